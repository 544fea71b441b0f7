//! Wildfire State Estimation & Forecast Fusion Core
//!
//! Turns sparse, asynchronous per-cell ignition-time observations into a
//! consistent current-state raster and perimeter, and forecasts the future
//! extent by seeding an external grid spread simulator from that estimate
//! while masking ground already resolved by observation.
//!
//! ## Estimation paths
//!
//! - Interpolation: thin-plate-spline densification of the scattered
//!   observations alone
//! - Fusion: control-point warping of a prior forecast toward the
//!   observations, preserving the simulator's plausible front geometry
//!
//! All estimation and propagation calls are synchronous; snapshots are
//! immutable once built and swapped wholesale behind `Arc`, so consumers
//! can keep reading an old snapshot while a new one is computed.

// Core types and utilities
pub mod core_types;

// Raster grid storage and georeferencing
pub mod grid;

// Estimation and forecasting
pub mod assessment;
pub mod error;
pub mod forecast;
pub mod observation;
pub mod perimeter;
pub mod spline;

// Re-export core types
pub use core_types::{Cell, CellState};

// Re-export grid types
pub use grid::{Environment, FireMap, RasterLayer};

// Re-export estimation types
pub use assessment::{
    CurrentAssessment, FrontGraph, FusionAssessment, SituationAssessment, WildfireAssessment,
};
pub use error::AssessError;
pub use forecast::{ForecastPropagation, SpreadSimulator, UniformSpreadModel};
pub use observation::ObservationStore;
pub use perimeter::Perimeter;
