//! Current wildfire state from observations alone
//!
//! Densifies a scattered cell→ignition-time map into a full raster with a
//! thin-plate-spline fit, then exposes a lazily-extracted perimeter at the
//! query time. The snapshot is immutable once built: it owns its copy of
//! the observations and is superseded wholesale, never patched.

use crate::core_types::{Cell, CellState};
use crate::error::AssessError;
use crate::grid::FireMap;
use crate::perimeter::Perimeter;
use crate::spline;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Interpolated values beyond `newest + EXTRAPOLATION_TOLERANCE * span` are
/// extrapolations, not trustworthy late ignitions, and are discarded as
/// unburnt.
pub const EXTRAPOLATION_TOLERANCE: f64 = 0.05;

/// Immutable snapshot of the estimated current wildfire extent.
#[derive(Debug)]
pub struct CurrentAssessment {
    geodata: FireMap,
    time: f64,
    oldest: f64,
    newest: f64,
    perimeter: OnceLock<Result<Perimeter, AssessError>>,
}

impl CurrentAssessment {
    /// Estimate the current state from scattered observations.
    ///
    /// `reference` fixes the grid shape, `observations` is an owned
    /// point-in-time copy of the store's cells, and `query_time` the
    /// instant the perimeter should be taken at (default: the newest
    /// observed time).
    ///
    /// A single observation is written through without interpolation.
    /// Otherwise observed times are normalized to `[0, 1]`, fitted with a
    /// thin-plate spline, evaluated densely, denormalized, and clipped by
    /// the extrapolation guard.
    pub fn from_observations(
        reference: &FireMap,
        observations: FxHashMap<Cell, f64>,
        query_time: Option<f64>,
    ) -> Result<Self, AssessError> {
        if observations.is_empty() {
            return Err(AssessError::InsufficientData { needed: 1, got: 0 });
        }

        let oldest = observations.values().copied().fold(f64::INFINITY, f64::min);
        let newest = observations
            .values()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let time = query_time.unwrap_or(newest);

        let mut geodata = FireMap::empty_like(reference);
        if observations.len() == 1 {
            // Nothing to interpolate: write the lone observation through
            for (cell, t) in &observations {
                geodata.set(*cell, CellState::Ignited(*t));
            }
        } else {
            // Normalize observed times to [0, 1]; a flat observation set
            // collapses to 0 rather than dividing by zero
            let span_norm = newest - oldest;
            let mut sites = Vec::with_capacity(observations.len());
            let mut values = Vec::with_capacity(observations.len());
            for (cell, t) in &observations {
                sites.push((cell.x as f64, cell.y as f64));
                values.push(if span_norm > 0.0 {
                    (t - oldest) / span_norm
                } else {
                    0.0
                });
            }

            let dense = spline::interpolate(&sites, &values, reference)?;

            // Denormalize and filter out extrapolations, because they are
            // not reliable
            let cutoff = newest + EXTRAPOLATION_TOLERANCE * (newest - oldest);
            for (i, v) in dense.values().iter().enumerate() {
                let t = v * span_norm + oldest;
                geodata.values_mut()[i] = if t > cutoff {
                    CellState::Unburnt
                } else {
                    CellState::Ignited(t)
                };
            }
        }

        Ok(Self {
            geodata,
            time,
            oldest,
            newest,
            perimeter: OnceLock::new(),
        })
    }

    /// Interpolated wildfire map
    pub fn geodata(&self) -> &FireMap {
        &self.geodata
    }

    /// Query time of the snapshot
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Oldest observed ignition time
    pub fn oldest_observation(&self) -> f64 {
        self.oldest
    }

    /// Newest observed ignition time
    pub fn newest_observation(&self) -> f64 {
        self.newest
    }

    /// Time span covered by the observations
    pub fn observation_span(&self) -> f64 {
        self.newest - self.oldest
    }

    /// The fire perimeter at the query time, or `None` when extraction
    /// failed. Extraction runs once on first access and is cached.
    pub fn perimeter(&self) -> Option<&Perimeter> {
        self.try_perimeter().ok()
    }

    /// Like [`perimeter`], but surfacing why extraction failed.
    ///
    /// [`perimeter`]: CurrentAssessment::perimeter
    pub fn try_perimeter(&self) -> Result<&Perimeter, &AssessError> {
        self.perimeter
            .get_or_init(|| Perimeter::extract(&self.geodata, self.time))
            .as_ref()
    }
}
