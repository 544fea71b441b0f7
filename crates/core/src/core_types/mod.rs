//! Core types and utilities

pub mod cell;
pub mod cell_state;

pub use cell::Cell;
pub use cell_state::CellState;
