//! Tagged per-cell fire state
//!
//! Fire maps exchanged with the spread simulator pack three meanings into a
//! single float channel: a finite fire-arrival time, `+inf` for ground that
//! never ignited, and `NaN` for cells whose state is already resolved and
//! must not be propagated over. Inside the crate each cell carries an
//! explicit tag instead; the float encoding exists only at the simulator
//! boundary.

use serde::{Deserialize, Serialize};

/// State of one grid cell in an ignition map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum CellState {
    /// Never ignited (or propagation stopped before reaching it)
    #[default]
    Unburnt,
    /// Fire front reached the cell at the given timestamp (seconds)
    Ignited(f64),
    /// State resolved externally; excluded from propagation bookkeeping
    Masked,
}

impl CellState {
    /// Decode the simulator float channel: `+inf` → unburnt, `NaN` → masked.
    pub fn from_time(t: f64) -> Self {
        if t.is_nan() {
            CellState::Masked
        } else if t.is_infinite() {
            CellState::Unburnt
        } else {
            CellState::Ignited(t)
        }
    }

    /// Encode for the simulator float channel.
    ///
    /// Unburnt cells become `+inf`, masked cells `NaN`.
    pub fn time_or_inf(&self) -> f64 {
        match self {
            CellState::Unburnt => f64::INFINITY,
            CellState::Ignited(t) => *t,
            CellState::Masked => f64::NAN,
        }
    }

    /// The ignition timestamp, when there is one.
    pub fn ignition_time(&self) -> Option<f64> {
        match self {
            CellState::Ignited(t) => Some(*t),
            _ => None,
        }
    }

    /// True for cells the fire front has reached.
    pub fn is_ignited(&self) -> bool {
        matches!(self, CellState::Ignited(_))
    }

    /// True for cells excluded from propagation bookkeeping.
    pub fn is_masked(&self) -> bool {
        matches!(self, CellState::Masked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_round_trip() {
        assert_eq!(CellState::from_time(42.5), CellState::Ignited(42.5));
        assert_eq!(CellState::from_time(f64::INFINITY), CellState::Unburnt);
        assert_eq!(CellState::from_time(f64::NAN), CellState::Masked);

        assert_eq!(CellState::Ignited(42.5).time_or_inf(), 42.5);
        assert_eq!(CellState::Unburnt.time_or_inf(), f64::INFINITY);
        assert!(CellState::Masked.time_or_inf().is_nan());
    }

    #[test]
    fn test_predicates() {
        assert!(CellState::Ignited(0.0).is_ignited());
        assert!(!CellState::Unburnt.is_ignited());
        assert!(CellState::Masked.is_masked());
        assert_eq!(CellState::Ignited(7.0).ignition_time(), Some(7.0));
        assert_eq!(CellState::Unburnt.ignition_time(), None);
    }
}
