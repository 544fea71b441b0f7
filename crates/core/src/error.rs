//! Error taxonomy for estimation and fusion
//!
//! Two recoverable failure classes exist: not enough observations to fit or
//! threshold anything, and numerical degeneracy in the spline systems. Both
//! leave any previously published snapshot untouched. Out-of-range indexed
//! raster access is not represented here: it is a programming error and
//! panics at the access site, never silently clamped.

use thiserror::Error;

/// Recoverable failure of an estimation, fusion or perimeter extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessError {
    /// Too few observations (or surviving control points) to proceed.
    #[error("insufficient data: {got} point(s) available, {needed} needed")]
    InsufficientData {
        /// Minimum number of points the operation requires
        needed: usize,
        /// Number of points actually available
        got: usize,
    },

    /// The fitted linear system was singular or the geometry degenerate.
    #[error("numerical degeneracy in {0}")]
    Degenerate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = AssessError::InsufficientData { needed: 3, got: 1 };
        assert_eq!(e.to_string(), "insufficient data: 1 point(s) available, 3 needed");

        let e = AssessError::Degenerate("thin-plate system".into());
        assert_eq!(e.to_string(), "numerical degeneracy in thin-plate system");
    }
}
