//! Ignition-time fire maps
//!
//! A fire map is a raster layer of [`CellState`] values: the per-cell
//! earliest fire-arrival time, or an explicit unburnt/masked tag. The float
//! sentinel encoding (`+inf` unburnt, `NaN` masked) used by the spread
//! simulator is produced and consumed here, at the boundary only.

use crate::core_types::{Cell, CellState};
use crate::grid::RasterLayer;

/// Dense ignition-time map over the terrain grid.
pub type FireMap = RasterLayer<CellState>;

impl RasterLayer<CellState> {
    /// An all-unburnt fire map of the given shape.
    #[must_use]
    pub fn empty_firemap(
        width: usize,
        height: usize,
        cell_size: f64,
        x_offset: f64,
        y_offset: f64,
    ) -> FireMap {
        RasterLayer::filled(width, height, cell_size, x_offset, y_offset, CellState::Unburnt)
    }

    /// An all-unburnt fire map with the shape and georeferencing of a
    /// reference raster.
    #[must_use]
    pub fn empty_like<U>(reference: &RasterLayer<U>) -> FireMap {
        RasterLayer::filled_like(reference, CellState::Unburnt)
    }

    /// Encode into the simulator float channel (`+inf` unburnt, `NaN` masked).
    #[must_use]
    pub fn to_times(&self) -> RasterLayer<f64> {
        let mut out = RasterLayer::filled_like(self, f64::INFINITY);
        for (i, state) in self.values().iter().enumerate() {
            out.values_mut()[i] = state.time_or_inf();
        }
        out
    }

    /// Decode a simulator float raster back into tagged cell states.
    #[must_use]
    pub fn from_times(times: &RasterLayer<f64>) -> FireMap {
        let mut out = FireMap::empty_like(times);
        for (i, t) in times.values().iter().enumerate() {
            out.values_mut()[i] = CellState::from_time(*t);
        }
        out
    }

    /// Iterate over ignited cells with their arrival times.
    pub fn ignited_cells(&self) -> impl Iterator<Item = (Cell, f64)> + '_ {
        self.iter_cells()
            .filter_map(|(c, s)| s.ignition_time().map(|t| (c, t)))
    }

    /// True if the fire eventually reaches the cell.
    pub fn eventually_ignited(&self, cell: Cell) -> bool {
        self[cell].is_ignited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_firemap_is_all_unburnt() {
        let m = FireMap::empty_firemap(3, 3, 25.0, 0.0, 0.0);
        assert!(m.values().iter().all(|s| *s == CellState::Unburnt));
    }

    #[test]
    fn test_times_round_trip() {
        let mut m = FireMap::empty_firemap(2, 2, 1.0, 0.0, 0.0);
        m.set(Cell::new(0, 0), CellState::Ignited(12.0));
        m.set(Cell::new(1, 1), CellState::Masked);

        let times = m.to_times();
        assert_eq!(times[Cell::new(0, 0)], 12.0);
        assert_eq!(times[Cell::new(1, 0)], f64::INFINITY);
        assert!(times[Cell::new(1, 1)].is_nan());

        let back = FireMap::from_times(&times);
        assert_eq!(back, m);
    }

    #[test]
    fn test_ignited_cells_iteration() {
        let mut m = FireMap::empty_firemap(3, 2, 1.0, 0.0, 0.0);
        m.set(Cell::new(2, 0), CellState::Ignited(5.0));
        m.set(Cell::new(0, 1), CellState::Ignited(9.0));
        let cells: Vec<_> = m.ignited_cells().collect();
        assert_eq!(cells, vec![(Cell::new(2, 0), 5.0), (Cell::new(0, 1), 9.0)]);
        assert!(m.eventually_ignited(Cell::new(2, 0)));
        assert!(!m.eventually_ignited(Cell::new(1, 0)));
    }
}
