//! Fire perimeter extraction
//!
//! Thresholds a dense ignition map at a query time into the burnt interior,
//! its boundary, and a boolean area mask over the whole grid. Extraction is
//! a pure function of (map, threshold): deterministic and side-effect-free,
//! so assessment snapshots can defer it and cache the result.

use crate::core_types::{Cell, CellState};
use crate::error::AssessError;
use crate::grid::{FireMap, RasterLayer};
use rustc_hash::FxHashMap;

/// Interior/boundary decomposition of the burnt region at a fixed time.
#[derive(Debug, Clone)]
pub struct Perimeter {
    threshold: f64,
    cells: FxHashMap<Cell, f64>,
    boundary: Vec<Cell>,
    area: RasterLayer<bool>,
    array: FireMap,
}

impl Perimeter {
    /// Extract the perimeter of `map` at query time `threshold`.
    ///
    /// Interior is every cell ignited at or before the threshold; boundary
    /// is the interior cells touching a non-interior 8-neighbor or the grid
    /// edge. An empty interior cannot be decomposed and yields
    /// [`AssessError::InsufficientData`].
    pub fn extract(map: &FireMap, threshold: f64) -> Result<Self, AssessError> {
        let mut cells = FxHashMap::default();
        let mut area = RasterLayer::filled_like(map, false);
        let mut array = FireMap::empty_like(map);

        for (cell, state) in map.iter_cells() {
            if let Some(t) = state.ignition_time() {
                if t <= threshold {
                    cells.insert(cell, t);
                    area.set(cell, true);
                    array.set(cell, CellState::Ignited(t));
                }
            }
        }

        if cells.is_empty() {
            return Err(AssessError::InsufficientData { needed: 1, got: 0 });
        }

        let mut boundary: Vec<Cell> = cells
            .keys()
            .filter(|cell| is_boundary(&area, **cell))
            .copied()
            .collect();
        // Deterministic output for a deterministic input
        boundary.sort_unstable_by_key(|c| (c.y, c.x));

        Ok(Self {
            threshold,
            cells,
            boundary,
            area,
            array,
        })
    }

    /// Query time the decomposition was taken at
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Interior cells with their ignition times
    pub fn cells(&self) -> &FxHashMap<Cell, f64> {
        &self.cells
    }

    /// Interior cells adjacent to unburnt ground or the grid edge
    pub fn boundary(&self) -> &[Cell] {
        &self.boundary
    }

    /// Boolean interior-membership mask over the full grid
    pub fn area(&self) -> &RasterLayer<bool> {
        &self.area
    }

    /// The perimeter's own ignition raster: interior times, unburnt elsewhere
    pub fn array(&self) -> &FireMap {
        &self.array
    }

    /// True when the cell belongs to the burnt interior.
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains_key(&cell)
    }
}

/// An interior cell is boundary when any 8-neighbor is missing (grid edge)
/// or outside the interior.
fn is_boundary(area: &RasterLayer<bool>, cell: Cell) -> bool {
    for dy in -1_isize..=1 {
        for dx in -1_isize..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            match cell.offset(dx, dy) {
                Some(n) if area.in_bounds(n) => {
                    if !area[n] {
                        return true;
                    }
                }
                _ => return true,
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 7x7 map with a 3x3 burnt block (times 0..=8) centered on (3, 3)
    fn block_map() -> FireMap {
        let mut map = FireMap::empty_firemap(7, 7, 1.0, 0.0, 0.0);
        let mut t = 0.0;
        for y in 2..5 {
            for x in 2..5 {
                map.set(Cell::new(x, y), CellState::Ignited(t));
                t += 1.0;
            }
        }
        map
    }

    #[test]
    fn test_interior_and_mask() {
        let p = Perimeter::extract(&block_map(), 100.0).unwrap();
        assert_eq!(p.cells().len(), 9);
        assert!(p.contains(Cell::new(3, 3)));
        assert!(!p.contains(Cell::new(0, 0)));
        assert!(p.area()[Cell::new(2, 2)]);
        assert!(!p.area()[Cell::new(5, 5)]);
        assert_eq!(p.array()[Cell::new(2, 3)], CellState::Ignited(3.0));
        assert_eq!(p.array()[Cell::new(0, 0)], CellState::Unburnt);
    }

    #[test]
    fn test_threshold_excludes_late_cells() {
        // Times 0..=8: threshold 3.5 keeps the first four cells only
        let p = Perimeter::extract(&block_map(), 3.5).unwrap();
        assert_eq!(p.cells().len(), 4);
        assert!(p.contains(Cell::new(2, 2)));
        assert!(!p.contains(Cell::new(4, 3)));
    }

    #[test]
    fn test_boundary_of_block() {
        let p = Perimeter::extract(&block_map(), 100.0).unwrap();
        // 3x3 interior: all cells but the center touch unburnt ground
        assert_eq!(p.boundary().len(), 8);
        assert!(!p.boundary().contains(&Cell::new(3, 3)));
    }

    #[test]
    fn test_grid_edge_is_boundary() {
        let mut map = FireMap::empty_firemap(3, 3, 1.0, 0.0, 0.0);
        for y in 0..3 {
            for x in 0..3 {
                map.set(Cell::new(x, y), CellState::Ignited(1.0));
            }
        }
        let p = Perimeter::extract(&map, 2.0).unwrap();
        // Everything burnt: only the center is not on the grid edge
        assert_eq!(p.boundary().len(), 8);
    }

    #[test]
    fn test_empty_interior_is_insufficient_data() {
        let map = FireMap::empty_firemap(4, 4, 1.0, 0.0, 0.0);
        assert!(matches!(
            Perimeter::extract(&map, 10.0),
            Err(AssessError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_masked_cells_stay_outside() {
        let mut map = block_map();
        map.set(Cell::new(3, 3), CellState::Masked);
        let p = Perimeter::extract(&map, 100.0).unwrap();
        assert_eq!(p.cells().len(), 8);
        assert!(!p.contains(Cell::new(3, 3)));
    }
}
