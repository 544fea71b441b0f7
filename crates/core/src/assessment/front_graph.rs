//! Fire-front graph over a predicted ignition map
//!
//! Treats a dense ignition raster as an implicit front graph: each cell
//! knows when the front arrives (`ignitions`), when it has fully traversed
//! the cell (`traversal_end`), and the local propagation direction (the
//! raising slope of the ignition raster, computed like a terrain slope).
//! Walking that direction up or down finds the raster's own cell whose
//! predicted front passage covers a target time, which is how observed
//! cells are matched to their counterparts in a forecast.

use crate::core_types::Cell;
use crate::grid::{FireMap, RasterLayer};

/// Residence time assumed at the propagation border, where no later
/// neighbor bounds the traversal (seconds).
const BORDER_RESIDENCE: f64 = 180.0;

/// Derived front-passage rasters over a predicted fire map.
#[derive(Debug, Clone)]
pub struct FrontGraph {
    ignitions: RasterLayer<f64>,
    traversal_end: RasterLayer<f64>,
    direction: RasterLayer<f64>,
}

impl FrontGraph {
    /// Build the front graph of a predicted fire map.
    #[must_use]
    pub fn new(map: &FireMap) -> Self {
        let ignitions = map.to_times();
        let traversal_end = compute_traversal_ends(&ignitions);
        let direction = compute_propagation_direction(&ignitions);
        Self {
            ignitions,
            traversal_end,
            direction,
        }
    }

    /// True if the predicted fire eventually reaches the cell.
    pub fn eventually_ignited(&self, cell: Cell) -> bool {
        self.ignitions[cell].is_finite()
    }

    /// Time at which the front has entirely traversed a cell.
    pub fn traversal_end(&self, cell: Cell) -> f64 {
        self.traversal_end[cell]
    }

    /// Find the cell whose predicted front passage covers `time`, walking
    /// from `cell` along the propagation direction.
    ///
    /// Walks downslope for times before the cell's ignition and upslope for
    /// times after its traversal. Fails (`None`) when the walk leaves the
    /// grid, leaves the ignited region, or hits a local extremum of the
    /// ignition raster (a geometric pattern the slope walk cannot cross).
    pub fn find_cell_at_time(&self, start: Cell, time: f64) -> Option<Cell> {
        if !self.ignitions.in_bounds(start) {
            return None;
        }
        let mut cell = start;
        // A plateau of equal ignition times can cycle the walk; cap steps
        // at the cell count to guarantee termination.
        for _ in 0..self.ignitions.len() {
            if !self.eventually_ignited(cell) {
                return None;
            }
            let ignition = self.ignitions[cell];
            let end = self.traversal_end[cell];
            if ignition <= time && time <= end {
                return Some(cell);
            }

            let (dx, dy) = discrete_direction(self.direction[cell]);
            let next = if time > end {
                // Move along the propagation direction, toward later times
                let next = cell.offset(dx, dy)?;
                if !self.ignitions.in_bounds(next) || ignition > self.ignitions[next] {
                    // Ignition times are not growing: local maximum, abandon
                    return None;
                }
                next
            } else {
                // Move against the propagation direction, toward earlier times
                let next = cell.offset(-dx, -dy)?;
                if !self.ignitions.in_bounds(next) || ignition < self.ignitions[next] {
                    // Ignition times are not decreasing: local minimum, abandon
                    return None;
                }
                next
            };
            if !self.eventually_ignited(next) {
                return None;
            }
            cell = next;
        }
        None
    }
}

/// Round an angle to one of the 8 grid directions and return its unit step.
fn discrete_direction(direction: f64) -> (isize, isize) {
    use std::f64::consts::{FRAC_PI_4, TAU};
    let dir = direction.rem_euclid(TAU);
    let discrete = ((dir / FRAC_PI_4).round() as i64).rem_euclid(8);

    let dx = match discrete {
        0 | 1 | 7 => 1,
        3 | 4 | 5 => -1,
        _ => 0,
    };
    let dy = match discrete {
        1 | 2 | 3 => 1,
        5 | 6 | 7 => -1,
        _ => 0,
    };
    (dx, dy)
}

/// Time at which the front leaves each cell: the latest ignition among its
/// ignited 8-neighbors, or a fixed border residence time where the cell is
/// the propagation border itself. Never-ignited cells stay infinite.
fn compute_traversal_ends(ignitions: &RasterLayer<f64>) -> RasterLayer<f64> {
    let mut ends = RasterLayer::filled_like(ignitions, f64::INFINITY);
    for (cell, t) in ignitions.iter_cells() {
        if !t.is_finite() {
            continue;
        }
        let mut max_neighbor = 0.0_f64;
        for dy in -1_isize..=1 {
            for dx in -1_isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some(n) = cell.offset(dx, dy) {
                    if let Some(nt) = ignitions.get(n) {
                        if nt.is_finite() {
                            max_neighbor = max_neighbor.max(*nt);
                        }
                    }
                }
            }
        }
        let end = if max_neighbor <= *t {
            *t + BORDER_RESIDENCE
        } else {
            max_neighbor
        };
        ends.set(cell, end);
    }
    ends
}

/// Local propagation direction per cell: the raising slope of the ignition
/// raster, computed with a Sobel stencil exactly as a terrain slope would
/// be. Out-of-grid or never-ignited neighbors default to the center time.
fn compute_propagation_direction(ignitions: &RasterLayer<f64>) -> RasterLayer<f64> {
    let mut directions = RasterLayer::filled_like(ignitions, 0.0);
    for (cell, t) in ignitions.iter_cells() {
        if !t.is_finite() {
            continue;
        }
        let ign = |dx: isize, dy: isize| -> f64 {
            cell.offset(dx, dy)
                .and_then(|n| ignitions.get(n))
                .filter(|nt| nt.is_finite())
                .copied()
                .unwrap_or(*t)
        };
        let prop_dx = ign(1, -1) + 2.0 * ign(1, 0) + ign(1, 1)
            - ign(-1, -1)
            - 2.0 * ign(-1, 0)
            - ign(-1, 1);
        let prop_dy = ign(1, 1) + 2.0 * ign(0, 1) + ign(-1, 1)
            - ign(1, -1)
            - 2.0 * ign(0, -1)
            - ign(-1, -1);
        directions.set(cell, prop_dy.atan2(prop_dx));
    }
    directions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::CellState;

    /// 10x10 map igniting left to right, 60 s per column
    fn ramp_map() -> FireMap {
        let mut map = FireMap::empty_firemap(10, 10, 1.0, 0.0, 0.0);
        for y in 0..10 {
            for x in 0..10 {
                map.set(Cell::new(x, y), CellState::Ignited(x as f64 * 60.0));
            }
        }
        map
    }

    #[test]
    fn test_traversal_interval_contains_target() {
        let graph = FrontGraph::new(&ramp_map());
        let found = graph.find_cell_at_time(Cell::new(2, 5), 300.0).unwrap();
        assert!(graph.ignitions[found] <= 300.0);
        assert!(graph.traversal_end(found) >= 300.0);
    }

    #[test]
    fn test_walk_toward_earlier_times() {
        let graph = FrontGraph::new(&ramp_map());
        // Cell (8, 5) ignites at 480; the front was at column 1 at t=60
        let found = graph.find_cell_at_time(Cell::new(8, 5), 60.0).unwrap();
        assert!(found.x < 8);
        assert!(graph.ignitions[found] <= 60.0);
    }

    #[test]
    fn test_direction_of_ramp() {
        let graph = FrontGraph::new(&ramp_map());
        // Ignition times grow with x: the slope points along +x
        let (dx, dy) = discrete_direction(graph.direction[Cell::new(5, 5)]);
        assert_eq!((dx, dy), (1, 0));
    }

    #[test]
    fn test_border_residence_on_uniform_patch() {
        let mut map = FireMap::empty_firemap(5, 5, 1.0, 0.0, 0.0);
        map.set(Cell::new(2, 2), CellState::Ignited(100.0));
        let graph = FrontGraph::new(&map);
        // Isolated ignition: no later neighbor, traversal is the fixed border residence
        assert_eq!(graph.traversal_end(Cell::new(2, 2)), 100.0 + BORDER_RESIDENCE);
    }

    #[test]
    fn test_unburnt_region_fails() {
        let graph = FrontGraph::new(&FireMap::empty_firemap(5, 5, 1.0, 0.0, 0.0));
        assert_eq!(graph.find_cell_at_time(Cell::new(2, 2), 10.0), None);
    }

    #[test]
    fn test_out_of_grid_start_fails() {
        let graph = FrontGraph::new(&ramp_map());
        assert_eq!(graph.find_cell_at_time(Cell::new(40, 2), 10.0), None);
    }
}
