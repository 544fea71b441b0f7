//! Observed wildfire store
//!
//! Holds the latest reported ignition time per cell, updatable from
//! different sources (UAV firemap reports, manual alarms). The per-cell map
//! is mirrored into a backing fire map so consumers can read a dense raster
//! without rebuilding one. Estimators never alias this store: they take an
//! owned copy of the cell map at construction.

use crate::core_types::{Cell, CellState};
use crate::grid::{FireMap, RasterLayer};
use rustc_hash::FxHashMap;
use std::time::SystemTime;
use tracing::debug;

/// Store of per-cell ignition-time observations.
///
/// Latest write wins per cell. Every mutation refreshes [`last_updated`],
/// which the monitoring loop polls to decide when a reassessment is due.
///
/// [`last_updated`]: ObservationStore::last_updated
#[derive(Debug, Clone)]
pub struct ObservationStore {
    cells: FxHashMap<Cell, f64>,
    geodata: FireMap,
    last_updated: SystemTime,
}

impl ObservationStore {
    /// Create an empty store shaped on a reference raster.
    #[must_use]
    pub fn new<U>(reference: &RasterLayer<U>) -> Self {
        Self {
            cells: FxHashMap::default(),
            geodata: FireMap::empty_like(reference),
            last_updated: SystemTime::now(),
        }
    }

    /// Report a world position as on fire at time `t`.
    ///
    /// Resolves the position to a cell and delegates to
    /// [`set_cell_ignition`]. The current wildfire assessment is not reset.
    ///
    /// # Panics
    ///
    /// Panics when the position lies outside the grid (fatal indexing error
    /// at the backing raster write).
    ///
    /// [`set_cell_ignition`]: ObservationStore::set_cell_ignition
    pub fn set_point_ignition(&mut self, world_x: f64, world_y: f64, t: f64) {
        let cell = self.geodata.world_to_cell(world_x, world_y);
        self.set_cell_ignition(cell, t);
    }

    /// Report a cell as on fire at time `t`, overwriting any earlier report.
    ///
    /// # Panics
    ///
    /// Panics when the cell is outside the grid.
    pub fn set_cell_ignition(&mut self, cell: Cell, t: f64) {
        self.cells.insert(cell, t);
        self.geodata.set(cell, CellState::Ignited(t));
        self.last_updated = SystemTime::now();
        debug!("observation set: ({}, {}) ignited at {t}", cell.x, cell.y);
    }

    /// Clear a cell that was previously reported on fire.
    ///
    /// The backing raster cell is reset to unburnt whether or not an
    /// observation existed.
    ///
    /// # Panics
    ///
    /// Panics when the cell is outside the grid.
    pub fn clear_observation_cell(&mut self, cell: Cell) {
        self.cells.remove(&cell);
        self.geodata.set(cell, CellState::Unburnt);
        self.last_updated = SystemTime::now();
        debug!("observation cleared: ({}, {})", cell.x, cell.y);
    }

    /// Owned snapshot of all current (cell, time) observations.
    ///
    /// Estimators must work on this copy, never on a live alias into the
    /// store, so later store mutations cannot corrupt an in-flight
    /// computation.
    #[must_use]
    pub fn cells(&self) -> FxHashMap<Cell, f64> {
        self.cells.clone()
    }

    /// Number of observed cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell has been observed
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Clone of the dense backing fire map
    #[must_use]
    pub fn geodata(&self) -> FireMap {
        self.geodata.clone()
    }

    /// Instant of the last mutation
    pub fn last_updated(&self) -> SystemTime {
        self.last_updated
    }
}
