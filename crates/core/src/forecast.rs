//! Future wildfire state from a known perimeter
//!
//! Seeds the external spread simulator from the current fire state, runs it
//! to a horizon timestamp, and fuses the result back with ground truth.
//! Cells already resolved by observation are masked out of the simulator's
//! working raster beforehand and overwritten from the authoritative current
//! map afterwards: the simulator has no notion of externally-fused history
//! and would otherwise back-propagate into already-burnt ground.

use crate::core_types::Cell;
use crate::grid::{FireMap, RasterLayer};
use crate::perimeter::Perimeter;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::SystemTime;
use tracing::{debug, info};

/// Contract of the external wind-driven spread simulator.
///
/// The simulator is bound to its grid/wind/fuel environment by the caller;
/// this crate only seeds it, masks resolved cells in its working raster,
/// and reads its output. Implementations must be total over well-formed
/// seed sets: a propagation run never fails, it just spreads less.
pub trait SpreadSimulator {
    /// Accumulate an ignition seed for the next propagation run.
    fn set_ignition_cell(&mut self, cell: Cell, time: f64);

    /// Mark a cell as externally resolved (`NaN` in the working raster):
    /// neither fresh fuel nor a re-ignition source.
    fn mask_cell(&mut self, cell: Cell);

    /// Run the deterministic spread model forward to a timestamp,
    /// consuming the accumulated seeds.
    fn propagate(&mut self, until: f64);

    /// Read the simulated ignition raster (float sentinel encoding).
    fn ignitions(&self) -> RasterLayer<f64>;
}

/// Immutable snapshot of the expected future wildfire extent.
#[derive(Debug, Clone)]
pub struct ForecastPropagation {
    geodata: FireMap,
    until: f64,
    time: SystemTime,
}

impl ForecastPropagation {
    /// An empty (all-unburnt) forecast, the state before any propagation.
    #[must_use]
    pub fn empty<U>(reference: &RasterLayer<U>, until: f64) -> Self {
        Self {
            geodata: FireMap::empty_like(reference),
            until,
            time: SystemTime::now(),
        }
    }

    /// Compute an expected wildfire up to the `until` horizon.
    ///
    /// Seeds are the pending point-ignitions plus the perimeter interior,
    /// when one is supplied. Masked cells are the finite, strictly positive
    /// cells of `current`, or, with a perimeter, the union of its area
    /// mask and the finite cells of its own raster. After the run every
    /// masked cell is overwritten with the authoritative current value,
    /// discarding simulator back-propagation artifacts.
    ///
    /// With neither a perimeter nor pending ignitions there is nothing to
    /// seed: propagation is skipped and the forecast stays empty. The
    /// pending-ignition map is consumed; a later run needs a fresh one.
    pub fn run(
        simulator: &mut dyn SpreadSimulator,
        perimeter: Option<&Perimeter>,
        pending_ignitions: FxHashMap<Cell, f64>,
        current: &FireMap,
        until: f64,
    ) -> Self {
        if perimeter.is_none() && pending_ignitions.is_empty() {
            info!("nothing to seed, skipping propagation");
            return Self::empty(current, until);
        }

        let mut seeds = pending_ignitions;
        if let Some(p) = perimeter {
            seeds.extend(p.cells().iter().map(|(c, t)| (*c, *t)));
        }

        // Mark burnt cells so fire does not propagate over them again
        let mask: Vec<Cell> = match perimeter {
            Some(p) => p
                .area()
                .iter_cells()
                .filter(|(c, inside)| **inside || p.array()[*c].is_ignited())
                .map(|(c, _)| c)
                .collect(),
            None => current
                .ignited_cells()
                .filter(|(_, t)| *t > 0.0)
                .map(|(c, _)| c)
                .collect(),
        };
        for cell in &mask {
            simulator.mask_cell(*cell);
        }

        debug!(
            "propagating {} seed(s) with {} masked cell(s) until {until}",
            seeds.len(),
            mask.len()
        );
        for (cell, t) in &seeds {
            simulator.set_ignition_cell(*cell, *t);
        }
        simulator.propagate(until);

        // Fuse simulated and current maps: masked cells keep ground truth
        let mut geodata = FireMap::from_times(&simulator.ignitions());
        for cell in &mask {
            geodata.set(*cell, current[*cell]);
        }

        Self {
            geodata,
            until,
            time: SystemTime::now(),
        }
    }

    /// Expected wildfire map at the horizon
    pub fn geodata(&self) -> &FireMap {
        &self.geodata
    }

    /// Horizon timestamp the simulation ran to
    pub fn until(&self) -> f64 {
        self.until
    }

    /// Wall-clock instant the forecast was computed at
    pub fn time(&self) -> SystemTime {
        self.time
    }
}

/// Minimal reference spread model satisfying [`SpreadSimulator`].
///
/// Grows a wavefront at a constant base rate, elongated downwind, by
/// relaxing arrival times over the 8-neighborhood (a Dijkstra sweep).
/// Masked cells are never traversed and keep their `NaN` marker unless
/// explicitly re-seeded. Deterministic; intended for tests and as a
/// stand-in until a real simulator service is bound.
#[derive(Debug, Clone)]
pub struct UniformSpreadModel {
    working: RasterLayer<f64>,
    seeds: Vec<(Cell, f64)>,
    /// Base spread rate (m/s)
    rate: f64,
    /// Wind as (speed km/h, direction radians); elongates the downwind rate
    wind: (f64, f64),
}

impl UniformSpreadModel {
    /// Wind speed at which the downwind elongation saturates (km/h)
    const WIND_SATURATION: f64 = 30.0;

    /// Bind a model to a grid shape with a base spread rate and wind.
    #[must_use]
    pub fn new<U>(reference: &RasterLayer<U>, rate: f64, wind: (f64, f64)) -> Self {
        Self {
            working: RasterLayer::filled_like(reference, f64::INFINITY),
            seeds: Vec::new(),
            rate,
            wind,
        }
    }

    /// Effective spread rate toward a travel direction.
    fn rate_toward(&self, direction: f64) -> f64 {
        let (speed, wind_dir) = self.wind;
        let alignment = (direction - wind_dir).cos();
        let strength = (speed / Self::WIND_SATURATION).min(1.0);
        // Up to +50% downwind, -50% upwind
        self.rate * (1.0 + 0.5 * strength * alignment)
    }
}

/// Heap entry ordered by earliest arrival time.
struct Frontier {
    time: f64,
    cell: Cell,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we pop earliest arrivals
        other.time.total_cmp(&self.time)
    }
}

impl SpreadSimulator for UniformSpreadModel {
    fn set_ignition_cell(&mut self, cell: Cell, time: f64) {
        self.seeds.push((cell, time));
    }

    fn mask_cell(&mut self, cell: Cell) {
        self.working.set(cell, f64::NAN);
    }

    fn propagate(&mut self, until: f64) {
        let cell_size = self.working.cell_size();
        let mut heap = BinaryHeap::new();
        for (cell, time) in self.seeds.drain(..) {
            if self.working.in_bounds(cell) && time <= until {
                heap.push(Frontier { time, cell });
            }
        }

        while let Some(Frontier { time, cell }) = heap.pop() {
            let known = self.working[cell];
            // A masked cell only burns when explicitly seeded; an earlier
            // arrival supersedes this one
            if known.is_finite() && known <= time {
                continue;
            }
            self.working.set(cell, time);

            for dy in -1_isize..=1 {
                for dx in -1_isize..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let neighbor = match cell.offset(dx, dy) {
                        Some(n) if self.working.in_bounds(n) => n,
                        _ => continue,
                    };
                    if self.working[neighbor].is_nan() {
                        // Externally resolved: never traversed
                        continue;
                    }
                    let distance = cell_size * f64::from((dx * dx + dy * dy) as i32).sqrt();
                    let direction = (dy as f64).atan2(dx as f64);
                    let arrival = time + distance / self.rate_toward(direction);
                    if arrival <= until && arrival < self.working[neighbor] {
                        heap.push(Frontier {
                            time: arrival,
                            cell: neighbor,
                        });
                    }
                }
            }
        }
    }

    fn ignitions(&self) -> RasterLayer<f64> {
        self.working.clone()
    }
}
