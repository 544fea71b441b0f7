//! Current wildfire state by fusing a forecast with observations
//!
//! Pure spline fitting over very sparse observations can produce spatially
//! implausible blobs. When a trustworthy prior forecast exists it is better
//! to correct that forecast: match each observed cell to the forecast cell
//! whose predicted front passage covers the observed time, then warp the
//! whole forecast raster through those correspondences. The result matches
//! the observations exactly at the control points and keeps the simulator's
//! plausible front geometry everywhere else.

use crate::assessment::front_graph::FrontGraph;
use crate::core_types::Cell;
use crate::error::AssessError;
use crate::grid::FireMap;
use crate::perimeter::Perimeter;
use crate::spline;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Immutable snapshot of the current wildfire extent, estimated by warping
/// a prior forecast toward new observations.
#[derive(Debug)]
pub struct FusionAssessment {
    geodata: FireMap,
    time: f64,
    oldest: f64,
    newest: f64,
    perimeter: OnceLock<Result<Perimeter, AssessError>>,
}

impl FusionAssessment {
    /// Fuse a predicted fire map with scattered observations.
    ///
    /// For every observed cell the front graph of `predicted` yields the
    /// forecast's own cell with the same predicted passage time; those
    /// pairs drive a thin-plate control-point warp of the whole raster.
    /// Observations whose projection walk fails are dropped; fewer than
    /// three surviving pairs cannot anchor a warp.
    pub fn from_forecast(
        predicted: &FireMap,
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

        // Find the cell in the predicted map with the same ignition time as
        // each observed cell
        let graph = FrontGraph::new(predicted);
        let mut sources = Vec::with_capacity(observations.len());
        let mut targets = Vec::with_capacity(observations.len());
        for (&cell, &t) in &observations {
            match graph.find_cell_at_time(cell, t) {
                Some(source) => {
                    sources.push(source);
                    targets.push(cell);
                }
                None => {
                    debug!(
                        "no forecast counterpart for observation ({}, {}) at {t}",
                        cell.x, cell.y
                    );
                }
            }
        }
        if targets.len() < 3 {
            return Err(AssessError::InsufficientData {
                needed: 3,
                got: targets.len(),
            });
        }

        let geodata = spline::warp_fire_map(predicted, &sources, &targets)?;

        Ok(Self {
            geodata,
            time,
            oldest,
            newest,
            perimeter: OnceLock::new(),
        })
    }

    /// Fused wildfire map
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

    /// The fire perimeter at the query time, or `None` when extraction
    /// failed. Extraction runs once on first access and is cached.
    pub fn perimeter(&self) -> Option<&Perimeter> {
        self.try_perimeter().ok()
    }

    /// Like [`perimeter`], but surfacing why extraction failed.
    ///
    /// [`perimeter`]: FusionAssessment::perimeter
    pub fn try_perimeter(&self) -> Result<&Perimeter, &AssessError> {
        self.perimeter
            .get_or_init(|| Perimeter::extract(&self.geodata, self.time))
            .as_ref()
    }
}
