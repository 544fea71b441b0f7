//! Estimation-side environment binding
//!
//! Groups the terrain raster the estimators are shaped on with the mean
//! surface wind the spread simulator is configured from. The wind itself is
//! only bookkeeping here; applying it to a propagation run is the simulator
//! binding's job.

use crate::grid::{FireMap, RasterLayer};
use tracing::debug;

/// Terrain grid plus mean surface wind for an area of interest.
#[derive(Debug, Clone)]
pub struct Environment {
    elevation: RasterLayer<f64>,
    /// Mean surface wind as (speed km/h, direction radians)
    surface_wind: (f64, f64),
}

impl Environment {
    /// Bind an environment to an elevation raster with calm initial wind.
    #[must_use]
    pub fn new(elevation: RasterLayer<f64>) -> Self {
        Self {
            elevation,
            surface_wind: (0.0, 0.0),
        }
    }

    /// Elevation raster the estimators are shaped on
    pub fn raster(&self) -> &RasterLayer<f64> {
        &self.elevation
    }

    /// Current mean surface wind as (speed km/h, direction radians)
    pub fn surface_wind(&self) -> (f64, f64) {
        self.surface_wind
    }

    /// Update the mean surface wind over the whole area.
    pub fn update_area_wind(&mut self, speed: f64, direction: f64) {
        self.surface_wind = (speed, direction);
        debug!("Surface wind has been updated to ({speed}, {direction})");
    }

    /// An all-unburnt fire map matching this environment's grid.
    #[must_use]
    pub fn empty_firemap(&self) -> FireMap {
        FireMap::empty_like(&self.elevation)
    }
}
