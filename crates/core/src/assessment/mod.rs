//! Wildfire situation assessment
//!
//! The two current-state estimators (interpolation over observations alone,
//! and fusion of a prior forecast with observations) plus the supervisor
//! that owns the observation store and swaps the published snapshots.

pub mod current;
pub mod front_graph;
pub mod fusion;

pub use current::{CurrentAssessment, EXTRAPOLATION_TOLERANCE};
pub use front_graph::FrontGraph;
pub use fusion::FusionAssessment;

use crate::core_types::Cell;
use crate::error::AssessError;
use crate::forecast::{ForecastPropagation, SpreadSimulator};
use crate::grid::{Environment, FireMap, RasterLayer};
use crate::observation::ObservationStore;
use crate::perimeter::Perimeter;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A published current-state snapshot, whichever estimator produced it.
#[derive(Debug)]
pub enum WildfireAssessment {
    /// Interpolated from observations alone
    Interpolated(CurrentAssessment),
    /// A prior forecast warped toward observations
    Fused(FusionAssessment),
}

impl WildfireAssessment {
    /// Estimated wildfire map
    pub fn geodata(&self) -> &FireMap {
        match self {
            WildfireAssessment::Interpolated(a) => a.geodata(),
            WildfireAssessment::Fused(a) => a.geodata(),
        }
    }

    /// Query time of the snapshot
    pub fn time(&self) -> f64 {
        match self {
            WildfireAssessment::Interpolated(a) => a.time(),
            WildfireAssessment::Fused(a) => a.time(),
        }
    }

    /// The perimeter at the query time, extracted once and cached
    pub fn perimeter(&self) -> Option<&Perimeter> {
        match self {
            WildfireAssessment::Interpolated(a) => a.perimeter(),
            WildfireAssessment::Fused(a) => a.perimeter(),
        }
    }

    /// Like [`perimeter`](WildfireAssessment::perimeter), surfacing the
    /// extraction failure
    pub fn try_perimeter(&self) -> Result<&Perimeter, &AssessError> {
        match self {
            WildfireAssessment::Interpolated(a) => a.try_perimeter(),
            WildfireAssessment::Fused(a) => a.try_perimeter(),
        }
    }
}

/// Evaluate the current state of a wildfire and provide fire perimeter
/// forecasts.
///
/// Owns the observation store and the environment; publishes immutable
/// snapshots behind `Arc` so planner and display consumers can keep reading
/// an old snapshot while a new one is under construction. A failed
/// reassessment leaves the previously published snapshot untouched.
#[derive(Debug)]
pub struct SituationAssessment {
    environment: Environment,
    observed: ObservationStore,
    current: Option<Arc<WildfireAssessment>>,
    forecast: Arc<ForecastPropagation>,
}

impl SituationAssessment {
    /// Set up an assessment over an environment, with nothing observed and
    /// an empty forecast.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        let observed = ObservationStore::new(environment.raster());
        let forecast = Arc::new(ForecastPropagation::empty(environment.raster(), 0.0));
        Self {
            environment,
            observed,
            current: None,
            forecast,
        }
    }

    /// Fused observed wildfire
    pub fn observed_wildfire(&self) -> &ObservationStore {
        &self.observed
    }

    /// Report a world position as on fire (delegates to the store).
    pub fn set_point_ignition(&mut self, world_x: f64, world_y: f64, t: f64) {
        self.observed.set_point_ignition(world_x, world_y, t);
    }

    /// Report a cell as on fire (delegates to the store).
    pub fn set_cell_ignition(&mut self, cell: Cell, t: f64) {
        self.observed.set_cell_ignition(cell, t);
    }

    /// Clear a previously reported cell (delegates to the store).
    pub fn clear_observation_cell(&mut self, cell: Cell) {
        self.observed.clear_observation_cell(cell);
    }

    /// Update the mean surface wind over the area.
    pub fn set_surface_wind(&mut self, wind: (f64, f64)) {
        self.environment.update_area_wind(wind.0, wind.1);
    }

    /// Environment the assessment is bound to
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Elevation map
    pub fn elevation(&self) -> &RasterLayer<f64> {
        self.environment.raster()
    }

    /// Estimated fire propagation in the present, when one has been
    /// published
    pub fn wildfire(&self) -> Option<Arc<WildfireAssessment>> {
        self.current.clone()
    }

    /// Expected fire propagation in the future
    pub fn predicted_wildfire(&self) -> Arc<ForecastPropagation> {
        Arc::clone(&self.forecast)
    }

    /// Interpolate the observed firemap into a new current assessment.
    ///
    /// Works on a point-in-time copy of the store's cells. On failure the
    /// previously published snapshot stays in place.
    pub fn assess_current(&mut self, time: Option<f64>) -> Result<(), AssessError> {
        match time {
            Some(t) => info!("assessment of current wildfire state at time {t}"),
            None => info!("assessment of current wildfire state now"),
        }
        let reference = self.environment.empty_firemap();
        let result =
            CurrentAssessment::from_observations(&reference, self.observed.cells(), time);
        match result {
            Ok(assessment) => {
                self.current = Some(Arc::new(WildfireAssessment::Interpolated(assessment)));
                Ok(())
            }
            Err(e) => {
                warn!("cannot make assessment: {e}");
                Err(e)
            }
        }
    }

    /// Warp the latest forecast toward the observed firemap into a new
    /// current assessment.
    ///
    /// Preferred over [`assess_current`] when a trustworthy forecast
    /// exists. On failure the previously published snapshot stays in
    /// place.
    ///
    /// [`assess_current`]: SituationAssessment::assess_current
    pub fn assess_current_fused(&mut self, time: Option<f64>) -> Result<(), AssessError> {
        info!("assessment of current wildfire state by forecast fusion");
        let result =
            FusionAssessment::from_forecast(self.forecast.geodata(), self.observed.cells(), time);
        match result {
            Ok(assessment) => {
                self.current = Some(Arc::new(WildfireAssessment::Fused(assessment)));
                Ok(())
            }
            Err(e) => {
                warn!("cannot make fusion assessment: {e}");
                Err(e)
            }
        }
    }

    /// Compute an expected wildfire simulation up to `until` and publish
    /// it.
    ///
    /// Seeds from the current assessment's perimeter when one exists;
    /// otherwise falls back to seeding the raw observed cells directly.
    pub fn assess_until(&mut self, simulator: &mut dyn SpreadSimulator, until: f64) {
        let forecast = match &self.current {
            Some(cur) => {
                info!(
                    "assessment of future wildfire state from {} until {until}",
                    cur.time()
                );
                ForecastPropagation::run(
                    simulator,
                    cur.perimeter(),
                    FxHashMap::default(),
                    cur.geodata(),
                    until,
                )
            }
            None => {
                info!("assessment of future wildfire state until {until}");
                let observed = self.observed.geodata();
                ForecastPropagation::run(simulator, None, self.observed.cells(), &observed, until)
            }
        };
        self.forecast = Arc::new(forecast);
    }
}
