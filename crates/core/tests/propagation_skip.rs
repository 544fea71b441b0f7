//! Propagation is skipped entirely when there is nothing to seed

use fire_assess_core::{
    Cell, CellState, Environment, RasterLayer, SituationAssessment, SpreadSimulator,
};
use std::cell::Cell as StdCell;

/// Simulator double that fails the test if any contract call arrives.
struct UntouchableSimulator {
    calls: StdCell<usize>,
    shape: RasterLayer<f64>,
}

impl UntouchableSimulator {
    fn new(shape: RasterLayer<f64>) -> Self {
        Self {
            calls: StdCell::new(0),
            shape,
        }
    }
}

impl SpreadSimulator for UntouchableSimulator {
    fn set_ignition_cell(&mut self, _cell: Cell, _time: f64) {
        self.calls.set(self.calls.get() + 1);
    }
    fn mask_cell(&mut self, _cell: Cell) {
        self.calls.set(self.calls.get() + 1);
    }
    fn propagate(&mut self, _until: f64) {
        self.calls.set(self.calls.get() + 1);
    }
    fn ignitions(&self) -> RasterLayer<f64> {
        self.calls.set(self.calls.get() + 1);
        self.shape.clone()
    }
}

#[test]
fn test_empty_situation_skips_the_simulator() {
    let elevation = RasterLayer::filled(6, 6, 10.0, 0.0, 0.0, 0.0_f64);
    let mut sa = SituationAssessment::new(Environment::new(elevation.clone()));

    let mut sim = UntouchableSimulator::new(elevation);
    sa.assess_until(&mut sim, 600.0);

    assert_eq!(sim.calls.get(), 0, "skip must perform no simulator calls");

    let forecast = sa.predicted_wildfire();
    assert_eq!(forecast.until(), 600.0);
    assert!(
        forecast
            .geodata()
            .values()
            .iter()
            .all(|s| *s == CellState::Unburnt),
        "skipped propagation must leave an all-unburnt forecast"
    );
}
