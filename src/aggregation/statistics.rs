// src/aggregation/statistics.rs
use serde::Serialize;

/// Counters accumulated over one aggregation run, retrievable after the
/// run completes. Consumed by the build-summary layer, never persisted.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BuildStatistics {
    pub number_of_use_cases: usize,
    pub number_of_successful_scenarios: usize,
    pub number_of_failed_scenarios: usize,
}

impl BuildStatistics {
    pub fn increment_use_case(&mut self) {
        self.number_of_use_cases += 1;
    }

    pub fn increment_successful_scenario(&mut self) {
        self.number_of_successful_scenarios += 1;
    }

    pub fn increment_failed_scenario(&mut self) {
        self.number_of_failed_scenarios += 1;
    }

    /// Total number of scenarios that were actually processed.
    #[must_use]
    pub fn number_of_scenarios(&self) -> usize {
        self.number_of_successful_scenarios + self.number_of_failed_scenarios
    }
}
