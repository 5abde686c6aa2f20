// src/docu/writer.rs
//! Writes raw documentation entities into the on-disk tree.
//!
//! Counterpart of [`DocuReader`](super::DocuReader), used by instrumentation
//! of test runs and by fixtures. The aggregator itself never writes raw data.

use std::path::PathBuf;

use crate::error::Result;
use crate::types::{BuildIdentifier, Scenario, Step, UseCase};

use super::{SCENARIO_FILE, USECASE_FILE};

#[derive(Debug, Clone)]
pub struct DocuWriter {
    root: PathBuf,
}

impl DocuWriter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_usecase(&self, id: &BuildIdentifier, use_case: &UseCase) -> Result<()> {
        let path =
            super::use_case_path(&self.root, id, &use_case.name).join(USECASE_FILE);
        super::marshal(use_case, &path)
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_scenario(
        &self,
        id: &BuildIdentifier,
        use_case: &str,
        scenario: &Scenario,
    ) -> Result<()> {
        let path = super::scenario_path(&self.root, id, use_case, &scenario.name)
            .join(SCENARIO_FILE);
        super::marshal(scenario, &path)
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_step(
        &self,
        id: &BuildIdentifier,
        use_case: &str,
        scenario: &str,
        step: &Step,
    ) -> Result<()> {
        let path = super::steps_path(&self.root, id, use_case, scenario)
            .join(format!("{:03}.json", step.index));
        super::marshal(step, &path)
    }
}
