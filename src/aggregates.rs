// src/aggregates.rs
//! Derived artifact types produced by build aggregation.
//!
//! Everything in this module is computed, never read from raw input. All
//! collections serialize in a stable order so that re-aggregating the same
//! build produces byte-identical files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{BuildIdentifier, Page, Scenario, UseCase, FAILED_STATE};

/// A scenario plus its derived step count, listed per use case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub scenario: Scenario,
    pub number_of_steps: usize,
}

impl ScenarioSummary {
    #[must_use]
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            number_of_steps: 0,
        }
    }
}

/// All scenario summaries of one use case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseScenarios {
    pub use_case: UseCase,
    pub scenarios: Vec<ScenarioSummary>,
}

/// The per-build aggregate of all use cases and their scenario summaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UseCaseScenariosList {
    pub use_case_scenarios: Vec<UseCaseScenarios>,
}

/// Step data retained in the per-page grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDescription {
    pub index: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Another rendering of the same logical page elsewhere in the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVariantLink {
    pub use_case: String,
    pub scenario: String,
    /// Index of the page occurrence within that scenario's page sequence.
    pub occurrence: usize,
    /// Index of the first step of that occurrence.
    pub first_step_index: usize,
}

/// A contiguous run of steps sharing one normalized page identity.
///
/// `variant_count` and `variants` stay empty until the cross-scenario
/// navigation pass has seen every scenario of the build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSteps {
    pub page: Page,
    pub steps: Vec<StepDescription>,
    #[serde(default)]
    pub variant_count: usize,
    #[serde(default)]
    pub variants: Vec<PageVariantLink>,
}

/// A scenario with its ordered page groups; persisted once per scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioPageSteps {
    pub use_case: UseCase,
    pub scenario: Scenario,
    pub pages_and_steps: Vec<PageSteps>,
}

impl ScenarioPageSteps {
    /// Total number of steps in the scenario, over all page groups.
    #[must_use]
    pub fn total_number_of_steps(&self) -> usize {
        self.pages_and_steps.iter().map(|p| p.steps.len()).sum()
    }
}

/// Where a business object was referenced during the build.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ObjectLocation {
    pub use_case: String,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub step: Option<usize>,
}

impl ObjectLocation {
    #[must_use]
    pub fn use_case(use_case: &str) -> Self {
        Self {
            use_case: use_case.to_string(),
            scenario: None,
            step: None,
        }
    }

    #[must_use]
    pub fn scenario(use_case: &str, scenario: &str) -> Self {
        Self {
            use_case: use_case.to_string(),
            scenario: Some(scenario.to_string()),
            step: None,
        }
    }

    #[must_use]
    pub fn step(use_case: &str, scenario: &str, step: usize) -> Self {
        Self {
            use_case: use_case.to_string(),
            scenario: Some(scenario.to_string()),
            step: Some(step),
        }
    }
}

/// Per-object index: every location that referenced the object.
/// One file per (object type, short key); merged, never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectIndex {
    pub object: crate::types::ObjectReference,
    pub locations: BTreeSet<ObjectLocation>,
}

/// Flat listing of all distinct objects of one type in a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectList {
    pub object_type: String,
    pub objects: Vec<crate::types::ObjectReference>,
}

/// A user-configured grouping of object lists, persisted per tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectTabTree {
    pub id: String,
    pub title: String,
    pub lists: Vec<ObjectList>,
}

/// Aggregation state of a build as reported to the browsing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildImportStatus {
    /// Never aggregated.
    Unprocessed,
    /// Aggregated with the current format version.
    Success,
    /// The upstream build import itself failed.
    Failed,
    /// Aggregated, but with a stale format version.
    Outdated,
}

impl BuildImportStatus {
    #[must_use]
    pub fn is_failed(self) -> bool {
        matches!(self, BuildImportStatus::Failed)
    }
}

/// Summary of one build's import and aggregation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildImportSummary {
    pub identifier: BuildIdentifier,
    pub status: BuildImportStatus,
    #[serde(default)]
    pub build_description: Option<crate::types::Build>,
}

impl BuildImportSummary {
    #[must_use]
    pub fn new(identifier: BuildIdentifier) -> Self {
        Self {
            identifier,
            status: BuildImportStatus::Unprocessed,
            build_description: None,
        }
    }
}

/// Derives a use case status from its scenarios when no explicit status
/// was recorded: failed as soon as one scenario failed.
#[must_use]
pub fn derive_use_case_status(scenarios: &[Scenario]) -> &'static str {
    if scenarios.iter().any(Scenario::is_failed) {
        FAILED_STATE
    } else {
        crate::types::SUCCESS_STATE
    }
}
