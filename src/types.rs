// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scenario or use case outcome recorded by the test run.
pub const SUCCESS_STATE: &str = "success";

/// Scenario or use case outcome recorded by the test run.
pub const FAILED_STATE: &str = "failed";

/// Identifies one versioned snapshot of raw documentation on a branch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildIdentifier {
    pub branch: String,
    pub build: String,
}

impl BuildIdentifier {
    #[must_use]
    pub fn new(branch: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            build: build.into(),
        }
    }
}

impl fmt::Display for BuildIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.branch, self.build)
    }
}

/// A named pointer to an arbitrary business object mentioned during a
/// scenario's execution, e.g. ("order", "Order #123"). Not owned by any
/// single entity; the same object may be referenced from many places.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ObjectReference {
    #[serde(rename = "type")]
    pub object_type: String,
    pub name: String,
}

impl ObjectReference {
    #[must_use]
    pub fn new(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            name: name.into(),
        }
    }
}

/// Top level of one documented test execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Explicit outcome override. When absent the aggregator derives the
    /// status from the owned scenarios.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub referenced_objects: Vec<ObjectReference>,
}

/// One executed scenario, owned by exactly one use case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub referenced_objects: Vec<ObjectReference>,
}

impl Scenario {
    /// Returns true if the recorded status equals the failed state.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status.as_deref() == Some(FAILED_STATE)
    }
}

/// The page a step was captured on. Raw page names are noisy and are
/// normalized before any grouping happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub name: String,
}

impl Page {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Leaf unit of a documented execution, ordered within its scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub page: Option<Page>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub referenced_objects: Vec<ObjectReference>,
}

/// Link to an upstream build as delivered by the build importer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildLink {
    pub link_name: String,
    pub build: Build,
}

/// Upstream build description carried on a [`BuildLink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}
