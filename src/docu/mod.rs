// src/docu/mod.rs
//! Raw Documentation Tree
//!
//! Layout and (un)marshalling for the on-disk documentation store. Raw data
//! lives in a directory tree mirroring branch/build/usecase/scenario; derived
//! files sit alongside the raw ones and are distinguished by naming
//! convention (`*.index.json`, the `objects/` subtree and the version stamp).

mod reader;
mod writer;

pub use reader::DocuReader;
pub use writer::DocuWriter;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DocuError, Result};
use crate::types::BuildIdentifier;

/// Raw use case entity file within a use case directory.
pub const USECASE_FILE: &str = "usecase.json";

/// Raw scenario entity file within a scenario directory.
pub const SCENARIO_FILE: &str = "scenario.json";

/// Subdirectory holding one file per step of a scenario.
pub const STEPS_DIR: &str = "steps";

/// Suffix shared by every derived index file.
pub const DERIVED_FILE_SUFFIX: &str = ".index.json";

/// Per-build aggregate of all use cases and their scenario summaries.
pub const USECASES_INDEX_FILE: &str = "usecases.index.json";

/// Per-use-case aggregate with scenario summaries.
pub const USECASE_INDEX_FILE: &str = "usecase.index.json";

/// Per-scenario page-grouped step sequence.
pub const PAGE_STEPS_INDEX_FILE: &str = "pagesteps.index.json";

/// Subtree holding all derived object data of a build.
pub const OBJECTS_DIR: &str = "objects";

/// Long-name to short-key index within the objects subtree.
pub const LONG_NAMES_INDEX_FILE: &str = "longnames.index.json";

/// Version stamp marking a completed aggregation; written last.
pub const VERSION_FILE: &str = "aggregated.version";

/// Computes the directory of one build's documentation.
#[must_use]
pub fn build_path(root: &Path, id: &BuildIdentifier) -> PathBuf {
    root.join(encode_name(&id.branch)).join(encode_name(&id.build))
}

/// Computes the directory of one use case within a build.
#[must_use]
pub fn use_case_path(root: &Path, id: &BuildIdentifier, use_case: &str) -> PathBuf {
    build_path(root, id).join(encode_name(use_case))
}

/// Computes the directory of one scenario within a use case.
#[must_use]
pub fn scenario_path(
    root: &Path,
    id: &BuildIdentifier,
    use_case: &str,
    scenario: &str,
) -> PathBuf {
    use_case_path(root, id, use_case).join(encode_name(scenario))
}

/// Computes the steps directory of one scenario.
#[must_use]
pub fn steps_path(
    root: &Path,
    id: &BuildIdentifier,
    use_case: &str,
    scenario: &str,
) -> PathBuf {
    scenario_path(root, id, use_case, scenario).join(STEPS_DIR)
}

/// Computes the derived objects directory of a build.
#[must_use]
pub fn objects_path(root: &Path, id: &BuildIdentifier) -> PathBuf {
    build_path(root, id).join(OBJECTS_DIR)
}

/// Computes the version stamp file of a build.
#[must_use]
pub fn version_file_path(root: &Path, id: &BuildIdentifier) -> PathBuf {
    build_path(root, id).join(VERSION_FILE)
}

/// Maps an entity name to a filesystem-safe directory name.
/// Deterministic; distinct names with the same safe form collapse, so
/// producers must keep entity names unique per level.
#[must_use]
pub fn encode_name(name: &str) -> String {
    let encoded: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if encoded.is_empty() {
        "_".to_string()
    } else {
        encoded
    }
}

/// Serializes a value as pretty-printed JSON into `path`, creating parent
/// directories as needed.
///
/// # Errors
/// Returns `Io` on filesystem failures, `Marshal` on serialization failures.
pub fn marshal<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DocuError::io(e, parent))?;
    }
    let mut content = serde_json::to_vec_pretty(value).map_err(|source| {
        DocuError::Marshal {
            source,
            path: path.to_path_buf(),
        }
    })?;
    content.push(b'\n');
    fs::write(path, content).map_err(|e| DocuError::io(e, path))
}

/// Reads a JSON file back into a value.
///
/// # Errors
/// Returns `NotFound` if the file is absent, `Unmarshal` if the content
/// does not parse.
pub fn unmarshal<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(DocuError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| DocuError::io(e, path))?;
    serde_json::from_str(&content).map_err(|source| DocuError::Unmarshal {
        source,
        path: path.to_path_buf(),
    })
}
