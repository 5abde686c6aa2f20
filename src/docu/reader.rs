// src/docu/reader.rs
//! Reads raw documentation entities from the on-disk tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DocuError, Result};
use crate::types::{BuildIdentifier, Scenario, Step, UseCase};

use super::{SCENARIO_FILE, USECASE_FILE};

/// Reader over the raw documentation data of one store root.
///
/// All listings are returned sorted by entity name (steps by index) so that
/// aggregation walks the tree in a deterministic order.
#[derive(Debug, Clone)]
pub struct DocuReader {
    root: PathBuf,
}

impl DocuReader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads the use cases of a build.
    ///
    /// # Errors
    /// `NotFound` if the build directory is absent; unmarshal errors for
    /// malformed entity files.
    pub fn load_usecases(&self, id: &BuildIdentifier) -> Result<Vec<UseCase>> {
        let dir = super::build_path(&self.root, id);
        let mut usecases: Vec<UseCase> =
            load_entities(&dir, USECASE_FILE)?;
        usecases.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(usecases)
    }

    /// Loads the scenarios of one use case.
    ///
    /// # Errors
    /// `NotFound` if the use case directory is absent.
    pub fn load_scenarios(
        &self,
        id: &BuildIdentifier,
        use_case: &str,
    ) -> Result<Vec<Scenario>> {
        let dir = super::use_case_path(&self.root, id, use_case);
        let mut scenarios: Vec<Scenario> =
            load_entities(&dir, SCENARIO_FILE)?;
        scenarios.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(scenarios)
    }

    /// Loads the ordered steps of one scenario.
    ///
    /// # Errors
    /// `NotFound` if the steps directory is absent.
    pub fn load_steps(
        &self,
        id: &BuildIdentifier,
        use_case: &str,
        scenario: &str,
    ) -> Result<Vec<Step>> {
        let dir = super::steps_path(&self.root, id, use_case, scenario);
        if !dir.is_dir() {
            return Err(DocuError::NotFound { path: dir });
        }
        let mut steps = Vec::new();
        for entry in read_dir_sorted(&dir)? {
            if entry.extension().is_some_and(|e| e == "json") {
                steps.push(super::unmarshal::<Step>(&entry)?);
            }
        }
        steps.sort_by_key(|s| s.index);
        Ok(steps)
    }
}

/// Unmarshals `entity_file` from every subdirectory of `dir` that carries one.
fn load_entities<T: serde::de::DeserializeOwned>(
    dir: &Path,
    entity_file: &str,
) -> Result<Vec<T>> {
    if !dir.is_dir() {
        return Err(DocuError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut entities = Vec::new();
    for entry in read_dir_sorted(dir)? {
        let candidate = entry.join(entity_file);
        if candidate.is_file() {
            entities.push(super::unmarshal(&candidate)?);
        }
    }
    Ok(entities)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| DocuError::io(e, dir))?;
    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry.map_err(|e| DocuError::io(e, dir))?.path());
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docu::DocuWriter;
    use crate::types::Page;
    use tempfile::TempDir;

    type TestResult = anyhow::Result<()>;

    fn usecase(name: &str) -> UseCase {
        UseCase {
            name: name.to_string(),
            description: String::new(),
            status: None,
            referenced_objects: Vec::new(),
        }
    }

    fn scenario(name: &str) -> Scenario {
        Scenario {
            name: name.to_string(),
            description: String::new(),
            status: Some("success".to_string()),
            referenced_objects: Vec::new(),
        }
    }

    fn step(index: usize, page: &str) -> Step {
        Step {
            index,
            title: format!("step {index}"),
            page: Some(Page::new(page)),
            status: None,
            referenced_objects: Vec::new(),
        }
    }

    #[test]
    fn test_roundtrip_is_sorted_by_name() -> TestResult {
        let dir = TempDir::new()?;
        let id = BuildIdentifier::new("trunk", "b1");
        let writer = DocuWriter::new(dir.path());
        writer.save_usecase(&id, &usecase("zeta"))?;
        writer.save_usecase(&id, &usecase("alpha"))?;

        let reader = DocuReader::new(dir.path());
        let names: Vec<_> = reader
            .load_usecases(&id)?
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        Ok(())
    }

    #[test]
    fn test_missing_build_is_not_found() {
        let dir = TempDir::new().unwrap();
        let reader = DocuReader::new(dir.path());
        let err = reader
            .load_usecases(&BuildIdentifier::new("trunk", "nope"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_steps_dir_is_not_found() -> TestResult {
        let dir = TempDir::new()?;
        let id = BuildIdentifier::new("trunk", "b1");
        let writer = DocuWriter::new(dir.path());
        writer.save_usecase(&id, &usecase("uc"))?;
        writer.save_scenario(&id, "uc", &scenario("sc"))?;

        let reader = DocuReader::new(dir.path());
        let err = reader.load_steps(&id, "uc", "sc").unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }

    #[test]
    fn test_steps_ordered_by_index() -> TestResult {
        let dir = TempDir::new()?;
        let id = BuildIdentifier::new("trunk", "b1");
        let writer = DocuWriter::new(dir.path());
        writer.save_usecase(&id, &usecase("uc"))?;
        writer.save_scenario(&id, "uc", &scenario("sc"))?;
        writer.save_step(&id, "uc", "sc", &step(2, "p"))?;
        writer.save_step(&id, "uc", "sc", &step(0, "p"))?;
        writer.save_step(&id, "uc", "sc", &step(1, "p"))?;

        let reader = DocuReader::new(dir.path());
        let indexes: Vec<_> = reader
            .load_steps(&id, "uc", "sc")?
            .into_iter()
            .map(|s| s.index)
            .collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn test_malformed_entity_is_unmarshal_error() -> TestResult {
        let dir = TempDir::new()?;
        let id = BuildIdentifier::new("trunk", "b1");
        let uc_dir = crate::docu::use_case_path(dir.path(), &id, "uc");
        std::fs::create_dir_all(&uc_dir)?;
        std::fs::write(uc_dir.join(USECASE_FILE), "{ not json")?;

        let reader = DocuReader::new(dir.path());
        let err = reader.load_usecases(&id).unwrap_err();
        assert!(matches!(err, DocuError::Unmarshal { .. }));
        Ok(())
    }
}
