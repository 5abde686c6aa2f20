// src/dao/mod.rs
//! Structured-file store for derived aggregation artifacts.
//!
//! Keyed by (branch, build[, usecase[, scenario]]). Derived files live next
//! to the raw documentation they were computed from and are recognized by
//! naming convention, so a deletion sweep never touches raw input.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::aggregates::{
    ObjectIndex, ObjectList, ObjectTabTree, ScenarioPageSteps, UseCaseScenarios,
    UseCaseScenariosList,
};
use crate::docu;
use crate::error::{DocuError, Result};
use crate::types::BuildIdentifier;

/// File store for everything the aggregator derives for a build.
#[derive(Debug, Clone)]
pub struct AggregationDao {
    root: PathBuf,
}

impl AggregationDao {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_use_case_scenarios_list(
        &self,
        id: &BuildIdentifier,
        list: &UseCaseScenariosList,
    ) -> Result<()> {
        let path =
            docu::build_path(&self.root, id).join(docu::USECASES_INDEX_FILE);
        docu::marshal(list, &path)
    }

    /// # Errors
    /// Returns `NotFound` if the build was never aggregated.
    pub fn load_use_case_scenarios_list(
        &self,
        id: &BuildIdentifier,
    ) -> Result<UseCaseScenariosList> {
        let path =
            docu::build_path(&self.root, id).join(docu::USECASES_INDEX_FILE);
        docu::unmarshal(&path)
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_use_case_scenarios(
        &self,
        id: &BuildIdentifier,
        scenarios: &UseCaseScenarios,
    ) -> Result<()> {
        let path = docu::use_case_path(&self.root, id, &scenarios.use_case.name)
            .join(docu::USECASE_INDEX_FILE);
        docu::marshal(scenarios, &path)
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_scenario_page_steps(
        &self,
        id: &BuildIdentifier,
        page_steps: &ScenarioPageSteps,
    ) -> Result<()> {
        let path = docu::scenario_path(
            &self.root,
            id,
            &page_steps.use_case.name,
            &page_steps.scenario.name,
        )
        .join(docu::PAGE_STEPS_INDEX_FILE);
        docu::marshal(page_steps, &path)
    }

    /// # Errors
    /// Returns `NotFound` if the scenario was never aggregated.
    pub fn load_scenario_page_steps(
        &self,
        id: &BuildIdentifier,
        use_case: &str,
        scenario: &str,
    ) -> Result<ScenarioPageSteps> {
        let path = docu::scenario_path(&self.root, id, use_case, scenario)
            .join(docu::PAGE_STEPS_INDEX_FILE);
        docu::unmarshal(&path)
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_object_index(
        &self,
        id: &BuildIdentifier,
        object_type: &str,
        short_key: &str,
        index: &ObjectIndex,
    ) -> Result<()> {
        docu::marshal(index, &self.object_index_path(id, object_type, short_key))
    }

    /// # Errors
    /// Returns `NotFound` if no index exists for the object yet.
    pub fn load_object_index(
        &self,
        id: &BuildIdentifier,
        object_type: &str,
        short_key: &str,
    ) -> Result<ObjectIndex> {
        docu::unmarshal(&self.object_index_path(id, object_type, short_key))
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_object_list(
        &self,
        id: &BuildIdentifier,
        list: &ObjectList,
    ) -> Result<()> {
        let file = format!(
            "{}.list{}",
            docu::encode_name(&list.object_type),
            docu::DERIVED_FILE_SUFFIX
        );
        docu::marshal(list, &docu::objects_path(&self.root, id).join(file))
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_object_tab_tree(
        &self,
        id: &BuildIdentifier,
        tree: &ObjectTabTree,
    ) -> Result<()> {
        let file = format!(
            "{}.tab{}",
            docu::encode_name(&tree.id),
            docu::DERIVED_FILE_SUFFIX
        );
        docu::marshal(tree, &docu::objects_path(&self.root, id).join(file))
    }

    /// Removes the whole derived object subtree of a build. Idempotent.
    ///
    /// # Errors
    /// Returns I/O errors other than the subtree being absent.
    pub fn delete_object_data(&self, id: &BuildIdentifier) -> Result<()> {
        let dir = docu::objects_path(&self.root, id);
        if dir.is_dir() {
            fs::remove_dir_all(&dir).map_err(|e| DocuError::io(e, &dir))?;
        }
        Ok(())
    }

    /// # Errors
    /// Returns marshal or I/O errors.
    pub fn save_long_object_names_index(
        &self,
        id: &BuildIdentifier,
        index: &BTreeMap<String, String>,
    ) -> Result<()> {
        let path =
            docu::objects_path(&self.root, id).join(docu::LONG_NAMES_INDEX_FILE);
        docu::marshal(index, &path)
    }

    /// # Errors
    /// Returns `NotFound` if the index was never persisted.
    pub fn load_long_object_names_index(
        &self,
        id: &BuildIdentifier,
    ) -> Result<BTreeMap<String, String>> {
        let path =
            docu::objects_path(&self.root, id).join(docu::LONG_NAMES_INDEX_FILE);
        docu::unmarshal(&path)
    }

    /// Loads the format version stamp of a build's derived data.
    /// Absent or blank means the build was never aggregated.
    #[must_use]
    pub fn load_version(&self, id: &BuildIdentifier) -> Option<String> {
        let path = docu::version_file_path(&self.root, id);
        let content = fs::read_to_string(path).ok()?;
        let version = content.trim();
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }

    /// Stamps the derived data with the format version that produced it.
    /// Must be the last write of a successful aggregation.
    ///
    /// # Errors
    /// Returns I/O errors.
    pub fn save_version(&self, id: &BuildIdentifier, version: &str) -> Result<()> {
        let path = docu::version_file_path(&self.root, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DocuError::io(e, parent))?;
        }
        fs::write(&path, format!("{version}\n")).map_err(|e| DocuError::io(e, &path))
    }

    /// Deletes every derived artifact of a build, leaving raw input intact.
    /// Safe to call when nothing was ever aggregated.
    ///
    /// # Errors
    /// Returns I/O errors encountered while sweeping.
    pub fn delete_derived_files(&self, id: &BuildIdentifier) -> Result<()> {
        let build_dir = docu::build_path(&self.root, id);
        if !build_dir.is_dir() {
            return Ok(());
        }
        self.delete_object_data(id)?;
        for entry in WalkDir::new(&build_dir) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(docu::DERIVED_FILE_SUFFIX) || name == docu::VERSION_FILE
            {
                fs::remove_file(entry.path())
                    .map_err(|e| DocuError::io(e, entry.path()))?;
            }
        }
        Ok(())
    }

    fn object_index_path(
        &self,
        id: &BuildIdentifier,
        object_type: &str,
        short_key: &str,
    ) -> PathBuf {
        docu::objects_path(&self.root, id)
            .join(docu::encode_name(object_type))
            .join(format!("{short_key}{}", docu::DERIVED_FILE_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::ObjectLocation;
    use crate::docu::DocuWriter;
    use crate::types::{ObjectReference, UseCase};
    use tempfile::TempDir;

    type TestResult = anyhow::Result<()>;

    fn build_id() -> BuildIdentifier {
        BuildIdentifier::new("trunk", "b1")
    }

    #[test]
    fn test_version_roundtrip() -> TestResult {
        let dir = TempDir::new()?;
        let dao = AggregationDao::new(dir.path());
        let id = build_id();

        assert_eq!(dao.load_version(&id), None);
        dao.save_version(&id, "3.1.0")?;
        assert_eq!(dao.load_version(&id), Some("3.1.0".to_string()));
        Ok(())
    }

    #[test]
    fn test_blank_version_counts_as_absent() -> TestResult {
        let dir = TempDir::new()?;
        let dao = AggregationDao::new(dir.path());
        let id = build_id();
        dao.save_version(&id, "  ")?;
        assert_eq!(dao.load_version(&id), None);
        Ok(())
    }

    #[test]
    fn test_delete_derived_files_keeps_raw_input() -> TestResult {
        let dir = TempDir::new()?;
        let id = build_id();
        let writer = DocuWriter::new(dir.path());
        writer.save_usecase(
            &id,
            &UseCase {
                name: "uc".to_string(),
                description: String::new(),
                status: None,
                referenced_objects: Vec::new(),
            },
        )?;

        let dao = AggregationDao::new(dir.path());
        dao.save_use_case_scenarios_list(&id, &UseCaseScenariosList::default())?;
        dao.save_version(&id, "1.0")?;
        let index = ObjectIndex {
            object: ObjectReference::new("order", "Order #1"),
            locations: [ObjectLocation::use_case("uc")].into_iter().collect(),
        };
        dao.save_object_index(&id, "order", "Order__1", &index)?;

        dao.delete_derived_files(&id)?;

        assert_eq!(dao.load_version(&id), None);
        assert!(dao.load_use_case_scenarios_list(&id).is_err());
        assert!(dao.load_object_index(&id, "order", "Order__1").is_err());
        // raw entity survives the sweep
        let raw = crate::docu::use_case_path(dir.path(), &id, "uc")
            .join(crate::docu::USECASE_FILE);
        assert!(raw.is_file());
        Ok(())
    }

    #[test]
    fn test_delete_derived_files_on_missing_build_is_noop() -> TestResult {
        let dir = TempDir::new()?;
        let dao = AggregationDao::new(dir.path());
        dao.delete_derived_files(&build_id())?;
        Ok(())
    }
}
