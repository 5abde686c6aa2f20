// src/aggregation/object_repository.rs
//! Object Reference Repository
//!
//! Accumulates and indexes business-object references encountered while
//! walking use cases, scenarios and steps. References declared at an outer
//! level are inherited by everything below it, carried along in an immutable
//! reference path: each descent produces a new path derived from the
//! parent's, so sibling traversals never observe each other's references.
//!
//! Stateful and single-threaded within one build; never shared across
//! concurrent builds.

use std::collections::{BTreeMap, BTreeSet};

use crate::aggregates::{ObjectIndex, ObjectLocation, ObjectList, ObjectTabTree};
use crate::config::CustomObjectTab;
use crate::dao::AggregationDao;
use crate::error::Result;
use crate::types::{BuildIdentifier, ObjectReference, Scenario, Step, UseCase};

use super::long_names::LongObjectNamesResolver;

/// The ordered, append-only set of object references visible at one point
/// of the traversal.
#[derive(Debug, Clone, Default)]
pub struct ReferencePath {
    entries: Vec<ObjectReference>,
}

impl ReferencePath {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a new path with `references` appended; `self` is untouched.
    #[must_use]
    pub fn extended(&self, references: &[ObjectReference]) -> Self {
        let mut entries = self.entries.clone();
        entries.extend_from_slice(references);
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[ObjectReference] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-build accumulator of object references and their locations.
pub struct ObjectRepository {
    build: BuildIdentifier,
    dao: AggregationDao,
    long_names: LongObjectNamesResolver,
    custom_tabs: Vec<CustomObjectTab>,
    current_use_case: Option<String>,
    /// Entries accumulated since the last per-use-case flush.
    pending: BTreeMap<ObjectReference, BTreeSet<ObjectLocation>>,
    /// Every distinct object seen during the whole build.
    all_objects: BTreeSet<ObjectReference>,
}

impl ObjectRepository {
    #[must_use]
    pub fn new(
        build: BuildIdentifier,
        dao: AggregationDao,
        custom_tabs: Vec<CustomObjectTab>,
    ) -> Self {
        Self {
            build,
            dao,
            long_names: LongObjectNamesResolver::new(),
            custom_tabs,
            current_use_case: None,
            pending: BTreeMap::new(),
            all_objects: BTreeSet::new(),
        }
    }

    /// Registers the objects declared at use case scope and opens a fresh
    /// reference path for the descent into its scenarios.
    pub fn add_referenced_use_case_objects(&mut self, use_case: &UseCase) -> ReferencePath {
        self.current_use_case = Some(use_case.name.clone());
        let location = ObjectLocation::use_case(&use_case.name);
        for reference in &use_case.referenced_objects {
            self.record(reference, location.clone());
        }
        ReferencePath::empty().extended(&use_case.referenced_objects)
    }

    /// Registers the objects visible at scenario scope (inherited use case
    /// references plus the scenario's own) and extends the path. The parent
    /// path is not mutated.
    pub fn add_referenced_scenario_objects(
        &mut self,
        parent: &ReferencePath,
        scenario: &Scenario,
    ) -> ReferencePath {
        let location =
            ObjectLocation::scenario(&self.current_use_case_name(), &scenario.name);
        let path = parent.extended(&scenario.referenced_objects);
        for reference in path.entries().to_vec() {
            self.record(&reference, location.clone());
        }
        path
    }

    /// Registers the objects visible at one step: everything inherited via
    /// the path plus the step's own references.
    pub fn add_referenced_step_objects(
        &mut self,
        path: &ReferencePath,
        scenario: &Scenario,
        step: &Step,
    ) {
        let location = ObjectLocation::step(
            &self.current_use_case_name(),
            &scenario.name,
            step.index,
        );
        let visible: Vec<ObjectReference> = path
            .entries()
            .iter()
            .chain(step.referenced_objects.iter())
            .cloned()
            .collect();
        for reference in visible {
            self.record(&reference, location.clone());
        }
    }

    /// Flushes the entries accumulated since the last flush, merging with
    /// any index files already written for other use cases of this build.
    /// Index entries are append/merge, never overwritten wholesale.
    ///
    /// # Errors
    /// Returns DAO errors; the build aborts on any of them.
    pub fn update_and_save_object_indexes_for_current_case(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for (object, locations) in pending {
            let short_key = self.long_names.resolve(&object.name);
            let mut index = match self.dao.load_object_index(
                &self.build,
                &object.object_type,
                &short_key,
            ) {
                Ok(existing) => existing,
                Err(err) if err.is_not_found() => ObjectIndex {
                    object: object.clone(),
                    locations: BTreeSet::new(),
                },
                Err(err) => return Err(err),
            };
            index.locations.extend(locations);
            self.dao
                .save_object_index(&self.build, &object.object_type, &short_key, &index)?;
        }
        Ok(())
    }

    /// Materializes the flat per-type listings of all distinct referenced
    /// objects. Purely derived; no new references are discovered here.
    ///
    /// # Errors
    /// Returns DAO errors.
    pub fn calculate_and_save_object_lists(&self) -> Result<()> {
        for (object_type, objects) in self.objects_by_type() {
            self.dao.save_object_list(
                &self.build,
                &ObjectList {
                    object_type,
                    objects,
                },
            )?;
        }
        Ok(())
    }

    /// Materializes the user-configured custom tab groupings over the
    /// already-collected objects.
    ///
    /// # Errors
    /// Returns DAO errors.
    pub fn save_custom_object_tab_trees(&self) -> Result<()> {
        let by_type = self.objects_by_type();
        for tab in &self.custom_tabs {
            let lists = tab
                .object_types
                .iter()
                .map(|object_type| ObjectList {
                    object_type: object_type.clone(),
                    objects: by_type.get(object_type).cloned().unwrap_or_default(),
                })
                .collect();
            self.dao.save_object_tab_tree(
                &self.build,
                &ObjectTabTree {
                    id: tab.id.clone(),
                    title: tab.title.clone(),
                    lists,
                },
            )?;
        }
        Ok(())
    }

    /// Deletes any previously persisted object data of this build.
    ///
    /// # Errors
    /// Returns DAO errors.
    pub fn remove_any_existing_object_data(&self) -> Result<()> {
        self.dao.delete_object_data(&self.build)
    }

    /// The long-name resolver backing this repository's index keys.
    #[must_use]
    pub fn long_names(&self) -> &LongObjectNamesResolver {
        &self.long_names
    }

    fn record(&mut self, object: &ObjectReference, location: ObjectLocation) {
        self.all_objects.insert(object.clone());
        self.pending
            .entry(object.clone())
            .or_default()
            .insert(location);
    }

    fn current_use_case_name(&self) -> String {
        debug_assert!(
            self.current_use_case.is_some(),
            "scenario/step registration before any use case"
        );
        self.current_use_case.clone().unwrap_or_default()
    }

    fn objects_by_type(&self) -> BTreeMap<String, Vec<ObjectReference>> {
        let mut by_type: BTreeMap<String, Vec<ObjectReference>> = BTreeMap::new();
        for object in &self.all_objects {
            by_type
                .entry(object.object_type.clone())
                .or_default()
                .push(object.clone());
        }
        by_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = anyhow::Result<()>;

    fn use_case(name: &str, refs: &[ObjectReference]) -> UseCase {
        UseCase {
            name: name.to_string(),
            description: String::new(),
            status: None,
            referenced_objects: refs.to_vec(),
        }
    }

    fn scenario(name: &str, refs: &[ObjectReference]) -> Scenario {
        Scenario {
            name: name.to_string(),
            description: String::new(),
            status: None,
            referenced_objects: refs.to_vec(),
        }
    }

    fn repository(dir: &TempDir) -> ObjectRepository {
        ObjectRepository::new(
            BuildIdentifier::new("trunk", "b1"),
            AggregationDao::new(dir.path()),
            Vec::new(),
        )
    }

    #[test]
    fn test_paths_grow_but_never_shrink() {
        let dir = TempDir::new().unwrap();
        let mut repo = repository(&dir);
        let order = ObjectReference::new("order", "Order #1");
        let user = ObjectReference::new("user", "Alice");

        let uc_path = repo.add_referenced_use_case_objects(&use_case("uc", &[order.clone()]));
        let sc_path =
            repo.add_referenced_scenario_objects(&uc_path, &scenario("sc", &[user.clone()]));

        assert_eq!(uc_path.entries(), &[order.clone()]);
        assert_eq!(sc_path.entries(), &[order, user]);
    }

    #[test]
    fn test_sibling_scenarios_do_not_see_each_other() {
        let dir = TempDir::new().unwrap();
        let mut repo = repository(&dir);
        let a = ObjectReference::new("order", "A");
        let b = ObjectReference::new("order", "B");

        let uc_path = repo.add_referenced_use_case_objects(&use_case("uc", &[]));
        let first = repo.add_referenced_scenario_objects(&uc_path, &scenario("s1", &[a.clone()]));
        let second = repo.add_referenced_scenario_objects(&uc_path, &scenario("s2", &[b.clone()]));

        assert_eq!(first.entries(), &[a]);
        assert_eq!(second.entries(), &[b]);
        assert!(uc_path.is_empty());
    }

    #[test]
    fn test_flush_merges_across_use_cases() -> TestResult {
        let dir = TempDir::new()?;
        let id = BuildIdentifier::new("trunk", "b1");
        let mut repo = repository(&dir);
        let shared = ObjectReference::new("service", "billing");

        repo.add_referenced_use_case_objects(&use_case("first", &[shared.clone()]));
        repo.update_and_save_object_indexes_for_current_case()?;
        repo.add_referenced_use_case_objects(&use_case("second", &[shared.clone()]));
        repo.update_and_save_object_indexes_for_current_case()?;

        let dao = AggregationDao::new(dir.path());
        let index = dao.load_object_index(&id, "service", "billing")?;
        assert_eq!(index.locations.len(), 2);
        assert!(index
            .locations
            .contains(&ObjectLocation::use_case("first")));
        assert!(index
            .locations
            .contains(&ObjectLocation::use_case("second")));
        Ok(())
    }

    #[test]
    fn test_object_lists_grouped_by_type() -> TestResult {
        let dir = TempDir::new()?;
        let id = BuildIdentifier::new("trunk", "b1");
        let mut repo = repository(&dir);

        repo.add_referenced_use_case_objects(&use_case(
            "uc",
            &[
                ObjectReference::new("service", "billing"),
                ObjectReference::new("order", "Order #9"),
                ObjectReference::new("service", "auth"),
            ],
        ));
        repo.calculate_and_save_object_lists()?;

        let objects_dir = crate::docu::objects_path(dir.path(), &id);
        assert!(objects_dir.join("service.list.index.json").is_file());
        assert!(objects_dir.join("order.list.index.json").is_file());
        Ok(())
    }

    #[test]
    fn test_custom_tab_trees_select_configured_types() -> TestResult {
        let dir = TempDir::new()?;
        let id = BuildIdentifier::new("trunk", "b1");
        let mut repo = ObjectRepository::new(
            id.clone(),
            AggregationDao::new(dir.path()),
            vec![CustomObjectTab {
                id: "services".to_string(),
                title: "Services".to_string(),
                object_types: vec!["service".to_string()],
            }],
        );
        repo.add_referenced_use_case_objects(&use_case(
            "uc",
            &[
                ObjectReference::new("service", "billing"),
                ObjectReference::new("order", "Order #9"),
            ],
        ));
        repo.save_custom_object_tab_trees()?;

        let tree: ObjectTabTree = crate::docu::unmarshal(
            &crate::docu::objects_path(dir.path(), &id).join("services.tab.index.json"),
        )?;
        assert_eq!(tree.lists.len(), 1);
        assert_eq!(tree.lists[0].objects.len(), 1);
        assert_eq!(tree.lists[0].objects[0].name, "billing");
        Ok(())
    }
}
