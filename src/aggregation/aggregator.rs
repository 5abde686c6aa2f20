// src/aggregation/aggregator.rs
//! Build Aggregation Orchestrator
//!
//! Walks the raw tree of one build exactly once, builds the cross-cutting
//! indexes incrementally as it walks and manages idempotent, versioned
//! recomputation: derived data is rebuilt only when the raw data or the
//! aggregation format changes. One aggregator instance owns one build's
//! derived-file namespace exclusively; callers must serialize concurrent
//! attempts for the same build externally.

use log::{info, warn};

use crate::aggregates::{
    derive_use_case_status, BuildImportStatus, BuildImportSummary, ScenarioSummary,
    UseCaseScenarios, UseCaseScenariosList,
};
use crate::config::{Config, CustomObjectTab};
use crate::dao::AggregationDao;
use crate::docu::DocuReader;
use crate::error::Result;
use crate::types::{BuildIdentifier, BuildLink, Scenario, UseCase, FAILED_STATE, SUCCESS_STATE};

use super::object_repository::{ObjectRepository, ReferencePath};
use super::pages::StepsAndPagesAggregator;
use super::sanitizer::{sanitize_page_names, DefaultPageNameSanitizer, PageNameSanitizer};
use super::statistics::BuildStatistics;

/// Version of the derived file format. Bump whenever the shape of generated
/// data changes; any stamp mismatch forces full recomputation.
pub const CURRENT_FILE_FORMAT_VERSION: &str = "3.1.0";

/// Drives the per-build aggregation pipeline.
pub struct BuildAggregator {
    build: BuildIdentifier,
    reader: DocuReader,
    dao: AggregationDao,
    custom_tabs: Vec<CustomObjectTab>,
    sanitizer: Box<dyn PageNameSanitizer>,
    statistics: BuildStatistics,
}

impl BuildAggregator {
    #[must_use]
    pub fn new(config: &Config, build: BuildIdentifier) -> Self {
        Self {
            build,
            reader: DocuReader::new(&config.data_directory),
            dao: AggregationDao::new(&config.data_directory),
            custom_tabs: config.custom_object_tabs.clone(),
            sanitizer: Box::new(DefaultPageNameSanitizer),
            statistics: BuildStatistics::default(),
        }
    }

    /// Replaces the page-identifier normalizer.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Box<dyn PageNameSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    #[must_use]
    pub fn build(&self) -> &BuildIdentifier {
        &self.build
    }

    /// True iff a version stamp exists for the build and equals the current
    /// format version.
    #[must_use]
    pub fn is_aggregated_data_available_and_current(&self) -> bool {
        self.dao
            .load_version(&self.build)
            .is_some_and(|version| version == CURRENT_FILE_FORMAT_VERSION)
    }

    /// Deletes all derived files and index state for the build without
    /// touching raw input. Idempotent; no error on missing data.
    ///
    /// # Errors
    /// Returns I/O errors encountered while deleting.
    pub fn remove_aggregated_data(&self) -> Result<()> {
        self.dao.delete_derived_files(&self.build)
    }

    /// Runs the full aggregation pipeline for the build.
    ///
    /// Any pre-existing derived data is removed first, so a prior failed run
    /// can never leave stale partial state behind. The version stamp is
    /// written as the final step; a build that fails mid-aggregation keeps
    /// reporting as unprocessed.
    ///
    /// # Errors
    /// A missing scenario is skipped with a logged warning. Every other
    /// error aborts the whole build before any version stamp is written.
    pub fn calculate_aggregated_data(&mut self) -> Result<()> {
        self.remove_aggregated_data()?;

        let mut pages =
            StepsAndPagesAggregator::new(self.build.clone(), self.dao.clone());
        let mut objects = ObjectRepository::new(
            self.build.clone(),
            self.dao.clone(),
            self.custom_tabs.clone(),
        );
        objects.remove_any_existing_object_data()?;

        info!("calculating aggregated data for build {} ...", self.build);
        let mut list = self.calculate_use_case_scenarios_list()?;
        for use_case_scenarios in &mut list.use_case_scenarios {
            self.calculate_aggregated_data_for_use_case(
                use_case_scenarios,
                &mut pages,
                &mut objects,
            )?;
            self.statistics.increment_use_case();
        }

        pages.complete_page_variant_navigation()?;

        self.dao.save_use_case_scenarios_list(&self.build, &list)?;

        objects.calculate_and_save_object_lists()?;
        objects.save_custom_object_tab_trees()?;
        self.dao
            .save_long_object_names_index(&self.build, objects.long_names().index())?;

        self.dao
            .save_version(&self.build, CURRENT_FILE_FORMAT_VERSION)
    }

    /// Combines stamp presence, stamp currency and the upstream failure
    /// flag into the reported import state. Precedence: FAILED over
    /// OUTDATED over SUCCESS over UNPROCESSED.
    pub fn update_build_summary(
        &self,
        summary: &mut BuildImportSummary,
        build_link: &BuildLink,
    ) {
        summary.build_description = Some(build_link.build.clone());
        let version = self.dao.load_version(&summary.identifier);
        let aggregated = version.is_some();
        let outdated = version
            .as_deref()
            .is_some_and(|v| v != CURRENT_FILE_FORMAT_VERSION);
        summary.status = if summary.status.is_failed() {
            BuildImportStatus::Failed
        } else if outdated {
            BuildImportStatus::Outdated
        } else if aggregated {
            BuildImportStatus::Success
        } else {
            BuildImportStatus::Unprocessed
        };
    }

    /// Counters accumulated by the last aggregation run.
    #[must_use]
    pub fn build_statistics(&self) -> &BuildStatistics {
        &self.statistics
    }

    fn calculate_use_case_scenarios_list(&self) -> Result<UseCaseScenariosList> {
        let mut result = UseCaseScenariosList::default();
        for mut use_case in self.reader.load_usecases(&self.build)? {
            let scenarios = self.reader.load_scenarios(&self.build, &use_case.name)?;
            if use_case.status.is_none() {
                use_case.status = Some(derive_use_case_status(&scenarios).to_string());
            }
            result.use_case_scenarios.push(UseCaseScenarios {
                use_case,
                scenarios: scenarios.into_iter().map(ScenarioSummary::new).collect(),
            });
        }
        Ok(result)
    }

    fn calculate_aggregated_data_for_use_case(
        &mut self,
        use_case_scenarios: &mut UseCaseScenarios,
        pages: &mut StepsAndPagesAggregator,
        objects: &mut ObjectRepository,
    ) -> Result<()> {
        info!(
            "  calculating aggregated data for use case: {}",
            use_case_scenarios.use_case.name
        );
        let reference_path =
            objects.add_referenced_use_case_objects(&use_case_scenarios.use_case);

        let use_case = use_case_scenarios.use_case.clone();
        for summary in &mut use_case_scenarios.scenarios {
            match self.calculate_aggregated_data_for_scenario(
                &reference_path,
                &use_case,
                summary,
                pages,
                objects,
            ) {
                Ok(()) => self.add_scenario_statistics(&summary.scenario),
                Err(err) if err.is_not_found() => warn!(
                    "could not load scenario {} in use case {}, skipping it",
                    summary.scenario.name, use_case.name
                ),
                Err(err) => return Err(err),
            }
        }

        self.dao
            .save_use_case_scenarios(&self.build, use_case_scenarios)?;
        objects.update_and_save_object_indexes_for_current_case()
    }

    fn calculate_aggregated_data_for_scenario(
        &self,
        parent_path: &ReferencePath,
        use_case: &UseCase,
        summary: &mut ScenarioSummary,
        pages: &mut StepsAndPagesAggregator,
        objects: &mut ObjectRepository,
    ) -> Result<()> {
        let reference_path =
            objects.add_referenced_scenario_objects(parent_path, &summary.scenario);

        info!(
            "    calculating aggregated data for scenario: {}",
            summary.scenario.name
        );
        let mut steps =
            self.reader
                .load_steps(&self.build, &use_case.name, &summary.scenario.name)?;
        sanitize_page_names(&mut steps, &*self.sanitizer);

        summary.number_of_steps = pages.calculate_scenario_page_steps(
            use_case,
            &summary.scenario,
            &steps,
            &reference_path,
            objects,
        )?;
        Ok(())
    }

    fn add_scenario_statistics(&mut self, scenario: &Scenario) {
        match scenario.status.as_deref() {
            Some(SUCCESS_STATE) => self.statistics.increment_successful_scenario(),
            Some(FAILED_STATE) => self.statistics.increment_failed_scenario(),
            _ => {}
        }
    }
}
