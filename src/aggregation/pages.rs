// src/aggregation/pages.rs
//! Page/Step Grouping Engine
//!
//! Groups a scenario's flat step sequence into logical pages: consecutive
//! steps with an equal normalized page identifier form one group, and a
//! change of identifier starts a new one. A page recurring after an
//! intervening different page becomes a second, distinct group — revisits
//! are documented, not merged.
//!
//! Cross-scenario page-variant navigation is a second pass over the full
//! in-memory collection of the build's grouped scenarios; it runs only once
//! every scenario has been grouped, mutates the retained groups in place and
//! re-persists the affected artifacts.

use std::collections::BTreeMap;

use crate::aggregates::{PageSteps, PageVariantLink, ScenarioPageSteps, StepDescription};
use crate::dao::AggregationDao;
use crate::error::Result;
use crate::types::{BuildIdentifier, Page, Scenario, Step, UseCase};

use super::object_repository::{ObjectRepository, ReferencePath};

/// Page identity assigned to steps that carry no page at all.
pub const UNKNOWN_PAGE_NAME: &str = "unknown";

#[derive(Debug, Clone)]
struct PageOccurrence {
    use_case: String,
    scenario: String,
    occurrence: usize,
    first_step_index: usize,
}

/// Computes and retains the page groupings of every scenario in one build.
pub struct StepsAndPagesAggregator {
    build: BuildIdentifier,
    dao: AggregationDao,
    collected: Vec<ScenarioPageSteps>,
}

impl StepsAndPagesAggregator {
    #[must_use]
    pub fn new(build: BuildIdentifier, dao: AggregationDao) -> Self {
        Self {
            build,
            dao,
            collected: Vec::new(),
        }
    }

    /// Groups one scenario's steps into pages, persists the grouped
    /// artifact and feeds every step's object references into the object
    /// repository under the extended path. Steps must already carry
    /// normalized page names. Returns the scenario's total step count.
    ///
    /// # Errors
    /// Returns DAO errors; the build aborts on any of them.
    pub fn calculate_scenario_page_steps(
        &mut self,
        use_case: &UseCase,
        scenario: &Scenario,
        steps: &[Step],
        reference_path: &ReferencePath,
        objects: &mut ObjectRepository,
    ) -> Result<usize> {
        let mut groups: Vec<PageSteps> = Vec::new();
        for step in steps {
            objects.add_referenced_step_objects(reference_path, scenario, step);

            let page_name = step
                .page
                .as_ref()
                .map_or(UNKNOWN_PAGE_NAME, |p| p.name.as_str());
            let description = StepDescription {
                index: step.index,
                title: step.title.clone(),
                status: step.status.clone(),
            };
            match groups.last_mut() {
                Some(last) if last.page.name == page_name => last.steps.push(description),
                _ => groups.push(PageSteps {
                    page: Page::new(page_name),
                    steps: vec![description],
                    variant_count: 0,
                    variants: Vec::new(),
                }),
            }
        }

        let page_steps = ScenarioPageSteps {
            use_case: use_case.clone(),
            scenario: scenario.clone(),
            pages_and_steps: groups,
        };
        let total = page_steps.total_number_of_steps();
        self.dao.save_scenario_page_steps(&self.build, &page_steps)?;
        self.collected.push(page_steps);
        Ok(total)
    }

    /// Second pass: links every page group to the other occurrences of the
    /// same logical page anywhere in the build, then re-persists each
    /// scenario's artifact with the completed navigation metadata.
    ///
    /// # Errors
    /// Returns DAO errors.
    pub fn complete_page_variant_navigation(&mut self) -> Result<()> {
        let mut occurrences: BTreeMap<String, Vec<PageOccurrence>> = BTreeMap::new();
        for page_steps in &self.collected {
            for (position, group) in page_steps.pages_and_steps.iter().enumerate() {
                occurrences
                    .entry(group.page.name.clone())
                    .or_default()
                    .push(PageOccurrence {
                        use_case: page_steps.use_case.name.clone(),
                        scenario: page_steps.scenario.name.clone(),
                        occurrence: position,
                        first_step_index: group.steps.first().map_or(0, |s| s.index),
                    });
            }
        }

        for page_steps in &mut self.collected {
            for (position, group) in page_steps.pages_and_steps.iter_mut().enumerate() {
                let all = occurrences
                    .get(&group.page.name)
                    .map_or(&[] as &[PageOccurrence], Vec::as_slice);
                group.variant_count = all.len();
                group.variants = all
                    .iter()
                    .filter(|o| {
                        !(o.use_case == page_steps.use_case.name
                            && o.scenario == page_steps.scenario.name
                            && o.occurrence == position)
                    })
                    .map(|o| PageVariantLink {
                        use_case: o.use_case.clone(),
                        scenario: o.scenario.clone(),
                        occurrence: o.occurrence,
                        first_step_index: o.first_step_index,
                    })
                    .collect();
            }
            self.dao.save_scenario_page_steps(&self.build, page_steps)?;
        }
        Ok(())
    }

    /// Number of scenarios grouped so far.
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.collected.len()
    }
}
