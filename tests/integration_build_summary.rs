// tests/integration_build_summary.rs
use tempfile::TempDir;

use docuweave_core::aggregates::{BuildImportStatus, BuildImportSummary};
use docuweave_core::aggregation::BuildAggregator;
use docuweave_core::config::Config;
use docuweave_core::dao::AggregationDao;
use docuweave_core::docu::DocuWriter;
use docuweave_core::types::{Build, BuildIdentifier, BuildLink, Scenario, UseCase};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn build_id() -> BuildIdentifier {
    BuildIdentifier::new("trunk", "nightly-7")
}

fn config_for(dir: &TempDir) -> Config {
    let mut config = Config::new();
    config.data_directory = dir.path().to_path_buf();
    config
}

fn build_link() -> BuildLink {
    BuildLink {
        link_name: "nightly-7".to_string(),
        build: Build {
            name: "nightly-7".to_string(),
            status: Some("success".to_string()),
        },
    }
}

fn write_minimal_fixture(dir: &TempDir) -> Result<()> {
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
    writer.save_scenario(
        &id,
        "uc",
        &Scenario {
            name: "sc".to_string(),
            description: String::new(),
            status: Some("success".to_string()),
            referenced_objects: Vec::new(),
        },
    )?;
    std::fs::create_dir_all(docuweave_core::docu::steps_path(
        dir.path(),
        &id,
        "uc",
        "sc",
    ))?;
    Ok(())
}

#[test]
fn test_never_aggregated_is_unprocessed() -> Result<()> {
    let dir = TempDir::new()?;
    let aggregator = BuildAggregator::new(&config_for(&dir), build_id());
    let mut summary = BuildImportSummary::new(build_id());

    aggregator.update_build_summary(&mut summary, &build_link());

    assert_eq!(summary.status, BuildImportStatus::Unprocessed);
    assert_eq!(
        summary.build_description.as_ref().map(|b| b.name.as_str()),
        Some("nightly-7")
    );
    Ok(())
}

#[test]
fn test_current_aggregation_is_success() -> Result<()> {
    let dir = TempDir::new()?;
    write_minimal_fixture(&dir)?;
    let config = config_for(&dir);
    let mut aggregator = BuildAggregator::new(&config, build_id());
    aggregator.calculate_aggregated_data()?;

    let mut summary = BuildImportSummary::new(build_id());
    aggregator.update_build_summary(&mut summary, &build_link());
    assert_eq!(summary.status, BuildImportStatus::Success);
    Ok(())
}

#[test]
fn test_stale_version_is_outdated() -> Result<()> {
    let dir = TempDir::new()?;
    write_minimal_fixture(&dir)?;
    let config = config_for(&dir);
    let mut aggregator = BuildAggregator::new(&config, build_id());
    aggregator.calculate_aggregated_data()?;
    AggregationDao::new(dir.path()).save_version(&build_id(), "1.0.0-old")?;

    let mut summary = BuildImportSummary::new(build_id());
    aggregator.update_build_summary(&mut summary, &build_link());
    assert_eq!(summary.status, BuildImportStatus::Outdated);
    Ok(())
}

#[test]
fn test_upstream_failure_wins_over_current_aggregation() -> Result<()> {
    let dir = TempDir::new()?;
    write_minimal_fixture(&dir)?;
    let config = config_for(&dir);
    let mut aggregator = BuildAggregator::new(&config, build_id());
    aggregator.calculate_aggregated_data()?;

    let mut summary = BuildImportSummary::new(build_id());
    summary.status = BuildImportStatus::Failed;
    aggregator.update_build_summary(&mut summary, &build_link());
    assert_eq!(summary.status, BuildImportStatus::Failed);
    Ok(())
}

#[test]
fn test_upstream_failure_wins_over_stale_version() -> Result<()> {
    let dir = TempDir::new()?;
    write_minimal_fixture(&dir)?;
    let config = config_for(&dir);
    let mut aggregator = BuildAggregator::new(&config, build_id());
    aggregator.calculate_aggregated_data()?;
    AggregationDao::new(dir.path()).save_version(&build_id(), "1.0.0-old")?;

    let mut summary = BuildImportSummary::new(build_id());
    summary.status = BuildImportStatus::Failed;
    aggregator.update_build_summary(&mut summary, &build_link());
    assert_eq!(summary.status, BuildImportStatus::Failed);
    Ok(())
}
