// src/bin/docuweave.rs
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use docuweave_core::aggregation::{BuildAggregator, CURRENT_FILE_FORMAT_VERSION};
use docuweave_core::config::Config;
use docuweave_core::dao::AggregationDao;
use docuweave_core::types::BuildIdentifier;

#[derive(Parser)]
#[command(name = "docuweave")]
#[command(about = "Aggregates raw test documentation into browsable artifacts")]
#[command(version)]
struct Cli {
    /// Path to the configuration file (defaults to ./docuweave.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Documentation data directory (overrides the configuration)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate one build into derived, indexed artifacts
    Aggregate {
        #[arg(long, short)]
        branch: String,
        #[arg(long, short = 'B')]
        build: String,
        /// Recompute even when the derived data is already current
        #[arg(long)]
        force: bool,
    },
    /// Report the aggregation state of one build
    Status {
        #[arg(long, short)]
        branch: String,
        #[arg(long, short = 'B')]
        build: String,
    },
    /// Delete the derived artifacts of one build (raw data is kept)
    Remove {
        #[arg(long, short)]
        branch: String,
        #[arg(long, short = 'B')]
        build: String,
    },
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    dispatch(&cli, &config)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_directory = data_dir.clone();
    }
    Ok(config)
}

fn dispatch(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Aggregate {
            branch,
            build,
            force,
        } => aggregate(config, BuildIdentifier::new(branch, build), *force),
        Commands::Status { branch, build } => {
            status(config, &BuildIdentifier::new(branch, build));
            Ok(())
        }
        Commands::Remove { branch, build } => {
            remove(config, &BuildIdentifier::new(branch, build))
        }
    }
}

fn aggregate(config: &Config, id: BuildIdentifier, force: bool) -> Result<()> {
    let mut aggregator = BuildAggregator::new(config, id.clone());
    if !force && aggregator.is_aggregated_data_available_and_current() {
        println!(
            "{} build {id} is already aggregated with the current format",
            "ok:".green().bold()
        );
        return Ok(());
    }

    aggregator.calculate_aggregated_data()?;

    let stats = aggregator.build_statistics();
    println!("{} aggregated build {id}", "ok:".green().bold());
    println!(
        "    {} use cases, {} scenarios ({} failed)",
        stats.number_of_use_cases,
        stats.number_of_scenarios(),
        stats.number_of_failed_scenarios
    );
    Ok(())
}

fn status(config: &Config, id: &BuildIdentifier) {
    let dao = AggregationDao::new(&config.data_directory);
    match dao.load_version(id) {
        Some(version) if version == CURRENT_FILE_FORMAT_VERSION => {
            println!("{} {id}: aggregated (format {version})", "current:".green());
        }
        Some(version) => {
            println!(
                "{} {id}: aggregated with format {version}, current is {}",
                "outdated:".yellow(),
                CURRENT_FILE_FORMAT_VERSION
            );
        }
        None => println!("{} {id}: never aggregated", "unprocessed:".dimmed()),
    }
}

fn remove(config: &Config, id: &BuildIdentifier) -> Result<()> {
    let aggregator = BuildAggregator::new(config, id.clone());
    aggregator.remove_aggregated_data()?;
    println!("{} removed derived data of build {id}", "ok:".green().bold());
    Ok(())
}
