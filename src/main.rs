//! `yarn-licensed` — enumerate a yarn project's resolved dependencies for license review.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]).
//! 3. Check the project is a yarn project ([`detector::detect_yarn_project`]).
//! 4. Walk, deduplicate and enrich the dependency tree ([`analyzer`]).
//! 5. Render the requested report ([`report`]).
//! 6. Exit `0`, or `1` when the project cannot be enumerated.

mod analyzer;
mod cli;
mod config;
mod detector;
mod models;
mod registry;
mod report;
mod source;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use analyzer::YarnAnalyzer;
use cli::{Cli, ReportFormat};
use config::{load_config, MetadataSourceKind};
use detector::{detect_yarn_project, Detection};
use registry::npm::NpmRegistry;
use source::yarn::YarnCli;
use source::MetadataSource;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;

    let detection = detect_yarn_project(&path);
    if detection != Detection::Applicable {
        eprintln!(
            "{} Cannot enumerate {}: {}",
            "✗".red(),
            path.display(),
            detection
        );
        std::process::exit(1);
    }

    let include_dev = cli.include_dev || config.yarn.include_non_production();
    let timeout = Duration::from_secs(config.enrich.timeout_secs);
    let yarn = YarnCli::new(&path, timeout).production_only(!include_dev);

    let source_kind = cli
        .metadata_source
        .map(MetadataSourceKind::from)
        .unwrap_or(config.enrich.source);
    let metadata: Box<dyn MetadataSource> = match source_kind {
        MetadataSourceKind::Yarn => Box::new(yarn.clone()),
        MetadataSourceKind::Registry => {
            Box::new(NpmRegistry::new(&config.enrich.registry_url, timeout)?)
        }
    };

    tracing::info!(
        path = %path.display(),
        include_dev,
        source = ?source_kind,
        "enumerating yarn dependencies"
    );

    let deps = YarnAnalyzer::new(Box::new(yarn), metadata)
        .with_concurrency(cli.concurrency.unwrap_or(config.enrich.concurrency))
        .with_progress(!cli.quiet && cli.report == ReportFormat::Terminal)
        .analyze(&path)
        .await?;

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&deps, &path, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&deps)?);
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`, `info` with `--verbose`).
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
