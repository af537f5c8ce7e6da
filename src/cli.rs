use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::Parser;

use crate::config::MetadataSourceKind;

#[derive(Parser, Debug)]
#[command(
    name = "yarn-licensed",
    about = "Enumerate a yarn project's resolved dependencies for license review",
    version
)]
pub struct Cli {
    /// Project path to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file [default: ./.yarn-licensed/config.toml, fallback ~/.config/yarn-licensed/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Include devDependencies (overrides `yarn.production_only`)
    #[arg(long)]
    pub include_dev: bool,

    /// Where package descriptions and homepages come from
    #[arg(long, value_name = "SOURCE")]
    pub metadata_source: Option<MetadataSourceArg>,

    /// Maximum number of concurrent metadata lookups
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub concurrency: Option<usize>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Show install paths and info-level logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum MetadataSourceArg {
    Yarn,
    Registry,
}

impl From<MetadataSourceArg> for MetadataSourceKind {
    fn from(arg: MetadataSourceArg) -> Self {
        match arg {
            MetadataSourceArg::Yarn => MetadataSourceKind::Yarn,
            MetadataSourceArg::Registry => MetadataSourceKind::Registry,
        }
    }
}
