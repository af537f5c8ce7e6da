use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::analyzer::enrich::DEFAULT_CONCURRENCY;
use crate::registry::npm::DEFAULT_REGISTRY;

/// Root configuration structure, deserialized from `.yarn-licensed/config.toml`.
///
/// Every section and key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How the dependency tree is requested from yarn.
    pub yarn: YarnConfig,
    /// How package metadata is fetched.
    pub enrich: EnrichConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct YarnConfig {
    /// Only an explicit `false` includes devDependencies.
    pub production_only: Option<bool>,
}

impl YarnConfig {
    pub fn include_non_production(&self) -> bool {
        self.production_only == Some(false)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Where descriptions and homepages come from.
    pub source: MetadataSourceKind,
    /// Maximum number of lookups in flight.
    pub concurrency: usize,
    /// Per-lookup timeout.
    pub timeout_secs: u64,
    /// Base URL used when `source = "registry"`.
    pub registry_url: String,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            source: MetadataSourceKind::Yarn,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: 10,
            registry_url: DEFAULT_REGISTRY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSourceKind {
    /// `yarn info` per package.
    Yarn,
    /// npm registry HTTP API.
    Registry,
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.enrich.concurrency == 0 {
            bail!("enrich.concurrency must be at least 1");
        }
        if self.enrich.timeout_secs == 0 {
            bail!("enrich.timeout_secs must be at least 1");
        }
        if self.enrich.registry_url.trim().is_empty() {
            bail!("enrich.registry_url must not be empty");
        }
        Ok(())
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.yarn-licensed/config.toml`
/// 3. `~/.config/yarn-licensed/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".yarn-licensed").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("yarn-licensed")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}
