//! Collaborators that feed the analyzer.
//!
//! A [`TreeSource`] supplies the resolved dependency tree; a
//! [`MetadataSource`] answers `name@version` lookups with description and
//! homepage. [`yarn::YarnCli`] implements both by shelling out to `yarn`;
//! [`crate::registry::npm::NpmRegistry`] is an HTTP-backed metadata source.

pub mod yarn;

use async_trait::async_trait;

use crate::models::{PackageInfo, TreeNode};

#[async_trait]
pub trait TreeSource: Send + Sync {
    /// The top-level `trees` array of the resolved dependency graph.
    async fn trees(&self) -> Result<Vec<TreeNode>, SourceError>;
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Look up `id` (`name@version` or bare `name`).
    ///
    /// `Ok(None)` means the source had nothing to say about the package.
    async fn package_info(&self, id: &str) -> Result<Option<PackageInfo>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("`{0}` was not found on PATH")]
    ToolUnavailable(String),

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("`yarn list` produced no dependency tree")]
    MissingTrees,

    #[error("invalid JSON from `{command}`: {source}")]
    Json {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),
}
