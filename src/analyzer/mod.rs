//! Dependency enumeration for yarn projects.
//!
//! The pipeline runs in three stages, each feeding the next:
//! 1. [`walker::walk`] flattens the nested `yarn list` tree into every
//!    occurrence of every package name.
//! 2. [`dedupe::dedupe`] collapses same-version occurrences and keys genuine
//!    version conflicts separately.
//! 3. [`enrich::Enricher`] looks up description and homepage for each entry.
//!
//! Stages 1 and 2 are synchronous and deterministic; stage 3 is the only
//! concurrent one.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::Dependency;
use crate::source::{MetadataSource, TreeSource};

pub mod dedupe;
pub mod enrich;
pub mod walker;

pub struct YarnAnalyzer {
    trees: Box<dyn TreeSource>,
    metadata: Box<dyn MetadataSource>,
    concurrency: usize,
    progress: bool,
}

impl YarnAnalyzer {
    pub fn new(trees: Box<dyn TreeSource>, metadata: Box<dyn MetadataSource>) -> Self {
        Self {
            trees,
            metadata,
            concurrency: enrich::DEFAULT_CONCURRENCY,
            progress: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Show a progress bar while metadata is fetched.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Enumerate every dependency installed under `root`.
    ///
    /// Only a failure of the tree source is fatal; per-package problems
    /// degrade to partially populated records.
    pub async fn analyze(&self, root: &Path) -> Result<Vec<Dependency>> {
        let trees = self
            .trees
            .trees()
            .await
            .context("failed to read the yarn dependency tree")?;

        let occurrences = walker::walk(root, &trees);
        debug!(names = occurrences.len(), "walked dependency tree");

        let entries = dedupe::dedupe(occurrences);
        debug!(entries = entries.len(), "deduplicated dependencies");

        let enriched = enrich::Enricher::new(self.metadata.as_ref())
            .with_concurrency(self.concurrency)
            .with_progress(self.progress)
            .enrich(entries)
            .await;
        info!(dependencies = enriched.len(), "enumerated yarn dependencies");

        Ok(enriched.into_values().map(Dependency::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{PackageInfo, TreeNode};
    use crate::source::SourceError;

    struct FixedTree(&'static str);

    #[async_trait]
    impl TreeSource for FixedTree {
        async fn trees(&self) -> Result<Vec<TreeNode>, SourceError> {
            serde_json::from_str(self.0).map_err(|source| SourceError::Json {
                command: "fixture".to_string(),
                source,
            })
        }
    }

    struct NoTree;

    #[async_trait]
    impl TreeSource for NoTree {
        async fn trees(&self) -> Result<Vec<TreeNode>, SourceError> {
            Err(SourceError::MissingTrees)
        }
    }

    struct Descriptions(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl MetadataSource for Descriptions {
        async fn package_info(&self, id: &str) -> Result<Option<PackageInfo>, SourceError> {
            Ok(self.0.get(id).map(|description| PackageInfo {
                description: Some(description.to_string()),
                homepage: None,
            }))
        }
    }

    const TREE: &str = r#"[
        {"name": "a@1.0.0", "children": [
            {"name": "shared@1.0.0", "children": []},
            {"name": "conflict@1.0.0", "children": []}
        ]},
        {"name": "b@1.0.0", "children": [
            {"name": "shared@1.0.0", "shadow": true},
            {"name": "conflict@2.0.0", "children": [
                {"name": "deep@0.1.0"}
            ]}
        ]},
        {"name": "hidden-parent@1.0.0", "shadow": true, "children": [
            {"name": "hidden@1.0.0"}
        ]}
    ]"#;

    fn analyzer(tree: &'static str) -> YarnAnalyzer {
        let descriptions = HashMap::from([("a@1.0.0", "package a"), ("conflict@2.0.0", "v2")]);
        YarnAnalyzer::new(Box::new(FixedTree(tree)), Box::new(Descriptions(descriptions)))
            .with_concurrency(4)
    }

    #[tokio::test]
    async fn test_analyze_full_pipeline() {
        let deps = analyzer(TREE).analyze(Path::new("/proj")).await.unwrap();

        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["a", "shared", "conflict-1.0.0", "conflict-2.0.0", "b", "deep"]
        );

        let conflict = deps.iter().find(|d| d.name == "conflict-2.0.0").unwrap();
        assert_eq!(conflict.metadata.name, "conflict");
        assert_eq!(conflict.metadata.summary.as_deref(), Some("v2"));
        assert_eq!(
            conflict.path,
            PathBuf::from("/proj/node_modules/b/node_modules/conflict")
        );

        let deep = deps.iter().find(|d| d.name == "deep").unwrap();
        assert_eq!(
            deep.path,
            PathBuf::from("/proj/node_modules/b/node_modules/conflict/node_modules/deep")
        );
        assert_eq!(deep.metadata.summary, None);

        assert_eq!(deps[0].metadata.summary.as_deref(), Some("package a"));
    }

    #[tokio::test]
    async fn test_analyze_is_idempotent() {
        let analyzer = analyzer(TREE);
        let first = analyzer.analyze(Path::new("/proj")).await.unwrap();
        let second = analyzer.analyze(Path::new("/proj")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_analyze_empty_tree() {
        let deps = analyzer("[]").analyze(Path::new("/proj")).await.unwrap();
        assert!(deps.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_tree_source_failure_is_fatal() {
        let analyzer = YarnAnalyzer::new(Box::new(NoTree), Box::new(Descriptions(HashMap::new())));
        assert!(analyzer.analyze(Path::new("/proj")).await.is_err());
    }
}
