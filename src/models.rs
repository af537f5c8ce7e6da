use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of `metadata.type` on every record this tool produces.
pub const SOURCE_TYPE: &str = "yarn";

/// One node of the tree reported by `yarn list --json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    /// `name@version`, e.g. `left-pad@1.3.0` or `@babel/core@7.24.0`.
    #[serde(rename = "name")]
    pub identifier: String,
    /// Set when the package is already described elsewhere in the tree.
    #[serde(default)]
    pub shadow: bool,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// A single placement of a package in the install tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub id: String,
    pub name: String,
    pub version: Option<String>,
    pub path: PathBuf,
}

/// Package name → every occurrence of it, in traversal order.
pub type OccurrenceGroup = IndexMap<String, Vec<Occurrence>>;

/// Descriptive data attached to each reported dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub summary: Option<String>,
    pub homepage: Option<String>,
}

impl Metadata {
    fn new(name: &str) -> Self {
        Self {
            kind: SOURCE_TYPE,
            name: name.to_string(),
            summary: None,
            homepage: None,
        }
    }

    /// Overwrite `summary` / `homepage` with what the metadata source reported.
    pub fn merge(&mut self, info: PackageInfo) {
        self.summary = info.description;
        self.homepage = info.homepage;
    }
}

/// A deduplicated package, keyed uniquely within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub key: String,
    pub name: String,
    pub version: Option<String>,
    pub path: PathBuf,
    pub metadata: Metadata,
}

impl DependencyEntry {
    pub fn from_occurrence(key: String, occurrence: Occurrence) -> Self {
        Self {
            key,
            metadata: Metadata::new(&occurrence.name),
            name: occurrence.name,
            version: occurrence.version,
            path: occurrence.path,
        }
    }

    /// Identifier handed to the metadata source: `name@version`, or `name`
    /// when no version was recorded.
    pub fn lookup_id(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

/// Extended package information returned by a metadata source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

impl PackageInfo {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.homepage.is_none()
    }
}

/// A dependency record as reported to the user.
///
/// `name` carries the entry key, so two versions of the same package show up
/// as `foo-1.0.0` and `foo-2.0.0`; the package name itself is in
/// `metadata.name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub version: Option<String>,
    pub path: PathBuf,
    pub metadata: Metadata,
}

impl From<DependencyEntry> for Dependency {
    fn from(entry: DependencyEntry) -> Self {
        Self {
            name: entry.key,
            version: entry.version,
            path: entry.path,
            metadata: entry.metadata,
        }
    }
}
