use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::models::{Occurrence, OccurrenceGroup, TreeNode};

/// Flatten a `yarn list` tree into every occurrence of every package name.
///
/// Traversal is depth-first and pre-order, so a parent is always recorded
/// before its descendants and a name's first occurrence comes first. Shadow
/// nodes are skipped together with their whole subtree; packages reachable
/// only through a shadow node are therefore not enumerated.
///
/// Install paths always stay under `root`: only plain components of a name
/// are joined, so a name like `/etc` lands in `node_modules/etc`. A node whose
/// name has no plain component (e.g. identifier `""`) is not recorded; its
/// children are walked as if they hung off its parent.
pub fn walk(root: &Path, trees: &[TreeNode]) -> OccurrenceGroup {
    let mut group = OccurrenceGroup::new();
    let mut pending: Vec<(&TreeNode, PathBuf)> = trees
        .iter()
        .rev()
        .map(|node| (node, root.to_path_buf()))
        .collect();

    while let Some((node, parent)) = pending.pop() {
        if node.shadow {
            continue;
        }

        let (name, version) = parse_identifier(&node.identifier);
        if version.is_none() {
            debug!(identifier = %node.identifier, "no version in package identifier");
        }

        let Some(path) = install_path(&parent, name) else {
            debug!(identifier = %node.identifier, "no package name in identifier, skipping");
            pending.extend(node.children.iter().rev().map(|child| (child, parent.clone())));
            continue;
        };
        pending.extend(node.children.iter().rev().map(|child| (child, path.clone())));

        group.entry(name.to_string()).or_default().push(Occurrence {
            id: node.identifier.clone(),
            name: name.to_string(),
            version: version.map(str::to_string),
            path,
        });
    }

    group
}

/// `parent/node_modules/<name>`, joining only the plain components of `name`.
fn install_path(parent: &Path, name: &str) -> Option<PathBuf> {
    let mut parts = Path::new(name)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .peekable();
    parts.peek()?;

    let mut path = parent.join("node_modules");
    path.extend(parts);
    Some(path)
}

/// Split `name@version` at the first `@` that is not a leading scope marker.
///
/// `@scope/pkg@1.0.0` → (`@scope/pkg`, `1.0.0`). An identifier without a
/// version part, or with an empty one, yields `None`.
pub fn parse_identifier(identifier: &str) -> (&str, Option<&str>) {
    let scope = usize::from(identifier.starts_with('@'));
    match identifier[scope..].find('@') {
        Some(pos) => {
            let at = scope + pos;
            let version = &identifier[at + 1..];
            (&identifier[..at], Some(version).filter(|v| !v.is_empty()))
        }
        None => (identifier, None),
    }
}
