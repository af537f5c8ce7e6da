use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::models::{DependencyEntry, Occurrence, OccurrenceGroup};

/// Collapse occurrences that share a version and key what remains.
///
/// A name resolved to a single version is keyed by the bare name. A name
/// resolved to several versions yields one entry per version, keyed by its
/// identifier with every `@` replaced by `-` (`foo@1.0.0` → `foo-1.0.0`).
/// For each version the first occurrence in traversal order wins.
///
/// Keys stay unique even when a bare name equals another package's conflict
/// key (a package literally named `foo-1.0.0` next to `foo@1.0.0` and
/// `foo@2.0.0`): the later entry gets `-2`, `-3`, … appended and a warning is
/// logged. No entry is dropped.
pub fn dedupe(group: OccurrenceGroup) -> IndexMap<String, DependencyEntry> {
    let mut entries = IndexMap::new();

    for (name, occurrences) in group {
        let mut versions = HashSet::new();
        let unique: Vec<Occurrence> = occurrences
            .into_iter()
            .filter(|o| versions.insert(o.version.clone()))
            .collect();

        match <[Occurrence; 1]>::try_from(unique) {
            Ok([occurrence]) => insert_unique(&mut entries, name, occurrence),
            Err(conflicting) => {
                debug!(package = %name, versions = conflicting.len(), "multiple versions resolved");
                for occurrence in conflicting {
                    let key = occurrence.id.replace('@', "-");
                    insert_unique(&mut entries, key, occurrence);
                }
            }
        }
    }

    entries
}

/// Insert under `key`, appending `-2`, `-3`, … if an unrelated package
/// already produced the same key.
fn insert_unique(
    entries: &mut IndexMap<String, DependencyEntry>,
    key: String,
    occurrence: Occurrence,
) {
    let mut unique_key = key.clone();
    let mut suffix = 2;
    while entries.contains_key(&unique_key) {
        unique_key = format!("{}-{}", key, suffix);
        suffix += 1;
    }
    if unique_key != key {
        warn!(key = %key, renamed = %unique_key, "dependency key collision");
    }

    entries.insert(
        unique_key.clone(),
        DependencyEntry::from_occurrence(unique_key, occurrence),
    );
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn occurrence(name: &str, version: Option<&str>, path: &str) -> Occurrence {
        let id = match version {
            Some(v) => format!("{}@{}", name, v),
            None => name.to_string(),
        };
        Occurrence {
            id,
            name: name.to_string(),
            version: version.map(str::to_string),
            path: PathBuf::from(path),
        }
    }

    fn group(occurrences: Vec<Occurrence>) -> OccurrenceGroup {
        let mut group = OccurrenceGroup::new();
        for o in occurrences {
            group.entry(o.name.clone()).or_default().push(o);
        }
        group
    }

    #[test]
    fn test_same_version_collapses_to_first() {
        let entries = dedupe(group(vec![
            occurrence("foo", Some("1.0.0"), "/p/node_modules/foo"),
            occurrence("foo", Some("1.0.0"), "/p/node_modules/bar/node_modules/foo"),
        ]));

        assert_eq!(entries.len(), 1);
        let entry = &entries["foo"];
        assert_eq!(entry.key, "foo");
        assert_eq!(entry.version.as_deref(), Some("1.0.0"));
        assert_eq!(entry.path, PathBuf::from("/p/node_modules/foo"));
    }

    #[test]
    fn test_version_conflict_keys() {
        let entries = dedupe(group(vec![
            occurrence("foo", Some("1.0.0"), "/p/node_modules/foo"),
            occurrence("foo", Some("2.0.0"), "/p/node_modules/bar/node_modules/foo"),
            occurrence("foo", Some("1.0.0"), "/p/node_modules/baz/node_modules/foo"),
        ]));

        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["foo-1.0.0", "foo-2.0.0"]);
        assert_eq!(entries["foo-1.0.0"].path, PathBuf::from("/p/node_modules/foo"));
        assert_eq!(entries["foo-2.0.0"].name, "foo");
        assert_eq!(entries["foo-2.0.0"].metadata.name, "foo");
    }

    #[test]
    fn test_scoped_conflict_replaces_every_at() {
        let entries = dedupe(group(vec![
            occurrence("@scope/pkg", Some("1.0.0"), "/p/a"),
            occurrence("@scope/pkg", Some("2.0.0"), "/p/b"),
        ]));
        assert!(entries.contains_key("-scope/pkg-1.0.0"));
        assert!(entries.contains_key("-scope/pkg-2.0.0"));
    }

    #[test]
    fn test_missing_version_is_its_own_version() {
        let entries = dedupe(group(vec![
            occurrence("foo", None, "/p/a"),
            occurrence("foo", Some("1.0.0"), "/p/b"),
        ]));
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["foo", "foo-1.0.0"]);
    }

    #[test]
    fn test_key_collision_is_renamed() {
        let entries = dedupe(group(vec![
            occurrence("foo-1.0.0", Some("3.0.0"), "/p/x"),
            occurrence("foo", Some("1.0.0"), "/p/a"),
            occurrence("foo", Some("2.0.0"), "/p/b"),
        ]));

        assert_eq!(entries.len(), 3);
        assert_eq!(entries["foo-1.0.0"].name, "foo-1.0.0");
        assert_eq!(entries["foo-1.0.0-2"].name, "foo");
        assert_eq!(entries["foo-1.0.0-2"].key, "foo-1.0.0-2");
    }

    #[test]
    fn test_empty_group() {
        assert!(dedupe(OccurrenceGroup::new()).is_empty());
    }
}
