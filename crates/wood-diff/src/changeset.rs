//! Owned summary of a comparison's path streams.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::comparison::Comparison;
use crate::traversal::{DeletedOptions, NewOptions};

/// Every stream of a comparison collected into vectors.
///
/// Useful for reporting and serialisation; callers acting on a large tree
/// should consume the lazy streams directly instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Paths present only on the right side.
    pub new: Vec<String>,
    /// Files present on both sides with different content.
    pub modified: Vec<String>,
    /// Paths present only on the left side.
    pub deleted: Vec<String>,
    /// Aggregated purge prefixes.
    pub invalidations: Vec<String>,
}

impl ChangeSet {
    /// Collect all streams of `comparison`, rendering paths under `base`.
    pub fn from_comparison(
        comparison: &Comparison<'_>,
        base: &str,
        new_opts: NewOptions,
        deleted_opts: DeletedOptions,
    ) -> Self {
        let changes = Self {
            new: comparison.new(base, new_opts).collect(),
            modified: comparison.modified(base).collect(),
            deleted: comparison.deleted(base, deleted_opts).collect(),
            invalidations: comparison.invalidations().collect(),
        };
        debug!(
            new = changes.new.len(),
            modified = changes.modified.len(),
            deleted = changes.deleted.len(),
            invalidations = changes.invalidations.len(),
            "collected change set"
        );
        changes
    }

    /// Returns `true` if nothing was added, changed or removed.
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Number of new, modified and deleted paths.
    pub fn len(&self) -> usize {
        self.new.len() + self.modified.len() + self.deleted.len()
    }
}

#[cfg(test)]
mod tests {
    use wood_types::Entity;

    use super::*;

    #[test]
    fn identical_snapshots_are_empty() {
        let root = Entity::root([Entity::file("a", 1, "x")]);
        let c = Comparison::compare(Some(&root), Some(&root)).unwrap();
        let changes = ChangeSet::from_comparison(&c, "", NewOptions::default(), DeletedOptions::default());
        assert!(changes.is_empty());
        assert_eq!(changes.len(), 0);
        assert!(changes.invalidations.is_empty());
    }

    #[test]
    fn mixed_changes_are_collected() {
        let left = Entity::root([
            Entity::file("keep", 1, "x"),
            Entity::file("modify", 1, "x"),
            Entity::file("delete", 1, "x"),
        ]);
        let right = Entity::root([
            Entity::file("keep", 1, "x"),
            Entity::file("modify", 1, "y"),
            Entity::file("added", 1, "x"),
        ]);
        let c = Comparison::compare(Some(&left), Some(&right)).unwrap();
        let changes = ChangeSet::from_comparison(&c, "", NewOptions::default(), DeletedOptions::default());
        assert_eq!(changes.new, vec!["added"]);
        assert_eq!(changes.modified, vec!["modify"]);
        assert_eq!(changes.deleted, vec!["delete"]);
        assert_eq!(changes.invalidations, vec!["delete", "modify"]);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn serialises_to_json() {
        let changes = ChangeSet {
            new: vec!["a".into()],
            ..ChangeSet::default()
        };
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json["new"][0], "a");
        assert!(json["modified"].as_array().unwrap().is_empty());
    }
}
