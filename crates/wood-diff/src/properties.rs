use std::collections::BTreeSet;

use proptest::collection::vec;
use proptest::prelude::*;
use wood_types::Entity;

use crate::{Comparison, DeletedOptions, NewOptions};

// Directories always hold at least one entry; an unchanged empty directory
// contributes nothing to invalidation and would need special-casing below.
fn entity() -> impl Strategy<Value = Entity> {
    let leaf = ("[a-c]", 0u8..3).prop_map(|(name, fp)| Entity::file(name, 1, fp.to_string()));
    leaf.prop_recursive(3, 24, 4, |inner| {
        ("[a-c]", vec(inner, 1..4)).prop_map(|(name, children)| Entity::directory(name, children))
    })
}

fn root() -> impl Strategy<Value = Entity> {
    vec(entity(), 1..5).prop_map(|children| Entity::root(children))
}

fn covered(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| {
        p == "*"
            || p == path
            || p.strip_suffix("/*")
                .is_some_and(|dir| path.starts_with(&format!("{dir}/")))
    })
}

fn strip_marker(path: String) -> String {
    path.trim_end_matches('/').to_string()
}

proptest! {
    #[test]
    fn identical_trees_have_no_changes(tree in root()) {
        let c = Comparison::compare(Some(&tree), Some(&tree)).unwrap();
        prop_assert_eq!(c.new("", NewOptions::default()).count(), 0);
        prop_assert_eq!(c.modified("").count(), 0);
        prop_assert_eq!(c.deleted("", DeletedOptions::default()).count(), 0);
        prop_assert_eq!(c.invalidations().count(), 0);
    }

    #[test]
    fn one_sided_comparisons_mirror_each_other(tree in root()) {
        let added = Comparison::compare(None, Some(&tree)).unwrap();
        let removed = Comparison::compare(Some(&tree), None).unwrap();
        prop_assert!(added.is_new());
        prop_assert!(removed.is_deleted());
        let new: Vec<_> = added.new("", NewOptions::default()).map(strip_marker).collect();
        let deleted: Vec<_> = removed.deleted("", DeletedOptions::default()).map(strip_marker).collect();
        prop_assert_eq!(&new, &deleted);
        prop_assert_eq!(new, tree.walk_paths(""));
    }

    #[test]
    fn streams_stay_within_their_side(left in root(), right in root()) {
        let c = Comparison::compare(Some(&left), Some(&right)).unwrap();
        let left_paths: BTreeSet<_> = left.walk_paths("").into_iter().collect();
        let right_paths: BTreeSet<_> = right.walk_paths("").into_iter().collect();
        for path in c.new("", NewOptions::default()).map(strip_marker) {
            prop_assert!(right_paths.contains(&path), "{} not on the right", path);
        }
        for path in c.deleted("", DeletedOptions::default()).map(strip_marker) {
            prop_assert!(left_paths.contains(&path), "{} not on the left", path);
        }
        for path in c.modified("") {
            prop_assert!(left_paths.contains(&path) && right_paths.contains(&path));
        }
    }

    #[test]
    fn streams_are_sorted_and_unique(left in root(), right in root()) {
        let c = Comparison::compare(Some(&left), Some(&right)).unwrap();
        let streams: [(&str, Vec<String>); 4] = [
            ("new", c.new("", NewOptions::default()).map(strip_marker).collect()),
            ("modified", c.modified("").collect()),
            ("deleted", c.deleted("", DeletedOptions::default()).map(strip_marker).collect()),
            ("invalidations", c.invalidations().collect()),
        ];
        for (name, paths) in streams {
            let unique: BTreeSet<_> = paths.iter().cloned().collect();
            prop_assert_eq!(unique.len(), paths.len(), "{} repeats a path: {:?}", name, paths);
            if name != "invalidations" {
                let mut sorted = paths.clone();
                sorted.sort_by(|a, b| a.split('/').cmp(b.split('/')));
                prop_assert_eq!(&paths, &sorted, "{} is out of order", name);
            }
        }
    }

    #[test]
    fn every_change_is_covered_by_an_invalidation(left in root(), right in root()) {
        let c = Comparison::compare(Some(&left), Some(&right)).unwrap();
        let prefixes: Vec<_> = c.invalidations().collect();
        for path in c.modified("").chain(c.deleted("", DeletedOptions::files_only())) {
            prop_assert!(covered(&path, &prefixes), "{} not covered by {:?}", path, prefixes);
        }
    }

    #[test]
    fn invalidations_are_well_formed(left in root(), right in root()) {
        let c = Comparison::compare(Some(&left), Some(&right)).unwrap();
        for prefix in c.invalidations() {
            prop_assert!(!prefix.starts_with('/'));
            prop_assert!(!prefix.is_empty());
            let stem = prefix.strip_suffix('*').unwrap_or(&prefix);
            prop_assert!(!stem.contains('*'));
            prop_assert!(stem.is_empty() || !prefix.ends_with('*') || stem.ends_with('/'));
        }
    }
}
