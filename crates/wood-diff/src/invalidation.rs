//! Bottom-up aggregation of cache-invalidation prefixes.
//!
//! Purge APIs are rate limited and often billed per path, so a directory
//! whose every descendant must be purged collapses into two entries: the
//! bare directory key (flat stores may hold an object under it) and the
//! `dir/*` wildcard covering everything below. The wildcard is never written
//! as `dir*`, which would also match sibling directories sharing the prefix.
//!
//! A directory that cannot collapse hands the decision to its children.
//! Children with nothing below them (unchanged empty directories) are
//! skipped entirely.

use tracing::trace;
use wood_types::{join_path, WILDCARD};

use crate::comparison::Comparison;
use crate::traversal::{visit_children_where, Step};

/// Expand one node of an invalidation stream. `prefix` is the rendered path
/// of the parent directory.
pub(crate) fn expand<'c>(node: &'c Comparison<'c>, prefix: &str, out: &mut Vec<Step<'c>>) {
    match node {
        Comparison::File(c) => {
            if let (true, Some(left)) = (c.invalidate(), c.left()) {
                out.push(Step::Emit(join_path(prefix, &left.name)));
            }
        }
        Comparison::Directory(c) => {
            let name = c.name();
            let us = join_path(prefix, name);
            if c.invalidate() {
                trace!(prefix = %us, "collapsing directory into wildcard");
                if !name.is_empty() {
                    out.push(Step::Emit(us.clone()));
                }
                out.push(Step::Emit(join_path(&us, WILDCARD)));
            } else {
                visit_children_where(c.children(), &us, |child| !child.is_empty(), out);
            }
        }
        Comparison::FileDirectory(c) => {
            // The old key was a file; the new directory's contents were never
            // cached.
            out.push(Step::Emit(join_path(prefix, &c.left().name)));
        }
        Comparison::DirectoryFile(c) => {
            // The bare key is now the new file, so only the old contents go.
            let us = join_path(prefix, &c.left().name);
            out.push(Step::Emit(join_path(&us, WILDCARD)));
        }
    }
}

#[cfg(test)]
mod tests {
    use wood_types::Entity;

    use super::*;

    fn file(name: &str, fp: &str) -> Entity {
        Entity::file(name, 1, fp)
    }

    fn invalidations(left: &Entity, right: &Entity) -> Vec<String> {
        Comparison::compare(Some(left), Some(right))
            .unwrap()
            .invalidations()
            .collect()
    }

    fn assets(css_fp: &str) -> Entity {
        Entity::root([
            Entity::directory("css", [file("styles.css", css_fp)]),
            Entity::directory("img", [Entity::file("george.jpg", 12345, "abc")]),
        ])
    }

    #[test]
    fn partially_changed_directory_collapses_only_changed_subtree() {
        assert_eq!(invalidations(&assets("abc"), &assets("abcd")), vec!["css", "css/*"]);
    }

    #[test]
    fn named_top_level_directory_prefixes_children() {
        let left = Entity::directory("assets", [Entity::directory("css", [file("s.css", "1")]), Entity::directory("img", [file("g.jpg", "1")])]);
        let right = Entity::directory("assets", [Entity::directory("css", [file("s.css", "2")]), Entity::directory("img", [file("g.jpg", "1")])]);
        assert_eq!(invalidations(&right, &left), vec!["assets/css", "assets/css/*"]);
    }

    #[test]
    fn unchanged_tree_yields_nothing() {
        assert!(invalidations(&assets("abc"), &assets("abc")).is_empty());
    }

    #[test]
    fn fully_changed_root_collapses_to_bare_wildcard() {
        let left = Entity::root([file("a", "1"), file("b", "1")]);
        let right = Entity::root([file("a", "2"), file("b", "2")]);
        assert_eq!(invalidations(&left, &right), vec!["*"]);
    }

    #[test]
    fn new_files_are_not_invalidated() {
        let left = Entity::root([file("a", "1")]);
        let right = Entity::root([file("a", "1"), file("b", "1")]);
        assert!(invalidations(&left, &right).is_empty());
    }

    #[test]
    fn individual_files_when_siblings_unchanged() {
        let left = Entity::root([file("a", "1"), file("b", "1"), file("c", "1")]);
        let right = Entity::root([file("a", "2"), file("b", "1")]);
        assert_eq!(invalidations(&left, &right), vec!["a", "c"]);
    }

    #[test]
    fn deleted_directory_collapses() {
        let left = Entity::root([
            Entity::directory("old", [file("x", "1"), file("y", "1")]),
            file("keep", "1"),
        ]);
        let right = Entity::root([file("keep", "1")]);
        assert_eq!(invalidations(&left, &right), vec!["old", "old/*"]);
    }

    #[test]
    fn unchanged_empty_directory_contributes_nothing() {
        let left = Entity::root([Entity::directory("empty", []), file("a", "1"), file("b", "1")]);
        let right = Entity::root([Entity::directory("empty", []), file("a", "2"), file("b", "1")]);
        assert_eq!(invalidations(&left, &right), vec!["a"]);
    }

    #[test]
    fn empty_directory_does_not_block_aggregation() {
        let left = Entity::root([Entity::directory(
            "d",
            [Entity::directory("empty", []), file("a", "1")],
        ), file("keep", "1")]);
        let right = Entity::root([Entity::directory(
            "d",
            [Entity::directory("empty", []), file("a", "2")],
        ), file("keep", "1")]);
        assert_eq!(invalidations(&left, &right), vec!["d", "d/*"]);
    }

    #[test]
    fn directory_to_file_yields_wildcard_only() {
        let left = Entity::root([Entity::directory("x", [file("y", "1")]), file("keep", "1")]);
        let right = Entity::root([file("x", "1"), file("keep", "1")]);
        assert_eq!(invalidations(&left, &right), vec!["x/*"]);
    }

    #[test]
    fn file_to_directory_yields_bare_name() {
        let left = Entity::root([file("x", "1"), file("keep", "1")]);
        let right = Entity::root([Entity::directory("x", [file("y", "1")]), file("keep", "1")]);
        assert_eq!(invalidations(&left, &right), vec!["x"]);
    }

    #[test]
    fn nested_partial_change_descends() {
        let left = Entity::root([Entity::directory(
            "a",
            [
                Entity::directory("b", [file("1", "x"), file("2", "x")]),
                file("keep", "x"),
            ],
        )]);
        let right = Entity::root([Entity::directory(
            "a",
            [
                Entity::directory("b", [file("1", "y"), file("2", "y")]),
                file("keep", "x"),
            ],
        )]);
        assert_eq!(invalidations(&left, &right), vec!["a/b", "a/b/*"]);
    }

    #[test]
    fn file_pair_invalidates_by_name() {
        let a = file("index.html", "1");
        let b = file("index.html", "2");
        assert_eq!(invalidations(&a, &b), vec!["index.html"]);
    }
}
