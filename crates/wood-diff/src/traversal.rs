//! Lazy path streams over a comparison tree.
//!
//! Every stream is a depth-first walk driven by an explicit work stack.
//! Expanding a node pushes its own output and its children (in name order)
//! back onto the stack, so parents are always yielded before their contents
//! and nothing below a node is visited until the node itself is reached.
//!
//! Rendered paths are `/`-joined; directory paths end with `/`. The nameless
//! root never yields a path of its own.

use wood_types::{join_path, DIRECTORY_SUFFIX};

use crate::comparison::{Children, Comparison};
use crate::invalidation;

/// Options for [`Comparison::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewOptions {
    /// Emit newly created, non-empty directories as well as their contents.
    ///
    /// Flat key-value stores have no real directory objects; callers syncing
    /// to one set this to `false`. New empty directories are emitted either
    /// way, since nothing else would record them.
    pub include_intermediates: bool,
}

impl Default for NewOptions {
    fn default() -> Self {
        Self {
            include_intermediates: true,
        }
    }
}

impl NewOptions {
    /// Leaf paths only (plus empty new directories).
    pub fn leaves_only() -> Self {
        Self {
            include_intermediates: false,
        }
    }
}

/// Options for [`Comparison::deleted`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeletedOptions {
    /// List the contents of deleted directories explicitly.
    pub include_children: bool,
    /// Emit deleted directories themselves.
    pub include_directories: bool,
}

impl Default for DeletedOptions {
    fn default() -> Self {
        Self {
            include_children: true,
            include_directories: true,
        }
    }
}

impl DeletedOptions {
    /// Only files, never directory markers.
    pub fn files_only() -> Self {
        Self {
            include_children: true,
            include_directories: false,
        }
    }
}

/// Which stream a [`Traversal`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Query {
    New(NewOptions),
    Modified,
    Deleted(DeletedOptions),
    Invalidations,
}

/// A pending unit of work on the traversal stack.
#[derive(Debug)]
pub(crate) enum Step<'c> {
    /// A path ready to be yielded.
    Emit(String),
    /// A node still to be expanded relative to `base`.
    Visit(&'c Comparison<'c>, String),
}

/// Finite, forward-only stream of rendered paths.
///
/// Produced by [`Comparison::new`], [`Comparison::modified`],
/// [`Comparison::deleted`] and [`Comparison::invalidations`]. The comparison
/// tree is immutable, so asking for a fresh stream always yields the same
/// sequence.
#[derive(Debug)]
pub struct Traversal<'c> {
    stack: Vec<Step<'c>>,
    query: Query,
    scratch: Vec<Step<'c>>,
}

impl<'c> Traversal<'c> {
    pub(crate) fn start(root: &'c Comparison<'c>, base: &str, query: Query) -> Self {
        Self {
            stack: vec![Step::Visit(root, base.to_string())],
            query,
            scratch: Vec::new(),
        }
    }
}

impl Iterator for Traversal<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Emit(path) => return Some(path),
                Step::Visit(node, base) => {
                    expand(node, &base, self.query, &mut self.scratch);
                    // Reverse so the first step produced is the next popped.
                    self.stack.extend(self.scratch.drain(..).rev());
                }
            }
        }
        None
    }
}

fn expand<'c>(node: &'c Comparison<'c>, base: &str, query: Query, out: &mut Vec<Step<'c>>) {
    match query {
        Query::New(opts) => expand_new(node, base, opts, out),
        Query::Modified => expand_modified(node, base, out),
        Query::Deleted(opts) => expand_deleted(node, base, opts, out),
        Query::Invalidations => invalidation::expand(node, base, out),
    }
}

pub(crate) fn visit_children<'c>(children: &'c Children<'c>, base: &str, out: &mut Vec<Step<'c>>) {
    out.extend(
        children
            .values()
            .map(|child| Step::Visit(child, base.to_string())),
    );
}

pub(crate) fn visit_children_where<'c>(
    children: &'c Children<'c>,
    base: &str,
    keep: impl Fn(&Comparison<'c>) -> bool,
    out: &mut Vec<Step<'c>>,
) {
    out.extend(
        children
            .values()
            .filter(|child| keep(child))
            .map(|child| Step::Visit(child, base.to_string())),
    );
}

fn directory_marker(path: &str) -> String {
    format!("{path}{DIRECTORY_SUFFIX}")
}

fn expand_new<'c>(node: &'c Comparison<'c>, base: &str, opts: NewOptions, out: &mut Vec<Step<'c>>) {
    match node {
        Comparison::File(c) => {
            if let (true, Some(right)) = (c.is_new(), c.right()) {
                out.push(Step::Emit(join_path(base, &right.name)));
            }
        }
        Comparison::Directory(c) => {
            let Some(right) = c.right() else {
                return;
            };
            let us = join_path(base, &right.name);
            if c.is_new() && !right.is_root() && (c.is_empty() || opts.include_intermediates) {
                out.push(Step::Emit(directory_marker(&us)));
            }
            // A new directory's children are new by construction.
            visit_children(c.children(), &us, out);
        }
        Comparison::FileDirectory(c) => {
            let us = join_path(base, &c.right().name);
            if c.children().is_empty() || opts.include_intermediates {
                out.push(Step::Emit(directory_marker(&us)));
            }
            visit_children(c.children(), &us, out);
        }
        Comparison::DirectoryFile(c) => {
            out.push(Step::Emit(join_path(base, &c.right().name)));
        }
    }
}

fn expand_modified<'c>(node: &'c Comparison<'c>, base: &str, out: &mut Vec<Step<'c>>) {
    match node {
        Comparison::File(c) => {
            if let (true, Some(right)) = (c.is_modified(), c.right()) {
                out.push(Step::Emit(join_path(base, &right.name)));
            }
        }
        Comparison::Directory(c) => {
            if let Some(right) = c.right() {
                visit_children(c.children(), &join_path(base, &right.name), out);
            }
        }
        // A type swap is a deletion plus a creation, never a modification.
        Comparison::FileDirectory(_) | Comparison::DirectoryFile(_) => {}
    }
}

fn expand_deleted<'c>(
    node: &'c Comparison<'c>,
    base: &str,
    opts: DeletedOptions,
    out: &mut Vec<Step<'c>>,
) {
    match node {
        Comparison::File(c) => {
            if let (true, Some(left)) = (c.is_deleted(), c.left()) {
                out.push(Step::Emit(join_path(base, &left.name)));
            }
        }
        Comparison::Directory(c) => {
            let Some(left) = c.left() else {
                return;
            };
            let us = join_path(base, &left.name);
            if c.is_deleted() && opts.include_directories && !left.is_root() {
                out.push(Step::Emit(directory_marker(&us)));
            }
            if !c.is_deleted() || opts.include_children {
                visit_children(c.children(), &us, out);
            }
        }
        Comparison::FileDirectory(c) => {
            out.push(Step::Emit(join_path(base, &c.left().name)));
        }
        Comparison::DirectoryFile(c) => {
            let us = join_path(base, &c.left().name);
            if opts.include_directories {
                out.push(Step::Emit(directory_marker(&us)));
            }
            if opts.include_children {
                visit_children(c.children(), &us, out);
            }
        }
    }
}

impl<'a> Comparison<'a> {
    /// Paths that exist only on the right side, rendered under `base`.
    ///
    /// Directories are yielded before their contents.
    pub fn new(&self, base: &str, opts: NewOptions) -> Traversal<'_> {
        Traversal::start(self, base, Query::New(opts))
    }

    /// Paths of files present on both sides whose content changed.
    ///
    /// Only files are ever yielded.
    pub fn modified(&self, base: &str) -> Traversal<'_> {
        Traversal::start(self, base, Query::Modified)
    }

    /// Paths that exist only on the left side, rendered under `base`.
    pub fn deleted(&self, base: &str, opts: DeletedOptions) -> Traversal<'_> {
        Traversal::start(self, base, Query::Deleted(opts))
    }

    /// Aggregated cache-invalidation prefixes, relative and without a
    /// leading `/`. Each is either a bare path or a path ending in `/*`.
    pub fn invalidations(&self) -> Traversal<'_> {
        Traversal::start(self, "", Query::Invalidations)
    }
}
