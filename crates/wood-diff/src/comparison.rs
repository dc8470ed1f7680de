//! Comparison tree: the reconciliation of a left ("before") and a right
//! ("after") entity.
//!
//! [`Comparison::compare`] picks one of four variants from the kinds of the
//! two sides:
//!
//! | left      | right     | variant                   |
//! |-----------|-----------|---------------------------|
//! | file      | file      | [`FileComparison`]        |
//! | file      | directory | [`FileDirectoryComparison`] |
//! | file      | absent    | [`FileComparison`]        |
//! | directory | file      | [`DirectoryFileComparison`] |
//! | directory | directory | [`DirectoryComparison`]   |
//! | directory | absent    | [`DirectoryComparison`]   |
//! | absent    | file      | [`FileComparison`]        |
//! | absent    | directory | [`DirectoryComparison`]   |
//! | absent    | absent    | [`DiffError::InvalidComparison`] |
//!
//! The tree borrows the entities it compares and is never mutated after it
//! is built.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};
use wood_types::{Directory, Entity, File};

use crate::error::{DiffError, DiffResult};

/// Spaces of indentation per nesting level in [`ComparisonHierarchy`] output.
const INDENT_SIZE: usize = 4;

/// Child comparisons keyed by entity name, iterated in name order.
pub type Children<'a> = BTreeMap<&'a str, Comparison<'a>>;

/// The comparison of two entities, either of which may be absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Comparison<'a> {
    /// File vs file, or a file on one side only.
    File(FileComparison<'a>),
    /// Directory vs directory, or a directory on one side only.
    Directory(DirectoryComparison<'a>),
    /// A file replaced by a directory.
    FileDirectory(FileDirectoryComparison<'a>),
    /// A directory replaced by a file.
    DirectoryFile(DirectoryFileComparison<'a>),
}

/// Comparison of two files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileComparison<'a> {
    left: Option<&'a File>,
    right: Option<&'a File>,
}

/// Comparison of two directories, reconciled child by child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryComparison<'a> {
    left: Option<&'a Directory>,
    right: Option<&'a Directory>,
    children: Children<'a>,
    invalidate: bool,
}

/// A file that became a directory.
///
/// Modelled as the file being deleted and the whole directory being new.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDirectoryComparison<'a> {
    left: &'a File,
    right: &'a Directory,
    children: Children<'a>,
}

/// A directory that became a file.
///
/// Modelled as the whole directory being deleted and the file being new.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryFileComparison<'a> {
    left: &'a Directory,
    right: &'a File,
    children: Children<'a>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

impl<'a> Comparison<'a> {
    /// Compare two entities, selecting the variant from their kinds.
    ///
    /// Fails only when both sides are absent.
    pub fn compare(left: Option<&'a Entity>, right: Option<&'a Entity>) -> DiffResult<Self> {
        let comparison = match (left, right) {
            (None, None) => Err(DiffError::InvalidComparison),
            (Some(Entity::File(l)), Some(Entity::Directory(r))) => {
                trace!(name = %l.name, "file replaced by directory");
                FileDirectoryComparison::new(l, r).map(Self::FileDirectory)
            }
            (Some(Entity::Directory(l)), Some(Entity::File(r))) => {
                trace!(name = %l.name, "directory replaced by file");
                DirectoryFileComparison::new(l, r).map(Self::DirectoryFile)
            }
            (Some(Entity::File(l)), r) => Ok(Self::File(FileComparison::new(
                Some(l),
                r.and_then(Entity::as_file),
            )?)),
            (None, Some(Entity::File(r))) => Ok(Self::File(FileComparison::new(None, Some(r))?)),
            (Some(Entity::Directory(l)), r) => Ok(Self::Directory(DirectoryComparison::new(
                Some(l),
                r.and_then(Entity::as_directory),
            )?)),
            (None, Some(Entity::Directory(r))) => {
                Ok(Self::Directory(DirectoryComparison::new(None, Some(r))?))
            }
        }?;
        if left.or(right).is_some_and(Entity::is_root) {
            debug!(
                kind = comparison.kind(),
                new = comparison.is_new(),
                deleted = comparison.is_deleted(),
                invalidate = comparison.invalidate(),
                "compared snapshots"
            );
        }
        Ok(comparison)
    }

    /// Returns `true` if the left side is absent, i.e. the entity appeared.
    ///
    /// Type swaps are always new.
    pub fn is_new(&self) -> bool {
        match self {
            Self::File(c) => c.is_new(),
            Self::Directory(c) => c.is_new(),
            Self::FileDirectory(_) | Self::DirectoryFile(_) => true,
        }
    }

    /// Returns `true` if the right side is absent, i.e. the entity vanished.
    ///
    /// Type swaps are always deleted.
    pub fn is_deleted(&self) -> bool {
        match self {
            Self::File(c) => c.is_deleted(),
            Self::Directory(c) => c.is_deleted(),
            Self::FileDirectory(_) | Self::DirectoryFile(_) => true,
        }
    }

    /// Returns `true` if a file exists on both sides with differing content.
    ///
    /// Directories and type swaps are never modified.
    pub fn is_modified(&self) -> bool {
        match self {
            Self::File(c) => c.is_modified(),
            Self::Directory(_) | Self::FileDirectory(_) | Self::DirectoryFile(_) => false,
        }
    }

    /// Returns `true` if the comparison covers no entities below itself.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::File(_) | Self::DirectoryFile(_) => false,
            Self::Directory(c) => c.is_empty(),
            Self::FileDirectory(c) => c.is_empty(),
        }
    }

    /// Whether the cached copy of this entity (and everything below it) must
    /// be purged.
    pub fn invalidate(&self) -> bool {
        match self {
            Self::File(c) => c.invalidate(),
            Self::Directory(c) => c.invalidate(),
            Self::FileDirectory(_) | Self::DirectoryFile(_) => true,
        }
    }

    /// Name of the left entity, if present.
    pub fn left_name(&self) -> Option<&'a str> {
        match self {
            Self::File(c) => c.left.map(|f| f.name.as_str()),
            Self::Directory(c) => c.left.map(|d| d.name.as_str()),
            Self::FileDirectory(c) => Some(c.left.name.as_str()),
            Self::DirectoryFile(c) => Some(c.left.name.as_str()),
        }
    }

    /// Name of the right entity, if present.
    pub fn right_name(&self) -> Option<&'a str> {
        match self {
            Self::File(c) => c.right.map(|f| f.name.as_str()),
            Self::Directory(c) => c.right.map(|d| d.name.as_str()),
            Self::FileDirectory(c) => Some(c.right.name.as_str()),
            Self::DirectoryFile(c) => Some(c.right.name.as_str()),
        }
    }

    /// Child comparisons, or `None` for a file comparison.
    pub fn children(&self) -> Option<&Children<'a>> {
        match self {
            Self::File(_) => None,
            Self::Directory(c) => Some(&c.children),
            Self::FileDirectory(c) => Some(&c.children),
            Self::DirectoryFile(c) => Some(&c.children),
        }
    }

    /// Short variant name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "FileComparison",
            Self::Directory(_) => "DirectoryComparison",
            Self::FileDirectory(_) => "FileDirectoryComparison",
            Self::DirectoryFile(_) => "DirectoryFileComparison",
        }
    }

    /// Indented, one-node-per-line rendering of this comparison tree.
    pub fn hierarchy(&self) -> ComparisonHierarchy<'_, 'a> {
        ComparisonHierarchy {
            comparison: self,
            level: 0,
        }
    }
}

/// Pair every child name appearing on either side with its two entities.
fn zip_children<'a>(
    left: Option<&'a Directory>,
    right: Option<&'a Directory>,
) -> BTreeMap<&'a str, (Option<&'a Entity>, Option<&'a Entity>)> {
    let mut pairs: BTreeMap<&'a str, (Option<&'a Entity>, Option<&'a Entity>)> = BTreeMap::new();
    for (name, entity) in left.into_iter().flat_map(|d| d.children.iter()) {
        pairs.entry(name.as_str()).or_default().0 = Some(entity);
    }
    for (name, entity) in right.into_iter().flat_map(|d| d.children.iter()) {
        pairs.entry(name.as_str()).or_default().1 = Some(entity);
    }
    pairs
}

fn compare_children<'a>(
    left: Option<&'a Directory>,
    right: Option<&'a Directory>,
) -> DiffResult<Children<'a>> {
    zip_children(left, right)
        .into_iter()
        .map(|(name, (l, r))| Ok((name, Comparison::compare(l, r)?)))
        .collect()
}

// ---------------------------------------------------------------------------
// FileComparison
// ---------------------------------------------------------------------------

impl<'a> FileComparison<'a> {
    /// Create a file comparison. At least one side must be present.
    pub fn new(left: Option<&'a File>, right: Option<&'a File>) -> DiffResult<Self> {
        if left.is_none() && right.is_none() {
            return Err(DiffError::InvalidComparison);
        }
        Ok(Self { left, right })
    }

    pub fn left(&self) -> Option<&'a File> {
        self.left
    }

    pub fn right(&self) -> Option<&'a File> {
        self.right
    }

    pub fn is_new(&self) -> bool {
        self.left.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.right.is_none()
    }

    /// Modified implies the file exists on both sides, so a new or deleted
    /// file is never modified.
    pub fn is_modified(&self) -> bool {
        match (self.left, self.right) {
            (Some(l), Some(r)) => l.fingerprint != r.fingerprint,
            _ => false,
        }
    }

    pub fn invalidate(&self) -> bool {
        self.is_modified() || self.is_deleted()
    }
}

// ---------------------------------------------------------------------------
// DirectoryComparison
// ---------------------------------------------------------------------------

impl<'a> DirectoryComparison<'a> {
    /// Create a directory comparison, recursively comparing the union of both
    /// sides' children. At least one side must be present.
    pub fn new(left: Option<&'a Directory>, right: Option<&'a Directory>) -> DiffResult<Self> {
        if left.is_none() && right.is_none() {
            return Err(DiffError::InvalidComparison);
        }
        let children = compare_children(left, right)?;
        // Vacuously true for an empty directory.
        let invalidate = children.values().all(Comparison::invalidate);
        Ok(Self {
            left,
            right,
            children,
            invalidate,
        })
    }

    pub fn left(&self) -> Option<&'a Directory> {
        self.left
    }

    pub fn right(&self) -> Option<&'a Directory> {
        self.right
    }

    pub fn children(&self) -> &Children<'a> {
        &self.children
    }

    pub fn is_new(&self) -> bool {
        self.left.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.right.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// `true` iff every reconciled child must be invalidated.
    pub fn invalidate(&self) -> bool {
        self.invalidate
    }

    /// The directory's own name, taken from whichever side exists.
    pub fn name(&self) -> &'a str {
        match (self.left, self.right) {
            (Some(l), _) => &l.name,
            (None, Some(r)) => &r.name,
            (None, None) => "",
        }
    }

    /// Returns `true` when this compares nameless roots.
    pub fn is_root(&self) -> bool {
        self.name().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Replacement comparisons
// ---------------------------------------------------------------------------

impl<'a> FileDirectoryComparison<'a> {
    /// Pair every child of the new directory against absence.
    pub fn new(left: &'a File, right: &'a Directory) -> DiffResult<Self> {
        Ok(Self {
            left,
            right,
            children: compare_children(None, Some(right))?,
        })
    }

    pub fn left(&self) -> &'a File {
        self.left
    }

    pub fn right(&self) -> &'a Directory {
        self.right
    }

    pub fn children(&self) -> &Children<'a> {
        &self.children
    }

    /// `true` iff the new directory has no children.
    pub fn is_empty(&self) -> bool {
        self.right.children.is_empty()
    }
}

impl<'a> DirectoryFileComparison<'a> {
    /// Pair every child of the old directory against absence.
    pub fn new(left: &'a Directory, right: &'a File) -> DiffResult<Self> {
        Ok(Self {
            left,
            right,
            children: compare_children(Some(left), None)?,
        })
    }

    pub fn left(&self) -> &'a Directory {
        self.left
    }

    pub fn right(&self) -> &'a File {
        self.right
    }

    pub fn children(&self) -> &Children<'a> {
        &self.children
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Comparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}|{}, is_new: {}, is_modified: {}, is_deleted: {}, invalidate: {})",
            self.kind(),
            self.left_name().unwrap_or("None"),
            self.right_name().unwrap_or("None"),
            self.is_new(),
            self.is_modified(),
            self.is_deleted(),
            self.invalidate(),
        )
    }
}

/// Displays a comparison and its descendants, four spaces per level.
#[derive(Clone, Copy, Debug)]
pub struct ComparisonHierarchy<'c, 'a> {
    comparison: &'c Comparison<'a>,
    level: usize,
}

impl fmt::Display for ComparisonHierarchy<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{}",
            "",
            self.comparison,
            indent = self.level * INDENT_SIZE
        )?;
        for child in self.comparison.children().into_iter().flat_map(BTreeMap::values) {
            let nested = ComparisonHierarchy {
                comparison: child,
                level: self.level + 1,
            };
            write!(f, "{nested}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, fp: &str) -> Entity {
        Entity::file(name, 1, fp)
    }

    fn dir(name: &str, children: Vec<Entity>) -> Entity {
        Entity::directory(name, children)
    }

    #[test]
    fn both_absent_is_invalid() {
        assert_eq!(Comparison::compare(None, None), Err(DiffError::InvalidComparison));
        assert_eq!(FileComparison::new(None, None), Err(DiffError::InvalidComparison));
        assert_eq!(DirectoryComparison::new(None, None), Err(DiffError::InvalidComparison));
    }

    #[test]
    fn dispatch_table_is_total() {
        let f = file("x", "a");
        let d = dir("x", vec![]);
        let cases: Vec<(Option<&Entity>, Option<&Entity>, &str)> = vec![
            (Some(&f), Some(&f), "FileComparison"),
            (Some(&f), Some(&d), "FileDirectoryComparison"),
            (Some(&f), None, "FileComparison"),
            (Some(&d), Some(&f), "DirectoryFileComparison"),
            (Some(&d), Some(&d), "DirectoryComparison"),
            (Some(&d), None, "DirectoryComparison"),
            (None, Some(&f), "FileComparison"),
            (None, Some(&d), "DirectoryComparison"),
        ];
        for (l, r, expected) in cases {
            let c = Comparison::compare(l, r).unwrap();
            assert_eq!(c.kind(), expected, "left={l:?} right={r:?}");
        }
    }

    #[test]
    fn file_modified_only_when_both_present_and_different() {
        let a = file("f", "abc");
        let b = file("f", "abcd");
        let same = Comparison::compare(Some(&a), Some(&a)).unwrap();
        assert!(!same.is_modified());
        assert!(!same.invalidate());

        let changed = Comparison::compare(Some(&a), Some(&b)).unwrap();
        assert!(changed.is_modified());
        assert!(changed.invalidate());

        let added = Comparison::compare(None, Some(&b)).unwrap();
        assert!(added.is_new());
        assert!(!added.is_modified());
        assert!(!added.invalidate());

        let removed = Comparison::compare(Some(&a), None).unwrap();
        assert!(removed.is_deleted());
        assert!(!removed.is_modified());
        assert!(removed.invalidate());
    }

    #[test]
    fn file_size_does_not_affect_equality() {
        let a = Entity::file("f", 1, "abc");
        let b = Entity::file("f", 999, "abc");
        let c = Comparison::compare(Some(&a), Some(&b)).unwrap();
        assert!(!c.is_modified());
    }

    #[test]
    fn directory_reconciles_key_union() {
        let left = dir("d", vec![file("a", "1"), file("b", "2")]);
        let right = dir("d", vec![file("b", "3"), file("c", "4")]);
        let c = Comparison::compare(Some(&left), Some(&right)).unwrap();
        let children = c.children().unwrap();
        let names: Vec<_> = children.keys().copied().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(children["a"].is_deleted());
        assert!(children["b"].is_modified());
        assert!(children["c"].is_new());
        assert!(!c.is_modified());
    }

    #[test]
    fn directory_invalidate_is_and_over_children() {
        let left = dir("d", vec![file("a", "1"), file("b", "2")]);
        let partial = dir("d", vec![file("a", "1"), file("b", "9")]);
        let full = dir("d", vec![file("a", "8"), file("b", "9")]);

        let c = Comparison::compare(Some(&left), Some(&partial)).unwrap();
        assert!(!c.invalidate());

        let c = Comparison::compare(Some(&left), Some(&full)).unwrap();
        assert!(c.invalidate());
    }

    #[test]
    fn empty_directory_is_vacuously_invalidated() {
        let empty = dir("d", vec![]);
        let c = Comparison::compare(Some(&empty), Some(&empty)).unwrap();
        assert!(c.is_empty());
        assert!(c.invalidate());
    }

    #[test]
    fn type_swaps_are_new_and_deleted() {
        let f = file("x", "a");
        let d = dir("x", vec![file("inner", "b")]);

        let fd = Comparison::compare(Some(&f), Some(&d)).unwrap();
        assert!(fd.is_new() && fd.is_deleted());
        assert!(!fd.is_modified());
        assert!(fd.invalidate());
        assert!(!fd.is_empty());
        let inner = &fd.children().unwrap()["inner"];
        assert!(inner.is_new() && !inner.is_deleted());

        let df = Comparison::compare(Some(&d), Some(&f)).unwrap();
        assert!(df.is_new() && df.is_deleted());
        assert!(!df.is_empty());
        let inner = &df.children().unwrap()["inner"];
        assert!(inner.is_deleted() && !inner.is_new());
    }

    #[test]
    fn file_to_empty_directory_is_empty() {
        let f = file("x", "a");
        let d = dir("x", vec![]);
        let fd = Comparison::compare(Some(&f), Some(&d)).unwrap();
        assert!(fd.is_empty());
    }

    #[test]
    fn hierarchy_renders_every_node() {
        let left = dir("d", vec![file("a", "1")]);
        let right = dir("d", vec![file("a", "2")]);
        let c = Comparison::compare(Some(&left), Some(&right)).unwrap();
        let rendered = c.hierarchy().to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("DirectoryComparison(d|d"));
        assert!(lines[1].starts_with("    FileComparison(a|a, is_new: false, is_modified: true"));
    }
}
