//! Snapshot entities: files, directories and the nameless root.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::path::join_path;

/// Spaces of indentation per nesting level in [`Hierarchy`] output.
const INDENT_SIZE: usize = 4;

/// An immutable snapshot of a file or directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    File(File),
    Directory(Directory),
}

/// A file: name, size in bytes and content fingerprint.
///
/// `size` is informational only; equality of content is decided by the
/// fingerprint alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub size: u64,
    pub fingerprint: Fingerprint,
}

/// A directory: name plus children keyed by their own names.
///
/// Children live in a `BTreeMap`, so names are unique and iteration is sorted.
/// The root directory has an empty name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub name: String,
    #[serde(default)]
    pub children: BTreeMap<String, Entity>,
}

impl File {
    /// Create a new file entity.
    pub fn new(name: impl Into<String>, size: u64, fingerprint: impl Into<Fingerprint>) -> Self {
        Self {
            name: name.into(),
            size,
            fingerprint: fingerprint.into(),
        }
    }
}

impl Directory {
    /// Create a directory holding `children`, keyed by each child's name.
    ///
    /// A later child with a duplicate name replaces the earlier one.
    pub fn new(name: impl Into<String>, children: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            name: name.into(),
            children: children
                .into_iter()
                .map(|child| (child.name().to_string(), child))
                .collect(),
        }
    }

    /// Create a directory with no children.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, [])
    }

    /// Create the nameless root directory.
    pub fn root(children: impl IntoIterator<Item = Entity>) -> Self {
        Self::new("", children)
    }

    /// Returns `true` for the nameless root.
    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// Returns `true` if the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.children.get(name)
    }

    /// Insert or replace a child, returning the previous entity under that name.
    pub fn insert(&mut self, child: Entity) -> Option<Entity> {
        self.children.insert(child.name().to_string(), child)
    }
}

impl Entity {
    /// Shorthand for a file entity.
    pub fn file(name: impl Into<String>, size: u64, fingerprint: impl Into<Fingerprint>) -> Self {
        Self::File(File::new(name, size, fingerprint))
    }

    /// Shorthand for a directory entity.
    pub fn directory(name: impl Into<String>, children: impl IntoIterator<Item = Entity>) -> Self {
        Self::Directory(Directory::new(name, children))
    }

    /// Shorthand for the nameless root directory.
    pub fn root(children: impl IntoIterator<Item = Entity>) -> Self {
        Self::Directory(Directory::root(children))
    }

    /// The entity's own segment name (empty for the root).
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Directory(dir) => &dir.name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Returns `true` for the nameless root directory.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Directory(dir) if dir.is_root())
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }

    /// Every path inside this entity, including the entity itself.
    ///
    /// The root's own (empty) path is never included. Directories are
    /// listed before their contents and carry no trailing separator.
    pub fn walk_paths(&self, base: &str) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(base, &mut paths);
        paths
    }

    fn collect_paths(&self, base: &str, out: &mut Vec<String>) {
        let us = join_path(base, self.name());
        if !us.is_empty() && !self.is_root() {
            out.push(us.clone());
        }
        if let Self::Directory(dir) = self {
            for child in dir.children.values() {
                child.collect_paths(&us, out);
            }
        }
    }

    /// Every file inside this entity, including the entity itself if it is one.
    pub fn walk_files(&self) -> Vec<&File> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a File>) {
        match self {
            Self::File(file) => out.push(file),
            Self::Directory(dir) => {
                for child in dir.children.values() {
                    child.collect_files(out);
                }
            }
        }
    }

    /// Indented, one-entity-per-line rendering of this tree.
    pub fn hierarchy(&self) -> Hierarchy<'_> {
        Hierarchy {
            entity: self,
            level: 0,
        }
    }
}

impl From<File> for Entity {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Directory> for Entity {
    fn from(dir: Directory) -> Self {
        Self::Directory(dir)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(file) => write!(f, "File({}, {}, {})", file.name, file.size, file.fingerprint),
            Self::Directory(dir) => write!(f, "Directory({})", dir.name),
        }
    }
}

/// Displays an entity and its descendants, four spaces per level.
#[derive(Clone, Copy, Debug)]
pub struct Hierarchy<'a> {
    entity: &'a Entity,
    level: usize,
}

impl<'a> Hierarchy<'a> {
    /// Start rendering at an explicit indentation level.
    pub fn at_level(entity: &'a Entity, level: usize) -> Self {
        Self { entity, level }
    }
}

impl fmt::Display for Hierarchy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.entity, indent = self.level * INDENT_SIZE)?;
        if let Entity::Directory(dir) = self.entity {
            for child in dir.children.values() {
                write!(f, "{}", Hierarchy::at_level(child, self.level + 1))?;
            }
        }
        Ok(())
    }
}
