//! Local directory scanning.

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};
use wood_types::{Directory, Entity, File, Fingerprint};

use crate::error::{SnapshotError, SnapshotResult};

/// Read buffer used when streaming file contents through the hasher.
const BUFFER_SIZE: usize = 64 * 1024;

/// Builds entity trees from the local filesystem.
///
/// Entries are visited in file-name order and symbolic links are never
/// followed. Paths matching any exclude pattern (gitignore syntax, relative
/// to the scanned directory) are left out together with everything below
/// them.
#[derive(Clone, Debug, Default)]
pub struct Scanner {
    excludes: Vec<String>,
}

impl Scanner {
    /// A scanner that includes every regular file.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scanner that skips paths matching `patterns`.
    pub fn with_excludes<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excludes: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured exclude patterns.
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Snapshot `path` as a named entity: a file for a file path, otherwise a
    /// directory named after the last path component.
    pub fn scan_entity(&self, path: &Path) -> SnapshotResult<Entity> {
        let metadata = metadata(path)?;
        let name = entity_name(path)?;
        if metadata.is_file() {
            return Ok(Entity::File(File::new(name, metadata.len(), hash_file(path)?)));
        }
        if !metadata.is_dir() {
            return Err(SnapshotError::NotADirectory(path.to_path_buf()));
        }
        let mut directory = self.scan_tree(path)?;
        directory.name = name;
        Ok(Entity::Directory(directory))
    }

    /// Snapshot the contents of the directory at `path` under a nameless root.
    pub fn scan_root(&self, path: &Path) -> SnapshotResult<Entity> {
        if !metadata(path)?.is_dir() {
            return Err(SnapshotError::NotADirectory(path.to_path_buf()));
        }
        Ok(Entity::Directory(self.scan_tree(path)?))
    }

    fn matcher(&self, root: &Path) -> SnapshotResult<Option<Gitignore>> {
        if self.excludes.is_empty() {
            return Ok(None);
        }
        let mut builder = GitignoreBuilder::new(root);
        for pattern in &self.excludes {
            builder
                .add_line(None, pattern)
                .map_err(|e| SnapshotError::Pattern(format!("{pattern}: {e}")))?;
        }
        let matcher = builder
            .build()
            .map_err(|e| SnapshotError::Pattern(e.to_string()))?;
        Ok(Some(matcher))
    }

    fn scan_tree(&self, root: &Path) -> SnapshotResult<Directory> {
        let matcher = self.matcher(root)?;
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_excluded(matcher.as_ref(), entry));

        // stack[d] is the open directory at walk depth d; stack[0] is the root.
        let mut stack = vec![Directory::default()];
        let mut files = 0usize;
        for entry in walker {
            let entry = entry?;
            close_to(&mut stack, entry.depth());
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type();
            if file_type.is_dir() {
                stack.push(Directory::empty(name));
            } else if file_type.is_file() {
                let size = metadata(entry.path())?.len();
                let file = File::new(name, size, hash_file(entry.path())?);
                trace!(path = %entry.path().display(), fingerprint = %file.fingerprint.short(), "hashed file");
                if let Some(parent) = stack.last_mut() {
                    parent.insert(file.into());
                }
                files += 1;
            } else {
                debug!(path = %entry.path().display(), "skipping non-regular entry");
            }
        }
        close_to(&mut stack, 1);

        debug!(root = %root.display(), files, "scanned directory");
        Ok(stack.pop().unwrap_or_default())
    }
}

/// Fold finished directories into their parents until `depth` remain open.
fn close_to(stack: &mut Vec<Directory>, depth: usize) {
    while stack.len() > depth.max(1) {
        let Some(done) = stack.pop() else {
            break;
        };
        if let Some(parent) = stack.last_mut() {
            parent.insert(Entity::Directory(done));
        }
    }
}

fn is_excluded(matcher: Option<&Gitignore>, entry: &DirEntry) -> bool {
    matcher.is_some_and(|m| m.matched(entry.path(), entry.file_type().is_dir()).is_ignore())
}

fn metadata(path: &Path) -> SnapshotResult<fs::Metadata> {
    fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SnapshotError::NotFound(path.to_path_buf()),
        _ => SnapshotError::io(path, e),
    })
}

fn entity_name(path: &Path) -> SnapshotResult<String> {
    let canonical = path.canonicalize().map_err(|e| SnapshotError::io(path, e))?;
    Ok(canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default())
}

/// Fingerprint a file by streaming its contents through BLAKE3.
pub fn hash_file(path: &Path) -> SnapshotResult<Fingerprint> {
    let mut file = fs::File::open(path).map_err(|e| SnapshotError::io(path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0; BUFFER_SIZE];
    loop {
        let n = file.read(&mut buffer).map_err(|e| SnapshotError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(Fingerprint::from(hasher.finalize()))
}
