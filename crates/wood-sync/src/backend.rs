//! Object stores that a sync can write to.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// A key-addressed store receiving uploads and bulk deletes.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Upload the local file `source` under `key`.
    async fn upload(&self, source: &Path, key: &str) -> SyncResult<()>;

    /// Create an (empty) directory marker. `key` ends with `/`.
    ///
    /// Flat stores have no directories, so the default does nothing.
    async fn create_directory(&self, key: &str) -> SyncResult<()> {
        let _ = key;
        Ok(())
    }

    /// Delete a batch of keys in one request.
    async fn delete_batch(&self, keys: &[String]) -> SyncResult<()>;

    /// Remove a directory and anything left below it. `key` ends with `/`.
    ///
    /// Flat stores lose a directory with its last key, so the default does
    /// nothing.
    async fn delete_directory(&self, key: &str) -> SyncResult<()> {
        let _ = key;
        Ok(())
    }
}

#[async_trait]
impl<B: ObjectBackend + ?Sized> ObjectBackend for &B {
    async fn upload(&self, source: &Path, key: &str) -> SyncResult<()> {
        (**self).upload(source, key).await
    }

    async fn create_directory(&self, key: &str) -> SyncResult<()> {
        (**self).create_directory(key).await
    }

    async fn delete_batch(&self, keys: &[String]) -> SyncResult<()> {
        (**self).delete_batch(keys).await
    }

    async fn delete_directory(&self, key: &str) -> SyncResult<()> {
        (**self).delete_directory(key).await
    }
}

/// Records every call; used in tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    uploads: Mutex<Vec<(PathBuf, String)>>,
    directories: Mutex<Vec<String>>,
    deletes: Mutex<Vec<Vec<String>>>,
    deleted_directories: Mutex<Vec<String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(source, key)` pairs in upload order.
    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        self.uploads.lock().expect("lock poisoned").clone()
    }

    /// Directory marker keys in creation order.
    pub fn directories(&self) -> Vec<String> {
        self.directories.lock().expect("lock poisoned").clone()
    }

    /// Delete batches in request order.
    pub fn delete_batches(&self) -> Vec<Vec<String>> {
        self.deletes.lock().expect("lock poisoned").clone()
    }

    /// Removed directory keys in request order.
    pub fn deleted_directories(&self) -> Vec<String> {
        self.deleted_directories.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl ObjectBackend for InMemoryBackend {
    async fn upload(&self, source: &Path, key: &str) -> SyncResult<()> {
        self.uploads
            .lock()
            .expect("lock poisoned")
            .push((source.to_path_buf(), key.to_string()));
        Ok(())
    }

    async fn create_directory(&self, key: &str) -> SyncResult<()> {
        self.directories.lock().expect("lock poisoned").push(key.to_string());
        Ok(())
    }

    async fn delete_batch(&self, keys: &[String]) -> SyncResult<()> {
        self.deletes.lock().expect("lock poisoned").push(keys.to_vec());
        Ok(())
    }

    async fn delete_directory(&self, key: &str) -> SyncResult<()> {
        self.deleted_directories
            .lock()
            .expect("lock poisoned")
            .push(key.to_string());
        Ok(())
    }
}

/// Mirrors keys as files below a local directory.
///
/// Directories emptied by a delete are removed, so a later upload can
/// replace them with a file of the same name.
#[derive(Clone, Debug)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> SyncResult<PathBuf> {
        let relative = Path::new(key.trim_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(SyncError::Backend(format!("refusing key outside root: {key}")));
        }
        Ok(self.root.join(relative))
    }

    /// Remove empty directories from `dir` upwards, stopping at the root.
    async fn prune(&self, mut dir: &Path) {
        while dir != self.root && dir.starts_with(&self.root) {
            if tokio::fs::remove_dir(dir).await.is_err() {
                break;
            }
            debug!(dir = %dir.display(), "removed empty directory");
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }
}

#[async_trait]
impl ObjectBackend for DirectoryBackend {
    async fn upload(&self, source: &Path, key: &str) -> SyncResult<()> {
        let target = self.resolve(key)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::io(parent, e))?;
        }
        tokio::fs::metadata(source)
            .await
            .map_err(|e| SyncError::io(source, e))?;
        tokio::fs::copy(source, &target)
            .await
            .map_err(|e| SyncError::io(&target, e))?;
        Ok(())
    }

    async fn create_directory(&self, key: &str) -> SyncResult<()> {
        let target = self.resolve(key)?;
        tokio::fs::create_dir_all(&target)
            .await
            .map_err(|e| SyncError::io(&target, e))
    }

    async fn delete_batch(&self, keys: &[String]) -> SyncResult<()> {
        for key in keys {
            let target = self.resolve(key)?;
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(SyncError::io(&target, e)),
            }
            if let Some(parent) = target.parent() {
                self.prune(parent).await;
            }
        }
        Ok(())
    }

    async fn delete_directory(&self, key: &str) -> SyncResult<()> {
        let target = self.resolve(key)?;
        if target == self.root {
            return Err(SyncError::Backend(format!("refusing to remove the root: {key}")));
        }
        match tokio::fs::remove_dir_all(&target).await {
            Ok(()) => debug!(dir = %target.display(), "removed directory"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(SyncError::io(&target, e)),
        }
        if let Some(parent) = target.parent() {
            self.prune(parent).await;
        }
        Ok(())
    }
}
