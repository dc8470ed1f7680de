//! Enacting a comparison against an object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wood_diff::{Comparison, DeletedOptions, NewOptions};
use wood_types::{join_path, DIRECTORY_SUFFIX};

use crate::backend::ObjectBackend;
use crate::chunk::chunks;
use crate::config::SyncConfig;
use crate::error::SyncResult;

/// What a sync did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub uploaded: usize,
    pub directories: usize,
    pub deleted: usize,
    pub directories_deleted: usize,
    pub delete_requests: usize,
}

/// Something that can make a destination match the right side of a
/// comparison whose left side describes the destination's current state.
#[async_trait]
pub trait Syncer: Send + Sync {
    async fn sync(&self, comparison: &Comparison<'_>) -> SyncResult<SyncReport>;
}

/// Syncs a local directory to a key-addressed store.
///
/// Deleted files go first, in bulk requests, followed by deleted directories.
/// New files follow, then modified ones. Intermediate directories are never
/// created explicitly; only empty directories produce a marker.
pub struct BucketSyncer<B> {
    backend: B,
    local_base: PathBuf,
    key_prefix: String,
    max_deletes_per_request: usize,
}

impl<B: ObjectBackend> BucketSyncer<B> {
    /// `local_base` is the directory the right-hand snapshot was taken from.
    pub fn new(backend: B, local_base: impl Into<PathBuf>, config: &SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            local_base: local_base.into(),
            key_prefix: config.key_prefix.clone(),
            max_deletes_per_request: config.max_deletes_per_request,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn key(&self, path: &str) -> String {
        format!("{}{path}", self.key_prefix)
    }

    fn source(&self, path: &str) -> PathBuf {
        self.local_base.join(Path::new(path))
    }

    async fn delete(&self, comparison: &Comparison<'_>, report: &mut SyncReport) -> SyncResult<()> {
        let keys = comparison
            .deleted("", DeletedOptions::files_only())
            .map(|path| self.key(&path));
        for batch in chunks(keys, self.max_deletes_per_request)? {
            info!(count = batch.len(), "deleting objects");
            debug!(keys = ?batch, "delete batch");
            self.backend.delete_batch(&batch).await?;
            report.deleted += batch.len();
            report.delete_requests += 1;
        }
        Ok(())
    }

    /// Remove the topmost deleted directories, including type swaps.
    async fn delete_directories(
        &self,
        comparison: &Comparison<'_>,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        let opts = DeletedOptions {
            include_children: false,
            include_directories: true,
        };
        for path in comparison
            .deleted("", opts)
            .filter(|path| path.ends_with(DIRECTORY_SUFFIX))
        {
            let key = self.key(&path);
            debug!(key = %key, "deleting directory");
            self.backend.delete_directory(&key).await?;
            report.directories_deleted += 1;
        }
        Ok(())
    }

    /// Recreate directories that lost all their contents but stay, empty,
    /// on the right side.
    async fn restore_emptied(
        &self,
        comparison: &Comparison<'_>,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        let mut paths = Vec::new();
        emptied_directories(comparison, "", &mut paths);
        self.upload_all(paths.into_iter(), report).await
    }

    async fn upload_all<I>(&self, paths: I, report: &mut SyncReport) -> SyncResult<()>
    where
        I: Iterator<Item = String> + Send,
    {
        for path in paths {
            let key = self.key(&path);
            if path.ends_with(DIRECTORY_SUFFIX) {
                debug!(key = %key, "creating directory");
                self.backend.create_directory(&key).await?;
                report.directories += 1;
            } else {
                let source = self.source(&path);
                info!(source = %source.display(), key = %key, "uploading");
                self.backend.upload(&source, &key).await?;
                report.uploaded += 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<B: ObjectBackend> Syncer for BucketSyncer<B> {
    async fn sync(&self, comparison: &Comparison<'_>) -> SyncResult<SyncReport> {
        let mut report = SyncReport::default();
        self.delete(comparison, &mut report).await?;
        self.delete_directories(comparison, &mut report).await?;
        self.restore_emptied(comparison, &mut report).await?;
        self.upload_all(comparison.new("", NewOptions::leaves_only()), &mut report)
            .await?;
        self.upload_all(comparison.modified(""), &mut report).await?;
        info!(
            uploaded = report.uploaded,
            deleted = report.deleted,
            directories = report.directories,
            directories_deleted = report.directories_deleted,
            "sync complete"
        );
        Ok(report)
    }
}

/// Marker paths of directories present on both sides that are empty on the
/// right but held entries on the left.
fn emptied_directories(node: &Comparison<'_>, base: &str, out: &mut Vec<String>) {
    let Comparison::Directory(c) = node else {
        return;
    };
    let (Some(left), Some(right)) = (c.left(), c.right()) else {
        return;
    };
    let us = join_path(base, &right.name);
    if right.is_empty() && !left.is_empty() && !right.is_root() {
        out.push(format!("{us}{DIRECTORY_SUFFIX}"));
    }
    for child in c.children().values() {
        emptied_directories(child, &us, out);
    }
}
