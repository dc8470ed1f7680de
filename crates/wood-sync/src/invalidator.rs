//! Purging the changes of a comparison from a cache.

use async_trait::async_trait;
use tracing::{debug, info};
use wood_diff::{Comparison, DeletedOptions};

use crate::chunk::chunks;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::purge::{PurgeClient, PurgeError, PurgeReceipt};
use crate::retry::RetryPolicy;

/// Something that can evict the changes of a comparison from a cache.
#[async_trait]
pub trait Invalidator: Send + Sync {
    /// Returns the number of purge requests issued.
    async fn invalidate(&self, comparison: &Comparison<'_>) -> SyncResult<usize>;
}

/// Send every batch through `client`, retrying per `retry`.
async fn purge_batches<C, I>(
    client: &C,
    retry: &RetryPolicy,
    paths: I,
    batch_size: usize,
) -> SyncResult<usize>
where
    C: PurgeClient,
    I: Iterator<Item = String> + Send,
{
    let mut requests = 0;
    for batch in chunks(paths, batch_size)? {
        info!(count = batch.len(), "invalidating paths");
        debug!(paths = ?batch, "purge batch");
        let receipt: PurgeReceipt = retry
            .run(|| client.purge(&batch), PurgeError::is_retryable)
            .await?;
        info!(id = %receipt.id, "created invalidation");
        requests += 1;
    }
    Ok(requests)
}

/// Purges aggregated prefixes (`/dir/*` wildcards and bare paths).
///
/// For providers that bill or rate-limit per path and understand trailing
/// wildcards.
pub struct PrefixInvalidator<C> {
    client: C,
    retry: RetryPolicy,
    max_paths_per_request: usize,
}

impl<C: PurgeClient> PrefixInvalidator<C> {
    pub fn new(client: C, config: &SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            client,
            retry: config.retry.policy(),
            max_paths_per_request: config.max_paths_per_request,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: PurgeClient> Invalidator for PrefixInvalidator<C> {
    async fn invalidate(&self, comparison: &Comparison<'_>) -> SyncResult<usize> {
        let prefixes = comparison.invalidations().map(|prefix| format!("/{prefix}"));
        purge_batches(&self.client, &self.retry, prefixes, self.max_paths_per_request).await
    }
}

/// Purges individual URLs: every deleted path, then every modified file,
/// joined to a URL prefix.
///
/// For providers without wildcard support.
pub struct PathInvalidator<C> {
    client: C,
    retry: RetryPolicy,
    url_prefix: String,
    max_paths_per_request: usize,
}

impl<C: PurgeClient> PathInvalidator<C> {
    pub fn new(client: C, config: &SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            client,
            retry: config.retry.policy(),
            url_prefix: config.url_prefix.clone(),
            max_paths_per_request: config.max_paths_per_request,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: PurgeClient> Invalidator for PathInvalidator<C> {
    async fn invalidate(&self, comparison: &Comparison<'_>) -> SyncResult<usize> {
        let urls = comparison
            .deleted("", DeletedOptions::default())
            .chain(comparison.modified(""))
            .map(|path| format!("{}{path}", self.url_prefix));
        purge_batches(&self.client, &self.retry, urls, self.max_paths_per_request).await
    }
}
