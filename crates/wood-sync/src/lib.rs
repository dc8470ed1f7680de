//! Sync and cache-invalidation drivers for wood.
//!
//! Takes a [`wood_diff::Comparison`] between what a destination currently
//! holds (left) and what it should hold (right) and enacts it: bulk deletes
//! and uploads against an [`ObjectBackend`], then purges against a CDN
//! through a [`PurgeClient`]. Every request is batched to provider limits and
//! purges are retried with exponential backoff on transient failures.
//!
//! # Key Types
//!
//! - [`Syncer`] / [`BucketSyncer`] -- Apply deletes and uploads to a store
//! - [`Invalidator`] / [`PrefixInvalidator`] / [`PathInvalidator`] -- Purge changed paths
//! - [`ObjectBackend`] -- Key-addressed store ([`InMemoryBackend`], [`DirectoryBackend`])
//! - [`PurgeClient`] -- Cache provider endpoint ([`InMemoryPurgeClient`])
//! - [`RetryPolicy`] -- Capped exponential backoff
//! - [`SyncConfig`] -- TOML-loadable settings

pub mod backend;
pub mod chunk;
pub mod config;
pub mod error;
pub mod invalidator;
pub mod purge;
pub mod retry;
pub mod syncer;

pub use backend::{DirectoryBackend, InMemoryBackend, ObjectBackend};
pub use chunk::{chunks, Chunks};
pub use config::{RetryConfig, SyncConfig, MAX_DELETES_PER_REQUEST, MAX_PATHS_PER_REQUEST};
pub use error::{SyncError, SyncResult};
pub use invalidator::{Invalidator, PathInvalidator, PrefixInvalidator};
pub use purge::{InMemoryPurgeClient, PurgeClient, PurgeError, PurgeReceipt};
pub use retry::RetryPolicy;
pub use syncer::{BucketSyncer, SyncReport, Syncer};
