use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::retry::RetryPolicy;

/// Largest number of keys a single bulk-delete request may carry.
pub const MAX_DELETES_PER_REQUEST: usize = 1_000;

/// Largest number of URLs a single purge request may carry.
pub const MAX_PATHS_PER_REQUEST: usize = 30;

/// Settings for syncing a snapshot to a store and purging a cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Prepended verbatim to every remote key, e.g. `site/`.
    pub key_prefix: String,
    /// Batch size for bulk deletes.
    pub max_deletes_per_request: usize,
    /// Batch size for purge requests.
    pub max_paths_per_request: usize,
    /// Full URL prefix that relative paths are joined to when purging
    /// individual URLs, e.g. `https://example.com/`.
    pub url_prefix: String,
    /// Backoff applied to retryable purge failures.
    pub retry: RetryConfig,
    /// Gitignore-style patterns left out of local scans.
    pub exclude: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            max_deletes_per_request: MAX_DELETES_PER_REQUEST,
            max_paths_per_request: MAX_PATHS_PER_REQUEST,
            url_prefix: String::new(),
            retry: RetryConfig::default(),
            exclude: Vec::new(),
        }
    }
}

/// Retry settings in TOML-friendly units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_tries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_tries: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_tries,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

impl SyncConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> SyncResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let data = fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
        Self::from_toml_str(&data)
    }

    /// Reject settings no request could be built from.
    pub fn validate(&self) -> SyncResult<()> {
        if self.max_deletes_per_request == 0 {
            return Err(SyncError::InvalidConfig(
                "max_deletes_per_request must be at least 1".into(),
            ));
        }
        if self.max_deletes_per_request > MAX_DELETES_PER_REQUEST {
            return Err(SyncError::InvalidConfig(format!(
                "max_deletes_per_request may not exceed {MAX_DELETES_PER_REQUEST}"
            )));
        }
        if self.max_paths_per_request == 0 {
            return Err(SyncError::InvalidConfig(
                "max_paths_per_request must be at least 1".into(),
            ));
        }
        if self.retry.max_tries == 0 {
            return Err(SyncError::InvalidConfig("retry.max_tries must be at least 1".into()));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(SyncError::InvalidConfig(
                "retry.base_delay_ms may not exceed retry.max_delay_ms".into(),
            ));
        }
        if !self.url_prefix.is_empty() && !self.url_prefix.ends_with('/') {
            return Err(SyncError::InvalidConfig("url_prefix must end with '/'".into()));
        }
        Ok(())
    }
}
