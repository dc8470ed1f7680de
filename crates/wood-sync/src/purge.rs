//! CDN purge clients.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single purge request.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PurgeError {
    /// The request was malformed or unauthorised; repeating it cannot help.
    #[error("client error {status}: {message}")]
    Client { status: u16, message: String },

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    /// The request was accepted but the provider reported it did not succeed.
    #[error("purge rejected: {0}")]
    Rejected(String),
}

impl PurgeError {
    /// Server and transport failures are worth repeating.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Transport(_))
    }

    /// Classify an HTTP status: 4xx is a client error, anything else a
    /// server error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            Self::Client { status, message }
        } else {
            Self::Server { status, message }
        }
    }
}

/// Acknowledgement of an accepted purge request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReceipt {
    /// Provider-assigned identifier of the invalidation.
    pub id: String,
    /// Number of paths the request carried.
    pub paths: usize,
}

/// A provider endpoint that evicts paths from a cache.
#[async_trait]
pub trait PurgeClient: Send + Sync {
    /// Purge one batch of paths in a single request.
    async fn purge(&self, paths: &[String]) -> Result<PurgeReceipt, PurgeError>;
}

#[async_trait]
impl<C: PurgeClient + ?Sized> PurgeClient for &C {
    async fn purge(&self, paths: &[String]) -> Result<PurgeReceipt, PurgeError> {
        (**self).purge(paths).await
    }
}

/// Records every accepted batch. Failures can be queued with
/// [`fail_next`](Self::fail_next); each request consumes one queued failure
/// before any succeed.
#[derive(Debug, Default)]
pub struct InMemoryPurgeClient {
    batches: Mutex<Vec<Vec<String>>>,
    failures: Mutex<VecDeque<PurgeError>>,
    attempts: Mutex<usize>,
}

impl InMemoryPurgeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next request fail with `error`.
    pub fn fail_next(&self, error: PurgeError) {
        self.failures.lock().expect("lock poisoned").push_back(error);
    }

    /// Every batch accepted so far, in request order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().expect("lock poisoned").clone()
    }

    /// All accepted paths, flattened.
    pub fn paths(&self) -> Vec<String> {
        self.batches().into_iter().flatten().collect()
    }

    /// Requests made, failed ones included.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().expect("lock poisoned")
    }
}

#[async_trait]
impl PurgeClient for InMemoryPurgeClient {
    async fn purge(&self, paths: &[String]) -> Result<PurgeReceipt, PurgeError> {
        let attempt = {
            let mut attempts = self.attempts.lock().expect("lock poisoned");
            *attempts += 1;
            *attempts
        };
        if let Some(error) = self.failures.lock().expect("lock poisoned").pop_front() {
            return Err(error);
        }
        self.batches
            .lock()
            .expect("lock poisoned")
            .push(paths.to_vec());
        Ok(PurgeReceipt {
            id: format!("purge-{attempt}"),
            paths: paths.len(),
        })
    }
}
