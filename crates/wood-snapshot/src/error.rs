//! Error types for the snapshot crate.

use std::path::PathBuf;

/// Errors that can occur while building or persisting a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The path to scan does not exist.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A root scan was requested for something other than a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Reading a file or its metadata failed.
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory walk itself failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// An exclude pattern could not be compiled.
    #[error("invalid exclude pattern: {0}")]
    Pattern(String),

    /// A manifest could not be encoded or decoded.
    #[error("manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A manifest was written by an incompatible version.
    #[error("unsupported manifest version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl SnapshotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for snapshot results.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
