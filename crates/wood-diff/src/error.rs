//! Error types for the diff crate.

/// Errors that can occur while building a comparison.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    /// Both sides of a comparison were absent.
    #[error("invalid comparison: the left and right side cannot both be absent")]
    InvalidComparison,
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
