use thiserror::Error;

/// Errors produced by entity and fingerprint operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("fingerprint must not be empty")]
    EmptyFingerprint,
}
