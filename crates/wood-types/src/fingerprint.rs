use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque content-equality token for a file.
///
/// Two files hold the same content iff their fingerprints are equal. The token
/// is never interpreted structurally: it may be a BLAKE3 digest computed by
/// the local scanner, or an ETag handed back by an object store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an existing token as-is.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Compute the BLAKE3 fingerprint of raw bytes.
    pub fn of(data: &[u8]) -> Self {
        Self::from_hash(*blake3::hash(data).as_bytes())
    }

    /// Create a fingerprint from a pre-computed 32-byte digest.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hex::encode(hash))
    }

    /// Parse a lowercase or uppercase hex digest, normalising to lowercase.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Err(TypeError::EmptyFingerprint);
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(hex::encode(bytes)))
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters).
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Fingerprint {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<blake3::Hash> for Fingerprint {
    fn from(hash: blake3::Hash) -> Self {
        Self::from_hash(*hash.as_bytes())
    }
}
