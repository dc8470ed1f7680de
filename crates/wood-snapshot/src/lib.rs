//! Snapshot builders for wood.
//!
//! Turns the places content lives into [`wood_types::Entity`] trees that the
//! comparison engine can reconcile.
//!
//! # Sources
//!
//! - [`Scanner`] -- Walks a local directory and fingerprints every file with BLAKE3
//! - [`from_listing`] -- Rebuilds a tree from a flat object-store key listing
//! - [`Manifest`] -- A snapshot persisted as JSON for later comparison

pub mod error;
pub mod listing;
pub mod manifest;
pub mod scanner;

pub use error::{SnapshotError, SnapshotResult};
pub use listing::{from_listing, ObjectSummary};
pub use manifest::{Manifest, MANIFEST_VERSION};
pub use scanner::{hash_file, Scanner};
