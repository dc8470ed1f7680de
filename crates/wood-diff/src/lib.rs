//! Comparison engine for wood.
//!
//! Reconciles a "before" and an "after" snapshot into an immutable comparison
//! tree, then streams the paths that are new, modified or deleted, and the
//! aggregated cache-invalidation prefixes covering every change.
//!
//! # Key Types
//!
//! - [`Comparison`] -- Tagged union over the four entity pairings
//! - [`FileComparison`] / [`DirectoryComparison`] -- Same-kind pairings
//! - [`FileDirectoryComparison`] / [`DirectoryFileComparison`] -- Type swaps
//! - [`Traversal`] -- Lazy depth-first path stream
//! - [`NewOptions`] / [`DeletedOptions`] -- Granularity of emitted paths
//! - [`ChangeSet`] -- Owned summary of every stream

pub mod changeset;
pub mod comparison;
pub mod error;
pub mod invalidation;
pub mod traversal;

#[cfg(test)]
mod properties;

pub use changeset::ChangeSet;
pub use comparison::{
    Children, Comparison, ComparisonHierarchy, DirectoryComparison, DirectoryFileComparison,
    FileComparison, FileDirectoryComparison,
};
pub use error::{DiffError, DiffResult};
pub use traversal::{DeletedOptions, NewOptions, Traversal};
