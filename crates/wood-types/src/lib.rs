//! Snapshot entity model for wood.
//!
//! A snapshot is an immutable tree of [`Entity`] values: files carrying an
//! opaque content [`Fingerprint`], and directories mapping child names to
//! child entities. The nameless root directory sits at the top of every
//! hierarchy so rendered paths never start with a spurious segment.
//!
//! # Key Types
//!
//! - [`Entity`] -- A file or a directory
//! - [`File`] -- Name, size and content fingerprint
//! - [`Directory`] -- Name and sorted child mapping (the root has an empty name)
//! - [`Fingerprint`] -- Opaque content-equality token
//! - [`Hierarchy`] -- Indented tree rendering of an entity

pub mod entity;
pub mod error;
pub mod fingerprint;
pub mod path;

pub use entity::{Directory, Entity, File, Hierarchy};
pub use error::TypeError;
pub use fingerprint::Fingerprint;
pub use path::{join_path, DIRECTORY_SUFFIX, SEPARATOR, WILDCARD};
