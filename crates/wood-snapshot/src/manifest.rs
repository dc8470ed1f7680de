//! JSON manifests: snapshots persisted for later comparison.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use wood_types::Entity;

use crate::error::{SnapshotError, SnapshotResult};

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// A snapshot root tagged with the format version that wrote it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub root: Entity,
}

impl Manifest {
    /// Wrap `root` in a manifest of the current version.
    pub fn new(root: Entity) -> Self {
        Self {
            version: MANIFEST_VERSION,
            root,
        }
    }

    /// Pretty-printed JSON encoding.
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a manifest, rejecting versions this build cannot read.
    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        if manifest.version != MANIFEST_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: manifest.version,
                expected: MANIFEST_VERSION,
            });
        }
        Ok(manifest)
    }

    /// Write the manifest to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> SnapshotResult<()> {
        fs::write(path, self.to_json()?).map_err(|e| SnapshotError::io(path, e))?;
        info!(path = %path.display(), "saved manifest");
        Ok(())
    }

    /// Read a manifest from `path`.
    pub fn load(path: &Path) -> SnapshotResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SnapshotError::NotFound(path.to_path_buf()),
            _ => SnapshotError::io(path, e),
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        Manifest::new(Entity::root([
            Entity::file("index.html", 13, "aa"),
            Entity::directory("css", [Entity::file("s.css", 7, "bb")]),
        ]))
    }

    #[test]
    fn save_then_load_restores_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let manifest = sample();
        manifest.save(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), manifest);
    }

    #[test]
    fn json_is_tagged_by_kind() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], MANIFEST_VERSION);
        assert_eq!(value["root"]["kind"], "directory");
        assert_eq!(value["root"]["children"]["css"]["kind"], "directory");
    }

    #[test]
    fn future_version_is_rejected() {
        let json = r#"{"version": 99, "root": {"kind": "directory", "name": ""}}"#;
        let err = Manifest::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedVersion { found: 99, expected: MANIFEST_VERSION }
        ));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = Manifest::from_json("{not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Serialization(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound(_)));
    }
}
