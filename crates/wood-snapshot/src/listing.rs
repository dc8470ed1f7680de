//! Snapshots reconstructed from flat object-store listings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wood_types::{Directory, Entity, File, Fingerprint, SEPARATOR};

/// One object of a bucket listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Full object key, e.g. `css/styles.css`.
    pub key: String,
    pub size: u64,
    /// Entity tag as reported by the store, quotes included or not.
    pub etag: String,
}

impl ObjectSummary {
    pub fn new(key: impl Into<String>, size: u64, etag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size,
            etag: etag.into(),
        }
    }

    /// Returns `true` for zero-byte directory marker keys such as `img/`.
    pub fn is_directory_marker(&self) -> bool {
        self.key.ends_with(SEPARATOR)
    }
}

/// Intermediate tree node. A node that was ever used as a key prefix or
/// marked with a trailing separator is a directory, whatever else was
/// recorded for it.
#[derive(Default)]
struct Node {
    directory: bool,
    file: Option<File>,
    children: BTreeMap<String, Node>,
}

impl Node {
    fn into_entity(self, name: String) -> Entity {
        match (self.directory, self.file) {
            (false, Some(file)) => Entity::File(file),
            _ => Entity::Directory(Directory::new(
                name,
                self.children
                    .into_iter()
                    .map(|(name, child)| child.into_entity(name)),
            )),
        }
    }

    /// Step into the child directory `name`, creating it if needed.
    fn descend(&mut self, name: &str) -> &mut Node {
        let child = self.children.entry(name.to_string()).or_default();
        child.directory = true;
        child
    }
}

/// Build a root snapshot from a flat listing of object keys.
///
/// Keys are split on `/` with empty segments ignored. Keys ending in `/`
/// only create directories. When a name is both a file and a prefix of other
/// keys, the directory wins. The ETag, stripped of surrounding quotes, becomes
/// the file's fingerprint.
pub fn from_listing<I>(objects: I) -> Entity
where
    I: IntoIterator<Item = ObjectSummary>,
{
    let mut root = Node {
        directory: true,
        ..Node::default()
    };
    let mut count = 0usize;
    for object in objects {
        insert(&mut root, &object);
        count += 1;
    }
    debug!(objects = count, "rebuilt snapshot from listing");
    root.into_entity(String::new())
}

fn insert(root: &mut Node, object: &ObjectSummary) {
    let segments: Vec<&str> = object
        .key
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = current.descend(segment);
    }

    if object.is_directory_marker() {
        current.descend(leaf);
    } else {
        let fingerprint = Fingerprint::new(object.etag.trim_matches('"'));
        let node = current.children.entry(leaf.to_string()).or_default();
        node.file = Some(File::new(*leaf, object.size, fingerprint));
    }
}
