//! Relative path rendering shared by every traversal.
//!
//! Paths are plain `/`-joined strings. Empty segments are dropped so that the
//! nameless root and an empty base never introduce a leading separator.

/// Segment separator for rendered paths.
pub const SEPARATOR: char = '/';

/// Suffix marking a rendered directory path.
pub const DIRECTORY_SUFFIX: &str = "/";

/// Final segment of a wildcard invalidation prefix.
pub const WILDCARD: &str = "*";

/// Join `name` onto `base`, skipping whichever side is empty.
pub fn join_path(base: &str, name: &str) -> String {
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => base.to_string(),
        (false, false) if base.ends_with(SEPARATOR) => format!("{base}{name}"),
        (false, false) => format!("{base}{SEPARATOR}{name}"),
    }
}
