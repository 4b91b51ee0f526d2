//! Storage-agnostic listing model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Path separator shared by local and object-storage listings.
pub const SEPARATOR: char = '/';

/// One file or directory found directly under a listed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Name relative to the parent; directories end with `/`
    pub name: String,
    /// True for directories and object-storage common prefixes
    pub is_dir: bool,
    /// Size in bytes, 0 for directories
    pub size: u64,
    /// Last modification time, absent for common prefixes
    pub last_modified: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>, size: u64, last_modified: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            size,
            last_modified,
        }
    }

    /// Create a directory entry. A trailing separator is appended if missing.
    pub fn dir(name: impl Into<String>, last_modified: Option<DateTime<Utc>>) -> Self {
        let mut name = name.into();
        if !name.ends_with(SEPARATOR) {
            name.push(SEPARATOR);
        }
        Self {
            name,
            is_dir: true,
            size: 0,
            last_modified,
        }
    }

    /// Name without the trailing directory separator.
    pub fn base_name(&self) -> &str {
        self.name.trim_end_matches(SEPARATOR)
    }
}

/// Result of reading one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Entries that survived filtering, in storage order
    pub items: Vec<Entry>,
    /// Set when the directory holds a no-index marker; `items` is then empty
    pub has_no_index: bool,
}

impl Listing {
    /// Listing of a directory suppressed by a no-index marker.
    pub fn suppressed() -> Self {
        Self {
            items: Vec::new(),
            has_no_index: true,
        }
    }

    /// Directory entries of this listing.
    pub fn dirs(&self) -> impl Iterator<Item = &Entry> {
        self.items.iter().filter(|e| e.is_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_gets_trailing_separator() {
        let dir = Entry::dir("photos", None);
        assert_eq!(dir.name, "photos/");
        assert!(dir.is_dir);
        assert_eq!(dir.size, 0);

        let already = Entry::dir("photos/", None);
        assert_eq!(already.name, "photos/");
        assert_eq!(already.base_name(), "photos");
    }

    #[test]
    fn test_listing_dirs() {
        let listing = Listing {
            items: vec![
                Entry::file("a.txt", 3, None),
                Entry::dir("b", None),
                Entry::dir("c", None),
            ],
            has_no_index: false,
        };
        let dirs: Vec<_> = listing.dirs().map(|e| e.name.as_str()).collect();
        assert_eq!(dirs, vec!["b/", "c/"]);
    }

    #[test]
    fn test_suppressed_is_empty() {
        let listing = Listing::suppressed();
        assert!(listing.has_no_index);
        assert!(listing.items.is_empty());
    }
}
