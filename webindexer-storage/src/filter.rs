//! Suppression and skip rules applied to every listing.
//!
//! Both backends hand their raw entries to [`ListingFilter::apply`], so
//! no-index and skip-index semantics are identical across storage kinds.

use glob::Pattern;

use crate::entry::{Entry, Listing};
use crate::error::{Result, StorageError};

/// Filter applied to the raw entries of one directory.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    no_index: Vec<String>,
    skip_index: Vec<String>,
    skips: Vec<Pattern>,
    index_file: Option<String>,
}

impl ListingFilter {
    /// Create a filter that lets everything through.
    pub fn new() -> Self {
        Self::default()
    }

    /// File names whose presence suppresses the whole directory.
    pub fn with_no_index<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_index = names.into_iter().map(Into::into).collect();
        self
    }

    /// File names dropped from their own listing.
    pub fn with_skip_index<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_index = names.into_iter().map(Into::into).collect();
        self
    }

    /// Glob patterns matched against entry names (without trailing `/`).
    pub fn with_skips<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skips = patterns
            .into_iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| {
                    StorageError::Config(format!("Invalid skip pattern '{}': {}", p.as_ref(), e))
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// Name of the generated index file, never listed.
    pub fn with_index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = Some(name.into());
        self
    }

    /// Whether `name` is a no-index marker.
    pub fn is_no_index(&self, name: &str) -> bool {
        self.no_index.iter().any(|m| m == name)
    }

    fn is_skipped(&self, entry: &Entry) -> bool {
        if !entry.is_dir {
            if self.skip_index.iter().any(|m| *m == entry.name) {
                return true;
            }
            if self.index_file.as_deref() == Some(entry.name.as_str()) {
                return true;
            }
        }
        let base = entry.base_name();
        self.skips.iter().any(|p| p.matches(base))
    }

    /// Turn raw entries into a listing.
    ///
    /// A no-index marker wins over everything else: the result is empty and
    /// flagged regardless of what else the directory holds.
    pub fn apply(&self, entries: Vec<Entry>) -> Listing {
        if entries
            .iter()
            .any(|e| !e.is_dir && self.is_no_index(&e.name))
        {
            return Listing::suppressed();
        }

        let items = entries
            .into_iter()
            .filter(|e| !self.is_skipped(e))
            .collect();

        Listing {
            items,
            has_no_index: false,
        }
    }
}
