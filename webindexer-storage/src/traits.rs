//! Core backend trait definitions.
//!
//! The `Backend` trait is the single capability set shared by the local
//! filesystem and object-storage implementations. The indexer only ever
//! talks to this trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::entry::Listing;
use crate::error::Result;
use crate::filter::ListingFilter;

/// Default name of the generated page.
pub const DEFAULT_INDEX_FILE: &str = "index.html";

/// Content type used for every page written to object storage.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Settings shared by every backend of a run.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// File name written into each indexed directory
    pub index_file: String,
    /// Suppression and skip rules applied on read
    pub filter: ListingFilter,
    /// Custom endpoint for S3-compatible services
    pub s3_endpoint: Option<String>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            index_file: DEFAULT_INDEX_FILE.to_string(),
            filter: ListingFilter::new().with_index_file(DEFAULT_INDEX_FILE),
            s3_endpoint: None,
        }
    }
}

/// Storage backend able to list one directory level and write one page.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; sibling directories are read and
/// written concurrently.
///
/// # Error Handling
///
/// Errors from the underlying filesystem or storage client are returned
/// unchanged. Nothing is retried at this layer.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List the immediate children of `path`.
    ///
    /// `path` is relative to the backend root; `""` (or `"/"`) is the root.
    /// Subdirectories are returned as entries but never descended into.
    /// When a no-index marker is present the listing is empty and flagged.
    async fn read(&self, path: &str) -> Result<Listing>;

    /// Persist a rendered page at `<root>/<relative_path>/<index_file>`.
    ///
    /// Overwrites an existing page.
    async fn write(&self, relative_path: &str, content: Bytes) -> Result<()>;

    /// Get a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;
}
