//! Storage backends for webindexer.
//!
//! This crate provides the [`Backend`] trait that the indexer uses to list a
//! directory and to write the generated page back. The same contract is
//! implemented for the local filesystem and for S3-compatible object storage,
//! so the traversal never branches on storage kind.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Indexer                                 │
//! │        │ read(path)      ▲ Listing       │
//! │        ▼                 │               │
//! │  ┌────────────────────────────┐          │
//! │  │          Backend           │ ← trait  │
//! │  └─────────────┬──────────────┘          │
//! │        ┌───────┴────────┐                │
//! │        ▼                ▼                │
//! │  ┌──────────┐   ┌────────────────┐       │
//! │  │  Local   │   │ ObjectStorage  │       │
//! │  └──────────┘   └───────┬────────┘       │
//! │                         ▼                │
//! │                  ObjectClient (S3)       │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Both implementations run their raw entries through the same
//! [`ListingFilter`], which handles no-index and skip-index markers.
//!
//! # Quick Start
//!
//! ```no_run
//! use webindexer_storage::{open_backend, BackendOptions, Location};
//! use bytes::Bytes;
//!
//! # async fn example() -> webindexer_storage::Result<()> {
//! let source = open_backend(&Location::parse("./public")?, BackendOptions::default())?;
//!
//! let listing = source.read("").await?;
//! for entry in &listing.items {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//! }
//!
//! source.write("", Bytes::from("<html></html>")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `s3` (default) - Enable the S3/object storage backend (requires `object_store`)

mod entry;
mod error;
mod filter;
mod local;
mod traits;
pub mod uri;

#[cfg(feature = "s3")]
mod s3;

use std::sync::Arc;

pub use entry::{Entry, Listing, SEPARATOR};
pub use error::{Result, StorageError};
pub use filter::ListingFilter;
pub use local::LocalBackend;
pub use traits::{Backend, BackendOptions, DEFAULT_INDEX_FILE, HTML_CONTENT_TYPE};
pub use uri::{is_object_storage_uri, uri_to_bucket_and_prefix, Location};

#[cfg(feature = "s3")]
pub use s3::{ListPage, ObjectClient, ObjectStorageBackend, ObjectStoreClient, ObjectSummary, S3Config};

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Create the backend for a location.
pub fn open_backend(location: &Location, options: BackendOptions) -> Result<Arc<dyn Backend>> {
    match location {
        Location::Local(path) => Ok(Arc::new(LocalBackend::new(path, options))),
        #[cfg(feature = "s3")]
        Location::Object { bucket, prefix } => {
            let mut config = S3Config::aws(bucket.as_str());
            if let Some(endpoint) = &options.s3_endpoint {
                config = config.with_endpoint(endpoint.as_str());
            }
            let prefix = prefix.clone();
            Ok(Arc::new(ObjectStorageBackend::from_config(
                config, prefix, options,
            )?))
        }
        #[cfg(not(feature = "s3"))]
        Location::Object { .. } => Err(StorageError::Config(
            "S3 storage requires 's3' feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_local_backend() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"x").unwrap();

        let location = Location::Local(temp.path().to_path_buf());
        let backend = open_backend(&location, BackendOptions::default()).unwrap();
        assert_eq!(backend.backend_name(), "local");

        let listing = backend.read("").await.unwrap();
        assert_eq!(listing.items.len(), 1);
    }

    #[cfg(feature = "s3")]
    #[test]
    fn test_open_object_backend() {
        let location = Location::parse("s3://test-bucket/site").unwrap();
        let options = BackendOptions {
            s3_endpoint: Some("http://localhost:9000".to_string()),
            ..Default::default()
        };
        let backend = open_backend(&location, options).unwrap();
        assert_eq!(backend.backend_name(), "s3");
    }
}
