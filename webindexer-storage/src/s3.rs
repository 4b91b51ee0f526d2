//! S3-compatible object storage backend.
//!
//! Object storage has no directories. Each `read` issues a delimited listing
//! for exactly one prefix, so the service itself splits keys into objects
//! directly under the prefix and common prefixes (the subdirectories). The
//! indexer then recurses one prefix at a time, which keeps no-index
//! suppression per directory.
//!
//! The storage client is behind the [`ObjectClient`] trait. The production
//! client, [`ObjectStoreClient`], uses the `object_store` crate for S3,
//! MinIO, and other S3-compatible services.
//!
//! # Configuration
//!
//! ```toml
//! source = "s3://my-bucket/releases"
//! target = "s3://my-bucket/releases"
//!
//! # Optional: For MinIO or other S3-compatible services
//! s3_endpoint = "http://localhost:9000"
//! ```
//!
//! Credentials and region come from the usual `AWS_*` environment variables.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::entry::{Entry, Listing, SEPARATOR};
use crate::error::{Result, StorageError};
use crate::traits::{Backend, BackendOptions, HTML_CONTENT_TYPE};
use crate::uri::join_key;

/// One object returned by a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a delimited listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects directly under the listed prefix
    pub objects: Vec<ObjectSummary>,
    /// Common prefixes, each ending with the delimiter
    pub common_prefixes: Vec<String>,
    /// Token for the next page, `None` on the last page
    pub next_continuation: Option<String>,
}

/// Minimal storage client surface the object-storage backend depends on.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Fetch one page of a delimited listing.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: char,
        continuation: Option<&str>,
    ) -> Result<ListPage>;

    /// Store a single object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<()>;
}

/// Configuration for S3 storage.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region, falls back to `AWS_REGION` / `AWS_DEFAULT_REGION`
    pub region: Option<String>,
    /// Optional custom endpoint (for MinIO, etc.)
    pub endpoint: Option<String>,
    /// Use path-style requests (required for MinIO)
    pub force_path_style: bool,
    /// Allow HTTP (non-HTTPS) connections
    pub allow_http: bool,
}

impl S3Config {
    /// Create a new S3 configuration for AWS.
    pub fn aws(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: None,
            endpoint: None,
            force_path_style: false,
            allow_http: false,
        }
    }

    /// Point the client at an S3-compatible endpoint.
    ///
    /// Path-style requests are enabled, and plain HTTP is allowed when the
    /// endpoint uses it.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.allow_http = endpoint.starts_with("http://");
        self.force_path_style = true;
        self.endpoint = Some(endpoint);
        self
    }

    /// Set an explicit region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// [`ObjectClient`] backed by an `object_store` instance bound to one bucket.
#[derive(Clone)]
pub struct ObjectStoreClient {
    bucket: String,
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreClient {
    /// Build an S3 client from configuration and the environment.
    pub fn new(config: &S3Config) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_allow_http(config.allow_http);

        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        if config.force_path_style {
            builder = builder.with_virtual_hosted_style_request(false);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            bucket: config.bucket.clone(),
            store: Arc::new(store),
        })
    }

    /// Create from an existing ObjectStore instance.
    pub fn from_store(bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: bucket.into(),
            store,
        }
    }

    fn check_bucket(&self, bucket: &str) -> Result<()> {
        if bucket == self.bucket {
            Ok(())
        } else {
            Err(StorageError::Config(format!(
                "client for bucket '{}' cannot access bucket '{}'",
                self.bucket, bucket
            )))
        }
    }
}

impl std::fmt::Debug for ObjectStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreClient")
            .field("bucket", &self.bucket)
            .finish()
    }
}

#[async_trait]
impl ObjectClient for ObjectStoreClient {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: char,
        _continuation: Option<&str>,
    ) -> Result<ListPage> {
        self.check_bucket(bucket)?;
        if delimiter != SEPARATOR {
            return Err(StorageError::Backend(format!(
                "unsupported listing delimiter '{}'",
                delimiter
            )));
        }

        let prefix_path = if prefix.is_empty() {
            None
        } else {
            Some(object_path(prefix)?)
        };

        // object_store follows continuation tokens itself, so the whole
        // listing arrives as a single page.
        let result = self
            .store
            .list_with_delimiter(prefix_path.as_ref())
            .await
            .map_err(StorageError::from)?;

        Ok(ListPage {
            objects: result
                .objects
                .into_iter()
                .map(|meta| ObjectSummary {
                    key: meta.location.to_string(),
                    size: meta.size as u64,
                    last_modified: Some(meta.last_modified),
                })
                .collect(),
            common_prefixes: result
                .common_prefixes
                .into_iter()
                .map(|p| format!("{}{}", p, SEPARATOR))
                .collect(),
            next_continuation: None,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<()> {
        self.check_bucket(bucket)?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&object_path(key)?, PutPayload::from(body), options)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

/// Parse a key verbatim.
///
/// `Path::from` percent-encodes characters such as `~` or `#` that are legal
/// in S3 keys, which would address a different object than the one listed.
fn object_path(key: &str) -> Result<ObjectPath> {
    ObjectPath::parse(key).map_err(|e| StorageError::InvalidPath(format!("{}: {}", key, e)))
}

/// Object-storage backend rooted at `bucket/prefix`.
#[derive(Clone)]
pub struct ObjectStorageBackend {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    prefix: String,
    options: BackendOptions,
}

impl ObjectStorageBackend {
    /// Create a backend over an existing client.
    pub fn new(
        client: Arc<dyn ObjectClient>,
        bucket: impl Into<String>,
        prefix: impl AsRef<str>,
        options: BackendOptions,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: join_key([prefix.as_ref()]),
            options,
        }
    }

    /// Create a backend talking to S3 through `object_store`.
    pub fn from_config(
        config: S3Config,
        prefix: impl AsRef<str>,
        options: BackendOptions,
    ) -> Result<Self> {
        let client = ObjectStoreClient::new(&config)?;
        Ok(Self::new(Arc::new(client), config.bucket, prefix, options))
    }

    /// Bucket this backend reads from and writes to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key prefix of the backend root, without separators at either end.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Listing prefix for a root-relative path.
    ///
    /// Empty for the bucket root, otherwise ends with the separator.
    fn list_prefix(&self, path: &str) -> String {
        let joined = join_key([self.prefix.as_str(), path]);
        if joined.is_empty() {
            joined
        } else {
            format!("{}{}", joined, SEPARATOR)
        }
    }

    /// Key of the page written for a root-relative directory.
    fn page_key(&self, relative_path: &str) -> String {
        join_key([
            self.prefix.as_str(),
            relative_path,
            self.options.index_file.as_str(),
        ])
    }

    /// Collect every page of a delimited listing.
    async fn list_all(&self, prefix: &str) -> Result<ListPage> {
        let mut all = ListPage::default();
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .client
                .list_page(&self.bucket, prefix, SEPARATOR, continuation.as_deref())
                .await?;
            pages += 1;

            all.objects.extend(page.objects);
            all.common_prefixes.extend(page.common_prefixes);

            match page.next_continuation {
                Some(token) if !token.is_empty() => continuation = Some(token),
                _ => break,
            }
        }

        debug!(pages, "Listed s3://{}/{}", self.bucket, prefix);
        Ok(all)
    }
}

impl std::fmt::Debug for ObjectStorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorageBackend")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Last non-empty segment of a key or prefix.
fn trailing_segment(key: &str) -> Option<&str> {
    key.trim_end_matches(SEPARATOR)
        .rsplit(SEPARATOR)
        .next()
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl Backend for ObjectStorageBackend {
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn read(&self, path: &str) -> Result<Listing> {
        let prefix = self.list_prefix(path);
        let page = self.list_all(&prefix).await?;

        let mut raw = Vec::with_capacity(page.objects.len() + page.common_prefixes.len());

        for object in page.objects {
            // Zero-byte "folder" placeholders end with the separator.
            if object.key.ends_with(SEPARATOR) {
                continue;
            }
            if let Some(name) = trailing_segment(&object.key) {
                raw.push(Entry::file(name, object.size, object.last_modified));
            }
        }

        for common in page.common_prefixes {
            if common == prefix {
                continue;
            }
            if let Some(name) = trailing_segment(&common) {
                raw.push(Entry::dir(name, None));
            }
        }

        let listing = self.options.filter.apply(raw);
        debug!(
            items = listing.items.len(),
            no_index = listing.has_no_index,
            "Read s3://{}/{}",
            self.bucket,
            prefix
        );
        Ok(listing)
    }

    #[instrument(skip(self, content), fields(bucket = %self.bucket, size = content.len()))]
    async fn write(&self, relative_path: &str, content: Bytes) -> Result<()> {
        let key = self.page_key(relative_path);
        debug!("Writing {} bytes to s3://{}/{}", content.len(), self.bucket, key);

        self.client
            .put_object(&self.bucket, &key, content, HTML_CONTENT_TYPE)
            .await
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
