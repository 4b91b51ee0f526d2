//! Source and target locations.
//!
//! A location string is either a local path or an object-storage URI of the
//! form `scheme://bucket/prefix`.
//!
//! # Examples
//!
//! ```
//! use webindexer_storage::Location;
//!
//! let location = Location::parse("s3://my-bucket/docs/v1/").unwrap();
//! assert_eq!(
//!     location,
//!     Location::Object {
//!         bucket: "my-bucket".to_string(),
//!         prefix: "docs/v1".to_string(),
//!     }
//! );
//! assert_eq!(location.to_string(), "s3://my-bucket/docs/v1");
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::entry::SEPARATOR;
use crate::error::{Result, StorageError};

/// URI schemes routed to the object-storage backend.
pub const OBJECT_SCHEMES: &[&str] = &["s3"];

const SCHEME_DELIMITER: &str = "://";

/// Parsed source or target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Directory on the local filesystem
    Local(PathBuf),
    /// Bucket and key prefix in object storage
    Object {
        /// Bucket name, never empty
        bucket: String,
        /// Key prefix without leading or trailing separators
        prefix: String,
    },
}

impl Location {
    /// Classify and parse a location string.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(StorageError::InvalidPath("empty location".to_string()));
        }
        if is_object_storage_uri(s) {
            let (bucket, prefix) = uri_to_bucket_and_prefix(s)?;
            Ok(Location::Object { bucket, prefix })
        } else {
            Ok(Location::Local(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Object { bucket, prefix } if prefix.is_empty() => {
                write!(f, "s3://{}", bucket)
            }
            Location::Object { bucket, prefix } => write!(f, "s3://{}/{}", bucket, prefix),
        }
    }
}

fn strip_scheme(s: &str) -> Option<&str> {
    OBJECT_SCHEMES
        .iter()
        .find_map(|scheme| s.strip_prefix(scheme)?.strip_prefix(SCHEME_DELIMITER))
}

/// Whether `s` starts with a recognised object-storage scheme and `://`.
pub fn is_object_storage_uri(s: &str) -> bool {
    strip_scheme(s).is_some()
}

/// Split an object-storage URI into bucket and prefix.
///
/// The prefix loses any leading or trailing separators; `s3://bucket` and
/// `s3://bucket/` both yield an empty prefix.
pub fn uri_to_bucket_and_prefix(uri: &str) -> Result<(String, String)> {
    let rest = strip_scheme(uri)
        .ok_or_else(|| StorageError::InvalidPath(format!("not an object storage URI: {}", uri)))?;

    let (bucket, prefix) = rest.split_once(SEPARATOR).unwrap_or((rest, ""));
    if bucket.is_empty() {
        return Err(StorageError::InvalidPath(format!("missing bucket in {}", uri)));
    }

    Ok((bucket.to_string(), prefix.trim_matches(SEPARATOR).to_string()))
}

/// Join path fragments with single separators.
///
/// Empty fragments and duplicate separators disappear, so `["a/", "/b//", "c"]`
/// becomes `a/b/c`. The result has no leading or trailing separator.
pub fn join_key<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .flat_map(|p| p.split(SEPARATOR))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
