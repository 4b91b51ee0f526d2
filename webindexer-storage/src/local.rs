//! Local filesystem backend.
//!
//! Lists one directory level with `tokio::fs::read_dir` and writes pages as
//! plain files below the root.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::entry::{Entry, Listing};
use crate::error::Result;
use crate::traits::{Backend, BackendOptions};
use crate::uri::join_key;

/// Local filesystem backend rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
    options: BackendOptions,
}

impl LocalBackend {
    /// Create a new local backend.
    ///
    /// The root does not need to exist until the first read or write.
    pub fn new(root: impl Into<PathBuf>, options: BackendOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    /// Convert a root-relative path to a filesystem path.
    fn to_fs_path(&self, path: &str) -> PathBuf {
        let relative = join_key([path]);
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    /// Ensure parent directories exist for a path.
    async fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for LocalBackend {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn read(&self, path: &str) -> Result<Listing> {
        let dir = self.to_fs_path(path);
        debug!("Listing {:?}", dir);

        let mut raw = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            // A lossy name would not resolve back to the entry on disk.
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(entry = ?raw, "Skipping entry with non-UTF-8 name");
                    continue;
                }
            };

            // Follow symlinks so linked directories are listed as directories.
            let metadata = match fs::metadata(entry.path()).await {
                Ok(m) => m,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(entry = %name, "Skipping dangling symlink");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

            if metadata.is_dir() {
                raw.push(Entry::dir(name, modified));
            } else {
                raw.push(Entry::file(name, metadata.len(), modified));
            }
        }

        let listing = self.options.filter.apply(raw);
        debug!(
            items = listing.items.len(),
            no_index = listing.has_no_index,
            "Listed {:?}",
            dir
        );
        Ok(listing)
    }

    #[instrument(skip(self, content), fields(path = %relative_path, size = content.len()))]
    async fn write(&self, relative_path: &str, content: Bytes) -> Result<()> {
        let fs_path = self.to_fs_path(&join_key([relative_path, self.options.index_file.as_str()]));
        self.ensure_parent(&fs_path).await?;

        debug!("Writing {} bytes to {:?}", content.len(), fs_path);
        fs::write(&fs_path, &content).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
