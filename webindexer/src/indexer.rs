//! Directory traversal.
//!
//! Reads a directory from the source backend, renders its page, writes the
//! page to the target backend and, in recursive mode, descends into every
//! subdirectory. Siblings are visited concurrently; a semaphore bounds the
//! number of storage calls in flight.

use async_recursion::async_recursion;
use futures::future::try_join_all;
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument};
use webindexer_storage::{open_backend, Backend, Bytes, Entry};

use crate::config::Config;
use crate::context::IndexData;
use crate::error::{Error, Result};
use crate::render::{HtmlRenderer, Renderer};
use crate::sort::SortPolicy;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub pages_written: usize,
    /// Directories skipped because they carry a no-index marker
    pub suppressed: usize,
}

impl AddAssign for IndexSummary {
    fn add_assign(&mut self, other: Self) {
        self.pages_written += other.pages_written;
        self.suppressed += other.suppressed;
    }
}

pub struct Indexer {
    config: Arc<Config>,
    source: Arc<dyn Backend>,
    target: Arc<dyn Backend>,
    renderer: Arc<dyn Renderer>,
    policy: SortPolicy,
    limiter: Semaphore,
}

impl Indexer {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn Backend>,
        target: Arc<dyn Backend>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let policy = config.sort_policy();
        let limiter = Semaphore::new(config.concurrency.max(1));
        Self {
            config,
            source,
            target,
            renderer,
            policy,
            limiter,
        }
    }

    /// Validate the configuration and open both backends and the HTML
    /// renderer it describes.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let options = config.backend_options()?;
        let source = open_backend(&config.source_location()?, options.clone())?;
        let target = open_backend(&config.target_location()?, options)?;
        let renderer = Arc::new(HtmlRenderer::from_config(&config)?);

        info!(
            source = %config.source,
            source_backend = source.backend_name(),
            target = %config.target,
            target_backend = target.backend_name(),
            recursive = config.recursive,
            "Indexer configured"
        );

        Ok(Self::new(Arc::new(config), source, target, renderer))
    }

    /// Index the source root and, in recursive mode, everything below it.
    pub async fn run(&self) -> Result<IndexSummary> {
        let summary = self.index_dir(String::new()).await?;
        info!(
            pages_written = summary.pages_written,
            suppressed = summary.suppressed,
            "Indexing complete"
        );
        Ok(summary)
    }

    /// Stop issuing storage calls.
    ///
    /// A run in progress fails with [`Error::Cancelled`] at its next read or
    /// write. Pages already written stay.
    pub fn cancel(&self) {
        if !self.limiter.is_closed() {
            info!("Cancelling indexing run");
            self.limiter.close();
        }
    }

    #[instrument(skip(self))]
    #[async_recursion]
    async fn index_dir(&self, path: String) -> Result<IndexSummary> {
        let listing = {
            let _permit = self.limiter.acquire().await.map_err(|_| Error::Cancelled)?;
            self.source.read(&path).await.map_err(|e| {
                error!(path = %path, error = %e, "Failed to list directory");
                e
            })?
        };

        let mut summary = IndexSummary::default();
        if listing.has_no_index {
            debug!(path = %path, "No-index marker found, skipping directory");
            summary.suppressed += 1;
            return Ok(summary);
        }

        let children: Vec<String> = if self.config.recursive {
            listing
                .dirs()
                .map(|d| format!("{}{}", path, d.name))
                .collect()
        } else {
            Vec::new()
        };

        self.write_page(&path, listing.items).await?;
        summary.pages_written += 1;

        let results = try_join_all(children.into_iter().map(|child| self.index_dir(child))).await?;
        for child in results {
            summary += child;
        }
        Ok(summary)
    }

    async fn write_page(&self, path: &str, mut items: Vec<Entry>) -> Result<()> {
        self.policy.sort(&mut items);
        let data = IndexData::new(&self.config, path, items);

        let html = self.renderer.render(&data).map_err(|e| {
            error!(path = %path, error = %e, "Failed to render page");
            e
        })?;

        let _permit = self.limiter.acquire().await.map_err(|_| Error::Cancelled)?;
        self.target
            .write(&data.relative_path, Bytes::from(html))
            .await
            .map_err(|e| {
                error!(path = %path, error = %e, "Failed to write page");
                e
            })?;

        info!(
            path = %data.relative_path,
            items = data.items.len(),
            "Wrote {}",
            self.config.index_file
        );
        Ok(())
    }
}
