//! Static directory index generation.
//!
//! Walks a local directory or an S3 prefix and writes an HTML listing page
//! into every directory it visits, either next to the files or into a
//! separate target location.
//!
//! ```no_run
//! use webindexer::{Config, Indexer};
//!
//! # async fn example() -> webindexer::Result<()> {
//! let config = Config {
//!     source: "s3://my-bucket/releases".to_string(),
//!     target: "s3://my-bucket/releases".to_string(),
//!     recursive: true,
//!     ..Default::default()
//! };
//!
//! let summary = Indexer::from_config(config)?.run().await?;
//! println!("{} pages written", summary.pages_written);
//! # Ok(())
//! # }
//! ```
//!
//! A directory holding a no-index marker (`.noindex` by default) gets no page
//! and is not descended into.

pub mod config;
pub mod context;
pub mod error;
pub mod indexer;
pub mod render;
pub mod sort;

pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use context::IndexData;
pub use error::{Error, Result};
pub use indexer::{IndexSummary, Indexer};
pub use render::{format_size, HtmlRenderer, Renderer, Theme};
pub use sort::{natural_cmp, Order, SortBy, SortPolicy};

pub use webindexer_storage as storage;
