//! Configuration for an indexing run.
//!
//! Default config location: `.webindexer.toml` in the working directory.
//!
//! ```toml
//! source = "s3://my-bucket/releases"
//! target = "s3://my-bucket/releases"
//! recursive = true
//! sort_by = "natural_name"
//! order = "desc"
//! noindex_files = [".noindex"]
//! skips = [".*"]
//! theme = "nord"
//! ```

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use webindexer_storage::{BackendOptions, ListingFilter, Location, DEFAULT_INDEX_FILE};

use crate::error::{Error, Result};
use crate::render::Theme;
use crate::sort::{Order, SortBy, SortPolicy};

/// File picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".webindexer.toml";

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory or `s3://bucket/prefix` to index
    #[serde(default)]
    pub source: String,
    /// Directory or `s3://bucket/prefix` receiving the pages
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default = "default_noindex_files", rename = "noindex_files")]
    pub no_index_files: Vec<String>,
    #[serde(default = "default_skipindex_files", rename = "skipindex_files")]
    pub skip_index_files: Vec<String>,
    /// Glob patterns of entries left out of every listing
    #[serde(default)]
    pub skips: Vec<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub order: Order,
    #[serde(default = "default_true")]
    pub dirs_first: bool,
    /// Handlebars template for the page title
    #[serde(default = "default_title")]
    pub title: String,
    /// Makes every link absolute when set
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Link directories to their index file instead of the directory itself
    #[serde(default)]
    pub link_to_index: bool,
    #[serde(default)]
    pub link_up_from_root: bool,
    #[serde(default = "default_link_up_text")]
    pub link_up_text: String,
    #[serde(default)]
    pub link_up_url: Option<String>,
    /// Custom Handlebars page template
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub s3_endpoint: Option<String>,
    /// Maximum number of storage calls in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub quiet: bool,
}

fn default_index_file() -> String {
    DEFAULT_INDEX_FILE.to_string()
}

fn default_noindex_files() -> Vec<String> {
    vec![".noindex".to_string()]
}

fn default_skipindex_files() -> Vec<String> {
    vec![".skipindex".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "Index of /{{relative_path}}".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S UTC".to_string()
}

fn default_link_up_text() -> String {
    "..".to_string()
}

fn default_concurrency() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: String::new(),
            target: String::new(),
            recursive: false,
            index_file: default_index_file(),
            no_index_files: default_noindex_files(),
            skip_index_files: default_skipindex_files(),
            skips: Vec::new(),
            sort_by: SortBy::default(),
            order: Order::default(),
            dirs_first: default_true(),
            title: default_title(),
            base_url: None,
            date_format: default_date_format(),
            link_to_index: false,
            link_up_from_root: false,
            link_up_text: default_link_up_text(),
            link_up_url: None,
            template: None,
            theme: Theme::default(),
            s3_endpoint: None,
            concurrency: default_concurrency(),
            log_level: default_log_level(),
            log_file: None,
            quiet: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `path` when given, otherwise `.webindexer.toml` in `dir` if it
    /// exists, otherwise defaults.
    pub fn load_from(dir: &Path, path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Check every field the run depends on. Call before any traversal.
    pub fn validate(&self) -> Result<()> {
        if self.source.is_empty() {
            return Err(Error::Config("source is required".to_string()));
        }
        if self.target.is_empty() {
            return Err(Error::Config("target is required".to_string()));
        }
        self.source_location()?;
        self.target_location()?;

        if self.index_file.is_empty() || self.index_file.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "index_file must be a plain file name (got '{}')",
                self.index_file
            )));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::Config(format!(
                "invalid date_format '{}'",
                self.date_format
            )));
        }
        handlebars::template::Template::compile(&self.title)
            .map_err(|e| Error::Config(format!("invalid title template: {}", e)))?;
        self.backend_options()?;
        Ok(())
    }

    pub fn source_location(&self) -> Result<Location> {
        Location::parse(&self.source).map_err(|e| Error::Config(format!("source: {}", e)))
    }

    pub fn target_location(&self) -> Result<Location> {
        Location::parse(&self.target).map_err(|e| Error::Config(format!("target: {}", e)))
    }

    pub fn sort_policy(&self) -> SortPolicy {
        SortPolicy::new(self.sort_by, self.order, self.dirs_first)
    }

    /// Options handed to both backends.
    pub fn backend_options(&self) -> Result<BackendOptions> {
        let filter = ListingFilter::new()
            .with_no_index(self.no_index_files.iter().cloned())
            .with_skip_index(self.skip_index_files.iter().cloned())
            .with_index_file(self.index_file.clone())
            .with_skips(&self.skips)
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(BackendOptions {
            index_file: self.index_file.clone(),
            filter,
            s3_endpoint: self.s3_endpoint.clone(),
        })
    }
}
