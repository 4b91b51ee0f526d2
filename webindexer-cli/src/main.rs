use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use webindexer::{Config, Indexer, Order, SortBy, Theme};

/// Every flag overrides the matching key of the config file.
#[derive(Parser, Debug)]
#[command(name = "webindexer")]
#[command(about = "Generate HTML index pages for a directory tree or S3 prefix")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./.webindexer.toml if present)
    #[arg(long, short, env = "WEBINDEXER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory or s3://bucket/prefix to index
    #[arg(long, short, env = "WEBINDEXER_SOURCE")]
    source: Option<String>,

    /// Directory or s3://bucket/prefix receiving the pages
    #[arg(long, short, env = "WEBINDEXER_TARGET")]
    target: Option<String>,

    /// Descend into subdirectories
    #[arg(long, short, env = "WEBINDEXER_RECURSIVE")]
    recursive: bool,

    /// Name of the generated page
    #[arg(long, env = "WEBINDEXER_INDEX_FILE")]
    index_file: Option<String>,

    /// Marker files that exclude a directory (comma-separated)
    #[arg(long, env = "WEBINDEXER_NOINDEX_FILES", value_delimiter = ',')]
    noindex_files: Option<Vec<String>>,

    /// Marker files hidden from the listing (comma-separated)
    #[arg(long, env = "WEBINDEXER_SKIPINDEX_FILES", value_delimiter = ',')]
    skipindex_files: Option<Vec<String>>,

    /// Glob patterns of entries to leave out (comma-separated)
    #[arg(long, env = "WEBINDEXER_SKIPS", value_delimiter = ',')]
    skips: Option<Vec<String>>,

    /// date, name or natural_name
    #[arg(long, env = "WEBINDEXER_SORT_BY")]
    sort_by: Option<SortBy>,

    /// asc or desc
    #[arg(long, env = "WEBINDEXER_ORDER")]
    order: Option<Order>,

    /// List directories before files
    #[arg(long, env = "WEBINDEXER_DIRS_FIRST", value_name = "BOOL")]
    dirs_first: Option<bool>,

    /// Page title template
    #[arg(long, env = "WEBINDEXER_TITLE")]
    title: Option<String>,

    /// Prefix making every link absolute
    #[arg(long, env = "WEBINDEXER_BASE_URL")]
    base_url: Option<String>,

    /// strftime format for modification times
    #[arg(long, env = "WEBINDEXER_DATE_FORMAT")]
    date_format: Option<String>,

    /// Link directories to their index file
    #[arg(long, env = "WEBINDEXER_LINK_TO_INDEX")]
    link_to_index: bool,

    /// Show the up link on the root page (requires --link-up-url)
    #[arg(long, env = "WEBINDEXER_LINK_UP_FROM_ROOT")]
    link_up_from_root: bool,

    #[arg(long, env = "WEBINDEXER_LINK_UP_TEXT")]
    link_up_text: Option<String>,

    #[arg(long, env = "WEBINDEXER_LINK_UP_URL")]
    link_up_url: Option<String>,

    /// Handlebars page template
    #[arg(long, env = "WEBINDEXER_TEMPLATE")]
    template: Option<PathBuf>,

    /// default, solarized, nord or dracula
    #[arg(long, env = "WEBINDEXER_THEME")]
    theme: Option<Theme>,

    /// Custom S3 endpoint (MinIO, R2, ...)
    #[arg(long, env = "WEBINDEXER_S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Maximum storage calls in flight
    #[arg(long, env = "WEBINDEXER_CONCURRENCY")]
    concurrency: Option<usize>,

    #[arg(long, env = "WEBINDEXER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "WEBINDEXER_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Only log errors
    #[arg(long, short, env = "WEBINDEXER_QUIET")]
    quiet: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if self.recursive {
            config.recursive = true;
        }
        if let Some(index_file) = self.index_file {
            config.index_file = index_file;
        }
        if let Some(files) = self.noindex_files {
            config.no_index_files = files;
        }
        if let Some(files) = self.skipindex_files {
            config.skip_index_files = files;
        }
        if let Some(skips) = self.skips {
            config.skips = skips;
        }
        if let Some(sort_by) = self.sort_by {
            config.sort_by = sort_by;
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        if let Some(dirs_first) = self.dirs_first {
            config.dirs_first = dirs_first;
        }
        if let Some(title) = self.title {
            config.title = title;
        }
        if self.base_url.is_some() {
            config.base_url = self.base_url;
        }
        if let Some(date_format) = self.date_format {
            config.date_format = date_format;
        }
        if self.link_to_index {
            config.link_to_index = true;
        }
        if self.link_up_from_root {
            config.link_up_from_root = true;
        }
        if let Some(text) = self.link_up_text {
            config.link_up_text = text;
        }
        if self.link_up_url.is_some() {
            config.link_up_url = self.link_up_url;
        }
        if self.template.is_some() {
            config.template = self.template;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if self.s3_endpoint.is_some() {
            config.s3_endpoint = self.s3_endpoint;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }
        if self.quiet {
            config.quiet = true;
        }
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let log_filter = if config.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    if let Some(log_file) = &config.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("cannot open log file {}", log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(log_filter)
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn load_config(cli: Cli) -> Result<Config> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let mut config = Config::load_from(&cwd, cli.config.as_deref())
        .context("failed to load configuration")?;
    cli.apply(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli)?;
    init_logging(&config)?;

    let indexer = Arc::new(Indexer::from_config(config).context("invalid configuration")?);

    let interrupted = Arc::clone(&indexer);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing calls in flight");
            interrupted.cancel();
        }
    });

    let summary = indexer.run().await.context("indexing failed")?;

    tracing::info!(
        "Wrote {} pages ({} directories excluded)",
        summary.pages_written,
        summary.suppressed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let cli = Cli::try_parse_from(std::iter::once("webindexer").chain(args.iter().copied()))
            .unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);
        config
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--source",
            "s3://bucket/files",
            "-t",
            "/tmp/out",
            "-r",
            "--sort-by",
            "last_modified",
            "--order",
            "desc",
            "--dirs-first",
            "false",
            "--skips",
            "*.tmp,.git",
            "--theme",
            "nord",
            "--concurrency",
            "2",
        ]);

        assert_eq!(config.source, "s3://bucket/files");
        assert_eq!(config.target, "/tmp/out");
        assert!(config.recursive);
        assert_eq!(config.sort_by, SortBy::Date);
        assert_eq!(config.order, Order::Desc);
        assert!(!config.dirs_first);
        assert_eq!(config.skips, vec!["*.tmp", ".git"]);
        assert_eq!(config.theme, Theme::Nord);
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let mut config = Config {
            recursive: true,
            title: "Mirror".to_string(),
            base_url: Some("https://example.com".to_string()),
            ..Default::default()
        };
        let cli = Cli::try_parse_from(["webindexer", "--quiet"]).unwrap();
        cli.apply(&mut config);

        assert!(config.recursive);
        assert!(config.quiet);
        assert_eq!(config.title, "Mirror");
        assert_eq!(config.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.no_index_files, vec![".noindex"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["webindexer", "--sort-by", "size"]).is_err());
        assert!(Cli::try_parse_from(["webindexer", "--theme", "neon"]).is_err());
        assert!(Cli::try_parse_from(["webindexer", "--concurrency", "many"]).is_err());
    }
}
