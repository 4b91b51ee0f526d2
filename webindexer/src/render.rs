//! Page rendering.
//!
//! The indexer only depends on the [`Renderer`] trait. [`HtmlRenderer`] is the
//! stock implementation: a Handlebars engine with one built-in page layout,
//! replaceable by a template file, and a handful of colour themes.
//!
//! Templates see the following context:
//!
//! | Key | Content |
//! |-----|---------|
//! | `title` | rendered title |
//! | `path` | `/` followed by the relative path |
//! | `relative_path` | relative path, `""` at the root |
//! | `is_root` | true on the root page |
//! | `style` | theme CSS |
//! | `up_link`, `link_up_text` | parent link, absent when none |
//! | `items[]` | `name`, `url`, `is_dir`, `size`, `modified` |

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use webindexer_storage::Entry;

use crate::config::Config;
use crate::context::IndexData;
use crate::error::{Error, Result};

const TEMPLATE_NAME: &str = "index";

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1.0">
<title>{{title}}</title>
<style>{{{style}}}</style>
</head>
<body>
<main>
<h1>{{title}}</h1>
<table>
<thead>
<tr><th class="name">Name</th><th class="date">Last modified</th><th class="size">Size</th></tr>
</thead>
<tbody>
{{#if up_link}}
<tr class="up"><td class="name"><a href="{{up_link}}">{{link_up_text}}</a></td><td class="date"></td><td class="size"></td></tr>
{{/if}}
{{#each items}}
<tr class="{{#if is_dir}}dir{{else}}file{{/if}}"><td class="name"><a href="{{url}}">{{name}}</a></td><td class="date">{{modified}}</td><td class="size">{{size}}</td></tr>
{{/each}}
</tbody>
</table>
</main>
</body>
</html>
"#;

const BASE_CSS: &str = "body{margin:0;font-family:system-ui,-apple-system,sans-serif;background:var(--bg);color:var(--fg)}\
main{max-width:960px;margin:0 auto;padding:1.5rem}\
h1{font-size:1.4rem;font-weight:600;word-break:break-all}\
table{width:100%;border-collapse:collapse}\
th{text-align:left;border-bottom:1px solid var(--border);padding:.4rem}\
td{padding:.3rem .4rem;border-bottom:1px solid var(--border)}\
td.size,th.size{text-align:right;white-space:nowrap}\
td.date{white-space:nowrap;color:var(--muted)}\
a{color:var(--link);text-decoration:none}a:hover{text-decoration:underline}\
tr.dir a{font-weight:600}";

/// Colour theme of the built-in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Default,
    Solarized,
    Nord,
    Dracula,
}

impl Theme {
    /// Full stylesheet for this theme.
    pub fn css(&self) -> String {
        // (background, foreground, muted, link, border)
        let (bg, fg, muted, link, border) = match self {
            Theme::Default => ("#ffffff", "#1f2328", "#656d76", "#0969da", "#d0d7de"),
            Theme::Solarized => ("#fdf6e3", "#657b83", "#93a1a1", "#268bd2", "#eee8d5"),
            Theme::Nord => ("#2e3440", "#d8dee9", "#81a1c1", "#88c0d0", "#3b4252"),
            Theme::Dracula => ("#282a36", "#f8f8f2", "#6272a4", "#bd93f9", "#44475a"),
        };
        format!(
            ":root{{--bg:{};--fg:{};--muted:{};--link:{};--border:{}}}{}",
            bg, fg, muted, link, border, BASE_CSS
        )
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(Theme::Default),
            "solarized" => Ok(Theme::Solarized),
            "nord" => Ok(Theme::Nord),
            "dracula" => Ok(Theme::Dracula),
            other => Err(Error::Config(format!(
                "theme must be one of: default, solarized, nord, dracula (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Default => "default",
            Theme::Solarized => "solarized",
            Theme::Nord => "nord",
            Theme::Dracula => "dracula",
        };
        write!(f, "{}", name)
    }
}

/// Turns a directory's render context into page content.
pub trait Renderer: Send + Sync {
    fn render(&self, data: &IndexData) -> Result<String>;
}

/// Handlebars-based HTML renderer.
pub struct HtmlRenderer {
    engine: Handlebars<'static>,
    // Titles are escaped once, by the page template.
    title_engine: Handlebars<'static>,
    theme: Theme,
}

impl HtmlRenderer {
    /// Renderer with the built-in layout.
    pub fn new(theme: Theme) -> Result<Self> {
        let mut engine = Handlebars::new();
        engine.register_template_string(TEMPLATE_NAME, DEFAULT_TEMPLATE)?;
        Ok(Self::with_engine(engine, theme))
    }

    /// Renderer with a layout loaded from a template file.
    pub fn with_template_file(path: &Path, theme: Theme) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read template {}: {}", path.display(), e))
        })?;
        let mut engine = Handlebars::new();
        engine.register_template_string(TEMPLATE_NAME, source)?;
        debug!(template = %path.display(), "Loaded custom template");
        Ok(Self::with_engine(engine, theme))
    }

    fn with_engine(engine: Handlebars<'static>, theme: Theme) -> Self {
        let mut title_engine = Handlebars::new();
        title_engine.register_escape_fn(handlebars::no_escape);
        Self {
            engine,
            title_engine,
            theme,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.template {
            Some(path) => Self::with_template_file(path, config.theme),
            None => Self::new(config.theme),
        }
    }

    fn item_view(&self, data: &IndexData, entry: &Entry) -> serde_json::Value {
        let modified = entry
            .last_modified
            .map(|t| t.format(&data.date_format).to_string())
            .unwrap_or_default();
        let size = if entry.is_dir {
            "-".to_string()
        } else {
            format_size(entry.size)
        };

        json!({
            "name": entry.name,
            "url": data.item_url(entry),
            "is_dir": entry.is_dir,
            "size": size,
            "bytes": entry.size,
            "modified": modified,
        })
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, data: &IndexData) -> Result<String> {
        let items: Vec<_> = data
            .items
            .iter()
            .map(|e| self.item_view(data, e))
            .collect();

        let mut view = json!({
            "relative_path": data.relative_path,
            "path": format!("/{}", data.relative_path),
            "is_root": data.is_root(),
            "style": self.theme.css(),
            "up_link": data.up_link,
            "link_up_text": data.link_up_text,
            "items": items,
        });

        let title = self.title_engine.render_template(&data.title, &view)?;
        view["title"] = json!(title);

        Ok(self.engine.render(TEMPLATE_NAME, &view)?)
    }
}

/// Human-readable size with binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
