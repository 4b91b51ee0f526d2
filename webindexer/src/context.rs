//! Per-directory render context.

use serde::Serialize;
use webindexer_storage::{Entry, SEPARATOR};

use crate::config::Config;

/// Everything a renderer needs to produce one directory page.
///
/// Built fresh for each visited directory and dropped once the page is
/// written. Fields other than `relative_path` and `items` are copied from the
/// configuration unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct IndexData {
    /// Directory path relative to the source root, `""` for the root,
    /// otherwise ending with `/`
    pub relative_path: String,
    /// Sorted entries of the directory
    pub items: Vec<Entry>,
    /// Title template
    pub title: String,
    /// Target of the "up" link, if one should be shown
    pub up_link: Option<String>,
    pub link_up_text: String,
    /// strftime format for modification times
    pub date_format: String,
    pub base_url: Option<String>,
    pub link_to_index: bool,
    pub index_file: String,
}

impl IndexData {
    pub fn new(config: &Config, relative_path: impl Into<String>, items: Vec<Entry>) -> Self {
        let relative_path: String = relative_path.into();
        let relative_path = normalize_dir(&relative_path);
        let up_link = up_link(config, &relative_path);

        Self {
            relative_path,
            items,
            title: config.title.clone(),
            up_link,
            link_up_text: config.link_up_text.clone(),
            date_format: config.date_format.clone(),
            base_url: config.base_url.clone(),
            link_to_index: config.link_to_index,
            index_file: config.index_file.clone(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.relative_path.is_empty()
    }

    /// Link target for one of this directory's entries.
    pub fn item_url(&self, entry: &Entry) -> String {
        let mut url = entry.name.clone();
        if entry.is_dir && self.link_to_index {
            url.push_str(&self.index_file);
        }
        match &self.base_url {
            Some(base) => format!(
                "{}/{}{}",
                base.trim_end_matches(SEPARATOR),
                self.relative_path,
                url
            ),
            None => url,
        }
    }
}

/// `""` stays the root; anything else gets exactly one trailing separator
/// and no leading one.
fn normalize_dir(path: &str) -> String {
    let trimmed = webindexer_storage::uri::join_key([path]);
    if trimmed.is_empty() {
        trimmed
    } else {
        format!("{}{}", trimmed, SEPARATOR)
    }
}

fn up_link(config: &Config, relative_path: &str) -> Option<String> {
    if relative_path.is_empty() {
        return if config.link_up_from_root {
            config.link_up_url.clone()
        } else {
            None
        };
    }

    let index = if config.link_to_index {
        config.index_file.as_str()
    } else {
        ""
    };

    match &config.base_url {
        Some(base) => {
            let trimmed = relative_path.trim_end_matches(SEPARATOR);
            let parent = match trimmed.rfind(SEPARATOR) {
                Some(i) => &trimmed[..=i],
                None => "",
            };
            Some(format!(
                "{}/{}{}",
                base.trim_end_matches(SEPARATOR),
                parent,
                index
            ))
        }
        None => Some(format!("../{}", index)),
    }
}
