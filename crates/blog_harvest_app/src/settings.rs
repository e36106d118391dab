use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use blog_harvest_core::CategoryTable;
use blog_harvest_engine::{EngineConfig, DEFAULT_LISTING_URL};
use harvest_logging::LogDestination;
use serde::Deserialize;

pub(crate) const SETTINGS_FILENAME: &str = "blog_harvest.ron";
const DEFAULT_CONTENT_DIR: &str = "Postgrespro.tr/wwwroot/content/blog";
const DEFAULT_ASSETS_DIR: &str = "Postgrespro.tr/wwwroot/blog";

/// Optional overrides read from `blog_harvest.ron`. Absent fields keep the
/// built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub listing_url: Option<String>,
    pub post_path_marker: Option<String>,
    pub content_dir: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub assets_url_prefix: Option<String>,
    pub page_delay_ms: Option<u64>,
    pub post_delay_ms: Option<u64>,
    pub max_pages: Option<u32>,
    pub default_author: Option<String>,
    pub default_category: Option<String>,
    pub categories: Option<CategoryTable>,
    /// Also log to this file.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Reads `<dir>/blog_harvest.ron`; a missing file yields the defaults.
    pub(crate) fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("could not read {}", path.display()))
            }
        };
        ron::from_str(&content)
            .with_context(|| format!("malformed settings in {}", path.display()))
    }

    pub(crate) fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub(crate) fn into_engine_config(self) -> EngineConfig {
        let mut config = EngineConfig::new(
            self.listing_url
                .unwrap_or_else(|| DEFAULT_LISTING_URL.to_string()),
            self.content_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR)),
            self.assets_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
        );
        if let Some(marker) = self.post_path_marker {
            config.post_path_marker = marker;
        }
        if let Some(prefix) = self.assets_url_prefix {
            config.assets_url_prefix = prefix;
        }
        if let Some(ms) = self.page_delay_ms {
            config.page_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.post_delay_ms {
            config.post_delay = Duration::from_millis(ms);
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(author) = self.default_author {
            config.defaults.author = author;
        }
        if let Some(category) = self.default_category {
            config.defaults.category = category;
        }
        if let Some(categories) = self.categories {
            config.categories = categories;
        }
        config
    }
}
