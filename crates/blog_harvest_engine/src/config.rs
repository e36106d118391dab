use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use blog_harvest_core::CategoryTable;
use chrono::{Local, NaiveDateTime};

use crate::extract::PostDefaults;
use crate::fetch::FetchSettings;

/// Source of "now" for posts without a parseable date.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub const DEFAULT_LISTING_URL: &str = "https://postgrespro.com/blog";
pub const DEFAULT_POST_PATH_MARKER: &str = "/blog/";
pub const DEFAULT_ASSETS_URL_PREFIX: &str = "/blog";
pub const DEFAULT_MAX_PAGES: u32 = 1_000;

/// Everything a harvest run needs, built once at startup.
#[derive(Clone)]
pub struct EngineConfig {
    pub listing_url: String,
    /// Anchors whose `href` contains this are treated as posts.
    pub post_path_marker: String,
    /// `<slug>.json` files land here.
    pub content_dir: PathBuf,
    /// Images land in `<assets_dir>/<slug>/`.
    pub assets_dir: PathBuf,
    /// Site path that serves `assets_dir`.
    pub assets_url_prefix: String,
    pub page_delay: Duration,
    pub post_delay: Duration,
    /// Hard ceiling on listing pages per run.
    pub max_pages: u32,
    pub page_fetch: FetchSettings,
    pub image_fetch: FetchSettings,
    pub defaults: PostDefaults,
    pub categories: CategoryTable,
    pub clock: Clock,
}

impl EngineConfig {
    pub fn new(listing_url: impl Into<String>, content_dir: PathBuf, assets_dir: PathBuf) -> Self {
        Self {
            listing_url: listing_url.into(),
            post_path_marker: DEFAULT_POST_PATH_MARKER.to_string(),
            content_dir,
            assets_dir,
            assets_url_prefix: DEFAULT_ASSETS_URL_PREFIX.to_string(),
            page_delay: Duration::from_secs(1),
            post_delay: Duration::from_secs(2),
            max_pages: DEFAULT_MAX_PAGES,
            page_fetch: FetchSettings::for_pages(),
            image_fetch: FetchSettings::for_images(),
            defaults: PostDefaults::default(),
            categories: CategoryTable::default(),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Default source with both output directories under `root`.
    pub fn default_with_output(root: PathBuf) -> Self {
        Self::new(
            DEFAULT_LISTING_URL,
            root.join("content").join("blog"),
            root.join("blog"),
        )
    }

    /// No politeness delays; for tests and local mirrors.
    pub fn without_delays(mut self) -> Self {
        self.page_delay = Duration::ZERO;
        self.post_delay = Duration::ZERO;
        self
    }
}
