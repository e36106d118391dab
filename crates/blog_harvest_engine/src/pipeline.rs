use std::path::PathBuf;
use std::sync::Arc;

use blog_harvest_core::BlogPost;
use harvest_logging::{harvest_debug, harvest_info, harvest_warn};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::decode::decode_html;
use crate::extract::{ExtractError, PostExtractor};
use crate::images::ImageDownloader;
use crate::listing::{CrawlOutcome, ListingCrawler, ListingParser};
use crate::persist::{ensure_output_dir, AtomicFileWriter, PersistError};
use crate::{FetchError, Fetcher, ReqwestFetcher};

/// Errors that stop a whole run. Per-post problems never surface here.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("could not serialize post: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostFailureReason {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFailure {
    pub url: String,
    pub reason: PostFailureReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPost {
    pub url: String,
    pub slug: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub crawl: CrawlOutcome,
    pub saved: Vec<SavedPost>,
    pub failures: Vec<PostFailure>,
}

impl RunSummary {
    pub fn discovered(&self) -> usize {
        self.crawl.urls.len()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }
}

/// Crawl, extract, localize images, persist: one post at a time.
pub struct Harvester {
    config: EngineConfig,
    page_fetcher: Arc<dyn Fetcher>,
    crawler: ListingCrawler,
    extractor: PostExtractor,
    downloader: ImageDownloader,
    writer: AtomicFileWriter,
}

impl Harvester {
    pub fn new(config: EngineConfig) -> Self {
        let page_fetcher = Arc::new(ReqwestFetcher::new(config.page_fetch.clone()));
        let image_fetcher = Arc::new(ReqwestFetcher::new(config.image_fetch.clone()));
        Self::with_fetchers(config, page_fetcher, image_fetcher)
    }

    pub fn with_fetchers(
        config: EngineConfig,
        page_fetcher: Arc<dyn Fetcher>,
        image_fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let crawler = ListingCrawler::new(
            page_fetcher.clone(),
            ListingParser::new(config.post_path_marker.clone()),
            config.listing_url.clone(),
            config.max_pages,
            config.page_delay,
        );
        let extractor = PostExtractor::new(config.categories.clone(), config.defaults.clone());
        let downloader = ImageDownloader::new(
            image_fetcher,
            config.assets_dir.clone(),
            config.assets_url_prefix.clone(),
        );
        let writer = AtomicFileWriter::new(config.content_dir.clone());
        Self {
            config,
            page_fetcher,
            crawler,
            extractor,
            downloader,
            writer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the full pipeline. Only setup and persistence failures are errors.
    pub async fn run(&self) -> Result<RunSummary, HarvestError> {
        self.writer.prepare()?;
        ensure_output_dir(&self.config.assets_dir)?;

        harvest_info!("Finding all blog post URLs from {}", self.config.listing_url);
        let crawl = self.crawler.crawl().await;
        harvest_info!("Found {} blog posts", crawl.urls.len());

        let mut saved = Vec::new();
        let mut failures = Vec::new();
        for (index, url) in crawl.urls.iter().enumerate() {
            if index > 0 && !self.config.post_delay.is_zero() {
                tokio::time::sleep(self.config.post_delay).await;
            }
            match self.harvest_post(url).await {
                Ok(post) => {
                    let path = self.save(&post)?;
                    harvest_info!("Saved: {}", post.file_name());
                    saved.push(SavedPost {
                        url: url.clone(),
                        slug: post.slug,
                        path,
                    });
                }
                Err(reason) => {
                    harvest_warn!("Error scraping {}: {}", url, reason);
                    failures.push(PostFailure {
                        url: url.clone(),
                        reason,
                    });
                }
            }
        }

        harvest_info!(
            "Scraping complete! Scraped {} posts ({} failed).",
            saved.len(),
            failures.len()
        );
        Ok(RunSummary {
            crawl,
            saved,
            failures,
        })
    }

    /// Fetches and extracts one post, then downloads its images.
    pub async fn harvest_post(&self, url: &str) -> Result<BlogPost, PostFailureReason> {
        harvest_info!("Scraping: {}", url);
        let output = self.page_fetcher.fetch(url).await?;
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
        if decoded.had_errors {
            harvest_debug!(
                "{} had malformed {} sequences; decoded with replacements",
                url,
                decoded.encoding_label
            );
        }
        let post = self
            .extractor
            .extract(url, &decoded.html, (self.config.clock)())?;
        Ok(self.downloader.localize(post).await)
    }

    /// Writes `<slug>.json`, replacing any earlier file for the same slug.
    pub fn save(&self, post: &BlogPost) -> Result<PathBuf, HarvestError> {
        let json = serde_json::to_string_pretty(post)?;
        Ok(self.writer.write(&post.file_name(), &json)?)
    }
}
