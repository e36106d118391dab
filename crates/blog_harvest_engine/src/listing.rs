use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use blog_harvest_core::{start, update, CrawlEffect, CrawlMsg, StopReason};
use harvest_logging::{harvest_debug, harvest_info, harvest_warn};
use scraper::{Html, Selector};
use url::Url;

use crate::decode::decode_html;
use crate::heuristics::Locator;
use crate::Fetcher;

/// Links and pagination signal found on one listing page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPage {
    pub links: Vec<String>,
    pub has_next: bool,
}

/// Finds post links (anchors whose `href` contains a path marker) and the
/// next/pagination marker on a listing page.
#[derive(Debug, Clone)]
pub struct ListingParser {
    anchors: Option<Selector>,
    next_marker: Option<Locator>,
    post_path_marker: String,
}

impl ListingParser {
    pub fn new(post_path_marker: impl Into<String>) -> Self {
        Self {
            anchors: Selector::parse("a[href]").ok(),
            next_marker: Locator::tag_with_class("a", "next|pagination"),
            post_path_marker: post_path_marker.into(),
        }
    }

    /// Parses `html`; links are resolved against `listing_url` and returned in
    /// document order (duplicates included).
    pub fn parse(&self, html: &str, listing_url: &str) -> ListingPage {
        let doc = Html::parse_document(html);
        let base = Url::parse(listing_url).ok();

        let links = self
            .anchors
            .as_ref()
            .map(|anchors| {
                doc.select(anchors)
                    .filter_map(|a| a.value().attr("href"))
                    .filter(|href| href.contains(&self.post_path_marker))
                    .filter_map(|href| resolve_link(href, base.as_ref()))
                    .collect()
            })
            .unwrap_or_default();
        let has_next = self
            .next_marker
            .as_ref()
            .is_some_and(|marker| marker.first(&doc).is_some());

        ListingPage { links, has_next }
    }
}

fn resolve_link(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") || lower.starts_with("mailto:") {
        return None;
    }
    let mut url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => base?.join(trimmed).ok()?,
    };
    url.set_fragment(None);
    Some(url.into())
}

/// Result of walking the listing pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Unique post URLs in discovery order.
    pub urls: Vec<String>,
    pub pages_fetched: u32,
    pub stop: Option<StopReason>,
}

/// Drives the pagination state machine with real fetches, one page at a time.
pub struct ListingCrawler {
    fetcher: Arc<dyn Fetcher>,
    parser: ListingParser,
    listing_url: String,
    max_pages: u32,
    page_delay: Duration,
}

impl ListingCrawler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        parser: ListingParser,
        listing_url: impl Into<String>,
        max_pages: u32,
        page_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            parser,
            listing_url: listing_url.into(),
            max_pages,
            page_delay,
        }
    }

    pub async fn crawl(&self) -> CrawlOutcome {
        let (mut state, effects) = start(self.listing_url.clone(), self.max_pages);
        let mut pending: VecDeque<CrawlEffect> = effects.into();
        let mut pages_fetched = 0;

        while let Some(effect) = pending.pop_front() {
            match effect {
                CrawlEffect::FetchPage { page, url } => {
                    if page > 1 && !self.page_delay.is_zero() {
                        tokio::time::sleep(self.page_delay).await;
                    }
                    let msg = self.load_page(page, &url).await;
                    if matches!(msg, CrawlMsg::PageLoaded { .. }) {
                        pages_fetched += 1;
                    }
                    let (next, effects) = update(state, msg);
                    state = next;
                    pending.extend(effects);
                }
                CrawlEffect::Finished { reason } => {
                    harvest_info!(
                        "Listing crawl finished after page {} ({:?}), {} post URLs",
                        state.page(),
                        reason,
                        state.urls().len()
                    );
                }
            }
        }

        CrawlOutcome {
            stop: state.stop_reason(),
            urls: state.into_urls(),
            pages_fetched,
        }
    }

    async fn load_page(&self, page: u32, url: &str) -> CrawlMsg {
        harvest_info!("Fetching blog list page {}...", page);
        match self.fetcher.fetch(url).await {
            Ok(output) => {
                let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
                let parsed = self.parser.parse(&decoded.html, &self.listing_url);
                harvest_debug!(
                    "Page {} yielded {} post links (next marker: {})",
                    page,
                    parsed.links.len(),
                    parsed.has_next
                );
                CrawlMsg::PageLoaded {
                    page,
                    links: parsed.links,
                    has_next: parsed.has_next,
                }
            }
            Err(err) => {
                harvest_warn!("Error fetching blog list page {}: {}", page, err);
                CrawlMsg::PageFailed {
                    page,
                    reason: err.to_string(),
                }
            }
        }
    }
}
