use std::collections::HashSet;

use url::Url;

/// Why pagination ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last page contributed no URL that had not been seen already.
    NoNewLinks,
    /// The last page had no next/pagination marker.
    NoNextPage,
    /// A listing page could not be fetched; URLs gathered so far are kept.
    FetchFailed,
    /// The configured page ceiling was reached.
    PageLimit,
}

/// Results fed back into the crawl after an effect has been executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlMsg {
    PageLoaded {
        page: u32,
        links: Vec<String>,
        has_next: bool,
    },
    PageFailed {
        page: u32,
        reason: String,
    },
}

/// Work the driver must perform next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEffect {
    FetchPage { page: u32, url: String },
    Finished { reason: StopReason },
}

/// Listing pagination state: current page and the accumulated post URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlState {
    listing_url: String,
    max_pages: u32,
    page: u32,
    urls: Vec<String>,
    seen: HashSet<String>,
    stop: Option<StopReason>,
}

impl CrawlState {
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Post URLs in discovery order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    pub fn is_finished(&self) -> bool {
        self.stop.is_some()
    }

    fn finish(&mut self, reason: StopReason) -> Vec<CrawlEffect> {
        self.stop = Some(reason);
        vec![CrawlEffect::Finished { reason }]
    }

    fn absorb(&mut self, links: Vec<String>) -> bool {
        let mut found_new = false;
        for link in links {
            if self.seen.insert(link.clone()) {
                self.urls.push(link);
                found_new = true;
            }
        }
        found_new
    }
}

/// Begins a crawl at page 1 of `listing_url`.
pub fn start(listing_url: impl Into<String>, max_pages: u32) -> (CrawlState, Vec<CrawlEffect>) {
    let mut state = CrawlState {
        listing_url: listing_url.into(),
        max_pages,
        page: 1,
        urls: Vec::new(),
        seen: HashSet::new(),
        stop: None,
    };
    if max_pages == 0 {
        let effects = state.finish(StopReason::PageLimit);
        return (state, effects);
    }
    let effects = vec![CrawlEffect::FetchPage {
        page: 1,
        url: state.listing_url.clone(),
    }];
    (state, effects)
}

/// Pure transition: applies a page result and returns the next effects.
///
/// Messages for a page other than the current one, or arriving after the crawl
/// finished, are ignored.
pub fn update(mut state: CrawlState, msg: CrawlMsg) -> (CrawlState, Vec<CrawlEffect>) {
    let page = match &msg {
        CrawlMsg::PageLoaded { page, .. } | CrawlMsg::PageFailed { page, .. } => *page,
    };
    if state.is_finished() || page != state.page {
        return (state, Vec::new());
    }

    let effects = match msg {
        CrawlMsg::PageFailed { .. } => state.finish(StopReason::FetchFailed),
        CrawlMsg::PageLoaded {
            links, has_next, ..
        } => {
            let found_new = state.absorb(links);
            if !found_new {
                state.finish(StopReason::NoNewLinks)
            } else if !has_next {
                state.finish(StopReason::NoNextPage)
            } else if state.page >= state.max_pages {
                state.finish(StopReason::PageLimit)
            } else {
                state.page += 1;
                vec![CrawlEffect::FetchPage {
                    page: state.page,
                    url: page_url(&state.listing_url, state.page),
                }]
            }
        }
    };

    (state, effects)
}

/// Listing URL for `page`: the bare URL for page 1, `page=<n>` appended otherwise.
pub fn page_url(listing_url: &str, page: u32) -> String {
    if page <= 1 {
        return listing_url.to_string();
    }
    match Url::parse(listing_url) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("page", &page.to_string());
            url.into()
        }
        Err(_) => {
            let sep = if listing_url.contains('?') { '&' } else { '?' };
            format!("{listing_url}{sep}page={page}")
        }
    }
}
