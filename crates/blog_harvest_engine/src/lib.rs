//! Blog harvest engine: fetching, extraction, asset download and persistence.
mod clean;
mod config;
mod decode;
mod extract;
mod fetch;
mod heuristics;
mod images;
mod listing;
mod persist;
mod pipeline;
mod types;

pub use clean::{strip_elements, ContentCleaner, BLOCKLIST, REGION_PRESTRIP};
pub use config::{Clock, EngineConfig, DEFAULT_LISTING_URL, DEFAULT_MAX_PAGES};
pub use decode::{decode_html, DecodedHtml};
pub use extract::{
    parse_post_date, slug_for, DateFormat, ExtractError, Heuristics, PostDefaults, PostExtractor,
    DATE_FORMATS,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, BROWSER_USER_AGENT};
pub use heuristics::{element_text, Chain, Locator, Rule};
pub use images::{
    asset_file_name, extract_images, resolve_image_url, rewrite_image_sources, AssetError,
    ImageDownloader,
};
pub use listing::{CrawlOutcome, ListingCrawler, ListingPage, ListingParser};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{HarvestError, Harvester, PostFailure, PostFailureReason, RunSummary, SavedPost};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
