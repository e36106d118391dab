//! Blog harvest core: pure normalization, post model and the listing-crawl state machine.
mod category;
mod crawl;
mod normalize;
mod post;

pub use category::{CategoryLabels, CategoryTable};
pub use crawl::{page_url, start, update, CrawlEffect, CrawlMsg, CrawlState, StopReason};
pub use normalize::{
    calculate_reading_time, generate_slug, sanitize_filename, truncate_chars, WORDS_PER_MINUTE,
};
pub use post::{BlogPost, PostDraft};
