use blog_harvest_core::{
    calculate_reading_time, generate_slug, truncate_chars, BlogPost, CategoryTable, PostDraft,
};
use chrono::{NaiveDate, NaiveDateTime};
use harvest_logging::harvest_debug;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use crate::clean::{parse_selectors, strip_elements, ContentCleaner, REGION_PRESTRIP};
use crate::heuristics::{non_empty_attr, non_empty_text, rule, Chain, Locator};
use crate::images::extract_images;

pub const UNTITLED: &str = "Untitled";
pub const EXCERPT_MAX_CHARS: usize = 200;
/// Date candidates are cut to this many characters before parsing.
pub const DATE_PREFIX_CHARS: usize = 19;

/// Tried in order; the first format that consumes the whole input wins.
pub const DATE_FORMATS: &[DateFormat] = &[
    DateFormat::Date("%Y-%m-%d"),
    DateFormat::Date("%B %d, %Y"),
    DateFormat::Date("%d %B %Y"),
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%S"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// Calendar date only; the time is midnight.
    Date(&'static str),
    DateTime(&'static str),
}

impl DateFormat {
    fn parse(self, input: &str) -> Option<NaiveDateTime> {
        match self {
            DateFormat::Date(fmt) => NaiveDate::parse_from_str(input, fmt)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0)),
            DateFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(input, fmt).ok(),
        }
    }
}

/// Parses a post date after cutting it to [`DATE_PREFIX_CHARS`] characters.
pub fn parse_post_date(raw: &str) -> Option<NaiveDateTime> {
    let candidate = truncate_chars(raw.trim(), DATE_PREFIX_CHARS);
    DATE_FORMATS
        .iter()
        .find_map(|format| format.parse(&candidate))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no content region found")]
    NoContentRegion,
}

/// Values used when a page does not say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDefaults {
    pub author: String,
    pub category: String,
}

impl Default for PostDefaults {
    fn default() -> Self {
        Self {
            author: "Postgres Pro".to_string(),
            category: "PostgreSQL".to_string(),
        }
    }
}

/// The fallback chains for every field, evaluated top-down.
pub struct Heuristics {
    pub title: Chain<String>,
    /// Raw date text; the first rule that finds any wins, parsed or not.
    pub date: Chain<String>,
    pub author: Chain<String>,
    pub category: Chain<String>,
    pub excerpt: Chain<String>,
    pub tags: Option<Locator>,
    pub content_region: Vec<Locator>,
}

impl Heuristics {
    pub fn standard() -> Self {
        Self {
            title: Chain::new([
                rule("h1", Locator::css("h1"), non_empty_text),
                rule("title", Locator::css("title"), non_empty_text),
            ]),
            date: Chain::new([
                rule("time", Locator::css("time"), read_date_text),
                rule("date class", Locator::class("date|published"), read_date_text),
            ]),
            author: Chain::new([rule(
                "author class",
                Locator::class("author|byline"),
                non_empty_text,
            )]),
            category: Chain::new([rule(
                "category class",
                Locator::class("category|tag"),
                non_empty_text,
            )]),
            excerpt: Chain::new([
                rule(
                    "og:description",
                    Locator::css(r#"meta[property="og:description"]"#),
                    read_meta_content,
                ),
                rule(
                    "meta description",
                    Locator::css(r#"meta[name="description"]"#),
                    read_meta_content,
                ),
            ]),
            tags: Locator::class("tag|keyword"),
            content_region: [
                Locator::css("article"),
                Locator::css("main"),
                Locator::class("content|post-body"),
                Locator::css("body"),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }

    /// Non-empty tag texts in first-seen order, without duplicates.
    pub fn tags(&self, doc: &Html) -> Vec<String> {
        let Some(locator) = &self.tags else {
            return Vec::new();
        };
        let mut tags: Vec<String> = Vec::new();
        for text in locator.all(doc).into_iter().filter_map(non_empty_text) {
            if !tags.contains(&text) {
                tags.push(text);
            }
        }
        tags
    }

    pub fn content_region<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        self.content_region
            .iter()
            .find_map(|locator| locator.first(doc))
    }
}

impl Default for Heuristics {
    fn default() -> Self {
        Self::standard()
    }
}

/// Turns one fetched page into a [`BlogPost`].
pub struct PostExtractor {
    heuristics: Heuristics,
    cleaner: ContentCleaner,
    prestrip: Vec<Selector>,
    paragraph: Option<Selector>,
    categories: CategoryTable,
    defaults: PostDefaults,
}

impl PostExtractor {
    pub fn new(categories: CategoryTable, defaults: PostDefaults) -> Self {
        Self {
            heuristics: Heuristics::standard(),
            cleaner: ContentCleaner::new(),
            prestrip: parse_selectors(REGION_PRESTRIP),
            paragraph: Selector::parse("p").ok(),
            categories,
            defaults,
        }
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    /// Extracts a post from `html` fetched at `url`.
    ///
    /// `now` becomes the post date when no date can be parsed. Only a missing
    /// content region is an error; every other field falls back to a default.
    pub fn extract(&self, url: &str, html: &str, now: NaiveDateTime) -> Result<BlogPost, ExtractError> {
        let doc = Html::parse_document(html);
        let h = &self.heuristics;

        let region_html = h
            .content_region(&doc)
            .map(|region| region.html())
            .ok_or(ExtractError::NoContentRegion)?;

        let mut region = Html::parse_fragment(&region_html);
        strip_elements(&mut region, &self.prestrip);
        let region_text: String = region.root_element().text().collect();
        let first_paragraph = self
            .paragraph
            .as_ref()
            .and_then(|p| region.select(p).find_map(non_empty_text));
        let content = self.cleaner.clean(&region.root_element().inner_html());

        let title = h.title.resolve(&doc).unwrap_or_else(|| UNTITLED.to_string());
        let date = h
            .date
            .resolve_named(&doc)
            .and_then(|(source, raw)| {
                let parsed = parse_post_date(&raw);
                if parsed.is_none() {
                    harvest_debug!("Unparseable date {:?} for {} from {}", raw, url, source);
                }
                parsed
            })
            .unwrap_or(now);
        let author = h
            .author
            .resolve(&doc)
            .unwrap_or_else(|| self.defaults.author.clone());
        let category = h
            .category
            .resolve(&doc)
            .filter(|category| self.categories.contains(category))
            .unwrap_or_else(|| self.defaults.category.clone());
        let excerpt = h
            .excerpt
            .resolve(&doc)
            .or_else(|| first_paragraph.map(|p| truncate_chars(&p, EXCERPT_MAX_CHARS)))
            .unwrap_or_default();

        let draft = PostDraft {
            slug: slug_for(&title, url),
            title,
            date,
            author,
            category,
            tags: h.tags(&doc),
            url: url.to_string(),
            excerpt,
            images: extract_images(&content, url),
            content,
            reading_time: calculate_reading_time(&region_text),
        };
        Ok(BlogPost::from_draft(draft, &self.categories))
    }
}

/// Slug from the title, falling back to the last URL path segment, then `untitled`.
pub fn slug_for(title: &str, url: &str) -> String {
    let slug = generate_slug(title);
    if !slug.is_empty() {
        return slug;
    }
    let from_url = Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .map(|segment| generate_slug(&segment))
        .unwrap_or_default();
    if from_url.is_empty() {
        "untitled".to_string()
    } else {
        from_url
    }
}

/// Always yields, so a located element decides the date even when it is blank.
fn read_date_text(element: ElementRef<'_>) -> Option<String> {
    Some(
        non_empty_attr(element, "datetime")
            .or_else(|| non_empty_text(element))
            .unwrap_or_default(),
    )
}

fn read_meta_content(element: ElementRef<'_>) -> Option<String> {
    non_empty_attr(element, "content")
}
