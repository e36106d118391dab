use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::CategoryTable;

/// One harvested blog post, as persisted to `<slug>.json`.
///
/// The `*_translated` fields start out as copies of their source fields; a
/// later translation step replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    pub title_translated: String,
    pub slug: String,
    pub date: NaiveDateTime,
    pub author: String,
    pub category: String,
    pub category_translated: String,
    pub tags: Vec<String>,
    pub tags_translated: Vec<String>,
    pub source_url: String,
    pub canonical_url: String,
    pub excerpt: String,
    pub excerpt_translated: String,
    pub content: String,
    pub content_translated: String,
    pub reading_time: u32,
    pub hero_image: Option<String>,
    pub images: Vec<String>,
    pub published: bool,
}

/// Source-language fields gathered from a page, before duplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub date: NaiveDateTime,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub url: String,
    pub excerpt: String,
    pub content: String,
    pub reading_time: u32,
    pub images: Vec<String>,
}

impl BlogPost {
    pub fn from_draft(draft: PostDraft, categories: &CategoryTable) -> Self {
        let category_translated = categories.translate(&draft.category).to_string();
        Self {
            title_translated: draft.title.clone(),
            title: draft.title,
            slug: draft.slug,
            date: draft.date,
            author: draft.author,
            category_translated,
            category: draft.category,
            tags_translated: draft.tags.clone(),
            tags: draft.tags,
            canonical_url: draft.url.clone(),
            source_url: draft.url,
            excerpt_translated: draft.excerpt.clone(),
            excerpt: draft.excerpt,
            content_translated: draft.content.clone(),
            content: draft.content,
            reading_time: draft.reading_time.max(1),
            hero_image: None,
            images: draft.images,
            published: true,
        }
    }

    /// Returns the post with downloaded image paths and the rewritten content.
    pub fn with_local_assets(self, images: Vec<String>, content: String) -> Self {
        Self {
            images,
            content_translated: content.clone(),
            content,
            ..self
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.slug)
    }
}
