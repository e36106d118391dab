use blog_harvest_core::{BlogPost, CategoryTable, PostDraft};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn draft(category: &str) -> PostDraft {
    PostDraft {
        title: "Şirket Haberleri".to_string(),
        slug: "sirket-haberleri".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        author: "Postgres Pro".to_string(),
        category: category.to_string(),
        tags: vec!["release".to_string()],
        url: "https://example.com/blog/sirket".to_string(),
        excerpt: "Kısa özet".to_string(),
        content: "<p>Body</p>".to_string(),
        reading_time: 0,
        images: vec!["https://example.com/a.png".to_string()],
    }
}

#[test]
fn translated_fields_start_as_copies() {
    let post = BlogPost::from_draft(draft("PostgreSQL"), &CategoryTable::default());
    assert_eq!(post.title_translated, post.title);
    assert_eq!(post.tags_translated, post.tags);
    assert_eq!(post.excerpt_translated, post.excerpt);
    assert_eq!(post.content_translated, post.content);
    assert_eq!(post.canonical_url, post.source_url);
    assert_eq!(post.hero_image, None);
    assert!(post.published);
    assert_eq!(post.reading_time, 1);
}

#[test]
fn category_goes_through_bilingual_table() {
    let table = CategoryTable::default();
    let mapped = BlogPost::from_draft(draft("Company Updates"), &table);
    assert_eq!(mapped.category_translated, "Şirket Güncellemeleri");

    let unmapped = BlogPost::from_draft(draft("Releases"), &table);
    assert_eq!(unmapped.category_translated, "Releases");
}

#[test]
fn json_uses_camel_case_and_keeps_unicode() {
    let post = BlogPost::from_draft(draft("Company Updates"), &CategoryTable::default());
    let json = serde_json::to_string_pretty(&post).unwrap();

    for key in [
        "\"title\"",
        "\"titleTranslated\"",
        "\"slug\"",
        "\"date\"",
        "\"author\"",
        "\"category\"",
        "\"categoryTranslated\"",
        "\"tags\"",
        "\"tagsTranslated\"",
        "\"sourceUrl\"",
        "\"canonicalUrl\"",
        "\"excerpt\"",
        "\"excerptTranslated\"",
        "\"content\"",
        "\"contentTranslated\"",
        "\"readingTime\"",
        "\"heroImage\": null",
        "\"images\"",
        "\"published\": true",
    ] {
        assert!(json.contains(key), "missing {key} in {json}");
    }
    assert!(json.contains("\"date\": \"2024-03-05T00:00:00\""));
    assert!(json.contains("Şirket Güncellemeleri"));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 19);
}

#[test]
fn local_assets_replace_images_and_both_contents() {
    let post = BlogPost::from_draft(draft("PostgreSQL"), &CategoryTable::default());
    let localized = post.clone().with_local_assets(
        vec!["/blog/sirket-haberleri/a.png".to_string()],
        "<p><img src=\"/blog/sirket-haberleri/a.png\"></p>".to_string(),
    );
    assert_eq!(localized.images, vec!["/blog/sirket-haberleri/a.png"]);
    assert_eq!(localized.content, localized.content_translated);
    assert_eq!(localized.title, post.title);
    assert_eq!(localized.file_name(), "sirket-haberleri.json");
}
