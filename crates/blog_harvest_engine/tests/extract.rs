use blog_harvest_core::CategoryTable;
use blog_harvest_engine::{ExtractError, PostDefaults, PostExtractor};
use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

const URL: &str = "https://example.com/blog/fallback-post";

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap()
}

fn extractor() -> PostExtractor {
    PostExtractor::new(CategoryTable::default(), PostDefaults::default())
}

const FULL_PAGE: &str = r#"
<html>
<head>
  <title>Site title</title>
  <meta property="og:description" content="OG summary">
  <meta name="description" content="Plain summary">
</head>
<body>
  <header class="site-header">Site</header>
  <article>
    <h1>PostgreSQL Şirket Güncellemeleri!</h1>
    <time datetime="2024-03-05T10:20:30Z">March 5</time>
    <span class="author-name">Jane Doe</span>
    <a class="category-link">Company Updates</a>
    <ul>
      <li class="tag">release</li>
      <li class="keyword">pg17</li>
      <li class="tag">release</li>
      <li class="tag">  </li>
    </ul>
    <nav>Prev / Next</nav>
    <p>First paragraph of the post.</p>
    <p></p>
    <div class="newsletter-box">Sign up</div>
    <img src="/img/one.png">
    <script>alert(1)</script>
  </article>
</body>
</html>
"#;

#[test]
fn extracts_every_field_from_well_formed_page() {
    let post = extractor().extract(URL, FULL_PAGE, now()).unwrap();

    assert_eq!(post.title, "PostgreSQL Şirket Güncellemeleri!");
    assert_eq!(post.slug, "postgresql-sirket-guncellemeleri");
    assert_eq!(
        post.date,
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap()
    );
    assert_eq!(post.author, "Jane Doe");
    assert_eq!(post.category, "Company Updates");
    assert_eq!(post.category_translated, "Şirket Güncellemeleri");
    assert_eq!(post.tags, vec!["release", "pg17"]);
    assert_eq!(post.excerpt, "OG summary");
    assert_eq!(post.images, vec!["https://example.com/img/one.png"]);
    assert_eq!(post.source_url, URL);
    assert_eq!(post.canonical_url, URL);
    assert!(post.published);
    assert_eq!(post.hero_image, None);
    assert!(post.reading_time >= 1);

    assert!(post.content.starts_with("<article>"));
    assert!(post.content.contains("First paragraph of the post."));
    for gone in ["<script", "<nav", "Sign up", "<p></p>"] {
        assert!(!post.content.contains(gone), "{gone} left in content");
    }
    assert_eq!(post.content_translated, post.content);
}

#[test]
fn minimal_page_uses_defaults() {
    let html = "<html><body><p>Just a body.</p></body></html>";
    let post = extractor().extract(URL, html, now()).unwrap();

    assert_eq!(post.title, "Untitled");
    assert_eq!(post.slug, "untitled");
    assert_eq!(post.date, now());
    assert_eq!(post.author, "Postgres Pro");
    assert_eq!(post.category, "PostgreSQL");
    assert_eq!(post.category_translated, "PostgreSQL");
    assert!(post.tags.is_empty());
    assert_eq!(post.excerpt, "Just a body.");
    assert_eq!(post.reading_time, 1);
}

#[test]
fn title_falls_back_to_title_element() {
    let html = "<html><head><title> Only   Title </title></head><body><main><p>x</p></main></body></html>";
    let post = extractor().extract(URL, html, now()).unwrap();
    assert_eq!(post.title, "Only Title");
    assert_eq!(post.slug, "only-title");
    assert!(post.content.starts_with("<main>"));
}

#[test]
fn date_prefers_attribute_then_text_then_class_element() {
    let from_text = r#"<body><article><time>March 5, 2024</time><p>x</p></article></body>"#;
    let post = extractor().extract(URL, from_text, now()).unwrap();
    assert_eq!(post.date.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

    let from_class = r#"<body><article><span class="published-on">7 June 2023</span><p>x</p></article></body>"#;
    let post = extractor().extract(URL, from_class, now()).unwrap();
    assert_eq!(post.date.date(), NaiveDate::from_ymd_opt(2023, 6, 7).unwrap());

    let unparseable = r#"<body><article><time>last Tuesday</time><p>x</p></article></body>"#;
    let post = extractor().extract(URL, unparseable, now()).unwrap();
    assert_eq!(post.date, now());
}

#[test]
fn unparseable_time_element_does_not_fall_through_to_class_element() {
    let html = r#"<body><article><time>sometime soon</time><span class="date">2024-01-02</span><p>x</p></article></body>"#;
    let post = extractor().extract(URL, html, now()).unwrap();
    assert_eq!(post.date, now());

    let blank = r#"<body><article><time></time><span class="date">2024-01-02</span><p>x</p></article></body>"#;
    let post = extractor().extract(URL, blank, now()).unwrap();
    assert_eq!(post.date, now());
}

#[test]
fn unknown_category_falls_back_to_default() {
    let html = r#"<body><article><span class="category">company updates</span><p>x</p></article></body>"#;
    let post = extractor().extract(URL, html, now()).unwrap();
    assert_eq!(post.category, "PostgreSQL");
}

#[test]
fn excerpt_uses_meta_description_then_truncated_paragraph() {
    let with_meta = r#"<html><head><meta name="description" content="Meta text"></head>
        <body><article><p>Para</p></article></body></html>"#;
    let post = extractor().extract(URL, with_meta, now()).unwrap();
    assert_eq!(post.excerpt, "Meta text");

    let blank_og = r#"<html><head><meta property="og:description" content=" ">
        <meta name="description" content="Meta text"></head>
        <body><article><p>Para</p></article></body></html>"#;
    let post = extractor().extract(URL, blank_og, now()).unwrap();
    assert_eq!(post.excerpt, "Meta text");

    let long = format!(
        "<body><article><p>  </p><p>{}</p></article></body>",
        "ğ".repeat(300)
    );
    let post = extractor().extract(URL, &long, now()).unwrap();
    assert_eq!(post.excerpt.chars().count(), 200);
}

#[test]
fn content_region_prefers_class_over_body() {
    let html = r#"<body><div class="sidebar"><p>side</p></div><div class="post-body"><p>real</p></div></body>"#;
    let post = extractor().extract(URL, html, now()).unwrap();
    assert!(post.content.contains("real"));
    assert!(!post.content.contains("side"));
}

#[test]
fn reading_time_counts_region_text_without_scripts() {
    let words = "word ".repeat(450);
    let html = format!(
        "<body><article><p>{words}</p><script>{}</script></article></body>",
        "x ".repeat(2000)
    );
    let post = extractor().extract(URL, &html, now()).unwrap();
    assert_eq!(post.reading_time, 3);
}

#[test]
fn page_without_any_region_is_rejected() {
    // A bare fragment parsed as a document still gets an implied <body>, so the
    // missing-region case is exercised through a frameset document.
    let html = "<html><head><title>Frames</title></head><frameset><frame src=\"a.html\"></frameset></html>";
    let err = extractor().extract(URL, html, now()).unwrap_err();
    assert_eq!(err, ExtractError::NoContentRegion);
}
