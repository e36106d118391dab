use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use blog_harvest_core::StopReason;
use blog_harvest_engine::{
    FetchError, FetchMetadata, FetchOutput, FetchSettings, Fetcher, ListingCrawler,
    ListingParser, ReqwestFetcher,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = "https://example.com/blog";

#[test]
fn parser_keeps_marked_links_in_document_order() {
    let html = r##"
        <a href="/blog/first">First</a>
        <a href="/about">About</a>
        <a href="https://example.com/blog/second#comments">Second</a>
        <a href="/blog/first">First again</a>
        <a>no href</a>
        <a href="#top">Top</a>
    "##;
    let page = ListingParser::new("/blog/").parse(html, LISTING);
    assert_eq!(
        page.links,
        vec![
            "https://example.com/blog/first",
            "https://example.com/blog/second",
            "https://example.com/blog/first",
        ]
    );
    assert!(!page.has_next);
}

#[test]
fn parser_detects_next_marker_on_anchors_only() {
    let parser = ListingParser::new("/blog/");
    assert!(parser.parse(r#"<a class="next" href="?page=2">More</a>"#, LISTING).has_next);
    assert!(
        parser
            .parse(r#"<ul><li><a class="pagination-link" href="?page=3">3</a></li></ul>"#, LISTING)
            .has_next
    );
    assert!(!parser.parse(r#"<span class="next">More</span>"#, LISTING).has_next);
}

#[test]
fn parser_tolerates_empty_page() {
    let page = ListingParser::new("/blog/").parse("", LISTING);
    assert!(page.links.is_empty());
    assert!(!page.has_next);
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

fn crawler(server: &MockServer, max_pages: u32) -> ListingCrawler {
    ListingCrawler::new(
        Arc::new(ReqwestFetcher::new(FetchSettings::for_pages())),
        ListingParser::new("/blog/"),
        format!("{}/blog", server.uri()),
        max_pages,
        Duration::ZERO,
    )
}

#[tokio::test]
async fn crawl_follows_pages_until_marker_disappears() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .and(query_param_is_missing("page"))
        .respond_with(html(
            r#"<a href="/blog/a">a</a><a href="/blog/b">b</a><a class="next" href="?page=2">next</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .and(query_param("page", "2"))
        .respond_with(html(r#"<a href="/blog/b">b</a><a href="/blog/c">c</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = crawler(&server, 10).crawl().await;
    let base = server.uri();
    assert_eq!(
        outcome.urls,
        vec![
            format!("{base}/blog/a"),
            format!("{base}/blog/b"),
            format!("{base}/blog/c"),
        ]
    );
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.stop, Some(StopReason::NoNextPage));
}

#[tokio::test]
async fn crawl_stops_when_page_repeats_known_links() {
    let server = MockServer::start().await;
    let body = r#"<a href="/blog/a">a</a><a class="next" href="?page=2">next</a>"#;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(html(body))
        .expect(2)
        .mount(&server)
        .await;

    let outcome = crawler(&server, 10).crawl().await;
    assert_eq!(outcome.urls, vec![format!("{}/blog/a", server.uri())]);
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.stop, Some(StopReason::NoNewLinks));
}

#[tokio::test]
async fn crawl_keeps_urls_found_before_a_failed_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .and(query_param_is_missing("page"))
        .respond_with(html(
            r#"<a href="/blog/a">a</a><a class="next" href="?page=2">next</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let outcome = crawler(&server, 10).crawl().await;
    assert_eq!(outcome.urls, vec![format!("{}/blog/a", server.uri())]);
    assert_eq!(outcome.pages_fetched, 1);
    assert_eq!(outcome.stop, Some(StopReason::FetchFailed));
}

/// Serves an endless listing: every page has one fresh link and a next marker.
struct EndlessListing {
    requested: Mutex<Vec<String>>,
}

#[async_trait]
impl Fetcher for EndlessListing {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let mut requested = self.requested.lock().unwrap();
        requested.push(url.to_string());
        let body = format!(
            r##"<a href="/blog/post-{}">p</a><a class="next" href="#">next</a>"##,
            requested.len()
        );
        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: Some("text/html".to_string()),
                byte_len: body.len() as u64,
            },
            bytes: body.into_bytes(),
        })
    }
}

#[tokio::test]
async fn crawl_honours_page_ceiling() {
    let fetcher = Arc::new(EndlessListing {
        requested: Mutex::new(Vec::new()),
    });
    let crawler = ListingCrawler::new(
        fetcher.clone(),
        ListingParser::new("/blog/"),
        LISTING,
        3,
        Duration::ZERO,
    );

    let outcome = crawler.crawl().await;
    assert_eq!(outcome.urls.len(), 3);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.stop, Some(StopReason::PageLimit));
    assert_eq!(
        *fetcher.requested.lock().unwrap(),
        vec![
            "https://example.com/blog".to_string(),
            "https://example.com/blog?page=2".to_string(),
            "https://example.com/blog?page=3".to_string(),
        ]
    );
}

#[tokio::test]
async fn crawl_with_zero_page_ceiling_fetches_nothing() {
    let fetcher = Arc::new(EndlessListing {
        requested: Mutex::new(Vec::new()),
    });
    let crawler = ListingCrawler::new(
        fetcher.clone(),
        ListingParser::new("/blog/"),
        LISTING,
        0,
        Duration::ZERO,
    );

    let outcome = crawler.crawl().await;
    assert!(outcome.urls.is_empty());
    assert_eq!(outcome.pages_fetched, 0);
    assert_eq!(outcome.stop, Some(StopReason::PageLimit));
    assert!(fetcher.requested.lock().unwrap().is_empty());
}
