//! Integration tests for collecting reviews over real HTTP with `HttpSession`.
//!
//! Uses `wiremock` to serve storefront pages locally so no real network
//! traffic is made.

use revscope_scraper::{
    BrowserSession, Collector, HttpSession, NavigationTiming, Navigator, ScraperError,
    StopReason, StorefrontAdapter,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REVIEWS_PATH: &str = "/product-reviews/B0C1234567";

fn review(id: &str, body: &str) -> String {
    format!(
        r#"<div data-hook="review" id="{id}">
             <span class="a-profile-name">Reviewer {id}</span>
             <i data-hook="review-star-rating"><span>5.0 out of 5 stars</span></i>
             <a data-hook="review-title"><span>Title {id}</span></a>
             <span data-hook="review-date">Reviewed in India on 2 February 2024</span>
             <span data-hook="review-body"><span>{body}</span></span>
             <span data-hook="helpful-vote-statement">One person found this helpful</span>
           </div>"#
    )
}

fn page(reviews: &[(&str, &str)], next: Option<&str>) -> String {
    let blocks: String = reviews.iter().map(|(id, body)| review(id, body)).collect();
    let pagination = next.map_or_else(
        || r#"<li class="a-disabled a-last">Next page</li>"#.to_string(),
        |href| format!(r#"<li class="a-last"><a href="{href}">Next page</a></li>"#),
    );
    format!(
        r#"<html><body><div id="cm_cr-review_list">{blocks}</div><ul>{pagination}</ul></body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

fn test_session() -> HttpSession {
    HttpSession::new(5, "revscope-test/0.1").expect("failed to build test HttpSession")
}

fn collector(adapter: &StorefrontAdapter, attempts: u32) -> Collector<'_, StorefrontAdapter> {
    let navigator = Navigator::new(
        adapter,
        NavigationTiming::immediate(attempts),
        CancellationToken::new(),
    );
    Collector::new(navigator, None)
}

#[tokio::test]
async fn collects_and_dedups_across_linked_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REVIEWS_PATH))
        .and(query_param("pageNumber", "2"))
        .respond_with(html(page(&[("R2", "Again"), ("R3", "Meh")], None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(REVIEWS_PATH))
        .respond_with(html(page(
            &[("R1", "Love it"), ("R2", "Again")],
            Some(&format!("{REVIEWS_PATH}?pageNumber=2")),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = StorefrontAdapter::new();
    let mut session = test_session();
    let start = format!("{}{REVIEWS_PATH}", server.uri());

    let collection = collector(&adapter, 3)
        .collect(&mut session, &start)
        .await
        .expect("collection should succeed");

    let ids: Vec<&str> = collection.reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["R1", "R2", "R3"]);
    assert_eq!(collection.duplicates, 1);
    assert_eq!(collection.stop, StopReason::LastPage);

    let first = &collection.reviews[0];
    assert_eq!(first.reviewer_name, "Reviewer R1");
    assert_eq!(first.rating, 5.0);
    assert_eq!(first.date, "2 February 2024");
    assert_eq!(first.country, "India");
    assert_eq!(first.helpful_votes, 1);
}

#[tokio::test]
async fn not_found_status_exhausts_attempts_on_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REVIEWS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Document Not Found"))
        .expect(2)
        .mount(&server)
        .await;

    let adapter = StorefrontAdapter::new();
    let mut session = test_session();
    let start = format!("{}{REVIEWS_PATH}", server.uri());

    let err = collector(&adapter, 2)
        .collect(&mut session, &start)
        .await
        .expect_err("first-page failure must fail the run");

    assert!(
        matches!(err.source, ScraperError::NavigationFailed { attempts: 2, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn redirect_to_challenge_fails_without_retry() {
    let server = MockServer::start().await;
    let captcha = format!("{}/errors/validateCaptcha", server.uri());

    Mock::given(method("GET"))
        .and(path(REVIEWS_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("location", captcha.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/errors/validateCaptcha"))
        .respond_with(html(
            r#"<html><body><div class="a-row a-text-center"><img src="/c.jpg"></div></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = StorefrontAdapter::new();
    let mut session = test_session();
    let start = format!("{}{REVIEWS_PATH}", server.uri());

    let err = collector(&adapter, 5)
        .collect(&mut session, &start)
        .await
        .expect_err("challenge must fail the run");

    assert!(matches!(err.source, ScraperError::ChallengeDetected { .. }));
    assert_eq!(session.current_url(), captcha);
}

#[tokio::test]
async fn soft_verified_page_writes_snapshot_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REVIEWS_PATH))
        .respond_with(html("<html><body>Loading reviews</body></html>".to_string()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = StorefrontAdapter::new();
    let navigator = Navigator::new(
        &adapter,
        NavigationTiming::immediate(1),
        CancellationToken::new(),
    )
    .with_snapshot_dir(dir.path());
    let mut session = test_session();
    let start = format!("{}{REVIEWS_PATH}", server.uri());

    let collection = Collector::new(navigator, None)
        .collect(&mut session, &start)
        .await
        .expect("soft-verified page still collects");

    assert!(collection.reviews.is_empty());
    let snapshots: Vec<_> = std::fs::read_dir(dir.path())
        .expect("snapshot dir exists")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    assert!(
        snapshots.iter().any(|name| name.starts_with("reviews_page_")),
        "snapshots: {snapshots:?}"
    );
}
