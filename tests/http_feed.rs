// tests/http_feed.rs
// HttpContentSource against a local axum server.

use axum::{Router, http::StatusCode, routing::get};
use std::sync::Arc;
use std::time::Duration;

use review_carousel::content::{ContentSource, HttpContentSource};
use review_carousel::render::TracingPresenter;
use review_carousel::runtime;
use review_carousel::carousel::Container;
use review_carousel::{CarouselConfig, CarouselError, CarouselStatus, HiddenReason, SlideSource};

const FEED: &str = r#"{"reviews": [
    {"reviewer_name": "Priya", "review_text_highlighted": "The mehndi night was magical", "rating": 5,
     "relative_date": "3 weeks ago", "is_local_guide": true, "photo_count": 4},
    {"reviewer_name": "Tom", "review_text": "Great guide to ceilidh traditions", "rating": 4,
     "rotation_delay": 8000}
]}"#;

async fn serve() -> String {
    let app = Router::new()
        .route("/reviews.json", get(|| async { ([("content-type", "application/json")], FEED) }))
        .route("/empty.json", get(|| async { r#"{"reviews": []}"# }))
        .route("/broken.json", get(|| async { "{\"reviews\": [" }))
        .route("/missing.json", get(|| async { (StatusCode::NOT_FOUND, "gone") }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn source(base: &str, path: &str) -> HttpContentSource {
    HttpContentSource::new(format!("{}{}", base, path), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetches_and_decodes_feed() {
    let base = serve().await;
    let feed = source(&base, "/reviews.json").load().await.unwrap();

    assert_eq!(feed.reviews.len(), 2);
    assert_eq!(feed.reviews[0].text(), "The mehndi night was magical");
    assert_eq!(feed.reviews[0].display_date(), Some("3 weeks ago"));
    assert_eq!(feed.reviews[1].rating(), 4.0);
    assert_eq!(feed.reviews[1].rotation_override(), Some(Duration::from_millis(8000)));
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let base = serve().await;
    let err = source(&base, "/missing.json").load().await.unwrap_err();
    assert!(matches!(err, CarouselError::HttpStatus(404)));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let base = serve().await;
    let err = source(&base, "/broken.json").load().await.unwrap_err();
    assert!(matches!(err, CarouselError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_load_error() {
    // port 9 (discard) on localhost is reliably closed in test environments
    let err = HttpContentSource::new("http://127.0.0.1:9/reviews.json", Duration::from_secs(2))
        .unwrap()
        .load()
        .await
        .unwrap_err();
    assert!(matches!(err, CarouselError::ContentLoad(_)));
}

#[tokio::test]
async fn test_driver_from_configured_url() {
    let base = serve().await;
    let config = CarouselConfig {
        content_url: Some(format!("{}/reviews.json", base)),
        ..CarouselConfig::default()
    };
    let source = SlideSource::from_config(&config).unwrap();
    let mut handle = runtime::spawn(Container::new("reviews"), config, source, Box::new(TracingPresenter));

    assert_eq!(handle.loaded().await, CarouselStatus::Ready { slides: 2 });
    let frame = handle.latest_frame().unwrap();
    assert_eq!(frame.indicators, vec![true, false]);
    handle.shutdown().await;
}

#[tokio::test]
async fn test_driver_hidden_on_404_and_empty() {
    let base = serve().await;

    let missing = SlideSource::Feed(Arc::new(source(&base, "/missing.json")));
    let mut handle = runtime::spawn(Container::new("a"), CarouselConfig::default(), missing, Box::new(TracingPresenter));
    assert!(matches!(handle.loaded().await, CarouselStatus::Hidden(HiddenReason::LoadFailed(_))));

    let empty = SlideSource::Feed(Arc::new(source(&base, "/empty.json")));
    let mut handle = runtime::spawn(Container::new("b"), CarouselConfig::default(), empty, Box::new(TracingPresenter));
    assert_eq!(handle.loaded().await, CarouselStatus::Hidden(HiddenReason::Empty));
    assert!(handle.latest_frame().is_none());
}
