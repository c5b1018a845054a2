// tests/runtime_driver.rs
// Driver task on a paused tokio clock: load sequencing, input, teardown.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};

use review_carousel::carousel::{Container, ContainerChild, InputEvent, Page};
use review_carousel::content::{ContentSource, Review, ReviewFeed, StaticContentSource, UnavailableContentSource};
use review_carousel::render::TracingPresenter;
use review_carousel::runtime::{self, attach};
use review_carousel::{CarouselConfig, CarouselHandle, CarouselStatus, HiddenReason, Result, SlideSource};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn review(name: &str) -> Review {
    let json = format!(r#"{{"reviewer_name": "{}", "review_text": "Lovely ceremony"}}"#, name);
    serde_json::from_str(&json).unwrap()
}

fn feed(n: usize) -> ReviewFeed {
    ReviewFeed {
        reviews: (0..n).map(|i| review(&format!("Guest {}", i))).collect(),
    }
}

fn config() -> CarouselConfig {
    CarouselConfig {
        rotation_period_ms: 3000,
        ..CarouselConfig::default()
    }
}

fn start(source: impl ContentSource + 'static) -> CarouselHandle {
    runtime::spawn(
        Container::new("reviews"),
        config(),
        SlideSource::Feed(Arc::new(source)),
        Box::new(TracingPresenter),
    )
}

fn current(handle: &CarouselHandle) -> Option<usize> {
    handle.latest_frame().and_then(|f| f.current)
}

/// Source that answers after a delay, with a different feed each call.
/// Calls after the first wait `reload_delay`.
struct SlowSource {
    delay: Duration,
    reload_delay: Duration,
    calls: AtomicUsize,
}

impl SlowSource {
    fn new(delay: Duration, reload_delay: Duration) -> Self {
        Self {
            delay,
            reload_delay,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ContentSource for SlowSource {
    fn describe(&self) -> String {
        "slow".to_string()
    }

    async fn load(&self) -> Result<ReviewFeed> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(if call == 0 { self.delay } else { self.reload_delay }).await;
        Ok(feed(3 + call))
    }
}

#[tokio::test(start_paused = true)]
async fn test_ready_then_auto_rotates_when_visible() {
    let mut handle = start(StaticContentSource::new(feed(3)));
    assert_eq!(handle.loaded().await, CarouselStatus::Ready { slides: 3 });

    let frame = handle.latest_frame().unwrap();
    assert!(!frame.container_hidden);
    assert_eq!(frame.active_count(), 1);
    assert_eq!(frame.current, Some(0));

    // not visible yet: nothing moves
    sleep(ms(10_000)).await;
    assert_eq!(current(&handle), Some(0));

    handle.send(InputEvent::Intersection(0.8));
    sleep(ms(3050)).await;
    let frame = handle.latest_frame().unwrap();
    assert_eq!(frame.current, Some(1));
    assert!(!frame.settled);

    sleep(ms(100)).await;
    let frame = handle.latest_frame().unwrap();
    assert!(frame.settled);
    assert_eq!(frame.slides[1].class, "carousel-slide active");
    assert_eq!(frame.slides[0].class, "carousel-slide offscreen-left");

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_feed_stays_hidden() {
    let mut handle = start(StaticContentSource::new(ReviewFeed::default()));
    assert_eq!(handle.loaded().await, CarouselStatus::Hidden(HiddenReason::Empty));
    assert!(handle.latest_frame().is_none());

    sleep(ms(60_000)).await;
    assert!(handle.latest_frame().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_stays_hidden() {
    let mut handle = start(UnavailableContentSource);
    match handle.loaded().await {
        CarouselStatus::Hidden(HiddenReason::LoadFailed(reason)) => assert!(reason.contains("503")),
        other => panic!("unexpected status {:?}", other),
    }
    assert!(handle.latest_frame().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_hover_pauses_driver() {
    let mut handle = start(StaticContentSource::new(feed(3)));
    handle.loaded().await;

    handle.send(InputEvent::Intersection(1.0));
    handle.send(InputEvent::PointerEnter);
    sleep(ms(20_000)).await;
    assert_eq!(current(&handle), Some(0));

    handle.send(InputEvent::PointerLeave);
    sleep(ms(2900)).await;
    assert_eq!(current(&handle), Some(0));
    sleep(ms(200)).await;
    assert_eq!(current(&handle), Some(1));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_manual_button_uses_grace_period() {
    let mut handle = start(StaticContentSource::new(feed(3)));
    handle.loaded().await;
    handle.send(InputEvent::Intersection(1.0));

    sleep(ms(1000)).await;
    handle.send(InputEvent::NextButton);
    sleep(ms(10)).await;
    assert_eq!(current(&handle), Some(1));

    // the 3000 ms auto deadline would have been at t=3000
    sleep(ms(4900)).await;
    assert_eq!(current(&handle), Some(1));
    sleep(ms(200)).await;
    assert_eq!(current(&handle), Some(2));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_input_before_load_is_applied_after() {
    let mut handle = start(SlowSource::new(ms(500), ms(500)));
    assert!(handle.send(InputEvent::NextButton));
    assert_eq!(handle.status(), CarouselStatus::Loading);

    assert_eq!(handle.loaded().await, CarouselStatus::Ready { slides: 3 });
    sleep(ms(150)).await;
    assert_eq!(current(&handle), Some(1));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_reload_replaces_sequence() {
    let mut handle = start(SlowSource::new(ms(10), ms(10)));
    handle.loaded().await;
    handle.send(InputEvent::NextButton);
    sleep(ms(150)).await;
    assert_eq!(current(&handle), Some(1));

    assert!(handle.reload());
    sleep(ms(50)).await;
    assert_eq!(handle.status(), CarouselStatus::Ready { slides: 4 });
    let frame = handle.latest_frame().unwrap();
    assert_eq!(frame.slides.len(), 4);
    assert_eq!(frame.current, Some(0));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_slow_reload_keeps_rotating() {
    let mut handle = start(SlowSource::new(ms(10), ms(8000)));
    assert_eq!(handle.loaded().await, CarouselStatus::Ready { slides: 3 });
    handle.send(InputEvent::Intersection(1.0));
    assert!(handle.reload());

    // the 3000 ms advance fires while the re-fetch is still out
    sleep(ms(3200)).await;
    assert_eq!(current(&handle), Some(1));
    assert_eq!(handle.status(), CarouselStatus::Ready { slides: 3 });

    // a second request while one is in flight is ignored
    assert!(handle.reload());
    sleep(ms(5000)).await;
    assert_eq!(handle.status(), CarouselStatus::Ready { slides: 4 });
    assert_eq!(current(&handle), Some(0));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_reload_is_prompt() {
    let mut handle = start(SlowSource::new(ms(10), ms(8000)));
    handle.loaded().await;
    assert!(handle.reload());
    sleep(ms(100)).await;

    let started = Instant::now();
    handle.shutdown().await;
    assert!(started.elapsed() < ms(1000));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_driver() {
    let mut handle = start(StaticContentSource::new(feed(2)));
    handle.loaded().await;
    handle.send(InputEvent::Intersection(1.0));

    let frames = handle.frames();
    handle.shutdown().await;

    // no frame is ever published after teardown
    sleep(ms(30_000)).await;
    assert!(!frames.has_changed().unwrap_or(false));
    assert_eq!(frames.borrow().as_ref().and_then(|f| f.current), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_attach_adopts_markup() {
    let mut page = Page::new(vec![Container::new("traditions").with_children(vec![
        ContainerChild::Bare { html: "<p>Handfasting</p>".into() },
        ContainerChild::Bare { html: "<p>Jumping the broom</p>".into() },
    ])]);

    let mut handle = attach(
        &mut page,
        "traditions",
        config(),
        SlideSource::Markup,
        Box::new(TracingPresenter),
    )
    .expect("container exists");
    assert_eq!(handle.loaded().await, CarouselStatus::Ready { slides: 2 });

    handle.send(InputEvent::FocusIn);
    handle.send(InputEvent::Key(review_carousel::carousel::Key::ArrowLeft));
    sleep(ms(150)).await;
    assert_eq!(current(&handle), Some(1));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_attach_missing_container_does_nothing() {
    let mut page = Page::new(vec![Container::new("reviews")]);
    let handle = attach(
        &mut page,
        "promo",
        config(),
        SlideSource::Markup,
        Box::new(TracingPresenter),
    );
    assert!(handle.is_none());
}
