// src/runtime.rs
//! Async driver for one carousel.
//!
//! Loads the slides, then runs the engine on a single tokio task: input
//! events, timer deadlines and cancellation are handled one at a time, each
//! to completion. Nothing is wired up until the load has settled, and any
//! failure leaves the carousel hidden instead of surfacing an error.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::carousel::{Carousel, Container, ContainerChild, InputEvent, InputMapper, Page, SlideDeck};
use crate::config::CarouselConfig;
use crate::content::{ContentSource, HttpContentSource, ReviewFeed};
use crate::error::{CarouselError, Result};
use crate::render::{Frame, Presenter};

/// Where the slides come from
#[derive(Clone)]
pub enum SlideSource {
    /// Fetch the review feed, replacing the container's children
    Feed(Arc<dyn ContentSource>),
    /// Adopt the container's existing markup
    Markup,
}

impl SlideSource {
    /// Feed when a content URL is configured, markup otherwise
    pub fn from_config(config: &CarouselConfig) -> Result<Self> {
        match &config.content_url {
            Some(url) => Ok(Self::Feed(Arc::new(HttpContentSource::new(
                url.clone(),
                config.fetch_timeout(),
            )?))),
            None => Ok(Self::Markup),
        }
    }
}

/// Why a carousel stayed hidden
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiddenReason {
    LoadFailed(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarouselStatus {
    Loading,
    Ready { slides: usize },
    Hidden(HiddenReason),
    Stopped,
}

enum Control {
    Input(InputEvent),
    Reload,
}

const CONTROL_BUFFER: usize = 100;

/// Owner-side handle. Dropping every handle tears the carousel down.
pub struct CarouselHandle {
    control: mpsc::Sender<Control>,
    status: watch::Receiver<CarouselStatus>,
    frames: watch::Receiver<Option<Frame>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl CarouselHandle {
    /// Queue an input event. Events sent before the load settles are
    /// processed after it. Returns false once the carousel is gone.
    pub fn send(&self, event: InputEvent) -> bool {
        self.control.try_send(Control::Input(event)).is_ok()
    }

    /// Re-fetch the slides and replace the whole sequence
    pub fn reload(&self) -> bool {
        self.control.try_send(Control::Reload).is_ok()
    }

    pub fn status(&self) -> CarouselStatus {
        self.status.borrow().clone()
    }

    /// Wait until the initial load has settled
    pub async fn loaded(&mut self) -> CarouselStatus {
        let settled = self
            .status
            .wait_for(|s| *s != CarouselStatus::Loading)
            .await
            .map(|s| s.clone());
        settled.unwrap_or(CarouselStatus::Stopped)
    }

    pub fn latest_frame(&self) -> Option<Frame> {
        self.frames.borrow().clone()
    }

    pub fn frames(&self) -> watch::Receiver<Option<Frame>> {
        self.frames.clone()
    }

    /// Cancel the driver and wait for it to exit; pending timers die with it
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!("[CAROUSEL] Driver task failed: {}", e);
        }
    }
}

/// Attach a carousel to a container on the page.
///
/// Returns `None` when the container is missing: the feature simply does
/// not initialise.
pub fn attach(
    page: &mut Page,
    container_id: &str,
    config: CarouselConfig,
    source: SlideSource,
    presenter: Box<dyn Presenter>,
) -> Option<CarouselHandle> {
    match page.take(container_id) {
        Ok(container) => Some(spawn(container, config, source, presenter)),
        Err(e) => {
            debug!("[CAROUSEL] Not initialising: {}", e);
            None
        }
    }
}

/// Start the driver task for a container
pub fn spawn(
    container: Container,
    config: CarouselConfig,
    source: SlideSource,
    presenter: Box<dyn Presenter>,
) -> CarouselHandle {
    let (control_tx, control_rx) = mpsc::channel(CONTROL_BUFFER);
    let (status_tx, status_rx) = watch::channel(CarouselStatus::Loading);
    let (frame_tx, frame_rx) = watch::channel(None);
    let cancel = CancellationToken::new();

    let driver = Driver {
        config,
        source,
        container,
        presenter,
        status: status_tx,
        frames: frame_tx,
        reload_task: None,
    };
    let task = tokio::spawn(driver.run(control_rx, cancel.clone()));

    CarouselHandle {
        control: control_tx,
        status: status_rx,
        frames: frame_rx,
        cancel,
        task,
    }
}

struct Driver {
    config: CarouselConfig,
    source: SlideSource,
    container: Container,
    presenter: Box<dyn Presenter>,
    status: watch::Sender<CarouselStatus>,
    frames: watch::Sender<Option<Frame>>,
    /// In-flight feed re-fetch; its result arrives on the reload channel
    reload_task: Option<JoinHandle<()>>,
}

impl Driver {
    async fn run(mut self, mut control: mpsc::Receiver<Control>, cancel: CancellationToken) {
        let loaded = tokio::select! {
            _ = cancel.cancelled() => None,
            loaded = self.load_deck() => Some(loaded),
        };
        let Some(loaded) = loaded else {
            self.status.send_replace(CarouselStatus::Stopped);
            return;
        };

        let deck = match loaded {
            Ok(deck) if deck.is_empty() => {
                info!("[CAROUSEL] '{}' has no slides, staying hidden", self.container.id);
                self.status.send_replace(CarouselStatus::Hidden(HiddenReason::Empty));
                return;
            }
            Ok(deck) => deck,
            Err(e) => {
                warn!("[CAROUSEL] '{}' failed to load: {}", self.container.id, e);
                self.status
                    .send_replace(CarouselStatus::Hidden(HiddenReason::LoadFailed(e.to_string())));
                return;
            }
        };

        self.container.hidden = false;
        let mut carousel = Carousel::new(deck, &self.config);
        let mut mapper = InputMapper::new(self.config.swipe_threshold_px);
        self.present(&carousel);
        let mut presented = carousel.revision();
        self.status
            .send_replace(CarouselStatus::Ready { slides: carousel.len() });

        let (reload_tx, mut reload_rx) = mpsc::channel::<Result<ReviewFeed>>(1);

        loop {
            let deadline = carousel.next_deadline();

            tokio::select! {
                _ = cancel.cancelled() => break,
                msg = control.recv() => match msg {
                    Some(Control::Input(event)) => {
                        if let Some(command) = mapper.map(event) {
                            command.apply(&mut carousel, Instant::now());
                        }
                    }
                    Some(Control::Reload) => self.start_reload(&mut carousel, &reload_tx),
                    None => break,
                },
                Some(fetched) = reload_rx.recv() => {
                    self.reload_task = None;
                    let deck = fetched.map(|feed| self.populate(&feed));
                    self.finish_reload(deck, &mut carousel);
                }
                _ = wait_for(deadline) => {
                    carousel.poll(Instant::now());
                }
            }

            if carousel.revision() != presented {
                self.present(&carousel);
                presented = carousel.revision();
            }
        }

        if let Some(task) = self.reload_task.take() {
            task.abort();
        }
        info!("[CAROUSEL] '{}' stopped", self.container.id);
        self.status.send_replace(CarouselStatus::Stopped);
    }

    async fn load_deck(&mut self) -> Result<SlideDeck> {
        match &self.source {
            SlideSource::Feed(source) => {
                info!("[CAROUSEL] Loading '{}' from {}", self.container.id, source.describe());
                let feed = source.load().await?;
                Ok(self.populate(&feed))
            }
            SlideSource::Markup => Ok(SlideDeck::adopt(&mut self.container)),
        }
    }

    /// Replace the container's children with the feed's slides
    fn populate(&mut self, feed: &ReviewFeed) -> SlideDeck {
        let deck = SlideDeck::from_feed(feed, self.config.max_slides);
        self.container.children = deck
            .slides
            .iter()
            .map(|s| ContainerChild::Wrapped {
                class: format!("carousel-slide {}", s.state.css_class()),
                html: s.content.html.clone(),
            })
            .collect();
        deck
    }

    // Markup is re-adopted on the spot. A feed is re-fetched on its own task
    // so rotation, input and cancellation keep running meanwhile.
    fn start_reload(&mut self, carousel: &mut Carousel, done: &mpsc::Sender<Result<ReviewFeed>>) {
        let source = match &self.source {
            SlideSource::Feed(source) => Arc::clone(source),
            SlideSource::Markup => {
                let deck = SlideDeck::adopt(&mut self.container);
                self.finish_reload(Ok(deck), carousel);
                return;
            }
        };

        if self.reload_task.is_some() {
            debug!("[CAROUSEL] Reload of '{}' already in flight", self.container.id);
            return;
        }

        info!("[CAROUSEL] Reloading '{}' from {}", self.container.id, source.describe());
        let done = done.clone();
        self.reload_task = Some(tokio::spawn(async move {
            let fetched = source.load().await;
            if done.send(fetched).await.is_err() {
                debug!("[CAROUSEL] Reload finished after the carousel stopped");
            }
        }));
    }

    // A failed reload keeps the slides already showing.
    fn finish_reload(&mut self, deck: Result<SlideDeck>, carousel: &mut Carousel) {
        match deck {
            Ok(deck) => {
                carousel.replace_deck(deck, Instant::now());
                let status = if carousel.is_enabled() {
                    CarouselStatus::Ready { slides: carousel.len() }
                } else {
                    CarouselStatus::Hidden(HiddenReason::Empty)
                };
                self.container.hidden = !carousel.is_enabled();
                self.status.send_replace(status);
            }
            Err(e) => {
                warn!("[CAROUSEL] Reload of '{}' failed, keeping current slides: {}", self.container.id, e);
            }
        }
    }

    fn present(&mut self, carousel: &Carousel) {
        let frame = Frame::project(carousel);
        self.presenter.present(&frame, carousel);
        self.frames.send_replace(Some(frame));
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Load a feed once and build its deck, outside any running carousel
pub async fn load_feed_deck(source: &dyn ContentSource, max_slides: usize) -> Result<SlideDeck> {
    let feed = source.load().await?;
    let deck = SlideDeck::from_feed(&feed, max_slides);
    if deck.is_empty() {
        return Err(CarouselError::EmptyContent);
    }
    Ok(deck)
}
