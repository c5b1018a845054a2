// src/carousel/deck.rs
//! Building the slide sequence.
//!
//! Two paths: replace-then-populate from the review feed, or wrap-in-place
//! adoption of whatever slide markup the container already holds.

use std::time::Duration;
use tracing::debug;

use super::slide::{Slide, SlideContent, SlideState};
use crate::content::ReviewFeed;
use crate::error::{CarouselError, Result};
use crate::markup::render_review_card;

/// Child element of a carousel container
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerChild {
    /// Already wrapped in a slide wrapper carrying a state class
    Wrapped { class: String, html: String },
    /// Raw item that still needs a wrapper
    Bare { html: String },
}

/// Minimal model of the carousel's host element
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub hidden: bool,
    pub children: Vec<ContainerChild>,
}

impl Container {
    /// Containers start hidden until the carousel has something to show
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hidden: true,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ContainerChild>) -> Self {
        self.children = children;
        self
    }
}

/// The containers present on a page, by id
#[derive(Debug, Clone, Default)]
pub struct Page {
    containers: Vec<Container>,
}

impl Page {
    pub fn new(containers: Vec<Container>) -> Self {
        Self { containers }
    }

    /// Detach a container so a carousel can own it
    pub fn take(&mut self, id: &str) -> Result<Container> {
        let pos = self
            .containers
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CarouselError::MissingContainer(id.to_string()))?;
        Ok(self.containers.remove(pos))
    }
}

/// Ordered slides plus their index-aligned rotation overrides
#[derive(Debug, Clone, Default)]
pub struct SlideDeck {
    pub slides: Vec<Slide>,
    pub overrides: Vec<Option<Duration>>,
}

impl SlideDeck {
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Slides from raw payloads: 0 active, the rest waiting off to the right
    pub fn from_contents(contents: Vec<SlideContent>) -> Self {
        let slides: Vec<Slide> = contents
            .into_iter()
            .enumerate()
            .map(|(i, content)| Slide::new(i, content, initial_state(i)))
            .collect();
        let overrides = vec![None; slides.len()];
        Self { slides, overrides }
    }

    /// Replace-then-populate from the review feed, keeping the first
    /// `max_slides` reviews
    pub fn from_feed(feed: &ReviewFeed, max_slides: usize) -> Self {
        let kept = feed.reviews.len().min(max_slides);
        if kept < feed.reviews.len() {
            debug!(
                "[CAROUSEL] Feed has {} reviews, showing the first {}",
                feed.reviews.len(),
                kept
            );
        }
        let mut slides = Vec::with_capacity(kept);
        let mut overrides = Vec::with_capacity(kept);

        for (i, review) in feed.reviews.iter().take(kept).enumerate() {
            let content = SlideContent {
                html: render_review_card(review),
                review: Some(review.clone()),
            };
            slides.push(Slide::new(i, content, initial_state(i)));
            overrides.push(review.rotation_override());
        }

        debug!("[CAROUSEL] Built {} slides from review feed", slides.len());
        Self { slides, overrides }
    }

    /// Wrap-in-place adoption of the container's existing children.
    ///
    /// Wrapped children keep their pre-set state; bare children are wrapped
    /// and the originals replaced. Afterwards exactly one slide is active.
    pub fn adopt(container: &mut Container) -> Self {
        let mut slides = Vec::with_capacity(container.children.len());

        for (i, child) in container.children.iter().enumerate() {
            let slide = match child {
                ContainerChild::Wrapped { class, html } => {
                    let state = class
                        .split_whitespace()
                        .find_map(SlideState::from_class)
                        .map(settle)
                        .unwrap_or(SlideState::OffscreenRight);
                    Slide::new(i, SlideContent::from_html(html.clone()), state)
                }
                ContainerChild::Bare { html } => {
                    Slide::new(i, SlideContent::from_html(html.clone()), initial_state(i))
                }
            };
            slides.push(slide);
        }

        normalize_active(&mut slides);

        container.children = slides
            .iter()
            .map(|s| ContainerChild::Wrapped {
                class: format!("carousel-slide {}", s.state.css_class()),
                html: s.content.html.clone(),
            })
            .collect();

        debug!(
            "[CAROUSEL] Adopted {} slides from container '{}'",
            slides.len(),
            container.id
        );
        let overrides = vec![None; slides.len()];
        Self { slides, overrides }
    }
}

fn initial_state(index: usize) -> SlideState {
    if index == 0 {
        SlideState::Active
    } else {
        SlideState::OffscreenRight
    }
}

// A half-finished transition in saved markup lands where it was heading.
fn settle(state: SlideState) -> SlideState {
    match state {
        SlideState::EnteringLeft | SlideState::EnteringRight => SlideState::Active,
        SlideState::ExitingLeft => SlideState::OffscreenLeft,
        SlideState::ExitingRight => SlideState::OffscreenRight,
        other => other,
    }
}

fn normalize_active(slides: &mut [Slide]) {
    let mut seen_active = false;
    for slide in slides.iter_mut() {
        if slide.state.is_active() {
            if seen_active {
                slide.state = SlideState::OffscreenRight;
            }
            seen_active = true;
        }
    }
    if !seen_active {
        if let Some(first) = slides.first_mut() {
            first.state = SlideState::Active;
        }
    }
}
