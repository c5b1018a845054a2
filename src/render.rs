// src/render.rs
//! Projection from engine state to what the page shows.
//!
//! A `Frame` is a pure function of the engine; presenters receive one after
//! every visual change and never see the engine itself.

use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

use crate::carousel::{Carousel, SlideState};
use crate::markup::review_summary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideView {
    pub index: usize,
    pub state: SlideState,
    /// Full class attribute for the slide wrapper
    pub class: String,
    pub aria_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub revision: u64,
    pub container_hidden: bool,
    pub current: Option<usize>,
    pub slides: Vec<SlideView>,
    /// One entry per indicator dot, true for the current slide
    pub indicators: Vec<bool>,
    pub settled: bool,
}

impl Frame {
    pub fn project(carousel: &Carousel) -> Self {
        let slides = carousel
            .slides()
            .iter()
            .map(|slide| {
                let mut class = format!("carousel-slide {}", slide.state.css_class());
                if slide.suppress_transition {
                    class.push_str(" no-transition");
                }
                SlideView {
                    index: slide.index,
                    state: slide.state,
                    class,
                    aria_hidden: !slide.state.is_active(),
                }
            })
            .collect();

        let indicators = (0..carousel.len())
            .map(|i| carousel.current_index() == Some(i))
            .collect();

        Self {
            revision: carousel.revision(),
            container_hidden: !carousel.is_enabled(),
            current: carousel.current_index(),
            slides,
            indicators,
            settled: !carousel.is_transitioning(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.slides.iter().filter(|s| s.state.is_active()).count()
    }
}

/// Receives a frame after every visual change
pub trait Presenter: Send {
    fn present(&mut self, frame: &Frame, carousel: &Carousel);
}

/// Logs each frame through tracing
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn present(&mut self, frame: &Frame, _carousel: &Carousel) {
        if frame.container_hidden {
            debug!("[CAROUSEL] Frame r{}: hidden", frame.revision);
            return;
        }
        let classes: Vec<&str> = frame.slides.iter().map(|s| s.class.as_str()).collect();
        debug!(
            "[CAROUSEL] Frame r{}: current={:?} [{}]",
            frame.revision,
            frame.current,
            classes.join(" | ")
        );
    }
}

/// Prints the settled slide to a writer (stdout in the CLI)
pub struct TerminalPresenter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn present(&mut self, frame: &Frame, carousel: &Carousel) {
        if !frame.settled {
            return;
        }
        let Some(current) = frame.current else {
            if writeln!(self.out, "(carousel hidden)").is_err() {
                info!("[CAROUSEL] Terminal output closed");
            }
            return;
        };

        let dots: String = frame
            .indicators
            .iter()
            .map(|on| if *on { '●' } else { '○' })
            .collect();
        let body = carousel
            .slides()
            .get(current)
            .map(|slide| match &slide.content.review {
                Some(review) => review_summary(review),
                None => slide.content.html.clone(),
            })
            .unwrap_or_default();

        if writeln!(self.out, "{} [{}/{}] {}", dots, current + 1, frame.slides.len(), body).is_err() {
            info!("[CAROUSEL] Terminal output closed");
        }
    }
}
