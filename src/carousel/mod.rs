// src/carousel/mod.rs
//! Review carousel - direction-aware slide rotation
//!
//! One engine per container. Slides come from the review feed or from the
//! container's own markup; the engine rotates through them on a timer,
//! pauses on hover or when scrolled out of view, and backs off after the
//! visitor navigates by hand.

pub mod deck;
pub mod engine;
pub mod input;
pub mod slide;

pub use deck::{Container, ContainerChild, Page, SlideDeck};
pub use engine::{Carousel, NavigationCause, RotationSchedule, RotationTimer, Transition};
pub use input::{Command, InputEvent, InputMapper, Key};
pub use slide::{Direction, Slide, SlideContent, SlideState};
