// src/lib.rs

pub mod carousel;
pub mod config;
pub mod content;
pub mod error;
pub mod markup;
pub mod render;
pub mod runtime;

pub use carousel::{Carousel, NavigationCause, SlideDeck, SlideState};
pub use config::CarouselConfig;
pub use error::{CarouselError, Result};
pub use runtime::{CarouselHandle, CarouselStatus, HiddenReason, SlideSource};
