// src/error.rs
//! Error taxonomy for the carousel.
//!
//! None of these ever reach the page: the runtime absorbs them, logs them and
//! leaves the carousel hidden. They exist so callers and tests can tell why.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarouselError {
    #[error("Content load failed: {0}")]
    ContentLoad(#[from] reqwest::Error),

    #[error("Content source returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Content decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Content source returned no slides")]
    EmptyContent,

    #[error("Carousel container not found: {0}")]
    MissingContainer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CarouselError>;
