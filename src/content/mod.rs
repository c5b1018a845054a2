// src/content/mod.rs
//! Review feed: wire types and the sources that produce them.
//!
//! The feed is a single JSON document (`{"reviews": [...]}`) fetched once at
//! start-up. Every field except the reviewer name is optional and falls back
//! to a sensible default; nothing else is validated.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CarouselError, Result};

pub use http::HttpContentSource;

/// Root of the review feed document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewFeed {
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// One review record, as published by the feed.
///
/// Numeric fields arrive as any JSON number or `null`; the accessors apply
/// the fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviewer_name: String,
    #[serde(default)]
    pub review_text: Option<String>,
    /// Preferred over `review_text` when both are present
    #[serde(default)]
    pub review_text_highlighted: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_date: Option<String>,
    #[serde(default)]
    pub relative_date: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_local_guide: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
    #[serde(default)]
    pub photo_count: Option<f64>,
    #[serde(default)]
    pub helpful_count: Option<f64>,
    /// Per-slide rotation override, milliseconds
    #[serde(default)]
    pub rotation_delay: Option<f64>,
}

const DEFAULT_RATING: f64 = 5.0;

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn count(value: Option<f64>) -> u32 {
    value.map(|n| n.max(0.0) as u32).unwrap_or(0)
}

impl Review {
    /// Body text: the highlighted variant wins, then the plain text
    pub fn text(&self) -> &str {
        self.review_text_highlighted
            .as_deref()
            .or(self.review_text.as_deref())
            .unwrap_or("")
    }

    /// Display date, first of review_date / relative_date / date
    pub fn display_date(&self) -> Option<&str> {
        self.review_date
            .as_deref()
            .or(self.relative_date.as_deref())
            .or(self.date.as_deref())
            .filter(|d| !d.trim().is_empty())
    }

    /// Star rating; missing, null or zero reads as 5
    pub fn rating(&self) -> f64 {
        self.rating
            .filter(|r| *r != 0.0 && r.is_finite())
            .unwrap_or(DEFAULT_RATING)
    }

    pub fn photo_count(&self) -> u32 {
        count(self.photo_count)
    }

    pub fn helpful_count(&self) -> u32 {
        count(self.helpful_count)
    }

    /// Positive delays only, rounded to whole milliseconds
    pub fn rotation_override(&self) -> Option<Duration> {
        self.rotation_delay
            .filter(|ms| ms.is_finite())
            .map(f64::round)
            .filter(|ms| *ms >= 1.0)
            .map(|ms| Duration::from_millis(ms as u64))
    }
}

impl ReviewFeed {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Anything that can produce the review feed once
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short label used in logs
    fn describe(&self) -> String;

    async fn load(&self) -> Result<ReviewFeed>;
}

/// Feed held in memory (pre-rendered pages, tests)
#[derive(Debug, Clone, Default)]
pub struct StaticContentSource {
    feed: ReviewFeed,
}

impl StaticContentSource {
    pub fn new(feed: ReviewFeed) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    fn describe(&self) -> String {
        format!("static ({} reviews)", self.feed.reviews.len())
    }

    async fn load(&self) -> Result<ReviewFeed> {
        Ok(self.feed.clone())
    }
}

/// Feed read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileContentSource {
    path: PathBuf,
}

impl FileContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for FileContentSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn load(&self) -> Result<ReviewFeed> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        ReviewFeed::from_json(&raw)
    }
}

/// Failing source, for exercising the hidden state
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableContentSource;

#[async_trait]
impl ContentSource for UnavailableContentSource {
    fn describe(&self) -> String {
        "unavailable".to_string()
    }

    async fn load(&self) -> Result<ReviewFeed> {
        Err(CarouselError::HttpStatus(503))
    }
}
