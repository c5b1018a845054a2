// src/config/mod.rs
// Carousel configuration: defaults, then optional TOML file, then .env / CAROUSEL_* vars.
// Passed explicitly at construction; there is no global config.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CarouselError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    // ── Content
    /// Review feed URL. When unset the carousel adopts existing container markup.
    pub content_url: Option<String>,
    pub fetch_timeout_secs: u64,
    /// Only the first N reviews of the feed become slides
    pub max_slides: usize,

    // ── Rotation timing (milliseconds)
    pub rotation_period_ms: u64,
    pub stagger_ms: u64,
    pub manual_grace_ms: u64,

    // ── Input thresholds
    pub visibility_threshold: f32,
    pub swipe_threshold_px: f32,

    // ── Observability
    pub history_limit: usize,
    pub log_level: String,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            content_url: None,
            fetch_timeout_secs: 10,
            max_slides: 6,
            rotation_period_ms: 5000,
            stagger_ms: 100,
            manual_grace_ms: 5000,
            visibility_threshold: 0.5,
            swipe_threshold_px: 50.0,
            history_limit: 20,
            log_level: "info".to_string(),
        }
    }
}

// Values may carry trailing comments and whitespace ("5000 # ms").
// Missing or unparseable keys keep the current value.
fn env_var_or<T>(key: &str, current: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => {
                    tracing::debug!("Config: {} = {} (from environment)", key, clean_val);
                    parsed
                }
                Err(_) => {
                    tracing::warn!("Config: {} = '{}' (parse failed, keeping previous)", key, val);
                    current
                }
            }
        }
        Err(_) => current,
    }
}

impl CarouselConfig {
    /// Parse a TOML document; absent keys fall back to defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| CarouselError::Config(e.to_string()))
    }

    /// Load from an optional TOML file, then apply `.env` and `CAROUSEL_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_toml_str(&std::fs::read_to_string(p)?)?,
            None => Self::default(),
        };

        if dotenvy::dotenv().is_err() {
            tracing::debug!("Config: no .env file found, using process environment");
        }

        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(self) -> Self {
        let content_url = match std::env::var("CAROUSEL_CONTENT_URL") {
            Ok(url) if !url.trim().is_empty() => Some(url.trim().to_string()),
            _ => self.content_url,
        };

        Self {
            content_url,
            fetch_timeout_secs: env_var_or("CAROUSEL_FETCH_TIMEOUT_SECS", self.fetch_timeout_secs),
            max_slides: env_var_or("CAROUSEL_MAX_SLIDES", self.max_slides),
            rotation_period_ms: env_var_or("CAROUSEL_ROTATION_PERIOD_MS", self.rotation_period_ms),
            stagger_ms: env_var_or("CAROUSEL_STAGGER_MS", self.stagger_ms),
            manual_grace_ms: env_var_or("CAROUSEL_MANUAL_GRACE_MS", self.manual_grace_ms),
            visibility_threshold: env_var_or("CAROUSEL_VISIBILITY_THRESHOLD", self.visibility_threshold),
            swipe_threshold_px: env_var_or("CAROUSEL_SWIPE_THRESHOLD_PX", self.swipe_threshold_px),
            history_limit: env_var_or("CAROUSEL_HISTORY_LIMIT", self.history_limit),
            log_level: env_var_or("CAROUSEL_LOG_LEVEL", self.log_level),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(CarouselError::Config(format!(
                "visibility_threshold must be within [0, 1], got {}",
                self.visibility_threshold
            )));
        }
        if self.rotation_period_ms == 0 || self.manual_grace_ms == 0 {
            return Err(CarouselError::Config(
                "rotation_period_ms and manual_grace_ms must be non-zero".to_string(),
            ));
        }
        if self.max_slides == 0 {
            return Err(CarouselError::Config("max_slides must be at least 1".to_string()));
        }
        if self.swipe_threshold_px < 0.0 {
            return Err(CarouselError::Config("swipe_threshold_px must not be negative".to_string()));
        }
        Ok(())
    }

    // --- Duration accessors ---

    pub fn rotation_period(&self) -> Duration {
        Duration::from_millis(self.rotation_period_ms)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn manual_grace(&self) -> Duration {
        Duration::from_millis(self.manual_grace_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Get a human-readable summary of the configuration
    pub fn summary(&self) -> String {
        format!(
            "Carousel Config:\n\
            - Content: {} (up to {} slides)\n\
            - Rotation: every {} ms (stagger {} ms, manual grace {} ms)\n\
            - Visible at ratio >= {}\n\
            - Swipe threshold: {} px",
            self.content_url.as_deref().unwrap_or("existing markup"),
            self.max_slides,
            self.rotation_period_ms,
            self.stagger_ms,
            self.manual_grace_ms,
            self.visibility_threshold,
            self.swipe_threshold_px,
        )
    }
}
