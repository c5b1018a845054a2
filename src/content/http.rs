// src/content/http.rs
// Single best-effort GET of the review feed. No retry, no caching.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ContentSource, ReviewFeed};
use crate::error::{CarouselError, Result};

#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: Client,
    url: String,
}

impl HttpContentSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }

    async fn load(&self) -> Result<ReviewFeed> {
        debug!("[CAROUSEL] Fetching review feed from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("[CAROUSEL] Review feed returned {}", status);
            return Err(CarouselError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        ReviewFeed::from_json(&body)
    }
}
