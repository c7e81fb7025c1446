//! In-memory fetcher for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::time::Instant;
use url::Url;

use super::Fetcher;
use crate::error::{Result, ScrapeError};

/// A fetch as seen by the stub.
#[derive(Debug, Clone)]
pub struct FetchLog {
    pub url: String,
    pub started: Instant,
    pub finished: Instant,
}

/// Serves canned pages by URL; unknown URLs answer 404.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    latency: Duration,
    log: Mutex<Vec<FetchLog>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fetches(&self) -> Vec<FetchLog> {
        self.log.lock().unwrap().clone()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetches().into_iter().map(|f| f.url).collect()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.log.lock().unwrap().push(FetchLog {
            url: url.to_string(),
            started,
            finished: Instant::now(),
        });

        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ScrapeError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            })
    }
}
