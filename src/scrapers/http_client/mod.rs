//! HTTP page fetching.

mod user_agent;

#[cfg(test)]
pub(crate) mod stub;

pub use user_agent::{browser_headers, ACCEPT, CACHE_CONTROL, UPGRADE_INSECURE_REQUESTS, USER_AGENT};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of page markup for a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page and return its decoded body.
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Fetches pages with a fixed desktop-browser header set.
///
/// Redirects follow reqwest's default policy; no cookies are kept between requests.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let transport = |source| ScrapeError::Transport {
            url: url.to_string(),
            source,
        };

        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(transport)?;
        debug!(
            "Fetched {} ({} bytes, HTTP {}) in {:?}",
            url,
            body.len(),
            status.as_u16(),
            start.elapsed()
        );
        Ok(body)
    }
}
