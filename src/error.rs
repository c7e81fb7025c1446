//! Error types for configuration loading and scraping.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Problems with the configuration file or the rules it declares.
///
/// All of these are detected before the first request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Config does not define any jobs")]
    Empty,
    #[error("Job '{job}': invalid start url '{url}': {source}")]
    InvalidUrl {
        job: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Job '{job}': {reason}")]
    InvalidJob { job: String, reason: String },
    #[error("Rule '{path}': {reason}")]
    InvalidRule { path: String, reason: String },
    #[error("Rule '{path}': invalid xpath '{query}': {reason}")]
    InvalidQuery {
        path: String,
        query: String,
        reason: String,
    },
}

/// Errors that end a scrape job.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Error fetching {url}: HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("Error parsing {url}: {reason}")]
    Parse { url: String, reason: String },
    #[error("XPath '{query}' failed: {reason}")]
    Query { query: String, reason: String },
    #[error("Failed to serialize output: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
