//! yawl - configuration-driven web content extractor.
//!
//! Reads a set of jobs from YAML, fetches each job's pages, applies XPath
//! extraction rules to them and follows `nextpage` links until none is left.

pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod utils;

pub use config::{Config, Rule, Rules, SourceConfig};
pub use error::{ConfigError, ScrapeError};
pub use models::{FieldValue, Record};
pub use services::{FailurePolicy, RunSummary, SourceRunner};
