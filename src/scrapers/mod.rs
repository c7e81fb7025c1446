//! Page fetching, parsing and rule-driven extraction.

pub mod configurable;
pub mod document;
pub mod http_client;
pub mod rate_limiter;

pub use configurable::{ConfigurableScraper, NEXT_PAGE_FIELD};
pub use document::HtmlDocument;
pub use http_client::{Fetcher, HttpClient};
pub use rate_limiter::IntervalGate;
