//! Configuration-based scraper.
//!
//! Drives one job: fetch a page, extract a record with the job's rules, then
//! follow the record's `nextpage` value until there is none.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use super::document::HtmlDocument;
use super::http_client::Fetcher;
use super::rate_limiter::IntervalGate;
use crate::config::SourceConfig;
use crate::error::{ConfigError, Result};
use crate::models::Record;
use crate::utils::resolve;

pub mod extract;

pub use extract::{extract, extract_field};

/// Field whose string value names the next page to fetch.
pub const NEXT_PAGE_FIELD: &str = "nextpage";

/// Configurable scraper for a single job.
pub struct ConfigurableScraper {
    name: String,
    config: SourceConfig,
    fetcher: Arc<dyn Fetcher>,
}

impl ConfigurableScraper {
    pub fn new(name: &str, config: SourceConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            name: name.to_string(),
            config,
            fetcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch every page of the job and return one record per page.
    pub async fn scrape(&self) -> Result<Vec<Record>> {
        let start_url = self
            .config
            .start_url()
            .map_err(|source| ConfigError::InvalidUrl {
                job: self.name.clone(),
                url: self.config.url.clone(),
                source,
            })?;

        let mut gate = IntervalGate::new(self.config.request_interval());
        let mut current = start_url.clone();
        let mut records = Vec::new();

        loop {
            gate.wait().await;
            info!("[{}] Next URL: {}", self.name, current);
            let body = self.fetcher.fetch(&current).await?;
            gate.mark();

            // The first record keeps the configured start URL as written.
            let page_url = if records.is_empty() {
                self.config.url.as_str()
            } else {
                current.as_str()
            };
            let base = self.config.resolution_base(&start_url, &current);
            let record = self.extract_page(page_url, base, &body)?;
            let next = self.next_page(&record, &start_url, &current);
            records.push(record);

            if let Some(max_pages) = self.config.max_pages {
                if records.len() as u64 >= max_pages {
                    info!("[{}] Reached page limit ({})", self.name, max_pages);
                    break;
                }
            }

            match next {
                Some(url) => current = url,
                None => break,
            }
        }

        info!("[{}] Done: {} page(s)", self.name, records.len());
        Ok(records)
    }

    /// Parse one page and run the job's rules over it.
    fn extract_page(&self, page_url: &str, base: &Url, body: &str) -> Result<Record> {
        let document = HtmlDocument::parse(page_url, body)?;
        let extracted = extract(document.root(), &self.config.elements, base)?;
        Ok(Record::for_page(page_url, extracted))
    }

    /// Resolve the record's next-page value, if it has a usable one.
    fn next_page(&self, record: &Record, start_url: &Url, current: &Url) -> Option<Url> {
        let candidate = record.text(NEXT_PAGE_FIELD)?;
        if candidate.trim().is_empty() {
            debug!("[{}] Empty next page value", self.name);
            return None;
        }

        let base = self.config.resolution_base(start_url, current);
        match resolve(base, candidate) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(
                    "[{}] Could not parse next page URL {:?}: {}",
                    self.name, candidate, err
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{Config, ResolveAgainst};
    use crate::error::ScrapeError;
    use crate::scrapers::http_client::stub::StubFetcher;

    fn job(yaml: &str) -> SourceConfig {
        let config = Config::from_yaml(yaml).unwrap();
        config.job("job").unwrap().clone()
    }

    fn paginated(start: &str, extra: &str) -> SourceConfig {
        job(&format!(
            r#"
job:
  url: {start}
{extra}
  elements:
    title:
      xpath: //h1
      type: text
    nextpage:
      xpath: "//a[@rel='next']"
      type: attribute
      attribute: href
"#
        ))
    }

    fn page(title: &str, next: Option<&str>) -> String {
        let link = next
            .map(|href| format!(r#"<a rel="next" href="{}">next</a>"#, href))
            .unwrap_or_default();
        format!("<html><body><h1>{}</h1>{}</body></html>", title, link)
    }

    #[tokio::test]
    async fn test_single_page_without_next() {
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://example.com/a", &page("A", None)),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com/a", ""),
            fetcher.clone(),
        );

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("url"), Some("https://example.com/a"));
        assert_eq!(records[0].text("title"), Some("A"));
        assert!(!records[0].contains(NEXT_PAGE_FIELD));
        assert_eq!(fetcher.fetched_urls(), vec!["https://example.com/a"]);
    }

    #[tokio::test]
    async fn test_follows_next_page_chain() {
        let fetcher = Arc::new(
            StubFetcher::new()
                .with_page("https://example.com/a", &page("A", Some("/b")))
                .with_page("https://example.com/b", &page("B", None)),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com/a", ""),
            fetcher.clone(),
        );

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("url"), Some("https://example.com/a"));
        assert_eq!(records[0].text(NEXT_PAGE_FIELD), Some("/b"));
        assert_eq!(records[1].text("url"), Some("https://example.com/b"));
        assert_eq!(records[1].text("title"), Some("B"));
    }

    #[tokio::test]
    async fn test_relative_next_resolves_against_current_page() {
        let fetcher = Arc::new(
            StubFetcher::new()
                .with_page("https://example.com/list/1/", &page("1", Some("../2/")))
                .with_page("https://example.com/list/2/", &page("2", Some("../3/")))
                .with_page("https://example.com/list/3/", &page("3", None)),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com/list/1/", ""),
            fetcher.clone(),
        );

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].text("url"), Some("https://example.com/list/3/"));
    }

    #[tokio::test]
    async fn test_resolve_against_start_url() {
        let fetcher = Arc::new(
            StubFetcher::new()
                .with_page("https://example.com/list/1/", &page("1", Some("../2/")))
                .with_page("https://example.com/list/2/", &page("2", Some("next/")))
                .with_page("https://example.com/list/1/next/", &page("3", None)),
        );
        let config = paginated("https://example.com/list/1/", "  resolveAgainst: start");
        assert_eq!(config.resolve_against, ResolveAgainst::Start);
        let scraper = ConfigurableScraper::new("job", config, fetcher.clone());

        // "next/" found on page 2 is still resolved under /list/1/.
        let records = scraper.scrape().await.unwrap();
        assert_eq!(
            fetcher.fetched_urls(),
            vec![
                "https://example.com/list/1/",
                "https://example.com/list/2/",
                "https://example.com/list/1/next/"
            ]
        );
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_unresolvable_next_page_ends_job() {
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://example.com/a", &page("A", Some("http://[::1"))),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com/a", ""),
            fetcher.clone(),
        );

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(fetcher.fetched_urls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_next_page_ends_job() {
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://example.com/a", &page("A", Some(""))),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com/a", ""),
            fetcher.clone(),
        );

        assert_eq!(scraper.scrape().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_string_next_page_ends_job() {
        let config = job(r#"
job:
  url: https://example.com/a
  elements:
    nextpage:
      xpath: "//a[@rel='next']"
      type: elements
      elements:
        href: { xpath: ./@href, type: text }
"#);
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://example.com/a", &page("A", Some("/b"))),
        );
        let scraper = ConfigurableScraper::new("job", config, fetcher.clone());

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].records(NEXT_PAGE_FIELD).map(<[Record]>::len), Some(1));
    }

    #[tokio::test]
    async fn test_max_pages_caps_pagination() {
        // Page links to itself; only the cap stops the loop.
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://example.com/a", &page("A", Some("/a"))),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com/a", "  maxPages: 3"),
            fetcher.clone(),
        );

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(fetcher.fetched_urls().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_job() {
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://example.com/a", &page("A", Some("/missing"))),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com/a", ""),
            fetcher.clone(),
        );

        assert!(matches!(
            scraper.scrape().await,
            Err(ScrapeError::Status { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_interval_between_fetches() {
        let fetcher = Arc::new(
            StubFetcher::new()
                .with_latency(Duration::from_millis(40))
                .with_page("https://example.com/a", &page("A", Some("/b")))
                .with_page("https://example.com/b", &page("B", Some("/c")))
                .with_page("https://example.com/c", &page("C", None)),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com/a", "  requestEveryMillis: 100"),
            fetcher.clone(),
        );
        let start = tokio::time::Instant::now();

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 3);

        let fetches = fetcher.fetches();
        assert_eq!(fetches.len(), 3);
        assert_eq!(fetches[0].started, start);
        for pair in fetches.windows(2) {
            assert!(pair[1].started - pair[0].finished >= Duration::from_millis(100));
        }
    }

    #[tokio::test]
    async fn test_job_without_rules_emits_url_only_records() {
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://example.com/a", &page("A", Some("/b"))),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            job("job:\n  url: https://example.com/a\n  elements: {}\n"),
            fetcher.clone(),
        );

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field_names().collect::<Vec<_>>(), vec!["url"]);
        assert_eq!(records[0].text("url"), Some("https://example.com/a"));
        assert_eq!(fetcher.fetched_urls(), vec!["https://example.com/a"]);
    }

    #[tokio::test]
    async fn test_first_record_keeps_configured_start_url() {
        let fetcher = Arc::new(
            StubFetcher::new()
                .with_page("https://example.com/", &page("Home", Some("/b")))
                .with_page("https://example.com/b", &page("B", None)),
        );
        let scraper = ConfigurableScraper::new(
            "job",
            paginated("https://example.com", ""),
            fetcher.clone(),
        );

        let records = scraper.scrape().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("url"), Some("https://example.com"));
        assert_eq!(records[1].text("url"), Some("https://example.com/b"));
        assert_eq!(
            fetcher.fetched_urls(),
            vec!["https://example.com/", "https://example.com/b"]
        );
    }
}
