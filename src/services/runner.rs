//! Source runner.
//!
//! Runs every configured job in turn and writes each job's configuration and
//! records to an output stream as YAML.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::{Config, SourceConfig};
use crate::error::Result;
use crate::models::Record;
use crate::scrapers::{ConfigurableScraper, Fetcher};

/// What to do when a job fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing job.
    #[default]
    Abort,
    /// Log the failure and run the remaining jobs.
    Continue,
}

/// Outcome of a full run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub jobs: usize,
    pub failed: usize,
    pub records: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs all jobs of a configuration against one fetcher.
pub struct SourceRunner {
    fetcher: Arc<dyn Fetcher>,
    policy: FailurePolicy,
}

impl SourceRunner {
    pub fn new(fetcher: Arc<dyn Fetcher>, policy: FailurePolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Run every job in declaration order, writing YAML to `out`.
    ///
    /// With [`FailurePolicy::Abort`] the first job error is returned; with
    /// [`FailurePolicy::Continue`] failures are counted in the summary.
    pub async fn run<W: Write>(&self, config: &Config, out: &mut W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (name, source) in config.jobs() {
            summary.jobs += 1;
            write_job_config(out, name, source)?;

            let scraper = ConfigurableScraper::new(name, source.clone(), self.fetcher.clone());
            match scraper.scrape().await {
                Ok(records) => {
                    info!("[{}] Extracted {} record(s)", name, records.len());
                    summary.records += records.len();
                    write_records(out, &records)?;
                }
                Err(err) if self.policy == FailurePolicy::Continue => {
                    error!("[{}] Job failed: {}", name, err);
                    summary.failed += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(summary)
    }
}

fn write_job_config<W: Write>(out: &mut W, name: &str, source: &SourceConfig) -> Result<()> {
    let echo: BTreeMap<&str, &SourceConfig> = BTreeMap::from([(name, source)]);
    writeln!(out, "{}", serde_yaml::to_string(&echo)?)?;
    Ok(())
}

fn write_records<W: Write>(out: &mut W, records: &[Record]) -> Result<()> {
    writeln!(out, "{}", serde_yaml::to_string(records)?)?;
    Ok(())
}
