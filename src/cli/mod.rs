//! Command-line interface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use yawl::config::{Config, DEFAULT_CONFIG_FILENAME};
use yawl::scrapers::http_client::DEFAULT_TIMEOUT;
use yawl::scrapers::HttpClient;
use yawl::services::{FailurePolicy, SourceRunner};

#[derive(Parser)]
#[command(name = "yawl")]
#[command(about = "Extract structured records from web pages described in a YAML config")]
#[command(version)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Keep running the remaining jobs when one fails
    #[arg(short, long)]
    keep_going: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config).await.with_context(|| {
        format!(
            "Config file {} could not be loaded",
            cli.config.display()
        )
    })?;
    info!("Loaded {} job(s) from {}", config.len(), cli.config.display());

    let policy = if cli.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };
    let client = HttpClient::new(DEFAULT_TIMEOUT)?;
    let runner = SourceRunner::new(Arc::new(client), policy);

    let mut stdout = std::io::stdout();
    let summary = runner.run(&config, &mut stdout).await?;

    if !summary.is_success() {
        bail!("{} of {} job(s) failed", summary.failed, summary.jobs);
    }
    info!(
        "Finished {} job(s), {} record(s)",
        summary.jobs, summary.records
    );
    Ok(())
}
