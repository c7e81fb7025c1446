//! Service layer.
//!
//! Orchestration that sits between the CLI and the scrapers.

pub mod runner;

pub use runner::{FailurePolicy, RunSummary, SourceRunner};
