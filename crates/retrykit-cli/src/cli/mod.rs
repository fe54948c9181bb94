//! CLI for the retrykit retry executor.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use retrykit_core::config;
use std::path::PathBuf;

use commands::{run_classify, run_probe, run_schedule, ClassifyArgs};

/// Top-level CLI for retrykit.
#[derive(Debug, Parser)]
#[command(name = "retrykit")]
#[command(
    about = "retrykit: retry with exponential backoff and error classification",
    long_about = None
)]
pub struct Cli {
    /// Read retry settings from this file instead of ~/.config/retrykit/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Classify an error the way the UI would, and say whether it is retried.
    Classify(ClassifyArgs),

    /// Print the backoff delay envelope for every permitted retry.
    Schedule,

    /// Send a HEAD request, retrying transient failures.
    Probe {
        /// HTTP/HTTPS URL to probe.
        url: String,
        /// Per-attempt timeout in seconds.
        #[arg(long, default_value = "30", value_name = "SECS")]
        timeout_secs: u64,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        let retry = cfg.retry_config().context("invalid retry settings")?;

        match cli.command {
            CliCommand::Classify(args) => run_classify(&args, &retry)?,
            CliCommand::Schedule => run_schedule(&retry),
            CliCommand::Probe { url, timeout_secs } => run_probe(&url, timeout_secs, &retry).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
