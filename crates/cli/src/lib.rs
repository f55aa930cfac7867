//! # chunkycloud-cli
//!
//! Command-line front end for ChunkyCloud.
//!
//! ## Commands
//!
//! - `chunkycloud job <id>` - Follow a render job
//! - `chunkycloud stats` - Follow fleet statistics
//! - `chunkycloud packs` - List resource packs
//! - `chunkycloud submit <paths...>` - Create a render job from scene files
//!
//! Settings come from the environment (see
//! [`ClientConfig::from_env`]); flags override them.

pub mod commands;
pub mod render;

use std::time::Duration;

use chunkycloud_client::config::{normalize_url, ClientConfig};
use clap::{Parser, Subcommand};

/// ChunkyCloud render-job client.
#[derive(Debug, Parser)]
#[command(name = "chunkycloud")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Render service URL (overrides `CHUNKYCLOUD_API_URL`).
    #[arg(long)]
    pub api_url: Option<String>,

    /// Seconds between refreshes (overrides `POLL_INTERVAL_SECS`).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: Option<u64>,

    /// Per-request timeout in seconds (overrides `REQUEST_TIMEOUT_SECS`).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Environment configuration with flag overrides applied.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.api_url = normalize_url(url);
        }
        if let Some(secs) = self.poll_interval {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Follow a render job's progress.
    Job(commands::job::JobArgs),
    /// Follow render farm statistics.
    Stats(commands::stats::StatsArgs),
    /// List the resource packs jobs can use.
    Packs,
    /// Create a render job from scene files.
    Submit(commands::submit::SubmitArgs),
}
