//! Binary crate for the `weather-page` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive settings form
//! - Terminal rendering of the weather page

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_logging(&cmd.log_level);
    cmd.run().await
}

/// `RUST_LOG` wins over `--log-level`. Logs go to stderr so `--json` output stays clean.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}
