//! robinhood - command line client for the Robinhood API.
//!
//! A thin wrapper over `robinhood-core`: log in once, then query quotes,
//! markets and positions as JSON.

mod cli;
mod commands;
mod config;

use std::io;

use anyhow::Result;
use clap::Parser;
use robinhood_core::{ClientConfig, RobinhoodClient};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use config::Config;

/// Log file name inside the cache directory
const LOG_FILE: &str = "robinhood.log";

/// Initialize the tracing subscriber for logging.
///
/// RUST_LOG overrides the level picked by `-v`. The returned guard flushes
/// the log file and must live until exit.
fn init_tracing(verbosity: u8, log_file: bool) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file.then(Config::log_dir) {
        Some(Ok(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Not logging to file: {}", e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.log_file);

    let config = Config::load()?;

    let mut client_config = ClientConfig::default();
    if let Some(url) = std::env::var("ROBINHOOD_API_URL")
        .ok()
        .or_else(|| config.api_base_url.clone())
    {
        client_config = client_config.with_base_url(url);
    }
    let client = RobinhoodClient::new(client_config)?;
    info!("robinhood starting");

    commands::run(cli, client, config).await
}
