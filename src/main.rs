//! A command-line client for Slack.
//!
//! Send messages, with Block Kit blocks or attached files, edit and react to
//! them, read history, and manage channels. Channels can be referred to by
//! name wherever Slack would expect an ID.
//!
//! See `slck --help` for usage.

use clap::Parser;
use cmd::Cli;
use dotenvy::dotenv;
use output::Output;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cache;
mod cmd;
mod compose;
mod config;
mod de;
mod error;
mod output;
mod slack;
mod timestamp;
mod upload;

/// Application entrypoint. Loads any `.env` so that it can supply flags,
/// initialises tracing, and runs the requested command.
#[tokio::main]
async fn main() -> ExitCode {
    let has_dotenv = dotenv().is_ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(cli.verbose))
        .init();

    if !has_dotenv {
        debug!("No .env found");
    }

    let mut out = Output::stdout(cli.output);
    let mut stdin = std::io::stdin().lock();

    match cmd::run(cli, &mut out, &mut stdin).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins if set. Otherwise only warnings are shown, unless asked
/// to be verbose.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "warn,slck=debug" } else { "warn" }))
}
