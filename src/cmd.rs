//! Command-line interface definition.
//!
//! The following commands are supported:
//!
//! - `messages send|update|delete|react|unreact|history`
//! - `channels list|get|set-purpose|archive|unarchive`

use crate::{config::Config, error::Error, output::Format, output::Output, slack::api::API_BASE};
use clap::{Parser, Subcommand};
use std::io::BufRead;

pub mod channels;
pub mod messages;

#[derive(Debug, Parser)]
#[command(name = "slck", version, about = "Send messages and manage channels in Slack")]
pub struct Cli {
    /// Slack bot or user token.
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Base URL of the Slack Web API.
    #[arg(long, env = "SLACK_API_BASE", default_value = API_BASE, global = true)]
    pub api_base: String,

    #[arg(short, long, value_enum, default_value_t = Format::Text, global = true)]
    pub output: Format,

    /// Log API calls and resolution decisions to stderr. `RUST_LOG` takes
    /// precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send, edit, delete and react to messages.
    #[command(subcommand)]
    Messages(messages::MessagesCommand),
    /// Inspect and manage channels.
    #[command(subcommand)]
    Channels(channels::ChannelsCommand),
}

/// Run a parsed command to completion.
pub async fn run(cli: Cli, out: &mut Output, stdin: &mut dyn BufRead) -> Result<(), Error> {
    let client = Config::new(cli.token, cli.api_base)?.client();

    match cli.command {
        Command::Messages(x) => messages::run(x, &client, out, stdin).await,
        Command::Channels(x) => channels::run(x, &client, out, stdin).await,
    }
}

/// Ask before doing something destructive. Only `y` or `yes`, in any case,
/// confirms; anything else, including end of input, declines. The exchange
/// stays off the result stream.
pub(crate) fn confirm(
    out: &mut Output,
    stdin: &mut dyn BufRead,
    what: &str,
) -> Result<bool, Error> {
    out.notice(what)?;
    out.prompt("Are you sure? [y/N]: ")?;

    let mut answer = String::new();
    stdin
        .read_line(&mut answer)
        .map_err(Error::StdinUnreadable)?;

    let answer = answer.trim().to_lowercase();
    let confirmed = answer == "y" || answer == "yes";

    if !confirmed {
        out.notice("Cancelled.")?;
    }

    Ok(confirmed)
}
