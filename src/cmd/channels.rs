use super::confirm;
use crate::{
    error::{wrap, Error},
    output::Output,
    slack::{
        api::SlackClient,
        channel::{Channel, ChannelId, CHANNEL_TYPES},
    },
};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Table};
use serde_json::json;
use std::io::BufRead;

#[derive(Debug, Subcommand)]
pub enum ChannelsCommand {
    /// List public and private channels visible to the token.
    List(ListArgs),
    /// Show a channel's details.
    Get(ChannelArgs),
    /// Set a channel's purpose.
    SetPurpose(SetPurposeArgs),
    /// Archive a channel.
    Archive(ArchiveArgs),
    /// Unarchive a channel. Archived channels don't resolve by name, so an
    /// ID is required.
    Unarchive(UnarchiveArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(short, long, default_value_t = 100)]
    pub limit: u16,
    #[arg(long)]
    pub include_archived: bool,
}

#[derive(Debug, Args)]
pub struct ChannelArgs {
    /// Channel ID, or name with or without a leading `#`.
    pub channel: String,
}

#[derive(Debug, Args)]
pub struct SetPurposeArgs {
    pub channel: String,
    pub purpose: String,
}

#[derive(Debug, Args)]
pub struct ArchiveArgs {
    pub channel: String,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct UnarchiveArgs {
    /// Channel ID.
    pub channel: String,
}

pub async fn run(
    cmd: ChannelsCommand,
    client: &SlackClient,
    out: &mut Output,
    stdin: &mut dyn BufRead,
) -> Result<(), Error> {
    match cmd {
        ChannelsCommand::List(x) => list(x, client, out).await,
        ChannelsCommand::Get(x) => get(x, client, out).await,
        ChannelsCommand::SetPurpose(x) => set_purpose(x, client, out).await,
        ChannelsCommand::Archive(x) => archive(x, client, out, stdin).await,
        ChannelsCommand::Unarchive(x) => unarchive(x, client, out).await,
    }
}

fn yes_no(x: bool) -> &'static str {
    if x {
        "yes"
    } else {
        "no"
    }
}

fn list_table(channels: &[Channel]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Private", "Members"]);

    for c in channels {
        table.add_row(vec![
            Cell::new(&c.id),
            Cell::new(&c.name),
            Cell::new(yes_no(c.is_private)),
            Cell::new(c.num_members.map(|n| n.to_string()).unwrap_or_default()),
        ]);
    }

    table
}

pub async fn list(args: ListArgs, client: &SlackClient, out: &mut Output) -> Result<(), Error> {
    let channels = client
        .list_channels(CHANNEL_TYPES, !args.include_archived, args.limit)
        .await
        .map_err(wrap("list channels"))?;

    if out.is_json() {
        out.json(&channels)?;
    } else if channels.is_empty() {
        out.line("No channels found")?;
    } else {
        out.table(&list_table(&channels))?;
    }

    Ok(())
}

pub async fn get(args: ChannelArgs, client: &SlackClient, out: &mut Output) -> Result<(), Error> {
    let channel = client.resolve_channel(&args.channel).await?;
    let info = client
        .get_channel_info(&channel)
        .await
        .map_err(wrap("get channel info"))?;

    if out.is_json() {
        out.json(&info)?;
        return Ok(());
    }

    out.key_value("ID", &info.id)?;
    out.key_value("Name", &info.name)?;
    out.key_value("Private", yes_no(info.is_private))?;
    out.key_value("Archived", yes_no(info.is_archived))?;
    if let Some(n) = info.num_members {
        out.key_value("Members", n)?;
    }
    if let Some(x) = info.topic() {
        out.key_value("Topic", x)?;
    }
    if let Some(x) = info.purpose() {
        out.key_value("Purpose", x)?;
    }

    Ok(())
}

pub async fn set_purpose(
    args: SetPurposeArgs,
    client: &SlackClient,
    out: &mut Output,
) -> Result<(), Error> {
    let channel = client.resolve_channel(&args.channel).await?;
    client
        .set_channel_purpose(&channel, &args.purpose)
        .await
        .map_err(wrap("set purpose"))?;

    if out.is_json() {
        out.json(&json!({ "channel": channel, "purpose": args.purpose }))?;
    } else {
        out.line(format!("Set purpose for channel {}", channel))?;
    }

    Ok(())
}

/// Confirmation is asked for before the channel is resolved, so declining
/// never touches the network.
pub async fn archive(
    args: ArchiveArgs,
    client: &SlackClient,
    out: &mut Output,
    stdin: &mut dyn BufRead,
) -> Result<(), Error> {
    let what = format!("About to archive channel {}", args.channel);
    if !args.force && !confirm(out, stdin, &what)? {
        return Ok(());
    }

    let channel = client.resolve_channel(&args.channel).await?;
    client
        .archive_channel(&channel)
        .await
        .map_err(wrap(format!("archive channel {}", channel)))?;

    if out.is_json() {
        out.json(&json!({ "channel": channel, "archived": true }))?;
    } else {
        out.line(format!("Archived channel: {}", channel))?;
    }

    Ok(())
}

pub async fn unarchive(
    args: UnarchiveArgs,
    client: &SlackClient,
    out: &mut Output,
) -> Result<(), Error> {
    let id = args.channel.trim();
    if id.is_empty() {
        return Err(Error::EmptyIdentifier);
    }

    let channel = ChannelId(id.to_owned());
    client
        .unarchive_channel(&channel)
        .await
        .map_err(wrap(format!("unarchive channel {}", channel)))?;

    if out.is_json() {
        out.json(&json!({ "channel": channel, "archived": false }))?;
    } else {
        out.line(format!("Unarchived channel: {}", channel))?;
    }

    Ok(())
}
