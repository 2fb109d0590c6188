use super::confirm;
use crate::{
    compose::{compose, ComposeOptions},
    error::{wrap, Error},
    output::Output,
    slack::{api::SlackClient, mention::UserResolver, message::HistoryMessage},
    timestamp,
    upload::{upload_and_share, Upload},
};
use clap::{Args, Subcommand};
use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum MessagesCommand {
    /// Post a message, optionally with attached files.
    Send(SendArgs),
    /// Replace the content of a message.
    Update(UpdateArgs),
    /// Delete a message.
    Delete(DeleteArgs),
    /// Add an emoji reaction to a message.
    React(ReactArgs),
    /// Remove an emoji reaction from a message.
    Unreact(ReactArgs),
    /// Show recent messages in a channel.
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Channel ID, or name with or without a leading `#`.
    pub channel: String,
    /// Message text. Use `-` to read it from stdin.
    pub text: Option<String>,
    /// Reply in the thread of this message timestamp.
    #[arg(long = "thread")]
    pub thread_ts: Option<String>,
    /// Block Kit blocks as a JSON array.
    #[arg(long = "blocks")]
    pub blocks_json: Option<String>,
    /// Read Block Kit blocks from a file.
    #[arg(long)]
    pub blocks_file: Option<PathBuf>,
    /// Read Block Kit blocks from stdin.
    #[arg(long)]
    pub blocks_stdin: bool,
    /// Send plain text without wrapping it in a block.
    #[arg(long)]
    pub simple: bool,
    /// Don't expand links and media into previews.
    #[arg(long)]
    pub no_unfurl: bool,
    /// Attach a file. Repeat to attach several.
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,
    /// Title for attached files. Defaults to each file's name.
    #[arg(long)]
    pub file_title: Option<String>,
}

impl SendArgs {
    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            thread_ts: self.thread_ts.clone(),
            blocks_json: self.blocks_json.clone(),
            blocks_file: self.blocks_file.clone(),
            blocks_stdin: self.blocks_stdin,
            simple: self.simple,
            no_unfurl: self.no_unfurl,
            files: self.files.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub channel: String,
    /// Timestamp of the message to update.
    pub ts: String,
    /// New message text. Use `-` to read it from stdin.
    pub text: Option<String>,
    #[arg(long = "blocks")]
    pub blocks_json: Option<String>,
    #[arg(long)]
    pub blocks_file: Option<PathBuf>,
    #[arg(long)]
    pub blocks_stdin: bool,
    #[arg(long)]
    pub simple: bool,
    #[arg(long)]
    pub no_unfurl: bool,
}

impl UpdateArgs {
    fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            blocks_json: self.blocks_json.clone(),
            blocks_file: self.blocks_file.clone(),
            blocks_stdin: self.blocks_stdin,
            simple: self.simple,
            no_unfurl: self.no_unfurl,
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub channel: String,
    /// Timestamp of the message to delete.
    pub ts: String,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ReactArgs {
    pub channel: String,
    /// Timestamp of the message to react to.
    pub ts: String,
    /// Emoji name, with or without surrounding colons.
    pub emoji: String,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    pub channel: String,
    #[arg(short, long, default_value_t = 20)]
    pub limit: u16,
    /// Only messages after this timestamp.
    #[arg(long)]
    pub oldest: Option<String>,
    /// Only messages before this timestamp.
    #[arg(long)]
    pub latest: Option<String>,
}

pub async fn run(
    cmd: MessagesCommand,
    client: &SlackClient,
    out: &mut Output,
    stdin: &mut dyn BufRead,
) -> Result<(), Error> {
    match cmd {
        MessagesCommand::Send(x) => send(x, client, out, stdin).await,
        MessagesCommand::Update(x) => update(x, client, out, stdin).await,
        MessagesCommand::Delete(x) => delete(x, client, out, stdin).await,
        MessagesCommand::React(x) => react(x, client, out).await,
        MessagesCommand::Unreact(x) => unreact(x, client, out).await,
        MessagesCommand::History(x) => history(x, client, out).await,
    }
}

/// The message is composed in full before the channel is resolved, so bad
/// input never costs a network call.
pub async fn send(
    args: SendArgs,
    client: &SlackClient,
    out: &mut Output,
    stdin: &mut dyn BufRead,
) -> Result<(), Error> {
    let opts = args.compose_options();
    let msg = compose(args.text.as_deref().unwrap_or_default(), &opts, stdin)?;
    let channel = client.resolve_channel(&args.channel).await?;

    if !opts.files.is_empty() {
        let files = upload_and_share(
            client,
            &Upload {
                channel: &channel,
                files: &opts.files,
                title: args.file_title.as_deref(),
                thread_ts: msg.thread_ts.as_deref(),
                comment: msg.text.as_deref(),
            },
        )
        .await?;

        if out.is_json() {
            out.json(&json!({ "channel": channel, "files": files }))?;
        } else if files.len() == 1 {
            out.line(format!("File uploaded to channel {}", channel))?;
        } else {
            out.line(format!("{} files uploaded to channel {}", files.len(), channel))?;
        }

        return Ok(());
    }

    let sent = client
        .send_message(&channel, &msg)
        .await
        .map_err(wrap("send message"))?;

    if out.is_json() {
        out.json(&json!({ "channel": channel, "ts": sent.ts }))?;
    } else {
        out.line(format!("Message sent (ts: {})", sent.ts))?;
    }

    Ok(())
}

pub async fn update(
    args: UpdateArgs,
    client: &SlackClient,
    out: &mut Output,
    stdin: &mut dyn BufRead,
) -> Result<(), Error> {
    let ts = timestamp::normalize(&args.ts)?;
    let msg = compose(
        args.text.as_deref().unwrap_or_default(),
        &args.compose_options(),
        stdin,
    )?;
    let channel = client.resolve_channel(&args.channel).await?;

    client
        .update_message(&channel, &ts, &msg)
        .await
        .map_err(wrap("update message"))?;

    if out.is_json() {
        out.json(&json!({ "channel": channel, "ts": ts }))?;
    } else {
        out.line(format!("Message updated (ts: {})", ts))?;
    }

    Ok(())
}

pub async fn delete(
    args: DeleteArgs,
    client: &SlackClient,
    out: &mut Output,
    stdin: &mut dyn BufRead,
) -> Result<(), Error> {
    let ts = timestamp::normalize(&args.ts)?;

    let what = format!("About to delete message {} in {}", ts, args.channel);
    if !args.force && !confirm(out, stdin, &what)? {
        return Ok(());
    }

    let channel = client.resolve_channel(&args.channel).await?;

    client
        .delete_message(&channel, &ts)
        .await
        .map_err(wrap("delete message"))?;

    if out.is_json() {
        out.json(&json!({ "channel": channel, "ts": ts, "deleted": true }))?;
    } else {
        out.line(format!("Message deleted (ts: {})", ts))?;
    }

    Ok(())
}

/// Emoji names are accepted as `thumbsup` or `:thumbsup:`.
fn emoji_name(x: &str) -> &str {
    x.trim_matches(':')
}

pub async fn react(args: ReactArgs, client: &SlackClient, out: &mut Output) -> Result<(), Error> {
    let ts = timestamp::normalize(&args.ts)?;
    let emoji = emoji_name(&args.emoji);
    let channel = client.resolve_channel(&args.channel).await?;

    client
        .add_reaction(&channel, &ts, emoji)
        .await
        .map_err(wrap("add reaction"))?;

    if out.is_json() {
        out.json(&json!({ "channel": channel, "ts": ts, "reaction": emoji }))?;
    } else {
        out.line(format!("Added :{}: reaction", emoji))?;
    }

    Ok(())
}

pub async fn unreact(
    args: ReactArgs,
    client: &SlackClient,
    out: &mut Output,
) -> Result<(), Error> {
    let ts = timestamp::normalize(&args.ts)?;
    let emoji = emoji_name(&args.emoji);
    let channel = client.resolve_channel(&args.channel).await?;

    client
        .remove_reaction(&channel, &ts, emoji)
        .await
        .map_err(wrap("remove reaction"))?;

    if out.is_json() {
        out.json(&json!({ "channel": channel, "ts": ts, "reaction": emoji }))?;
    } else {
        out.line(format!("Removed :{}: reaction", emoji))?;
    }

    Ok(())
}

/// A history entry with its author and mentions made readable.
#[derive(Debug, Serialize)]
struct Rendered {
    ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<String>,
    text: String,
}

async fn render(resolver: &UserResolver<'_>, msg: HistoryMessage) -> Rendered {
    let user_name = match msg.user.as_deref() {
        Some(id) => Some(resolver.resolve(id).await),
        None => None,
    };

    Rendered {
        text: resolver.resolve_mentions(&msg.text).await,
        ts: msg.ts,
        user: msg.user,
        user_name,
    }
}

/// Messages are rendered concurrently through one shared resolver, so users
/// already seen aren't looked up again.
pub async fn history(
    args: HistoryArgs,
    client: &SlackClient,
    out: &mut Output,
) -> Result<(), Error> {
    let oldest = timestamp::normalize_opt(args.oldest.as_deref())?;
    let latest = timestamp::normalize_opt(args.latest.as_deref())?;
    let channel = client.resolve_channel(&args.channel).await?;

    let messages = client
        .get_history(&channel, args.limit, oldest.as_deref(), latest.as_deref())
        .await
        .map_err(wrap("get history"))?;

    let resolver = UserResolver::new(client);
    let rendered = join_all(messages.into_iter().map(|m| render(&resolver, m))).await;

    if out.is_json() {
        out.json(&rendered)?;
        return Ok(());
    }

    if rendered.is_empty() {
        out.line("No messages found")?;
        return Ok(());
    }

    for m in rendered {
        let author = m.user_name.as_deref().unwrap_or("bot");
        out.line(format!("[{}] {}: {}", m.ts, author, m.text))?;
    }

    Ok(())
}
