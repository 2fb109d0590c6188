//! Send, edit and delete messages, react to them, and read channel history.

use super::{api::*, block::Blocks, channel::ChannelId, error::SlackError};
use serde::{Deserialize, Serialize};

/// A message ready to be posted, as produced by [crate::compose::compose].
///
/// Text is optional because Slack distinguishes between an absent `text`
/// field and an empty one; when blocks supply the content we omit it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub text: Option<String>,
    pub blocks: Option<Blocks>,
    pub thread_ts: Option<String>,
    pub unfurl: bool,
}

/// <https://api.slack.com/methods/chat.postMessage#args>
#[derive(Serialize)]
struct MessageRequest<'a> {
    channel: &'a ChannelId,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<&'a Blocks>,
    unfurl_links: bool,
    unfurl_media: bool,
}

/// <https://api.slack.com/methods/chat.postMessage#examples>
#[derive(Debug, Serialize, Deserialize)]
pub struct SentMessage {
    #[serde(skip_serializing)]
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    pub ts: String,
    #[serde(default)]
    pub channel: Option<ChannelId>,
}

/// <https://api.slack.com/methods/chat.update#args>
#[derive(Serialize)]
struct UpdateRequest<'a> {
    channel: &'a ChannelId,
    ts: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<&'a Blocks>,
    unfurl_links: bool,
    unfurl_media: bool,
}

/// Shared by `chat.delete` and `chat.update` responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRef {
    #[serde(skip_serializing)]
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    pub channel: Option<ChannelId>,
    #[serde(default)]
    pub ts: Option<String>,
}

/// <https://api.slack.com/methods/chat.delete#args>
#[derive(Serialize)]
struct DeleteRequest<'a> {
    channel: &'a ChannelId,
    ts: &'a str,
}

/// Shared by `reactions.add` and `reactions.remove`.
#[derive(Serialize)]
struct ReactionRequest<'a> {
    channel: &'a ChannelId,
    timestamp: &'a str,
    name: &'a str,
}

/// <https://api.slack.com/methods/conversations.history#args>
#[derive(Serialize)]
struct HistoryRequest<'a> {
    channel: &'a ChannelId,
    limit: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    oldest: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest: Option<&'a str>,
}

/// <https://api.slack.com/methods/conversations.history#examples>
#[derive(Deserialize)]
struct HistoryResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    messages: Vec<HistoryMessage>,
}

/// A message as it appears in a channel's history. Bot messages have no
/// `user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub ts: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl SlackClient {
    pub async fn send_message(
        &self,
        channel: &ChannelId,
        msg: &OutgoingMessage,
    ) -> Result<SentMessage, SlackError> {
        call(self.post("/chat.postMessage").json(&MessageRequest {
            channel,
            text: msg.text.as_deref(),
            thread_ts: msg.thread_ts.as_deref(),
            blocks: msg.blocks.as_ref(),
            unfurl_links: msg.unfurl,
            unfurl_media: msg.unfurl,
        }))
        .await
    }

    /// Replace the content of an existing message. Threading can't be
    /// changed after the fact, so `msg.thread_ts` is ignored.
    pub async fn update_message(
        &self,
        channel: &ChannelId,
        ts: &str,
        msg: &OutgoingMessage,
    ) -> Result<MessageRef, SlackError> {
        call(self.post("/chat.update").json(&UpdateRequest {
            channel,
            ts,
            text: msg.text.as_deref(),
            blocks: msg.blocks.as_ref(),
            unfurl_links: msg.unfurl,
            unfurl_media: msg.unfurl,
        }))
        .await
    }

    pub async fn delete_message(
        &self,
        channel: &ChannelId,
        ts: &str,
    ) -> Result<MessageRef, SlackError> {
        call(self.post("/chat.delete").json(&DeleteRequest { channel, ts })).await
    }

    pub async fn add_reaction(
        &self,
        channel: &ChannelId,
        timestamp: &str,
        name: &str,
    ) -> Result<(), SlackError> {
        call::<Ack>(self.post("/reactions.add").json(&ReactionRequest {
            channel,
            timestamp,
            name,
        }))
        .await
        .map(|_| ())
    }

    pub async fn remove_reaction(
        &self,
        channel: &ChannelId,
        timestamp: &str,
        name: &str,
    ) -> Result<(), SlackError> {
        call::<Ack>(self.post("/reactions.remove").json(&ReactionRequest {
            channel,
            timestamp,
            name,
        }))
        .await
        .map(|_| ())
    }

    /// The most recent messages in a channel, newest first, optionally
    /// bounded by timestamps.
    pub async fn get_history(
        &self,
        channel: &ChannelId,
        limit: u16,
        oldest: Option<&str>,
        latest: Option<&str>,
    ) -> Result<Vec<HistoryMessage>, SlackError> {
        let res: HistoryResponse = call(self.get("/conversations.history").query(&HistoryRequest {
            channel,
            limit,
            oldest,
            latest,
        }))
        .await?;

        Ok(res.messages)
    }
}
