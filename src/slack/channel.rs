//! Interact with Slack channels, including resolving the names consumers
//! supply to the IDs Slack's API expects.

use super::{api::*, error::SlackError};
use crate::error::{wrap, Error};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use std::fmt;
use tracing::debug;

/// Because channel names can change, channels are generally referred to by
/// their underlying ID. This can be found in the UI by copying a link to the
/// channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a string looks like a channel ID rather than a name.
///
/// IDs start with `C` (public channel), `G` (private channel) or `D` (direct
/// message), followed by uppercase letters and digits, for example
/// `C02DF3BEUGN`. At least one digit is required so that shouty names like
/// `GENERAL` aren't mistaken for IDs.
///
/// This is a heuristic: a name that happens to fit the shape will be treated
/// as an ID.
pub fn is_channel_id(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some('C' | 'G' | 'D') => {}
        _ => return false,
    }

    let rest = chars.as_str();

    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && rest.chars().any(|c| c.is_ascii_digit())
}

/// A channel as returned by `conversations.list` and `conversations.info`.
///
/// Only `id` and `name` are guaranteed; the remaining metadata is absent for
/// some conversation types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_members: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<ChannelText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<ChannelText>,
}

/// Channel topics and purposes share a shape. Slack represents "unset" as an
/// empty string.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelText {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub value: Option<String>,
}

impl Channel {
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_ref().and_then(|t| t.value.as_deref())
    }

    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_ref().and_then(|t| t.value.as_deref())
    }
}

/// Conversation types searched when resolving a channel by name.
pub const CHANNEL_TYPES: &str = "public_channel,private_channel";

/// The maximum page size Slack supports, enough to cover a typical workspace
/// in a single call.
pub const LIST_LIMIT: u16 = 1000;

/// <https://api.slack.com/methods/conversations.list#args>
#[derive(Serialize)]
struct ListRequest<'a> {
    types: &'a str,
    exclude_archived: bool,
    limit: u16,
}

/// <https://api.slack.com/methods/conversations.list#examples>
#[derive(Deserialize)]
struct ListResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    channels: Vec<Channel>,
}

/// <https://api.slack.com/methods/conversations.info#args>
#[derive(Serialize)]
struct InfoRequest<'a> {
    channel: &'a ChannelId,
}

/// <https://api.slack.com/methods/conversations.info#examples>
#[derive(Deserialize)]
struct InfoResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    channel: Channel,
}

/// Shared by `conversations.archive` and `conversations.unarchive`.
#[derive(Serialize)]
struct ChannelRequest<'a> {
    channel: &'a ChannelId,
}

/// <https://api.slack.com/methods/conversations.setPurpose#args>
#[derive(Serialize)]
struct SetPurposeRequest<'a> {
    channel: &'a ChannelId,
    purpose: &'a str,
}

impl SlackClient {
    /// A single page of channels of the given comma-separated `types`.
    pub async fn list_channels(
        &self,
        types: &str,
        exclude_archived: bool,
        limit: u16,
    ) -> Result<Vec<Channel>, SlackError> {
        let res: ListResponse = call(self.get("/conversations.list").query(&ListRequest {
            types,
            exclude_archived,
            limit,
        }))
        .await?;

        Ok(res.channels)
    }

    pub async fn get_channel_info(&self, channel: &ChannelId) -> Result<Channel, SlackError> {
        let res: InfoResponse =
            call(self.get("/conversations.info").query(&InfoRequest { channel })).await?;

        Ok(res.channel)
    }

    pub async fn archive_channel(&self, channel: &ChannelId) -> Result<(), SlackError> {
        call::<Ack>(
            self.post("/conversations.archive")
                .json(&ChannelRequest { channel }),
        )
        .await
        .map(|_| ())
    }

    pub async fn unarchive_channel(&self, channel: &ChannelId) -> Result<(), SlackError> {
        call::<Ack>(
            self.post("/conversations.unarchive")
                .json(&ChannelRequest { channel }),
        )
        .await
        .map(|_| ())
    }

    pub async fn set_channel_purpose(
        &self,
        channel: &ChannelId,
        purpose: &str,
    ) -> Result<(), SlackError> {
        call::<Ack>(
            self.post("/conversations.setPurpose")
                .json(&SetPurposeRequest { channel, purpose }),
        )
        .await
        .map(|_| ())
    }

    /// Get the channel ID associated with a channel token, enabling onward
    /// calls to Slack's API. Tokens that already look like IDs are returned
    /// as-is without touching the network; anything else costs exactly one
    /// listing call.
    pub async fn resolve_channel(&self, token: &str) -> Result<ChannelId, Error> {
        // Channel names can't contain hashes, so by doing this we can support
        // consumers supplying (or not) a leading hash.
        let token = token.strip_prefix('#').unwrap_or(token);

        if token.is_empty() {
            return Err(Error::EmptyIdentifier);
        }

        if is_channel_id(token) {
            debug!(token, "Channel token looks like an ID");
            return Ok(ChannelId(token.to_owned()));
        }

        let name = token.to_lowercase();
        let name = name.trim_start_matches('#');

        let channels = self
            .list_channels(CHANNEL_TYPES, false, LIST_LIMIT)
            .await
            .map_err(wrap("list channels"))?;

        let found = channels
            .into_iter()
            .find(|c| c.name.to_lowercase() == name)
            .map(|c| c.id)
            .ok_or_else(|| Error::ChannelNotFound(name.to_owned()))?;

        debug!(name, id = %found, "Resolved channel name");
        Ok(found)
    }
}
