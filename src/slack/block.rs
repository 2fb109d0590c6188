//! Slack's block API is its most modern, and allows rich formatting beyond
//! what plain message text supports.
//!
//! <https://api.slack.com/reference/block-kit/blocks>
//!
//! Blocks supplied by consumers are passed through untouched; we only check
//! that they're a well-formed JSON array. Slack validates the rest.

use serde::Serialize;
use serde_json::{json, Value};

/// A validated, otherwise opaque, array of blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Blocks(Vec<Value>);

impl Blocks {
    /// Parse a JSON document which must be an array, though each block
    /// within is left uninterpreted.
    pub fn parse(src: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(src).map(Blocks)
    }

    /// A single `section` block formatting `text` as "mrkdwn", Slack's
    /// alternative to Markdown. This looks more refined than bare message
    /// text.
    ///
    /// <https://api.slack.com/reference/surfaces/formatting#basics>
    pub fn section(text: &str) -> Self {
        Blocks(vec![json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": text,
            },
        })])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
