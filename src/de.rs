//! Deserialization helpers for Slack's `ok` envelope field.

use serde::de::{Deserialize, Deserializer, Error};

pub fn only_true<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    only(true, deserializer)
}

pub fn only_false<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    only(false, deserializer)
}

fn only<'a, D>(expected: bool, deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    bool::deserialize(deserializer).and_then(|b| {
        if b == expected {
            Ok(b)
        } else {
            Err(Error::custom(format!("invalid bool: {}", b)))
        }
    })
}
