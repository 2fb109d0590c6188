//! Look up Slack users.

use super::{api::*, error::SlackError};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};

/// The subset of a user record needed to show a human-friendly name.
///
/// Slack returns empty strings for unset names, which we treat as absent.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub profile: Profile,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub display_name: Option<String>,
}

impl User {
    /// The most human-friendly name available: the profile's display name,
    /// then the real name, then the account name.
    pub fn display_name(&self) -> Option<&str> {
        self.profile
            .display_name
            .as_deref()
            .or(self.real_name.as_deref())
            .or(self.name.as_deref())
    }
}

/// <https://api.slack.com/methods/users.info#args>
#[derive(Serialize)]
struct InfoRequest<'a> {
    user: &'a str,
}

/// <https://api.slack.com/methods/users.info#examples>
#[derive(Deserialize)]
struct InfoResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    user: User,
}

impl SlackClient {
    /// Fails with `user_not_found` for unknown IDs.
    pub async fn get_user_info(&self, id: &str) -> Result<User, SlackError> {
        let res: InfoResponse =
            call(self.get("/users.info").query(&InfoRequest { user: id })).await?;

        Ok(res.user)
    }
}
