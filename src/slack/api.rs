//! Type definitions and helpers for the Slack Web API.

use super::{auth::*, error::SlackError};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

/// The base URL of the Slack API.
pub const API_BASE: &str = "https://slack.com/api";

/// A reusable client that holds a connection pool internally, as per
/// [reqwest::Client], alongside the base URL and token every call needs.
///
/// The base URL is configurable so that tests can point it at a mock server.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base: String,
    token: SlackAccessToken,
}

impl SlackClient {
    pub fn new(base: String, token: SlackAccessToken) -> Self {
        SlackClient {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_owned(),
            token,
        }
    }

    /// Create a GET request to any Slack API endpoint, handling authentication.
    pub(super) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        debug!(method = "GET", path, "Slack API call");

        self.http
            .get(self.base.clone() + path)
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
    }

    /// Create a POST request to any Slack API endpoint, handling authentication.
    pub(super) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        debug!(method = "POST", path, "Slack API call");

        self.http
            .post(self.base.clone() + path)
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
    }

    /// A request outside of the Web API, without our `Authorization` header.
    /// Upload URLs are pre-signed.
    pub(super) fn raw_post(&self, url: url::Url) -> reqwest::RequestBuilder {
        debug!(method = "POST", %url, "Raw upload");

        self.http.post(url)
    }
}

/// Send a request and decode Slack's envelope, surfacing `ok: false` as
/// [SlackError::APIResponseError].
pub(super) async fn call<T: DeserializeOwned>(
    req: reqwest::RequestBuilder,
) -> Result<T, SlackError> {
    let res: APIResult<T> = req.send().await?.json().await?;

    match res {
        APIResult::Ok(x) => Ok(x),
        APIResult::Err(res) => Err(SlackError::APIResponseError(res.error)),
    }
}

/// Slack's API returns a common "untagged" response, representing whether a
/// request was successful.
///
/// ```json
/// {
///     "ok": true,
///     "channels": []
/// }
/// ```
///
/// ```json
/// {
///     "ok": false,
///     "error": "invalid_auth"
/// }
/// ```
#[derive(Deserialize)]
#[serde(untagged)]
pub enum APIResult<T> {
    Ok(T),
    Err(ErrorResponse),
}

/// The universal response in case of an unsuccessful request.
// The `ok` field is checked here, and should be checked on responses too,
// primarily to ensure appropriate deserialization behaviour in case of an
// otherwise empty successful response.
#[derive(Deserialize)]
pub struct ErrorResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_false")]
    ok: bool,
    #[serde(default = "unknown_error")]
    pub error: String,
}

fn unknown_error() -> String {
    "unknown_error".into()
}

/// A successful response carrying nothing we care about beyond `ok`.
#[derive(Deserialize)]
pub struct Ack {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
}
