use thiserror::Error;

/// Sum type representing every possible failure talking to Slack, be it the
/// Web API or a raw upload URL.
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Slack API request failed: {0}")]
    APIRequestFailed(#[from] reqwest::Error),
    #[error("Slack API returned error: {0}")]
    APIResponseError(String),
    #[error("upload URL responded with status {0}")]
    UploadRejected(reqwest::StatusCode),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl SlackError {
    /// The error code Slack returned, if this is an API-level failure.
    pub fn code(&self) -> Option<&str> {
        match self {
            SlackError::APIResponseError(e) => Some(e),
            _ => None,
        }
    }
}
