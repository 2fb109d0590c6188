use crate::slack::error::SlackError;
use std::path::PathBuf;
use thiserror::Error;

/// Sum type representing every possible unexceptional fail state of a command.
///
/// Input validation failures carry fixed messages which callers and tests
/// match on. Failures talking to Slack carry the operation that was being
/// attempted, with the underlying [SlackError] available via `source()`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("channel cannot be empty")]
    EmptyIdentifier,
    #[error("channel '{0}' not found. Use 'slck channels list' to see available channels")]
    ChannelNotFound(String),
    #[error("invalid timestamp '{0}': expected a Slack timestamp such as 1234567890.123456")]
    InvalidTimestamp(String),

    #[error("only one of --blocks, --blocks-file, or --blocks-stdin can be specified")]
    ConflictingBlocksSource,
    #[error("cannot use '-' for text and --blocks-stdin together; stdin can only be used for one")]
    ConflictingStdinUsage,
    #[error("reading stdin: {0}")]
    StdinUnreadable(#[source] std::io::Error),
    #[error("reading blocks file {}: {source}", path.display())]
    BlocksFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid blocks JSON: {0}")]
    InvalidBlocksJSON(#[source] serde_json::Error),
    #[error("message text cannot be empty (or provide blocks via --blocks, --blocks-file, --blocks-stdin, or files via --file)")]
    EmptyMessage,

    #[error("cannot access file {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("get upload URL: {0}")]
    UploadSlotRequestFailed(#[source] SlackError),
    #[error("upload file {}: {source}", path.display())]
    FileTransferFailed {
        path: PathBuf,
        #[source]
        source: SlackError,
    },
    #[error("complete upload: {0}")]
    UploadFinalizeFailed(#[source] SlackError),

    #[error("{op}: {source}")]
    API {
        op: String,
        #[source]
        source: SlackError,
    },

    #[error("no Slack token configured; set SLACK_TOKEN or pass --token")]
    MissingToken,
    #[error("writing output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Label a failed call to Slack with the operation being attempted.
    pub fn api<T: ToString>(op: T, source: SlackError) -> Self {
        Error::API {
            op: op.to_string(),
            source,
        }
    }
}

/// Bind an operation label to a fallible Slack call, for use with `map_err`.
///
/// ```
/// client.delete_message(&id, &ts).await.map_err(wrap("delete message"))?;
/// ```
pub fn wrap<T: ToString>(op: T) -> impl FnOnce(SlackError) -> Error {
    move |e| Error::api(op, e)
}
