//! Slack's external file upload API.
//!
//! Uploading is a three step dance: ask Slack for an upload URL, send the
//! bytes there, then tell Slack to share the uploaded files. See
//! [crate::upload] for the orchestration.
//!
//! <https://api.slack.com/messaging/files#uploading_files>

use super::{api::*, channel::ChannelId, error::SlackError};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use url::Url;

/// <https://api.slack.com/methods/files.getUploadURLExternal#args>
#[derive(Serialize)]
struct UploadURLRequest<'a> {
    filename: &'a str,
    length: u64,
}

/// Where to send a file's bytes, and the ID Slack will know it by. Only valid
/// until the upload is completed.
///
/// <https://api.slack.com/methods/files.getUploadURLExternal#examples>
#[derive(Debug, Deserialize)]
pub struct UploadSlot {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    pub upload_url: Url,
    pub file_id: String,
}

/// An uploaded file awaiting completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileHandle {
    pub id: String,
    pub title: String,
}

/// <https://api.slack.com/methods/files.completeUploadExternal#args>
#[derive(Serialize)]
struct CompleteRequest<'a> {
    files: &'a [FileHandle],
    channel_id: &'a ChannelId,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_comment: Option<&'a str>,
}

impl SlackClient {
    /// This endpoint only accepts form-encoded arguments.
    pub async fn get_upload_url_external(
        &self,
        filename: &str,
        length: u64,
    ) -> Result<UploadSlot, SlackError> {
        call(
            self.post("/files.getUploadURLExternal")
                .form(&UploadURLRequest { filename, length }),
        )
        .await
    }

    /// Stream a file's bytes to an upload URL. This isn't part of the Web
    /// API, so there's no envelope to decode; only the HTTP status matters.
    ///
    /// The file is consumed, and closed however this returns.
    pub async fn upload_file_to_url(
        &self,
        url: Url,
        file: tokio::fs::File,
        length: u64,
    ) -> Result<(), SlackError> {
        let res = self
            .raw_post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SlackError::UploadRejected(status))
        }
    }

    /// Share previously uploaded files in a channel, optionally in a thread
    /// and with a comment. Until this succeeds the files aren't visible to
    /// anyone.
    pub async fn complete_upload_external(
        &self,
        files: &[FileHandle],
        channel: &ChannelId,
        thread_ts: Option<&str>,
        comment: Option<&str>,
    ) -> Result<(), SlackError> {
        call::<Ack>(
            self.post("/files.completeUploadExternal")
                .json(&CompleteRequest {
                    files,
                    channel_id: channel,
                    thread_ts,
                    initial_comment: comment,
                }),
        )
        .await
        .map(|_| ())
    }
}
