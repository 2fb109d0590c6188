//! Upload local files and share them in a channel.
//!
//! Files are uploaded strictly one after another so that failures are
//! attributable to a single file and the final share sees every upload. Slack
//! offers no way to discard an upload slot, so if sharing fails the bytes
//! already sent are left for Slack to expire.

use crate::{
    error::{Error, Error::*},
    slack::{api::SlackClient, channel::ChannelId, file::FileHandle},
};
use std::path::{Path, PathBuf};
use tracing::info;

/// One or more files bound for a channel.
#[derive(Debug)]
pub struct Upload<'a> {
    pub channel: &'a ChannelId,
    pub files: &'a [PathBuf],
    /// Applied to every file; defaults to each file's name.
    pub title: Option<&'a str>,
    pub thread_ts: Option<&'a str>,
    /// Posted alongside the files.
    pub comment: Option<&'a str>,
}

/// A local file which has been checked to exist, ready to upload.
struct UploadUnit<'a> {
    path: &'a Path,
    name: String,
    length: u64,
}

/// Upload every file, then share them all in one go. Every path is checked
/// before anything is sent, and the first failure aborts the batch; nothing
/// is shared unless every upload succeeded.
pub async fn upload_and_share(
    client: &SlackClient,
    upload: &Upload<'_>,
) -> Result<Vec<FileHandle>, Error> {
    let mut units = Vec::with_capacity(upload.files.len());
    for path in upload.files {
        units.push(stat(path).await?);
    }

    let mut handles = Vec::with_capacity(units.len());
    for unit in units {
        let handle = upload_one(client, unit, upload.title).await?;
        handles.push(handle);
    }

    client
        .complete_upload_external(&handles, upload.channel, upload.thread_ts, upload.comment)
        .await
        .map_err(UploadFinalizeFailed)?;

    info!(count = handles.len(), channel = %upload.channel, "Shared files");
    Ok(handles)
}

async fn stat(path: &Path) -> Result<UploadUnit<'_>, Error> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|source| FileUnreadable {
            path: path.to_owned(),
            source,
        })?;

    Ok(UploadUnit {
        path,
        name: file_name(path),
        length: meta.len(),
    })
}

async fn upload_one(
    client: &SlackClient,
    unit: UploadUnit<'_>,
    title: Option<&str>,
) -> Result<FileHandle, Error> {
    info!(file = %unit.name, bytes = unit.length, "Uploading");

    let slot = client
        .get_upload_url_external(&unit.name, unit.length)
        .await
        .map_err(UploadSlotRequestFailed)?;

    let transfer_failed = |source| FileTransferFailed {
        path: unit.path.to_owned(),
        source,
    };

    let file = tokio::fs::File::open(unit.path)
        .await
        .map_err(|e| transfer_failed(e.into()))?;

    client
        .upload_file_to_url(slot.upload_url, file, unit.length)
        .await
        .map_err(transfer_failed)?;

    Ok(FileHandle {
        id: slot.file_id,
        title: title.map_or(unit.name, ToOwned::to_owned),
    })
}

/// The last component of a path, falling back to the whole path for oddities
/// like `..`.
fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
