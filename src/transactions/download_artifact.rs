//! Streams an artifact's zip archive to disk.

use std::{
    path::{Path, PathBuf},
    pin::pin,
};

use futures::TryStreamExt as _;
use tokio::io::AsyncWriteExt as _;
use tracing::info;

use crate::{
    error::Result,
    github::GitHubClient,
    workflow::artifact::{Artifact, format_size},
};

/// Downloads the specified artifact into `destination/<name>.zip`.
///
/// The destination directory is created if absent (including parents). The
/// response body is piped to the file chunk by chunk, never buffering the
/// whole payload in memory. On any transport or filesystem failure the error
/// propagates; a partial file may remain on disk.
///
/// # Errors
///
/// Returns an error if the download request, a body read, or a file write
/// fails.
pub async fn download_artifact(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    artifact: &Artifact,
    destination: &Path,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(destination).await?;
    let save_to = destination.join(format!("{}.zip", artifact.name));

    info!(
        "downloading {}.zip ({})…",
        artifact.name,
        format_size(artifact.size_in_bytes)
    );

    let stream = client.download_artifact(owner, repo, artifact.id).await?;
    let mut stream = pin!(stream);

    let mut file = tokio::fs::File::create(&save_to).await?;
    while let Some(chunk) = stream.try_next().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    info!("downloaded {}", save_to.display());
    Ok(save_to)
}
