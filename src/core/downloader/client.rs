use std::path::{Component, Path, PathBuf};

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::error::{PackerError, PackerResult};
use crate::core::mods::ResolvedMod;

/// Streams mod jars into a destination directory.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Where `item` lands inside `dest_dir`: the registry's file name, verbatim.
    ///
    /// The name must be a single plain path component, so the file can never
    /// land outside `dest_dir`.
    pub fn target_path(dest_dir: &Path, item: &ResolvedMod) -> PackerResult<PathBuf> {
        let mut components = Path::new(&item.filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(dest_dir.join(name)),
            _ => Err(PackerError::InvalidFileName(item.filename.clone())),
        }
    }

    /// An existing file counts as downloaded; its content is not checked.
    /// An unusable file name is never present.
    pub fn is_present(dest_dir: &Path, item: &ResolvedMod) -> bool {
        Self::target_path(dest_dir, item)
            .and_then(|path| Ok(path.try_exists()?))
            .unwrap_or(false)
    }

    /// Download `item` into `dest_dir`, calling `on_progress(received, total)`
    /// after every chunk. Returns the number of bytes written.
    ///
    /// On any failure after the file was created, the partial file is removed.
    pub async fn download_mod<F>(
        &self,
        item: &ResolvedMod,
        dest_dir: &Path,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> PackerResult<u64>
    where
        F: FnMut(u64, Option<u64>) + Send,
    {
        if cancel.is_cancelled() {
            return Err(PackerError::Cancelled);
        }

        let dest = Self::target_path(dest_dir, item)?;
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(PackerError::Cancelled),
            response = self.client.get(&item.download_url).send() => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(PackerError::DownloadFailed {
                url: item.download_url.clone(),
                status: status.as_u16(),
            });
        }

        let total = response.content_length();
        let mut file = File::create(&dest)
            .await
            .map_err(|e| PackerError::io(&dest, e))?;

        let written = stream_to_file(response, &mut file, &dest, cancel, total, &mut on_progress).await;
        // Close the handle before touching the path again.
        drop(file);

        match written {
            Ok(received) => {
                debug!("Downloaded: {} -> {:?}", item.download_url, dest);
                Ok(received)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&dest).await {
                    warn!("Could not remove partial file {:?}: {}", dest, remove_err);
                }
                Err(e)
            }
        }
    }
}

async fn stream_to_file<F>(
    response: Response,
    file: &mut File,
    dest: &Path,
    cancel: &CancellationToken,
    total: Option<u64>,
    on_progress: &mut F,
) -> PackerResult<u64>
where
    F: FnMut(u64, Option<u64>) + Send,
{
    let mut stream = response.bytes_stream();
    let mut received: u64 = 0;

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Err(PackerError::Cancelled),
            next = stream.next() => next,
        };
        let Some(chunk) = next else { break };
        let chunk = chunk?;

        file.write_all(&chunk)
            .await
            .map_err(|e| PackerError::io(dest, e))?;
        received += chunk.len() as u64;
        on_progress(received, total);
    }

    file.flush().await.map_err(|e| PackerError::io(dest, e))?;
    Ok(received)
}
