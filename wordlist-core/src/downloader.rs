use std::{path::Path, time::Duration};

use futures::StreamExt;
use reqwest::{header, Client, Response, StatusCode};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    download::{TransferOutcome, TransferRequest},
    errors::TransferError,
    event::TransferEvent,
    storage::PartialFile,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Knobs of the transfer loop.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Requests issued before giving up with [`TransferError::Exhausted`].
    pub max_attempts: u32,
    /// Fixed pause between two attempts.
    pub retry_delay: Duration,
    /// Size of the slices written to the partial file, one progress event each.
    pub chunk_size: usize,
    pub user_agent: String,
}

impl Default for TransferOptions {
    fn default() -> Self {
        TransferOptions {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            user_agent: format!("wordlistcli/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Resumable single-file downloader.
///
/// Bytes are staged in `<destination>.part` and only renamed onto the
/// destination once the whole body was written, so a file under the final
/// name is always complete. Running two downloaders against the same
/// destination at once is not supported.
pub struct Downloader<P>
where
    P: FnMut(TransferEvent),
{
    client: Client,
    options: TransferOptions,
    /// Cancelled by the caller to stop the transfer, whatever it is waiting on.
    cancel: CancellationToken,
    /// Callback for getting download progress updates
    pub on_progress_change: P,
}

impl<P> Downloader<P>
where
    P: FnMut(TransferEvent),
{
    pub fn new(
        options: TransferOptions,
        cancel: CancellationToken,
        on_progress_change: P,
    ) -> Result<Self, TransferError> {
        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(TransferError::Client)?;
        Ok(Downloader {
            client,
            options,
            cancel,
            on_progress_change,
        })
    }

    pub async fn download(
        &mut self,
        request: &TransferRequest,
    ) -> Result<TransferOutcome, TransferError> {
        self.fetch(&request.url, &request.destination).await
    }

    /// Fetches `url` into `destination`, resuming from `<destination>.part`
    /// when it exists.
    pub async fn fetch(
        &mut self,
        url: &str,
        destination: &Path,
    ) -> Result<TransferOutcome, TransferError> {
        if is_file(destination).await {
            warn!(destination = %destination.display(), "already exists -- skipping");
            return Ok(TransferOutcome::AlreadyExists {
                path: destination.to_path_buf(),
            });
        }

        let partial = PartialFile::for_destination(destination);
        match partial.existing_len().await? {
            Some(len) => info!(
                partial = %partial.path.display(),
                bytes = len,
                "found part file, resuming download"
            ),
            None => info!(
                destination = %destination.display(),
                partial = %partial.path.display(),
                "downloading"
            ),
        }

        let max_attempts = self.options.max_attempts.max(1);
        let mut last_status = 0;

        let cancel = self.cancel.clone();

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Ok(cancelled(partial));
            }

            let offset = partial.existing_len().await?;
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(cancelled(partial)),
                response = self.request(url, offset) => response?,
            };
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                return Err(TransferError::NotFoundRemote {
                    url: url.to_string(),
                });
            }

            if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
                last_status = status.as_u16();
                warn!(url, attempt, max_attempts, status = last_status, "unexpected status");
                if attempt < max_attempts {
                    (self.on_progress_change)(TransferEvent::Retrying {
                        attempt,
                        status: last_status,
                    });
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Ok(cancelled(partial)),
                        _ = tokio::time::sleep(self.options.retry_delay) => {}
                    }
                }
                continue;
            }

            // A 200 on a ranged request means the server is sending the whole
            // body again, so the bytes already on disk have to go.
            let append = status == StatusCode::PARTIAL_CONTENT;
            let resume_from = if append { offset.unwrap_or(0) } else { 0 };
            if !append && offset.is_some_and(|len| len > 0) {
                debug!(url, "server ignored range request, restarting from byte 0");
            }

            (self.on_progress_change)(TransferEvent::Started {
                resume_from,
                total: response.content_length().map(|len| len + resume_from),
            });

            let file = partial.open(append).await?;
            return self.stream_to_partial(url, response, file, partial).await;
        }

        Err(TransferError::Exhausted {
            url: url.to_string(),
            attempts: max_attempts,
            last_status,
            partial: partial.path,
        })
    }

    async fn request(&self, url: &str, offset: Option<u64>) -> Result<Response, TransferError> {
        let mut req = self.client.get(url);
        if let Some(offset) = offset {
            debug!(url, offset, "requesting range");
            req = req.header(header::RANGE, format!("bytes={offset}-"));
        }
        req.send().await.map_err(|source| TransferError::Network {
            url: url.to_string(),
            source,
        })
    }

    async fn stream_to_partial(
        &mut self,
        url: &str,
        response: Response,
        mut file: File,
        partial: PartialFile,
    ) -> Result<TransferOutcome, TransferError> {
        let chunk_size = self.options.chunk_size.max(1);
        let cancel = self.cancel.clone();
        let mut bytes_written = 0u64;
        let mut bytes_stream = response.bytes_stream();

        loop {
            let data = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                data = bytes_stream.next() => match data {
                    Some(data) => Some(data),
                    None => break,
                },
            };
            let Some(data) = data else {
                return stop_cancelled(file, partial, bytes_written).await;
            };
            let bytes = match data {
                Ok(bytes) => bytes,
                Err(source) => {
                    flush(&mut file, &partial).await?;
                    return Err(TransferError::Network {
                        url: url.to_string(),
                        source,
                    });
                }
            };

            for chunk in bytes.chunks(chunk_size) {
                if cancel.is_cancelled() {
                    return stop_cancelled(file, partial, bytes_written).await;
                }
                file.write_all(chunk)
                    .await
                    .map_err(|e| TransferError::io(&partial.path, e))?;
                bytes_written += chunk.len() as u64;
                (self.on_progress_change)(TransferEvent::ProgressChanged(chunk.len() as u64));
            }
        }

        let path = partial.commit(file).await?;
        info!(destination = %path.display(), bytes_written, "download completed");
        (self.on_progress_change)(TransferEvent::Completed { path: path.clone() });
        Ok(TransferOutcome::Completed {
            path,
            bytes_written,
        })
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

fn cancelled(partial: PartialFile) -> TransferOutcome {
    TransferOutcome::Cancelled {
        partial: partial.path,
    }
}

/// Leaves everything written so far in the partial file.
async fn stop_cancelled(
    mut file: File,
    partial: PartialFile,
    bytes_written: u64,
) -> Result<TransferOutcome, TransferError> {
    flush(&mut file, &partial).await?;
    warn!(
        partial = %partial.path.display(),
        bytes_written,
        "download cancelled, part file kept for resuming"
    );
    Ok(cancelled(partial))
}

async fn flush(file: &mut File, partial: &PartialFile) -> Result<(), TransferError> {
    file.flush()
        .await
        .map_err(|e| TransferError::io(&partial.path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = TransferOptions::default();

        assert_eq!(options.max_attempts, 5);
        assert_eq!(options.retry_delay, Duration::from_secs(5));
        assert_eq!(options.chunk_size, 1024);
        assert!(options.user_agent.starts_with("wordlistcli/"));
    }
}
