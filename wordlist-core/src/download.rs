use std::path::{Path, PathBuf};

use crate::errors::TransferError;

/// A single wordlist fetch: where it comes from, where it lands and whether
/// it gets unpacked afterwards.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub url: String,
    pub destination: PathBuf,
    pub decompress: bool,
}

/// How a transfer ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The partial file was fully written and renamed onto `path`.
    Completed { path: PathBuf, bytes_written: u64 },
    /// `path` was already there; nothing was requested.
    AlreadyExists { path: PathBuf },
    /// The cancellation flag was raised. `partial` is left for resuming.
    Cancelled { partial: PathBuf },
}

impl TransferOutcome {
    /// The final file, when one exists after this outcome.
    pub fn path(&self) -> Option<&Path> {
        match self {
            TransferOutcome::Completed { path, .. } | TransferOutcome::AlreadyExists { path } => {
                Some(path)
            }
            TransferOutcome::Cancelled { .. } => None,
        }
    }
}

impl TransferRequest {
    /// Builds a request that stores `url` under `output_dir`, named after the
    /// last segment of the URL path. `output_dir` has to exist.
    pub fn new(url: &str, output_dir: &Path, decompress: bool) -> Result<Self, TransferError> {
        if !output_dir.is_dir() {
            return Err(TransferError::OutputDir {
                path: output_dir.to_path_buf(),
            });
        }
        let output_dir = output_dir
            .canonicalize()
            .map_err(|e| TransferError::io(output_dir, e))?;

        Ok(TransferRequest {
            url: url.to_string(),
            destination: output_dir.join(file_name_from_url(url)),
            decompress,
        })
    }
}

/// Gets a file name from a download url
pub fn file_name_from_url(url: &str) -> String {
    let url = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    if let Some(last_slash_index) = url.rfind('/') {
        if last_slash_index + 1 != url.len() {
            return url[last_slash_index + 1..].to_string();
        }
    }

    String::from("Unknown_File")
}
