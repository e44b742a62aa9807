use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a transfer before the final file is produced.
///
/// None of these remove the `.part` file, so a later invocation resumes
/// from whatever was already written.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The server answered 404. Never retried.
    #[error("host returned 404 for {url}")]
    NotFoundRemote { url: String },

    /// Every attempt got a status other than 200, 206 or 404.
    #[error("giving up on {url} after {attempts} attempts (last status {last_status})")]
    Exhausted {
        url: String,
        attempts: u32,
        last_status: u16,
        partial: PathBuf,
    },

    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output directory {path} doesn't exist or path leads to a file")]
    OutputDir { path: PathBuf },

    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors raised while unpacking a downloaded artifact. The artifact is
/// left on disk in every case.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// An archive member would land outside the extraction directory.
    #[error("attempted path traversal in {archive}: member {entry} resolves to {resolved}")]
    PathTraversal {
        archive: PathBuf,
        entry: PathBuf,
        resolved: PathBuf,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransferError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransferError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ExtractionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractionError::Io {
            path: path.into(),
            source,
        }
    }
}
