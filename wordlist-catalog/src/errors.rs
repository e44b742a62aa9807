use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("repository file {path} could not be read: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("repository file is not valid: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{name} not found, please spell check or search for keyword again")]
    NotFound { name: String },
}
