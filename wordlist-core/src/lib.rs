//! Resumable wordlist transfers and safe decompression of the results.

pub mod download;
pub mod downloader;
pub mod errors;
pub mod event;
pub mod extract;
pub mod storage;

pub use download::{file_name_from_url, TransferOutcome, TransferRequest};
pub use downloader::{Downloader, TransferOptions};
pub use errors::{ExtractionError, TransferError};
pub use event::TransferEvent;
pub use extract::{extract, ArchiveFormat, Extracted};
pub use storage::{part_path, PartialFile};
pub use tokio_util::sync::CancellationToken;
