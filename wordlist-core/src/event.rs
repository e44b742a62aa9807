use std::path::PathBuf;

/// Progress notifications handed to the downloader's callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// A response with a usable status arrived. `resume_from` is the number
    /// of bytes kept from the partial file (0 after a full 200 response) and
    /// `total` is the expected final size when the server announced one.
    Started { resume_from: u64, total: Option<u64> },
    /// One chunk was written to the partial file.
    ProgressChanged(u64),
    /// The server answered with a transient status; another attempt follows.
    Retrying { attempt: u32, status: u16 },
    Completed { path: PathBuf },
}
