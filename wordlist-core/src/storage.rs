use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use tokio::{
    fs::{self, File, OpenOptions},
    io::AsyncWriteExt,
};

use crate::errors::TransferError;

pub const PART_SUFFIX: &str = ".part";

/// Path of the staging file for `destination`: the same path with `.part`
/// appended to the file name.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// The `.part` staging file of a single transfer.
///
/// Its length on disk is the resume offset. It only ever becomes the final
/// file through [`PartialFile::commit`].
#[derive(Debug)]
pub struct PartialFile {
    pub path: PathBuf,
    destination: PathBuf,
}

impl PartialFile {
    pub fn for_destination(destination: &Path) -> Self {
        PartialFile {
            path: part_path(destination),
            destination: destination.to_path_buf(),
        }
    }

    /// Bytes already on disk, or `None` when there is no partial file.
    pub async fn existing_len(&self) -> Result<Option<u64>, TransferError> {
        match fs::metadata(&self.path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TransferError::io(&self.path, e)),
        }
    }

    /// Opens the partial file for writing. With `append` the existing bytes
    /// are kept, otherwise the file is truncated.
    pub async fn open(&self, append: bool) -> Result<File, TransferError> {
        OpenOptions::new()
            .write(!append)
            .truncate(!append)
            .append(append)
            .create(true)
            .open(&self.path)
            .await
            .map_err(|e| TransferError::io(&self.path, e))
    }

    /// Flushes `file` and renames the partial file onto the destination.
    pub async fn commit(self, mut file: File) -> Result<PathBuf, TransferError> {
        file.flush()
            .await
            .map_err(|e| TransferError::io(&self.path, e))?;
        file.sync_all()
            .await
            .map_err(|e| TransferError::io(&self.path, e))?;
        drop(file);
        fs::rename(&self.path, &self.destination)
            .await
            .map_err(|e| TransferError::io(&self.destination, e))?;
        Ok(self.destination)
    }
}
