use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::{Component, Path, PathBuf},
};

use flate2::read::{GzDecoder, MultiGzDecoder};
use tar::Archive;
use tracing::{debug, info, warn};

use crate::errors::ExtractionError;

/// Formats the extractor knows, picked from the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Gzip,
    Unsupported { extension: String },
}

impl ArchiveFormat {
    /// Case-insensitive suffix match on the file name.
    pub fn detect(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if file_name.ends_with(".tar.gz") {
            ArchiveFormat::TarGz
        } else if file_name.ends_with(".gz") {
            ArchiveFormat::Gzip
        } else {
            let extension = file_name.rsplit('.').next().unwrap_or_default().to_string();
            ArchiveFormat::Unsupported { extension }
        }
    }
}

/// What [`extract`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// Members of a tarball were unpacked into `dir`.
    Tarball { dir: PathBuf, entries: usize },
    /// A gzip stream was inflated into `output`.
    Gzip { output: PathBuf },
    /// Nothing was done and the file was left alone.
    Unsupported { extension: String },
}

/// Unpacks a downloaded artifact next to itself and removes it on success.
///
/// Tarballs are checked member by member before anything is written; a
/// single member resolving outside the archive's directory aborts the whole
/// extraction. On any error the artifact stays on disk so extraction can be
/// retried on its own.
pub fn extract(path: &Path) -> Result<Extracted, ExtractionError> {
    info!(archive = %path.display(), "decompressing");

    let extracted = match ArchiveFormat::detect(path) {
        ArchiveFormat::TarGz => extract_tarball(path)?,
        ArchiveFormat::Gzip => extract_gzip(path)?,
        ArchiveFormat::Unsupported { extension } => {
            warn!(archive = %path.display(), "decompressing {extension} file type not supported");
            return Ok(Extracted::Unsupported { extension });
        }
    };

    fs::remove_file(path).map_err(|e| ExtractionError::io(path, e))?;
    info!(archive = %path.display(), "decompressing completed");
    Ok(extracted)
}

fn extract_tarball(path: &Path) -> Result<Extracted, ExtractionError> {
    let dir = archive_dir(path)?;

    let entries = validate_tarball(path, &dir)?;

    open_tarball(path)?
        .unpack(&dir)
        .map_err(|e| ExtractionError::io(path, e))?;
    debug!(archive = %path.display(), dir = %dir.display(), entries, "tarball unpacked");

    Ok(Extracted::Tarball { dir, entries })
}

/// Walks every member and checks it stays inside `dir`. Returns the number of
/// members.
fn validate_tarball(path: &Path, dir: &Path) -> Result<usize, ExtractionError> {
    let mut archive = open_tarball(path)?;
    let mut count = 0;

    for entry in archive.entries().map_err(|e| ExtractionError::io(path, e))? {
        let entry = entry.map_err(|e| ExtractionError::io(path, e))?;
        let member = entry
            .path()
            .map_err(|e| ExtractionError::io(path, e))?
            .into_owned();

        let resolved = normalize_path(&dir.join(&member));
        if !resolved.starts_with(dir) {
            return Err(ExtractionError::PathTraversal {
                archive: path.to_path_buf(),
                entry: member,
                resolved,
            });
        }
        count += 1;
    }

    Ok(count)
}

fn open_tarball(path: &Path) -> Result<Archive<GzDecoder<BufReader<File>>>, ExtractionError> {
    let file = File::open(path).map_err(|e| ExtractionError::io(path, e))?;
    Ok(Archive::new(GzDecoder::new(BufReader::new(file))))
}

fn extract_gzip(path: &Path) -> Result<Extracted, ExtractionError> {
    let output = strip_gz_suffix(path);

    let file = File::open(path).map_err(|e| ExtractionError::io(path, e))?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(file));
    let mut out = File::create(&output).map_err(|e| ExtractionError::io(&output, e))?;
    io::copy(&mut decoder, &mut out).map_err(|e| ExtractionError::io(path, e))?;
    out.sync_all().map_err(|e| ExtractionError::io(&output, e))?;

    Ok(Extracted::Gzip { output })
}

/// `list.txt.GZ` -> `list.txt`, in the same directory.
fn strip_gz_suffix(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = &name[..name.len().saturating_sub(".gz".len())];
    path.with_file_name(stem)
}

/// Absolute, symlink-free directory holding the archive.
fn archive_dir(path: &Path) -> Result<PathBuf, ExtractionError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    parent
        .canonicalize()
        .map_err(|e| ExtractionError::io(parent, e))
}

/// Lexically resolves `.` and `..` without touching the filesystem. `..`
/// never climbs above the root.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            ArchiveFormat::detect(Path::new("/lists/list.tar.gz")),
            ArchiveFormat::TarGz
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("/lists/LIST.TAR.GZ")),
            ArchiveFormat::TarGz
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("/lists/list.gz")),
            ArchiveFormat::Gzip
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("/lists/list.zip")),
            ArchiveFormat::Unsupported {
                extension: "zip".to_string()
            }
        );
    }

    #[test]
    fn test_strip_gz_suffix() {
        assert_eq!(
            strip_gz_suffix(Path::new("/lists/rockyou.txt.GZ")),
            PathBuf::from("/lists/rockyou.txt")
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/opt/lists/./a/../../evil")),
            PathBuf::from("/opt/evil")
        );
        assert_eq!(
            normalize_path(Path::new("/opt/../../../etc/passwd")),
            PathBuf::from("/etc/passwd")
        );
    }

    #[test]
    fn test_prefix_check_is_per_component() {
        let dir = Path::new("/opt/lists");
        let sibling = normalize_path(&dir.join("../lists2/file"));

        assert!(!sibling.starts_with(dir));
    }
}
