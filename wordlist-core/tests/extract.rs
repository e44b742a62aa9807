//! Extraction engine on archives built on the fly.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use flate2::{write::GzEncoder, Compression};
use tar::{Builder, EntryType, Header};
use tempfile::TempDir;
use wordlist_core::{extract, ArchiveFormat, Extracted, ExtractionError};

/// Writes a `.tar.gz` whose member names go into the header verbatim, so
/// hostile names like `../../evil` survive.
fn write_tarball(path: &Path, members: &[(&str, &str)]) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = Builder::new(encoder);
    for (name, data) in members {
        let mut header = Header::new_old();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_entry_type(EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(data.len() as u64);
        header.set_cksum();
        builder.append(&header, data.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

fn write_gzip(path: &Path, data: &[u8]) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap();
}

/// `<tmp>/downloads/lists`, deep enough for `../../` to stay inside the
/// temp dir.
fn nested_dir(root: &TempDir) -> PathBuf {
    let dir = root.path().join("downloads").join("lists");
    std::fs::create_dir_all(&dir).unwrap();
    dir.canonicalize().unwrap()
}

#[test]
fn test_tarball_is_unpacked_and_removed() {
    let root = TempDir::new().unwrap();
    let dir = nested_dir(&root);
    let archive = dir.join("seclists.tar.gz");
    write_tarball(
        &archive,
        &[
            ("web/common.txt", "admin\nlogin\n"),
            ("dns/subdomains.txt", "www\nmail\n"),
        ],
    );

    let extracted = extract(&archive).unwrap();

    assert_eq!(
        extracted,
        Extracted::Tarball {
            dir: dir.clone(),
            entries: 2
        }
    );
    assert_eq!(
        std::fs::read(dir.join("web/common.txt")).unwrap(),
        b"admin\nlogin\n"
    );
    assert_eq!(
        std::fs::read(dir.join("dns/subdomains.txt")).unwrap(),
        b"www\nmail\n"
    );
    assert!(!archive.exists());
}

#[test]
fn test_tarball_with_parent_segments_is_rejected_before_writing() {
    let root = TempDir::new().unwrap();
    let dir = nested_dir(&root);
    let archive = dir.join("evil.tar.gz");
    write_tarball(
        &archive,
        &[("innocent.txt", "fine"), ("../../evil", "pwned")],
    );

    let result = extract(&archive);

    match result {
        Err(ExtractionError::PathTraversal {
            entry, resolved, ..
        }) => {
            assert_eq!(entry, PathBuf::from("../../evil"));
            assert_eq!(resolved, root.path().canonicalize().unwrap().join("evil"));
        }
        other => panic!("expected path traversal, got {other:?}"),
    }
    assert!(archive.exists());
    assert!(!dir.join("innocent.txt").exists());
    assert!(!root.path().join("evil").exists());
}

#[test]
fn test_tarball_with_absolute_member_is_rejected() {
    let root = TempDir::new().unwrap();
    let dir = nested_dir(&root);
    let archive = dir.join("abs.tar.gz");
    let target = root.path().join("absolute-evil");
    let target_name = target.to_string_lossy().into_owned();
    write_tarball(&archive, &[(target_name.as_str(), "pwned")]);

    let result = extract(&archive);

    assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
    assert!(archive.exists());
    assert!(!target.exists());
}

#[test]
fn test_gzip_is_inflated_next_to_archive() {
    let root = TempDir::new().unwrap();
    let dir = nested_dir(&root);
    let archive = dir.join("rockyou.txt.gz");
    write_gzip(&archive, b"123456\npassword\n");

    let extracted = extract(&archive).unwrap();

    assert_eq!(
        extracted,
        Extracted::Gzip {
            output: dir.join("rockyou.txt")
        }
    );
    assert_eq!(
        std::fs::read(dir.join("rockyou.txt")).unwrap(),
        b"123456\npassword\n"
    );
    assert!(!archive.exists());
}

#[test]
fn test_unsupported_format_leaves_file() {
    let root = TempDir::new().unwrap();
    let dir = nested_dir(&root);
    let archive = dir.join("list.zip");
    std::fs::write(&archive, b"PK\x03\x04").unwrap();

    let extracted = extract(&archive).unwrap();

    assert_eq!(
        extracted,
        Extracted::Unsupported {
            extension: "zip".to_string()
        }
    );
    assert_eq!(std::fs::read(&archive).unwrap(), b"PK\x03\x04");
}

#[test]
fn test_corrupt_gzip_keeps_artifact() {
    let root = TempDir::new().unwrap();
    let dir = nested_dir(&root);
    let archive = dir.join("broken.gz");
    std::fs::write(&archive, b"definitely not gzip").unwrap();

    let result = extract(&archive);

    assert!(matches!(result, Err(ExtractionError::Io { .. })));
    assert!(archive.exists());
}

#[test]
fn test_format_dispatch_by_suffix() {
    assert_eq!(
        ArchiveFormat::detect(Path::new("list.tar.gz")),
        ArchiveFormat::TarGz
    );
    assert_eq!(ArchiveFormat::detect(Path::new("list.gz")), ArchiveFormat::Gzip);
    assert!(matches!(
        ArchiveFormat::detect(Path::new("list.zip")),
        ArchiveFormat::Unsupported { .. }
    ));
}
