use std::{fs, path::Path};

use errors::CatalogError;
use indexmap::IndexMap;
use models::{Catalog, CatalogEntry};
use tracing::debug;

pub mod errors;
pub mod models;
pub mod queries;

/// Catalog shipped with the crate, used when no other file is configured.
pub const BUNDLED_SOURCE: &str = include_str!("../source.json");

/// Reads a JSON catalog file of the form `{"name": {"url", "size", "group"}}`.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = Catalog::from_json_str(&raw)?;
    debug!(path = %path.display(), entries = catalog.len(), "catalog loaded");
    Ok(catalog)
}

impl Catalog {
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let entries: IndexMap<String, CatalogEntry> = serde_json::from_str(raw)?;
        Ok(Catalog::new(entries.into_iter().map(|(name, mut entry)| {
            entry.name = name;
            entry
        })))
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json_str(BUNDLED_SOURCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchScope, WordlistRepository};

    const SOURCE: &str = r#"{
        "rockyou": {"url": "https://example.com/rockyou.txt.tar.gz", "size": "133 MB", "group": "common"},
        "fuzzdb": {"url": "https://example.com/fuzzdb.gz", "size": "2 MB", "group": "fuzzing", "extra": 1}
    }"#;

    #[test]
    fn test_from_json_keeps_file_order() {
        let catalog = Catalog::from_json_str(SOURCE).unwrap();

        let names: Vec<_> = catalog.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["rockyou", "fuzzdb"]);
        assert_eq!(catalog.search("rock", SearchScope::Name).names(), vec!["rockyou"]);
        assert_eq!(catalog.search("fuzz", SearchScope::Group).names(), vec!["fuzzdb"]);
        assert!(catalog.search("xyz", SearchScope::Name).is_empty());
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.json");
        fs::write(&path, SOURCE).unwrap();

        let catalog = load_catalog(&path).unwrap();

        assert_eq!(catalog.resolve("fuzzdb").unwrap().size, "2 MB");
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_catalog(&dir.path().join("source.json"));

        assert!(matches!(result, Err(CatalogError::Read { .. })));
    }

    #[test]
    fn test_malformed_catalog() {
        let result = Catalog::from_json_str(r#"{"rockyou": {"url": 3}}"#);

        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = Catalog::bundled().unwrap();

        assert!(!catalog.is_empty());
        assert!(catalog.iter().all(|entry| entry.url.starts_with("https://")));
    }
}
