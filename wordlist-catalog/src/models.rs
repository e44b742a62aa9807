use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::errors::CatalogError;

/// One downloadable wordlist as described in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    /// Key of the entry in the catalog file.
    #[serde(skip)]
    pub name: String,
    pub url: String,
    /// Human readable size, display only.
    pub size: String,
    pub group: String,
}

/// Every known wordlist, keyed by name, in the order of the catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub(crate) entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Catalog {
            entries: entries
                .into_iter()
                .map(|entry| (entry.name.clone(), entry))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }
}

/// Which field a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    Name,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// Position among the matches, starting at 0.
    pub index: usize,
    pub name: String,
    pub size: String,
}

impl fmt::Display for SearchMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {} ({})", self.index, self.name, self.size)
    }
}

/// Matches of one query, in catalog order. Empty means nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub matches: Vec<SearchMatch>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.name.as_str()).collect()
    }
}

pub trait WordlistRepository {
    /// Exact lookup by name.
    fn resolve(&self, name: &str) -> Result<&CatalogEntry, CatalogError>;
    /// Case-insensitive substring search over names or groups.
    fn search(&self, term: &str, scope: SearchScope) -> SearchResult;
}
