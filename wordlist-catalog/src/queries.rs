use crate::{
    errors::CatalogError,
    models::{Catalog, CatalogEntry, SearchMatch, SearchResult, SearchScope, WordlistRepository},
};

impl WordlistRepository for Catalog {
    fn resolve(&self, name: &str) -> Result<&CatalogEntry, CatalogError> {
        self.entries.get(name).ok_or_else(|| CatalogError::NotFound {
            name: name.to_string(),
        })
    }

    fn search(&self, term: &str, scope: SearchScope) -> SearchResult {
        let term = term.to_lowercase();
        let matches = self
            .iter()
            .filter(|entry| {
                let field = match scope {
                    SearchScope::Name => &entry.name,
                    SearchScope::Group => &entry.group,
                };
                field.to_lowercase().contains(&term)
            })
            .enumerate()
            .map(|(index, entry)| SearchMatch {
                index,
                name: entry.name.clone(),
                size: entry.size.clone(),
            })
            .collect();

        SearchResult { matches }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, group: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            url: format!("https://example.com/{name}.txt.gz"),
            size: "1 MB".to_string(),
            group: group.to_string(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new([
            entry("rockyou", "common"),
            entry("fuzzdb", "fuzzing"),
            entry("RockSolid", "passwords"),
        ])
    }

    #[test]
    fn test_search_by_name_is_case_insensitive() {
        let result = catalog().search("ROCK", SearchScope::Name);

        assert_eq!(result.names(), vec!["rockyou", "RockSolid"]);
        assert_eq!(result.matches[1].index, 1);
    }

    #[test]
    fn test_search_by_group() {
        let result = catalog().search("fuzz", SearchScope::Group);

        assert_eq!(result.names(), vec!["fuzzdb"]);
    }

    #[test]
    fn test_search_by_name_ignores_group() {
        let result = catalog().search("common", SearchScope::Name);

        assert!(result.is_empty());
    }

    #[test]
    fn test_search_without_matches() {
        let result = catalog().search("xyz", SearchScope::Name);

        assert!(result.is_empty());
        assert!(result.names().is_empty());
    }

    #[test]
    fn test_search_match_display() {
        let result = catalog().search("fuzzdb", SearchScope::Name);

        assert_eq!(result.matches[0].to_string(), "0 > fuzzdb (1 MB)");
    }

    #[test]
    fn test_resolve() {
        let catalog = catalog();

        assert_eq!(
            catalog.resolve("fuzzdb").unwrap().url,
            "https://example.com/fuzzdb.txt.gz"
        );
        assert!(matches!(
            catalog.resolve("Fuzzdb"),
            Err(CatalogError::NotFound { .. })
        ));
    }
}
