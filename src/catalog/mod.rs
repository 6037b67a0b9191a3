// src/catalog/mod.rs

mod cache;
mod loader;

pub use cache::CatalogCache;
pub use loader::{CatalogLoad, load_catalog};
#[cfg(test)]
pub use loader::parse_catalog_text;

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// A single product row from the catalog files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub code: String,
    pub description: String,
    pub unit_price: f64,
    /// `code - description`, used for search and selection labels only.
    pub display_label: String,
}

impl ProductRecord {
    pub fn new(code: impl Into<String>, description: impl Into<String>, unit_price: f64) -> Self {
        let code = code.into();
        let description = description.into();
        let display_label = format!("{code} - {description}");
        ProductRecord {
            code,
            description,
            unit_price,
            display_label,
        }
    }
}

/// Merged, code-keyed product table.
///
/// Codes keep the position of their first insertion, so listing the
/// catalog shows base-file order followed by codes that only exist in
/// the override file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<ProductRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing record with the same code
    /// (last write wins). Returns `true` when the code was new.
    pub fn upsert(&mut self, record: ProductRecord) -> bool {
        match self.index.get(&record.code) {
            Some(&pos) => {
                self.records[pos] = record;
                false
            }
            None => {
                self.index.insert(record.code.clone(), self.records.len());
                self.records.push(record);
                true
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&ProductRecord> {
        self.index.get(code).map(|&pos| &self.records[pos])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.records.iter()
    }

    /// Type-to-search over display labels.
    ///
    /// Every whitespace-separated term of `query` must appear in the label,
    /// case-insensitively. Results come back in catalog order; an empty
    /// query matches everything.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&ProductRecord> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

        self.iter()
            .filter(|r| {
                let label = r.display_label.to_lowercase();
                terms.iter().all(|t| label.contains(t.as_str()))
            })
            .take(limit)
            .collect()
    }
}

/// Non-fatal problems surfaced to the caller after a catalog load.
#[derive(Debug, Error)]
pub enum CatalogWarning {
    #[error("catalog file {path} could not be read ({source}); continuing with an empty catalog")]
    MissingCatalogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.upsert(ProductRecord::new("1001", "Martillo uña 16oz", 129.5));
        catalog.upsert(ProductRecord::new("1002", "Desarmador plano 1/4", 45.0));
        catalog.upsert(ProductRecord::new("20455", "Martillo de bola 24oz", 210.0));
        catalog
    }

    #[test]
    fn test_display_label_joins_code_and_description() {
        let r = ProductRecord::new("1001", "Hammer 16oz", 129.5);
        assert_eq!(r.display_label, "1001 - Hammer 16oz");
    }

    #[test]
    fn test_upsert_replaces_in_place_and_keeps_position() {
        let mut catalog = sample();
        let inserted = catalog.upsert(ProductRecord::new("1001", "Martillo nuevo", 140.0));

        assert!(!inserted);
        assert_eq!(catalog.len(), 3);
        let first = catalog.iter().next().unwrap();
        assert_eq!(first.code, "1001");
        assert_eq!(first.description, "Martillo nuevo");
        assert_eq!(first.unit_price, 140.0);
        assert_eq!(first.display_label, "1001 - Martillo nuevo");
    }

    #[test]
    fn test_upsert_appends_new_codes() {
        let mut catalog = sample();
        assert!(catalog.upsert(ProductRecord::new("3000", "Pinza", 80.0)));
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.iter().last().unwrap().code, "3000");
    }

    #[test]
    fn test_search_matches_all_terms_case_insensitively() {
        let catalog = sample();

        let hits: Vec<&str> = catalog
            .search("martillo", 10)
            .iter()
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(hits, vec!["1001", "20455"]);

        let hits = catalog.search("MARTILLO 24", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "20455");

        // Codes are part of the label.
        assert_eq!(catalog.search("1002", 10)[0].code, "1002");
    }

    #[test]
    fn test_search_respects_limit_and_empty_query() {
        let catalog = sample();
        assert_eq!(catalog.search("", 10).len(), 3);
        assert_eq!(catalog.search("", 2).len(), 2);
        assert!(catalog.search("serrucho", 10).is_empty());
    }
}
