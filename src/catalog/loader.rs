// src/catalog/loader.rs

use super::{Catalog, CatalogWarning, ProductRecord};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of loading a base catalog plus its override file.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub warnings: Vec<CatalogWarning>,
}

/// Per-file counters, logged after each fold.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LineStats {
    parsed: usize,
    skipped: usize,
    inserted: usize,
}

/// Parse one `code,description,price` line.
///
/// Only the last field is the price, so descriptions may contain commas
/// and numbers. Returns `None` for blank or malformed lines.
pub fn parse_catalog_line(line: &str) -> Option<ProductRecord> {
    let parts: Vec<&str> = line.trim().split(',').collect();
    if parts.len() < 3 {
        return None;
    }

    let code = parts[0].trim();
    if code.is_empty() {
        return None;
    }

    let price: f64 = parts[parts.len() - 1].trim().parse().ok()?;
    if !price.is_finite() || price < 0.0 {
        return None;
    }

    let description = parts[1..parts.len() - 1].join(",");
    Some(ProductRecord::new(code, description.trim(), price))
}

/// Parse a whole catalog file body into a fresh table.
#[cfg(test)]
pub fn parse_catalog_text(text: &str) -> Catalog {
    let mut catalog = Catalog::new();
    fold_lines(&mut catalog, text);
    catalog
}

/// Upsert every well-formed line of `text` into `catalog`, in file order.
fn fold_lines(catalog: &mut Catalog, text: &str) -> LineStats {
    let mut stats = LineStats::default();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_catalog_line(line) {
            Some(record) => {
                stats.parsed += 1;
                if catalog.upsert(record) {
                    stats.inserted += 1;
                }
            }
            None => stats.skipped += 1,
        }
    }

    stats
}

/// Load the base catalog and fold the override file on top of it.
///
/// Never fails: an unreadable base file yields an empty catalog and a
/// [`CatalogWarning::MissingCatalogFile`]; an unreadable override file
/// means no overrides.
pub fn load_catalog(base_path: &Path, override_path: Option<&Path>) -> CatalogLoad {
    let base = fs::read(base_path);
    let overrides = override_path.map(|p| (p, fs::read(p)));
    merge_sources(base_path, base, overrides)
}

/// Two-phase build over already-read file contents.
pub(super) fn merge_sources(
    base_path: &Path,
    base: io::Result<Vec<u8>>,
    overrides: Option<(&Path, io::Result<Vec<u8>>)>,
) -> CatalogLoad {
    let mut load = CatalogLoad::default();

    match base {
        Ok(bytes) => {
            let stats = fold_lines(&mut load.catalog, &String::from_utf8_lossy(&bytes));
            debug!(
                path = %base_path.display(),
                parsed = stats.parsed,
                skipped = stats.skipped,
                "Base catalog parsed"
            );
        }
        Err(e) => {
            warn!(path = %base_path.display(), error = %e, "Base catalog unreadable");
            load.warnings.push(CatalogWarning::MissingCatalogFile {
                path: base_path.to_path_buf(),
                source: e,
            });
            // Overrides are never applied to a missing base.
            return load;
        }
    }

    match overrides {
        Some((path, Ok(bytes))) => {
            let stats = fold_lines(&mut load.catalog, &String::from_utf8_lossy(&bytes));
            debug!(
                path = %path.display(),
                parsed = stats.parsed,
                skipped = stats.skipped,
                inserted = stats.inserted,
                "Override file merged"
            );
        }
        Some((path, Err(e))) => {
            debug!(path = %path.display(), error = %e, "No override file, using base prices");
        }
        None => {}
    }

    info!(products = load.catalog.len(), "Catalog loaded");
    load
}
