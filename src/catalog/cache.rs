// src/catalog/cache.rs

use super::loader::{CatalogLoad, merge_sources};
use super::{Catalog, CatalogWarning};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

struct CachedCatalog {
    fingerprint: String,
    catalog: Catalog,
}

/// Memoizes catalog loads on the bytes of both source files.
///
/// Files are still read on every call; only the merge is skipped when the
/// fingerprint is unchanged.
#[derive(Default)]
pub struct CatalogCache {
    entries: HashMap<(PathBuf, Option<PathBuf>), CachedCatalog>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, base_path: &Path, override_path: Option<&Path>) -> CatalogLoad {
        let base = fs::read(base_path);
        let overrides = override_path.map(fs::read);
        let fingerprint = fingerprint(&base, overrides.as_ref());
        let key = (base_path.to_path_buf(), override_path.map(Path::to_path_buf));
        let short = &fingerprint[..12];

        if let Some(cached) = self.entries.get(&key) {
            if cached.fingerprint == fingerprint {
                debug!(fingerprint = short, "Catalog cache hit");
                let warnings = match base {
                    Ok(_) => Vec::new(),
                    Err(e) => vec![CatalogWarning::MissingCatalogFile {
                        path: base_path.to_path_buf(),
                        source: e,
                    }],
                };
                return CatalogLoad {
                    catalog: cached.catalog.clone(),
                    warnings,
                };
            }
        }

        debug!(fingerprint = short, "Catalog cache miss");
        let load = merge_sources(base_path, base, override_path.zip(overrides));
        self.entries.insert(
            key,
            CachedCatalog {
                fingerprint,
                catalog: load.catalog.clone(),
            },
        );
        load
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// SHA-256 over both sources, with distinct tags for absent files so that
/// "missing" never collides with "empty".
fn fingerprint(base: &io::Result<Vec<u8>>, overrides: Option<&io::Result<Vec<u8>>>) -> String {
    let mut hasher = Sha256::new();
    feed(&mut hasher, base);
    match overrides {
        Some(source) => feed(&mut hasher, source),
        None => hasher.update(b"none"),
    }
    format!("{:x}", hasher.finalize())
}

fn feed(hasher: &mut Sha256, source: &io::Result<Vec<u8>>) {
    match source {
        Ok(bytes) => {
            hasher.update(b"file");
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        Err(_) => hasher.update(b"missing"),
    }
}
