use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while building or exporting a quote.
///
/// Catalog-level problems are not here: a missing or malformed catalog
/// degrades to an empty table plus a [`crate::catalog::CatalogWarning`].
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot edit config {path}: {message}")]
    ConfigEdit { path: PathBuf, message: String },

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("writing PDF output failed: {0}")]
    PdfWrite(#[source] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("product code {0} is not in the catalog")]
    UnknownCode(String),

    #[error("product {0} is already in the quote")]
    DuplicateCode(String),

    #[error("no quote line at position {index} (quote has {len} lines)")]
    LineIndex { index: usize, len: usize },

    #[error("the quote is empty")]
    EmptyQuote,

    #[error("expected CODE:QTY, got {0:?}")]
    BadLineSpec(String),

    #[error("unknown price list {0:?} (expected \"distributor\" or \"secondary\")")]
    BadPriceList(String),
}

impl QuoteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QuoteError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
