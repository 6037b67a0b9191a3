// src/order_parser/mod.rs

mod pattern;

pub use pattern::{CodeQty, extract_code_qty, is_noise};

use crate::catalog::Catalog;
use crate::quote::{OrderLine, PriceList};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Header phrase found at the top of orders exported from the chat app.
pub const DEFAULT_HEADER_PHRASE: &str = "DETALLE DEL PEDIDO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Lines containing any of these (case-insensitive) are skipped.
    pub header_phrases: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            header_phrases: vec![DEFAULT_HEADER_PHRASE.to_string()],
        }
    }
}

/// A recognized code/quantity pair whose code is not in the catalog.
/// `line` is the pasted line as received and `quantity` is the value as
/// written, before any coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: String,
    pub code: String,
    pub quantity: u32,
}

/// Overall signal for a paste, independent of the unknown-code list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteStatus {
    /// This many new lines were added.
    Added(usize),
    /// Lines were recognized but every one was already on the quote.
    AlreadyPresent(usize),
    /// Code/quantity pairs were found, but none of the codes are in the
    /// catalog. The count is the number of such lines.
    UnknownOnly(usize),
    /// No line had a code/quantity pattern at all.
    NothingMatched,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub added: Vec<OrderLine>,
    pub unknown: Vec<Diagnostic>,
    /// Recognized lines dropped because their code was already quoted.
    pub duplicates: usize,
}

impl ParseOutcome {
    pub fn status(&self) -> PasteStatus {
        if !self.added.is_empty() {
            PasteStatus::Added(self.added.len())
        } else if self.duplicates > 0 {
            PasteStatus::AlreadyPresent(self.duplicates)
        } else if !self.unknown.is_empty() {
            PasteStatus::UnknownOnly(self.unknown.len())
        } else {
            PasteStatus::NothingMatched
        }
    }
}

/// Turn a pasted chat message into quote lines.
///
/// Each line is handled on its own: headers and lines without a
/// code/quantity pattern are ignored, unknown codes become diagnostics,
/// and codes already present in `existing` (or earlier in this paste) are
/// dropped. Added lines with a quantity of zero get 1. Prices come from `catalog` at
/// `price_list`.
pub fn parse_order_text(
    text: &str,
    catalog: &Catalog,
    price_list: PriceList,
    existing: &[OrderLine],
    options: &ParseOptions,
) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut seen: HashSet<String> = existing.iter().map(|l| l.code.clone()).collect();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || is_noise(line, &options.header_phrases) {
            continue;
        }

        let Some(CodeQty { code, quantity }) = extract_code_qty(line) else {
            continue;
        };

        let Some(record) = catalog.get(&code) else {
            debug!(code = %code, quantity, "Pasted code not in catalog");
            outcome.unknown.push(Diagnostic {
                line: raw.to_string(),
                code,
                quantity,
            });
            continue;
        };

        if !seen.insert(code) {
            outcome.duplicates += 1;
            continue;
        }

        outcome
            .added
            .push(OrderLine::from_record(record, quantity, price_list));
    }

    info!(
        added = outcome.added.len(),
        unknown = outcome.unknown.len(),
        duplicates = outcome.duplicates,
        "Pasted order parsed"
    );
    outcome
}
