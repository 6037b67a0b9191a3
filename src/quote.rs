// src/quote.rs

use crate::catalog::{Catalog, ProductRecord};
use crate::error::{QuoteError, Result};
use crate::order_parser::{self, ParseOptions, ParseOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// The secondary list is priced so that a 10% discount on it lands back
/// on the distributor price.
const SECONDARY_DISCOUNT: f64 = 0.90;

/// Pricing mode applied when a catalog price is copied onto a quote line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceList {
    #[default]
    Distributor,
    #[serde(rename = "secondary")]
    SecondaryList,
}

impl PriceList {
    pub fn price(self, base_price: f64) -> f64 {
        match self {
            PriceList::Distributor => base_price,
            PriceList::SecondaryList => base_price / SECONDARY_DISCOUNT,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PriceList::Distributor => "Distributor",
            PriceList::SecondaryList => "Secondary list",
        }
    }
}

impl fmt::Display for PriceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PriceList {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "distributor" | "distribuidor" | "d" => Ok(PriceList::Distributor),
            "secondary" | "secondary-list" | "lista2" | "s" => Ok(PriceList::SecondaryList),
            _ => Err(QuoteError::BadPriceList(s.to_string())),
        }
    }
}

/// One product on the quote. Description and price are snapshots taken
/// when the line was added; reloading the catalog does not touch them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderLine {
    pub fn from_record(record: &ProductRecord, quantity: u32, price_list: PriceList) -> Self {
        OrderLine {
            code: record.code.clone(),
            description: record.description.clone(),
            quantity: quantity.max(1),
            unit_price: price_list.price(record.unit_price),
        }
    }

    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// In-memory state of one quoting session.
#[derive(Debug, Clone, Default)]
pub struct QuoteSession {
    client: String,
    agent: String,
    price_list: PriceList,
    lines: Vec<OrderLine>,
}

impl QuoteSession {
    pub fn new(price_list: PriceList) -> Self {
        QuoteSession {
            price_list,
            ..Default::default()
        }
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn price_list(&self) -> PriceList {
        self.price_list
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn set_client(&mut self, client: &str) {
        self.client = client.trim().to_uppercase();
    }

    pub fn set_agent(&mut self, agent: &str) {
        self.agent = agent.trim().to_uppercase();
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lines.iter().any(|l| l.code == code)
    }

    /// Manually add a product picked from the catalog.
    pub fn add_product(&mut self, catalog: &Catalog, code: &str, quantity: u32) -> Result<&OrderLine> {
        let code = code.trim();
        let record = catalog
            .get(code)
            .ok_or_else(|| QuoteError::UnknownCode(code.to_string()))?;
        if self.contains(code) {
            return Err(QuoteError::DuplicateCode(code.to_string()));
        }

        let line = OrderLine::from_record(record, quantity, self.price_list);
        info!(code = %line.code, quantity = line.quantity, price = line.unit_price, "Line added");
        self.lines.push(line);
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Parse a pasted order and append every newly recognized line.
    pub fn paste(&mut self, catalog: &Catalog, text: &str, options: &ParseOptions) -> ParseOutcome {
        let outcome =
            order_parser::parse_order_text(text, catalog, self.price_list, &self.lines, options);
        self.lines.extend(outcome.added.iter().cloned());
        outcome
    }

    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Result<()> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(QuoteError::LineIndex { index, len })?;
        line.quantity = quantity.max(1);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<OrderLine> {
        if index >= self.lines.len() {
            return Err(QuoteError::LineIndex {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Drop every line and the client name. The agent stays, since the
    /// same person usually prepares the next quote.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.client.clear();
    }

    /// Switch price lists and re-derive every line's price from the
    /// current catalog.
    pub fn set_price_list(&mut self, catalog: &Catalog, price_list: PriceList) {
        self.price_list = price_list;
        for line in &mut self.lines {
            match catalog.get(&line.code) {
                Some(record) => line.unit_price = price_list.price(record.unit_price),
                None => warn!(code = %line.code, "Code no longer in catalog, keeping its price"),
            }
        }
        info!(price_list = %price_list, lines = self.lines.len(), "Price list changed");
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(OrderLine::amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog_text;

    fn catalog() -> Catalog {
        parse_catalog_text("1001,Martillo 16oz,129.50\n1002,Serrucho 22in,200\n20455,Pinza,90\n")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_secondary_list_round_trips_to_distributor_price() {
        for base in [0.0, 0.01, 45.0, 129.5, 999.99, 12_345.67] {
            let secondary = PriceList::SecondaryList.price(base);
            let back = (secondary * 0.90 * 100.0).round() / 100.0;
            assert!(approx(back, base), "{base} -> {secondary} -> {back}");
        }
        assert_eq!(PriceList::Distributor.price(129.5), 129.5);
    }

    #[test]
    fn test_price_list_from_str() {
        assert_eq!("distributor".parse::<PriceList>().unwrap(), PriceList::Distributor);
        assert_eq!(" Secondary ".parse::<PriceList>().unwrap(), PriceList::SecondaryList);
        assert!(matches!(
            "retail".parse::<PriceList>(),
            Err(QuoteError::BadPriceList(_))
        ));
    }

    #[test]
    fn test_add_product_snapshots_catalog_values() {
        let catalog = catalog();
        let mut session = QuoteSession::new(PriceList::Distributor);
        let line = session.add_product(&catalog, "1001", 3).unwrap().clone();

        assert_eq!(line.description, "Martillo 16oz");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price, 129.5);
        assert!(approx(session.total(), 388.5));
    }

    #[test]
    fn test_add_product_rejects_unknown_and_duplicate_codes() {
        let catalog = catalog();
        let mut session = QuoteSession::new(PriceList::Distributor);
        session.add_product(&catalog, "1001", 1).unwrap();

        assert!(matches!(
            session.add_product(&catalog, "1001", 2),
            Err(QuoteError::DuplicateCode(_))
        ));
        assert!(matches!(
            session.add_product(&catalog, "9999", 2),
            Err(QuoteError::UnknownCode(_))
        ));
        assert_eq!(session.lines().len(), 1);
    }

    #[test]
    fn test_zero_quantity_is_coerced_to_one() {
        let catalog = catalog();
        let mut session = QuoteSession::new(PriceList::Distributor);
        session.add_product(&catalog, "1002", 0).unwrap();
        assert_eq!(session.lines()[0].quantity, 1);

        session.set_quantity(0, 0).unwrap();
        assert_eq!(session.lines()[0].quantity, 1);
        session.set_quantity(0, 7).unwrap();
        assert_eq!(session.lines()[0].quantity, 7);
    }

    #[test]
    fn test_bad_indices_are_reported() {
        let mut session = QuoteSession::new(PriceList::Distributor);
        assert!(matches!(
            session.set_quantity(0, 2),
            Err(QuoteError::LineIndex { index: 0, len: 0 })
        ));
        assert!(matches!(session.remove(3), Err(QuoteError::LineIndex { .. })));
    }

    #[test]
    fn test_remove_and_clear() {
        let catalog = catalog();
        let mut session = QuoteSession::new(PriceList::Distributor);
        session.set_client("ferreteria lopez");
        session.set_agent("ana");
        session.add_product(&catalog, "1001", 1).unwrap();
        session.add_product(&catalog, "1002", 1).unwrap();

        let removed = session.remove(0).unwrap();
        assert_eq!(removed.code, "1001");
        assert_eq!(session.lines()[0].code, "1002");

        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.client(), "");
        assert_eq!(session.agent(), "ANA");
    }

    #[test]
    fn test_names_are_upper_cased() {
        let mut session = QuoteSession::default();
        session.set_client("  Ferretería López ");
        assert_eq!(session.client(), "FERRETERÍA LÓPEZ");
    }

    #[test]
    fn test_switching_price_list_recomputes_existing_lines() {
        let catalog = catalog();
        let mut session = QuoteSession::new(PriceList::Distributor);
        session.add_product(&catalog, "1002", 2).unwrap();

        session.set_price_list(&catalog, PriceList::SecondaryList);
        assert!(approx(session.lines()[0].unit_price, 200.0 / 0.90));

        session.set_price_list(&catalog, PriceList::Distributor);
        assert!(approx(session.lines()[0].unit_price, 200.0));
    }

    #[test]
    fn test_switching_price_list_keeps_price_of_vanished_code() {
        let mut session = QuoteSession::new(PriceList::Distributor);
        session.add_product(&catalog(), "20455", 1).unwrap();

        let reloaded = parse_catalog_text("1001,Martillo 16oz,129.50\n");
        session.set_price_list(&reloaded, PriceList::SecondaryList);
        assert_eq!(session.lines()[0].unit_price, 90.0);
    }

    #[test]
    fn test_paste_appends_and_skips_codes_already_quoted() {
        let catalog = catalog();
        let mut session = QuoteSession::new(PriceList::SecondaryList);
        session.add_product(&catalog, "1001", 1).unwrap();

        let outcome = session.paste(
            &catalog,
            "* 1001 5 martillo\n* 1002 2 serrucho\n",
            &ParseOptions::default(),
        );

        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(session.lines().len(), 2);
        assert_eq!(session.lines()[0].quantity, 1);
        assert!(approx(session.lines()[1].unit_price, 200.0 / 0.90));
    }
}
