// src/export/mod.rs

pub mod pdf;
pub mod whatsapp;

use crate::config::ExportConfig;
use crate::error::Result;
use crate::quote::QuoteSession;
use serde::Serialize;
use time::{Date, OffsetDateTime};

/// Document-level values shared by every export format.
#[derive(Debug, Clone)]
pub struct ExportMeta {
    pub title: String,
    pub validity_note: String,
    pub date: Date,
}

impl ExportMeta {
    pub fn from_config(cfg: &ExportConfig, date: Date) -> Self {
        ExportMeta {
            title: cfg.title.clone(),
            validity_note: cfg.validity_note.clone(),
            date,
        }
    }
}

/// Today's date in local time, falling back to UTC when the local offset
/// can't be determined.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// `$1,234.50` style amount with two decimals and thousands separators.
pub fn format_money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// `dd/mm/yyyy`
pub fn format_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// `cotizacion_<CLIENT>.pdf`, spaces replaced by underscores.
pub fn pdf_file_name(client: &str) -> String {
    let client = client.trim();
    if client.is_empty() {
        "cotizacion_cliente.pdf".to_string()
    } else {
        format!("cotizacion_{}.pdf", client.replace(' ', "_"))
    }
}

#[derive(Debug, Serialize)]
struct LineExport<'a> {
    code: &'a str,
    description: &'a str,
    quantity: u32,
    unit_price: f64,
    amount: f64,
}

#[derive(Debug, Serialize)]
struct QuoteExport<'a> {
    client: &'a str,
    agent: &'a str,
    price_list: crate::quote::PriceList,
    date: String,
    lines: Vec<LineExport<'a>>,
    total: f64,
}

/// Pretty-printed JSON of the quote, for scripting.
pub fn quote_json(session: &QuoteSession, date: Date) -> Result<String> {
    let export = QuoteExport {
        client: session.client(),
        agent: session.agent(),
        price_list: session.price_list(),
        date: format_date(date),
        lines: session
            .lines()
            .iter()
            .map(|l| LineExport {
                code: &l.code,
                description: &l.description,
                quantity: l.quantity,
                unit_price: l.unit_price,
                amount: l.amount(),
            })
            .collect(),
        total: session.total(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog_text;
    use crate::quote::PriceList;
    use time::Month;

    #[test]
    fn test_money_formatting() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(129.5), "$129.50");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(-45.1), "-$45.10");
    }

    #[test]
    fn test_date_formatting() {
        let date = Date::from_calendar_date(2025, Month::March, 7).unwrap();
        assert_eq!(format_date(date), "07/03/2025");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(pdf_file_name("FERRETERIA LOPEZ"), "cotizacion_FERRETERIA_LOPEZ.pdf");
        assert_eq!(pdf_file_name("  "), "cotizacion_cliente.pdf");
    }

    #[test]
    fn test_json_export_carries_amounts_and_total() {
        let catalog = parse_catalog_text("1001,Martillo,100\n1002,Pinza,50\n");
        let mut session = QuoteSession::new(PriceList::Distributor);
        session.set_client("acme");
        session.add_product(&catalog, "1001", 2).unwrap();
        session.add_product(&catalog, "1002", 1).unwrap();

        let date = Date::from_calendar_date(2025, Month::January, 15).unwrap();
        let json = quote_json(&session, date).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["client"], "ACME");
        assert_eq!(value["price_list"], "distributor");
        assert_eq!(value["date"], "15/01/2025");
        assert_eq!(value["lines"][0]["amount"], 200.0);
        assert_eq!(value["total"], 250.0);
    }
}
