use crate::catalog::{CatalogWarning, ProductRecord};
use crate::export::format_money;
use crate::order_parser::{ParseOutcome, PasteStatus};
use crate::quote::QuoteSession;
use std::io::{self, Write};

pub fn print_catalog_warnings(out: &mut impl Write, warnings: &[CatalogWarning]) -> io::Result<()> {
    for w in warnings {
        writeln!(out, "⚠️  {w}")?;
    }
    Ok(())
}

pub fn print_products<'a>(
    out: &mut impl Write,
    products: impl IntoIterator<Item = &'a ProductRecord>,
) -> io::Result<()> {
    for p in products {
        writeln!(out, "{:<60} {:>12}", p.display_label, format_money(p.unit_price))?;
    }
    Ok(())
}

/// Success count, or the "nothing matched" warning, then the unknown
/// codes as a separate list.
pub fn print_paste_report(out: &mut impl Write, outcome: &ParseOutcome) -> io::Result<()> {
    match outcome.status() {
        PasteStatus::Added(n) => writeln!(out, "✅ {n} product(s) added to the quote")?,
        PasteStatus::AlreadyPresent(n) => {
            writeln!(out, "ℹ️  {n} recognized product(s) were already in the quote")?
        }
        PasteStatus::UnknownOnly(n) => {
            writeln!(out, "⚠️  {n} code/quantity line(s) recognized, none of them in the catalog")?
        }
        PasteStatus::NothingMatched => {
            writeln!(out, "⚠️  No valid code/quantity pattern found in the pasted text")?
        }
    }

    if !outcome.unknown.is_empty() {
        writeln!(out, "❌ Codes not found in the catalog:")?;
        for d in &outcome.unknown {
            writeln!(out, "   {} (x{})  <- {}", d.code, d.quantity, d.line.trim())?;
        }
    }
    Ok(())
}

pub fn print_quote(out: &mut impl Write, session: &QuoteSession) -> io::Result<()> {
    if session.is_empty() {
        writeln!(out, "The quote is empty. Add products to start.")?;
        return Ok(());
    }

    writeln!(
        out,
        "Client: {}   Agent: {}   Price list: {}",
        session.client(),
        session.agent(),
        session.price_list()
    )?;
    writeln!(
        out,
        "{:>3}  {:<8} {:<50} {:>5} {:>12} {:>12}",
        "#", "Code", "Description", "Qty", "Unit", "Amount"
    )?;
    for (i, line) in session.lines().iter().enumerate() {
        let description: String = line.description.chars().take(50).collect();
        writeln!(
            out,
            "{:>3}  {:<8} {:<50} {:>5} {:>12} {:>12}",
            i + 1,
            line.code,
            description,
            line.quantity,
            format_money(line.unit_price),
            format_money(line.amount())
        )?;
    }
    writeln!(out, "Total: {}", format_money(session.total()))
}
