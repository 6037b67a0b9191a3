// src/export/whatsapp.rs

use super::{ExportMeta, format_date, format_money};
use crate::quote::QuoteSession;

const DOUBLE_RULE: &str = "======================================";
const SINGLE_RULE: &str = "--------------------------------------";

/// Render the quote as a chat message. Text between `*` shows bold in
/// WhatsApp.
pub fn format_message(session: &QuoteSession, meta: &ExportMeta) -> String {
    let mut out = String::new();

    out.push_str("*COTIZACIÓN*\n");
    out.push_str(DOUBLE_RULE);
    out.push('\n');
    out.push_str(&format!("*Cliente:* {}\n", session.client()));
    out.push_str(&format!("*Atendido por:* {}\n", session.agent()));
    out.push_str(&format!("*Fecha:* {}\n", format_date(meta.date)));
    out.push_str(SINGLE_RULE);
    out.push('\n');
    out.push_str("*Productos Solicitados:*\n");

    for line in session.lines() {
        out.push_str(&format!(
            "\n- ({}x) [{}] *{}*\n",
            line.quantity, line.code, line.description
        ));
        out.push_str(&format!("  Importe: {}", format_money(line.amount())));
    }

    out.push('\n');
    out.push_str(SINGLE_RULE);
    out.push('\n');
    out.push_str(&format!("*TOTAL: {}*\n", format_money(session.total())));
    out.push_str(DOUBLE_RULE);
    out.push('\n');
    out.push_str(&format!("*{}*", meta.validity_note));
    out
}

/// `wa.me` deep link that opens a chat with `text` prefilled. Non-digits
/// in `phone` are dropped; without a phone the user picks the chat.
pub fn deep_link(text: &str, phone: Option<&str>) -> String {
    let phone: String = phone
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    format!("https://wa.me/{phone}?text={}", urlencoding::encode(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog_text;
    use crate::quote::PriceList;
    use time::{Date, Month};

    fn meta() -> ExportMeta {
        ExportMeta {
            title: "Cotización de Pedidos".to_string(),
            validity_note: "Válida este mes.".to_string(),
            date: Date::from_calendar_date(2025, Month::June, 2).unwrap(),
        }
    }

    #[test]
    fn test_message_follows_template() {
        let catalog = parse_catalog_text("1001,Martillo 16oz,1200\n1002,Pinza,45.5\n");
        let mut session = QuoteSession::new(PriceList::Distributor);
        session.set_client("ferreteria lopez");
        session.set_agent("ana");
        session.add_product(&catalog, "1001", 2).unwrap();
        session.add_product(&catalog, "1002", 1).unwrap();

        let expected = "\
*COTIZACIÓN*
======================================
*Cliente:* FERRETERIA LOPEZ
*Atendido por:* ANA
*Fecha:* 02/06/2025
--------------------------------------
*Productos Solicitados:*

- (2x) [1001] *Martillo 16oz*
  Importe: $2,400.00
- (1x) [1002] *Pinza*
  Importe: $45.50
--------------------------------------
*TOTAL: $2,445.50*
======================================
*Válida este mes.*";

        assert_eq!(format_message(&session, &meta()), expected);
    }

    #[test]
    fn test_deep_link_encodes_text() {
        let link = deep_link("*TOTAL: $10.00*\nÁ", Some("+52 1 55 1234 5678"));
        assert_eq!(
            link,
            "https://wa.me/5215512345678?text=%2ATOTAL%3A%20%2410.00%2A%0A%C3%81"
        );
        assert!(deep_link("hola", None).starts_with("https://wa.me/?text="));
    }
}
