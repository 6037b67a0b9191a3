// src/shell.rs

use crate::catalog::{Catalog, CatalogCache};
use crate::cli::parse_line_spec;
use crate::config::Config;
use crate::error::QuoteError;
use crate::export::{self, ExportMeta, pdf, whatsapp};
use crate::quote::{PriceList, QuoteSession};
use crate::report;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  search <terms>            find products by code or description
  add <code>[:qty] [qty]    add a product (default qty 1)
  paste                     paste a chat order, end with a line containing only '.'
  list                      show the quote
  qty <n> <qty>             change the quantity of line n
  rm <n>                    remove line n
  clear                     empty the quote and forget the client
  client <name>             set the client name
  agent <name>              set the agent name
  pricelist [distributor|secondary]
  pdf [path]                write the quote PDF
  whatsapp                  print the WhatsApp message and link
  json                      print the quote as JSON
  reload                    re-read the catalog files
  help | quit";

/// Line-oriented stand-in for the quoting form: one quote session per run.
pub struct Shell {
    config: Config,
    base: PathBuf,
    overrides: Option<PathBuf>,
    cache: CatalogCache,
    catalog: Catalog,
    session: QuoteSession,
}

impl Shell {
    pub fn new(config: Config, base: PathBuf, overrides: Option<PathBuf>) -> Self {
        let mut session = QuoteSession::new(config.quote.price_list);
        session.set_agent(&config.quote.agent);
        Shell {
            config,
            base,
            overrides,
            cache: CatalogCache::new(),
            catalog: Catalog::new(),
            session,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &QuoteSession {
        &self.session
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        self.reload(out)?;
        writeln!(out, "Type 'help' for commands.")?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            match cmd.to_lowercase().as_str() {
                "quit" | "exit" | "q" => break,
                "help" | "?" => writeln!(out, "{HELP}")?,
                "search" | "s" => {
                    let hits = self.catalog.search(rest, 20);
                    if hits.is_empty() {
                        writeln!(out, "No products match {rest:?}")?;
                    }
                    report::print_products(out, hits)?;
                }
                "add" | "a" => self.add(rest, out)?,
                "paste" | "p" => {
                    writeln!(out, "Paste the order, then a line with only '.':")?;
                    let mut text = String::new();
                    for pasted in lines.by_ref() {
                        let pasted = pasted?;
                        if pasted.trim() == "." {
                            break;
                        }
                        text.push_str(&pasted);
                        text.push('\n');
                    }
                    let options = self.config.parse_options();
                    let outcome = self.session.paste(&self.catalog, &text, &options);
                    report::print_paste_report(out, &outcome)?;
                }
                "list" | "ls" => report::print_quote(out, &self.session)?,
                "qty" => self.set_quantity(rest, out)?,
                "rm" | "del" => match parse_index(rest) {
                    Some(i) => match self.session.remove(i) {
                        Ok(line) => writeln!(out, "Removed {} - {}", line.code, line.description)?,
                        Err(e) => writeln!(out, "❌ {e}")?,
                    },
                    None => writeln!(out, "usage: rm <n>")?,
                },
                "clear" => {
                    self.session.clear();
                    writeln!(out, "Quote cleared")?;
                }
                "client" => {
                    self.session.set_client(rest);
                    writeln!(out, "Client: {}", self.session.client())?;
                }
                "agent" => {
                    self.session.set_agent(rest);
                    writeln!(out, "Agent: {}", self.session.agent())?;
                }
                "pricelist" => {
                    if rest.is_empty() {
                        writeln!(out, "Price list: {}", self.session.price_list())?;
                    } else {
                        match rest.parse::<PriceList>() {
                            Ok(list) => {
                                self.session.set_price_list(&self.catalog, list);
                                writeln!(out, "Price list: {list}")?;
                            }
                            Err(e) => writeln!(out, "❌ {e}")?,
                        }
                    }
                }
                "pdf" => self.pdf(rest, out)?,
                "whatsapp" | "wa" => {
                    let text = whatsapp::format_message(&self.session, &self.meta());
                    let link = whatsapp::deep_link(&text, self.config.export.whatsapp_phone.as_deref());
                    writeln!(out, "{text}\n\n{link}")?;
                }
                "json" => match export::quote_json(&self.session, export::today()) {
                    Ok(json) => writeln!(out, "{json}")?,
                    Err(e) => writeln!(out, "❌ {e}")?,
                },
                "reload" => self.reload(out)?,
                other => writeln!(out, "Unknown command {other:?}; type 'help'")?,
            }
        }

        info!(lines = self.session.lines().len(), "Shell closed");
        Ok(())
    }

    fn reload<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let load = self.cache.load(&self.base, self.overrides.as_deref());
        report::print_catalog_warnings(out, &load.warnings)?;
        self.catalog = load.catalog;
        debug!(
            products = self.catalog.len(),
            cached_sources = self.cache.len(),
            "Catalog reloaded"
        );
        writeln!(out, "Catalog: {} products", self.catalog.len())
    }

    fn add<W: Write>(&mut self, rest: &str, out: &mut W) -> io::Result<()> {
        let mut parts = rest.split_whitespace();
        let parsed = match (parts.next(), parts.next()) {
            (Some(spec), None) => parse_line_spec(spec),
            (Some(code), Some(qty)) => qty
                .parse::<u32>()
                .map(|q| (code.to_string(), q))
                .map_err(|_| QuoteError::BadLineSpec(rest.to_string())),
            _ => {
                writeln!(out, "usage: add <code>[:qty] [qty]")?;
                return Ok(());
            }
        };

        let result = parsed.and_then(|(code, qty)| {
            self.session
                .add_product(&self.catalog, &code, qty)
                .map(|l| {
                    format!(
                        "Added {} - {} x{} at {}",
                        l.code,
                        l.description,
                        l.quantity,
                        export::format_money(l.unit_price)
                    )
                })
        });
        match result {
            Ok(msg) => writeln!(out, "{msg}"),
            Err(QuoteError::DuplicateCode(code)) => {
                writeln!(out, "⚠️  {code} is already in the quote; use 'qty' to change it")
            }
            Err(e) => writeln!(out, "❌ {e}"),
        }
    }

    fn set_quantity<W: Write>(&mut self, rest: &str, out: &mut W) -> io::Result<()> {
        let mut parts = rest.split_whitespace();
        let index = parts.next().and_then(parse_index);
        let qty = parts.next().and_then(|q| q.parse::<u32>().ok());
        match (index, qty) {
            (Some(i), Some(q)) => match self.session.set_quantity(i, q) {
                Ok(()) => report::print_quote(out, &self.session),
                Err(e) => writeln!(out, "❌ {e}"),
            },
            _ => writeln!(out, "usage: qty <n> <qty>"),
        }
    }

    fn pdf<W: Write>(&mut self, rest: &str, out: &mut W) -> io::Result<()> {
        let path = if rest.is_empty() {
            self.config
                .export
                .output_dir
                .join(export::pdf_file_name(self.session.client()))
        } else {
            PathBuf::from(rest)
        };
        match pdf::save_quote_pdf(&self.session, &self.meta(), &path) {
            Ok(()) => writeln!(out, "📄 Saved {}", path.display()),
            Err(e) => writeln!(out, "❌ {e}"),
        }
    }

    fn meta(&self) -> ExportMeta {
        ExportMeta::from_config(&self.config.export, export::today())
    }
}

/// 1-based line number typed by the user to a 0-based index.
fn parse_index(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok()?.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    fn shell_in(dir: &std::path::Path) -> Shell {
        let base = dir.join("base.txt");
        let overrides = dir.join("overrides.txt");
        fs::write(&base, "1001,Martillo 16oz,100\n1002,Serrucho 22in,200\n20455,Pinza,90\n").unwrap();
        fs::write(&overrides, "1002,Serrucho 22in reforzado,250\n").unwrap();

        let mut config = Config::default();
        config.quote.agent = "ana".to_string();
        config.export.output_dir = dir.join("quotes");
        Shell::new(config, base, Some(overrides))
    }

    fn run(shell: &mut Shell, script: &str) -> String {
        let mut out = Vec::new();
        shell.run(Cursor::new(script.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_full_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());

        let script = "\
client ferreteria lopez
add 1001:2
add 1001
paste
*DETALLE DEL PEDIDO*
- 1002 3 serrucho
- 9999 1 no existe
.
qty 1 5
pricelist secondary
pdf
quit
";
        let out = run(&mut shell, script);

        assert!(out.contains("Catalog: 3 products"));
        assert!(out.contains("already in the quote"));
        assert!(out.contains("1 product(s) added"));
        assert!(out.contains("9999 (x1)"));
        assert!(out.contains("Saved"));

        let session = shell.session();
        assert_eq!(session.client(), "FERRETERIA LOPEZ");
        assert_eq!(session.agent(), "ANA");
        assert_eq!(session.lines().len(), 2);
        assert_eq!(session.lines()[0].quantity, 5);
        assert!((session.lines()[1].unit_price - 250.0 / 0.90).abs() < 1e-9);
        assert!(dir
            .path()
            .join("quotes")
            .join("cotizacion_FERRETERIA_LOPEZ.pdf")
            .exists());
    }

    #[test]
    fn test_bad_input_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());

        let out = run(&mut shell, "add 5555 2\nrm 4\nqty x\npricelist retail\nfrobnicate\npdf\n");
        assert!(out.contains("5555 is not in the catalog"));
        assert!(out.contains("no quote line at position 3"));
        assert!(out.contains("usage: qty"));
        assert!(out.contains("unknown price list"));
        assert!(out.contains("Unknown command"));
        assert!(out.contains("the quote is empty"));
    }

    #[test]
    fn test_missing_catalog_warns_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = Shell::new(Config::default(), dir.path().join("absent.txt"), None);

        let out = run(&mut shell, "search martillo\nwhatsapp\n");
        assert!(out.contains("continuing with an empty catalog"));
        assert!(out.contains("Catalog: 0 products"));
        assert!(out.contains("*COTIZACIÓN*"));
        assert!(out.contains("https://wa.me/?text="));
    }

    #[test]
    fn test_index_parsing() {
        assert_eq!(parse_index("1"), Some(0));
        assert_eq!(parse_index("0"), None);
        assert_eq!(parse_index("x"), None);
    }
}
