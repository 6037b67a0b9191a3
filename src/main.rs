mod catalog;
mod cli;
mod config;
mod error;
mod export;
mod order_parser;
mod quote;
mod report;
mod shell;

use catalog::{CatalogLoad, load_catalog};
use clap::Parser;
use cli::{BuildArgs, Cli, Command, ConfigCmd, SearchArgs, parse_line_spec};
use config::Config;
use export::{ExportMeta, pdf, whatsapp};
use quote::{PriceList, QuoteSession};
use std::io::{self, Read};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing; stdout is reserved for quote output
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load_or_default(&cli.config)?;

    let base = cli
        .catalog
        .clone()
        .unwrap_or_else(|| cfg.catalog.base_path.clone());
    let overrides = cli.overrides.clone().or_else(|| cfg.catalog.override_path.clone());

    match cli.command {
        Command::Search(args) => run_search(&base, overrides.as_deref(), &args)?,
        Command::Build(args) => run_build(&cfg, &base, overrides.as_deref(), args)?,
        Command::Shell => {
            let mut shell = shell::Shell::new(cfg, base, overrides);
            shell.run(io::stdin().lock(), &mut io::stdout())?;
        }
        Command::Config(ConfigCmd::Show) => run_config_show(&cli.config, &cfg, &base, overrides.as_deref()),
        Command::Config(ConfigCmd::SetAgent { name }) => {
            Config::update_agent(&cli.config, &name.join(" "))?;
            println!("Default agent saved to {}", cli.config.display());
        }
    }

    Ok(())
}

fn load(base: &Path, overrides: Option<&Path>) -> io::Result<CatalogLoad> {
    let load = load_catalog(base, overrides);
    report::print_catalog_warnings(&mut io::stderr(), &load.warnings)?;
    Ok(load)
}

fn run_search(
    base: &Path,
    overrides: Option<&Path>,
    args: &SearchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load(base, overrides)?.catalog;
    if catalog.is_empty() {
        warn!(path = %base.display(), "Catalog is empty, nothing to search");
    }
    let hits = catalog.search(&args.query.join(" "), args.limit);
    info!(query = ?args.query, hits = hits.len(), "Catalog search");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        report::print_products(&mut io::stdout(), hits)?;
    }
    Ok(())
}

fn run_build(
    cfg: &Config,
    base: &Path,
    overrides: Option<&Path>,
    args: BuildArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load(base, overrides)?.catalog;

    let price_list = match &args.price_list {
        Some(name) => name.parse::<PriceList>()?,
        None => cfg.quote.price_list,
    };
    let mut session = QuoteSession::new(price_list);
    session.set_client(args.client.as_deref().unwrap_or_default());
    session.set_agent(args.agent.as_deref().unwrap_or(&cfg.quote.agent));

    for spec in &args.add {
        let (code, qty) = parse_line_spec(spec)?;
        if let Err(e) = session.add_product(&catalog, &code, qty) {
            warn!(spec = %spec, error = %e, "Manual line skipped");
            eprintln!("⚠️  {e}");
        }
    }

    if let Some(source) = &args.paste {
        let text = read_paste(source)?;
        let outcome = session.paste(&catalog, &text, &cfg.parse_options());
        report::print_paste_report(&mut io::stderr(), &outcome)?;
    }

    let date = export::today();
    let meta = ExportMeta::from_config(&cfg.export, date);

    if let Some(target) = &args.pdf {
        let path = target.clone().unwrap_or_else(|| {
            cfg.export
                .output_dir
                .join(export::pdf_file_name(session.client()))
        });
        pdf::save_quote_pdf(&session, &meta, &path)?;
        eprintln!("📄 Saved {}", path.display());
    }

    if args.whatsapp {
        let text = whatsapp::format_message(&session, &meta);
        println!("{text}\n");
        println!(
            "{}",
            whatsapp::deep_link(&text, cfg.export.whatsapp_phone.as_deref())
        );
    }

    if args.json {
        println!("{}", export::quote_json(&session, date)?);
    }

    if args.pdf.is_none() && !args.whatsapp && !args.json {
        report::print_quote(&mut io::stdout(), &session)?;
    }
    Ok(())
}

fn read_paste(source: &Path) -> Result<String, error::QuoteError> {
    let mut text = String::new();
    if source == Path::new("-") {
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| error::QuoteError::io("<stdin>", e))?;
    } else {
        let bytes = std::fs::read(source).map_err(|e| error::QuoteError::io(source, e))?;
        text = String::from_utf8_lossy(&bytes).into_owned();
    }
    Ok(text)
}

fn run_config_show(config_path: &Path, cfg: &Config, base: &Path, overrides: Option<&Path>) {
    println!("config file:    {}", config_path.display());
    println!("catalog:        {}", base.display());
    match overrides {
        Some(p) => println!("overrides:      {}", p.display()),
        None => println!("overrides:      (none)"),
    }
    println!("agent:          {}", cfg.quote.agent);
    println!("price list:     {}", cfg.quote.price_list);
    println!("header phrases: {}", cfg.quote.header_phrases.join(" | "));
    println!("output dir:     {}", cfg.export.output_dir.display());
    println!("title:          {}", cfg.export.title);
    println!(
        "whatsapp phone: {}",
        cfg.export.whatsapp_phone.as_deref().unwrap_or("(none)")
    );
}
