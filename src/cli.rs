// src/cli.rs

use crate::config::DEFAULT_CONFIG_PATH;
use crate::error::{QuoteError, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "quote-desk",
    version,
    about = "Build product quotes from the catalog or from an order pasted out of a chat",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Settings file (missing file means defaults).
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Base catalog file (overrides the config).
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Price/description override file (overrides the config).
    #[arg(long, global = true, value_name = "PATH")]
    pub overrides: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the catalog by code or description.
    Search(SearchArgs),

    /// Build a quote in one go and export it.
    Build(BuildArgs),

    /// Interactive quoting session.
    Shell,

    /// Show or edit the settings file.
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Terms that must all appear in "code - description".
    #[arg(required = true)]
    pub query: Vec<String>,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Print matches as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[arg(long)]
    pub client: Option<String>,

    /// Defaults to the agent in the config.
    #[arg(long)]
    pub agent: Option<String>,

    /// `distributor` or `secondary`.
    #[arg(long, value_name = "LIST")]
    pub price_list: Option<String>,

    /// File with a pasted chat order (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub paste: Option<PathBuf>,

    /// Add a product manually; repeatable.
    #[arg(long = "add", value_name = "CODE:QTY")]
    pub add: Vec<String>,

    /// Write a PDF; without a path it goes to the configured output dir.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub pdf: Option<Option<PathBuf>>,

    /// Print the WhatsApp message and link.
    #[arg(long)]
    pub whatsapp: bool,

    /// Print the quote as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Print the effective settings.
    Show,

    /// Store the default agent name.
    SetAgent {
        #[arg(required = true)]
        name: Vec<String>,
    },
}

/// `CODE:QTY` or `CODE` (quantity 1).
pub fn parse_line_spec(spec: &str) -> Result<(String, u32)> {
    let bad = || QuoteError::BadLineSpec(spec.to_string());
    let (code, qty) = match spec.split_once(':') {
        Some((code, qty)) => (code.trim(), qty.trim().parse::<u32>().map_err(|_| bad())?),
        None => (spec.trim(), 1),
    };
    if code.is_empty() {
        return Err(bad());
    }
    Ok((code.to_string(), qty))
}
