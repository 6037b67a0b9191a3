use crate::error::{QuoteError, Result};
use crate::order_parser::{DEFAULT_HEADER_PHRASE, ParseOptions};
use crate::quote::PriceList;
use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf};
use toml_edit::{DocumentMut, value};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = ".config/quote_desk.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub quote: QuoteConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
    #[serde(default = "default_override_path")]
    pub override_path: Option<PathBuf>,
}

fn default_base_path() -> PathBuf {
    PathBuf::from("catalog/base.txt")
}

fn default_override_path() -> Option<PathBuf> {
    Some(PathBuf::from("catalog/overrides.txt"))
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            base_path: default_base_path(),
            override_path: default_override_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub price_list: PriceList,
    #[serde(default = "default_header_phrases")]
    pub header_phrases: Vec<String>,
}

fn default_header_phrases() -> Vec<String> {
    vec![DEFAULT_HEADER_PHRASE.to_string()]
}

impl Default for QuoteConfig {
    fn default() -> Self {
        QuoteConfig {
            agent: String::new(),
            price_list: PriceList::default(),
            header_phrases: default_header_phrases(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_validity_note")]
    pub validity_note: String,
    /// International number without `+`; when unset the WhatsApp link
    /// lets the user pick a chat.
    pub whatsapp_phone: Option<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_title() -> String {
    "Cotización de Pedidos".to_string()
}

fn default_validity_note() -> String {
    "La presente cotización es válida únicamente durante el mes y año de su emisión.".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            output_dir: default_output_dir(),
            title: default_title(),
            validity_note: default_validity_note(),
            whatsapp_phone: None,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| QuoteError::io(path, e))?;
        toml::from_str(&content).map_err(|source| QuoteError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(QuoteError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            header_phrases: self.quote.header_phrases.clone(),
        }
    }

    /// Persist the default agent name, keeping the rest of the file as
    /// written. Creates the file (and its directory) if needed.
    pub fn update_agent(path: impl AsRef<Path>, agent: &str) -> Result<()> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(QuoteError::io(path, e)),
        };
        let mut doc = content
            .parse::<DocumentMut>()
            .map_err(|e| QuoteError::ConfigEdit {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if !doc.contains_table("quote") {
            doc["quote"] = toml_edit::table();
        }
        doc["quote"]["agent"] = value(agent.trim().to_uppercase());

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| QuoteError::io(dir, e))?;
        }
        fs::write(path, doc.to_string()).map_err(|e| QuoteError::io(path, e))?;
        info!(path = %path.display(), "Default agent updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg.catalog.base_path, PathBuf::from("catalog/base.txt"));
        assert_eq!(cfg.quote.price_list, PriceList::Distributor);
        assert_eq!(cfg.quote.header_phrases, vec!["DETALLE DEL PEDIDO"]);
        assert!(cfg.export.whatsapp_phone.is_none());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(
            &path,
            r#"
[catalog]
base_path = "data/CATALOGO 25.txt"

[quote]
price_list = "secondary"

[export]
whatsapp_phone = "5215512345678"
"#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.catalog.base_path, PathBuf::from("data/CATALOGO 25.txt"));
        assert_eq!(
            cfg.catalog.override_path,
            Some(PathBuf::from("catalog/overrides.txt"))
        );
        assert_eq!(cfg.quote.price_list, PriceList::SecondaryList);
        assert_eq!(cfg.export.title, "Cotización de Pedidos");
        assert_eq!(cfg.export.whatsapp_phone.as_deref(), Some("5215512345678"));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(&path, "[quote\nagent = 1").unwrap();
        assert!(matches!(Config::load(&path), Err(QuoteError::Config { .. })));
    }

    #[test]
    fn test_update_agent_keeps_other_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(
            &path,
            "# shop settings\n[catalog]\nbase_path = \"a.txt\"\n\n[quote]\nagent = \"old\"\n",
        )
        .unwrap();

        Config::update_agent(&path, "maria g").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("# shop settings"));
        assert!(text.contains("base_path = \"a.txt\""));

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.quote.agent, "MARIA G");
        assert_eq!(cfg.catalog.base_path, PathBuf::from("a.txt"));
    }

    #[test]
    fn test_update_agent_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".config").join("quote_desk.toml");

        Config::update_agent(&path, "luis").unwrap();
        assert_eq!(Config::load(&path).unwrap().quote.agent, "LUIS");
    }
}
