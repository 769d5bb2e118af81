use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

pub const DEFAULT_SOURCE_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";
pub const DEFAULT_TABLE_NAME: &str = "Largest_banks_marketcaps";

/// Locations and queries for one ETL run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    /// Page holding the bank table; `file://` URLs are read from disk.
    pub source_url: String,
    /// CSV with `Currency` and `Rate` columns.
    pub rates_path: PathBuf,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub table_name: String,
    pub log_path: PathBuf,
    /// Run in order after loading; printed to stdout.
    pub queries: Vec<String>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            rates_path: PathBuf::from("exchange_rate.csv"),
            csv_path: PathBuf::from("Largest_banks_marketcaps.csv"),
            db_path: PathBuf::from("LargestBanks.db"),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            log_path: PathBuf::from("code_log.txt"),
            queries: vec![
                format!("SELECT * FROM {DEFAULT_TABLE_NAME}"),
                format!("SELECT AVG(MC_USD_Billion) FROM {DEFAULT_TABLE_NAME}"),
                format!("SELECT Name FROM {DEFAULT_TABLE_NAME} WHERE MC_EUR_Billion > 200"),
            ],
        }
    }
}

impl EtlConfig {
    /// Parse a YAML config; missing keys fall back to [`EtlConfig::default`].
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing ETL config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("loading {:?}", path))
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
