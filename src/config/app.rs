//! Application configuration loading from config.toml
//!
//! The configuration file lists the residents to seed on first run (optionally linked to
//! a Discord user) and the currency symbol used when printing balances. Every section is
//! optional; a missing file means "use the defaults".

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// How amounts are printed
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Residents to create if they don't exist yet
    #[serde(default)]
    pub residents: Vec<ResidentConfig>,
}

/// Currency display settings
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// Symbol placed before amounts (e.g., "₱", "$")
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
        }
    }
}

fn default_symbol() -> String {
    "₱".to_string()
}

/// Configuration for a single resident
#[derive(Debug, Deserialize, Clone)]
pub struct ResidentConfig {
    /// Nickname shown in the ledger
    pub nickname: String,
    /// Discord user ID of this resident, used to fill in "paid by" defaults
    #[serde(default)]
    pub discord_user_id: Option<String>,
}

impl AppConfig {
    /// Nickname of the resident linked to a Discord user, if any.
    #[must_use]
    pub fn nickname_for_user(&self, user_id: &str) -> Option<&str> {
        self.residents
            .iter()
            .find(|r| r.discord_user_id.as_deref() == Some(user_id))
            .map(|r| r.nickname.as_str())
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file
///
/// A missing file yields [`AppConfig::default`].
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No configuration file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `CONFIG_PATH`, or ./config.toml when unset
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
