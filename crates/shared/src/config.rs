//! Ledger configuration management.

use serde::Deserialize;

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Closing configuration.
    #[serde(default)]
    pub closing: ClosingConfig,
    /// Journal configuration.
    #[serde(default)]
    pub journal: JournalConfig,
}

/// Fiscal closing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClosingConfig {
    /// Chart-of-accounts code of the retained earnings (Equity) account
    /// that receives the net result at period close.
    #[serde(default = "default_retained_earnings_code")]
    pub retained_earnings_code: String,
    /// Prefix for closing record codes (e.g. "PC" -> "PC-2026-01-31").
    #[serde(default = "default_closing_code_prefix")]
    pub code_prefix: String,
}

fn default_retained_earnings_code() -> String {
    "3201".to_string()
}

fn default_closing_code_prefix() -> String {
    "PC".to_string()
}

impl Default for ClosingConfig {
    fn default() -> Self {
        Self {
            retained_earnings_code: default_retained_earnings_code(),
            code_prefix: default_closing_code_prefix(),
        }
    }
}

/// Journal entry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    /// Prefix for generated entry references (e.g. "JE" -> "JE-000001").
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,
}

fn default_reference_prefix() -> String {
    "JE".to_string()
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            reference_prefix: default_reference_prefix(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            closing: ClosingConfig::default(),
            journal: JournalConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SALDO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
