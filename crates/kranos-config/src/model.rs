use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DATABASE_FILE_NAME: &str = "kranos.db";

/// User-editable settings, stored as JSON next to the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Database file. Defaults to `<base>/kranos.db`.
    pub database_path: Option<PathBuf>,
    /// Label printed next to amounts. Amounts themselves carry no currency.
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    #[serde(default = "Config::default_renewal_window_days")]
    pub renewal_window_days: u32,
    #[serde(default = "Config::default_true")]
    pub seed_default_plans: bool,
    #[serde(default = "Config::default_true")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            currency: Self::default_currency(),
            log_filter: None,
            renewal_window_days: Self::default_renewal_window_days(),
            seed_default_plans: true,
            ui_color_enabled: true,
        }
    }
}

impl Config {
    pub fn default_currency() -> String {
        "INR".into()
    }

    pub fn default_renewal_window_days() -> u32 {
        30
    }

    fn default_true() -> bool {
        true
    }

    pub fn resolve_database_path(&self, base: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join(DATABASE_FILE_NAME),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency label must not be empty".into()));
        }
        if self.renewal_window_days == 0 {
            return Err(ConfigError::Invalid(
                "renewal_window_days must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
