use kranos_config::ConfigError;
use kranos_core::CoreError;
use kranos_domain::{DateParseError, MonthKeyError};
use thiserror::Error;

/// Unified error for the facade: every lower layer converts into it.
#[derive(Debug, Error)]
pub enum KranosError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Month(#[from] MonthKeyError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl KranosError {
    /// True when the operation was refused because its month is closed.
    pub fn is_closed_books(&self) -> bool {
        matches!(self, KranosError::Core(err) if err.is_closed_books())
    }
}

impl From<DateParseError> for KranosError {
    fn from(err: DateParseError) -> Self {
        KranosError::Core(CoreError::InvalidDate(err))
    }
}

pub type Result<T> = std::result::Result<T, KranosError>;

/// Failures that end the shell itself rather than a single command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Kranos(#[from] KranosError),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Kranos(err.into())
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Kranos(err.into())
    }
}
