//! Shell state, command dispatch and error reporting.

use dialoguer::{theme::ColorfulTheme, Confirm};
use kranos_config::ConfigManager;
use kranos_core::CoreError;
use kranos_domain::{DateParseError, MonthKeyError};
use strsim::levenshtein;
use thiserror::Error;

use crate::cli::{commands, output, registry::CommandRegistry};
use crate::errors::{CliError, KranosError};
use crate::GymLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Failure of one command. The shell reports it and keeps running.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Kranos(#[from] KranosError),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Kranos(err.into())
    }
}

impl From<MonthKeyError> for CommandError {
    fn from(err: MonthKeyError) -> Self {
        CommandError::Kranos(err.into())
    }
}

impl From<DateParseError> for CommandError {
    fn from(err: DateParseError) -> Self {
        CommandError::Kranos(err.into())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::Kranos(err.into())
    }
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub ledger: GymLedger,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode, ledger: GymLedger) -> Self {
        Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            ledger,
            running: true,
        }
    }

    /// Loads configuration from `KRANOS_HOME` (or `~/.kranos`), installs
    /// logging and opens the database.
    pub fn from_env(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::from_env()?;
        let config = manager.load()?;
        crate::init_with_filter(config.log_filter.as_deref());
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);
        let path = manager.database_path(&config);
        let ledger = GymLedger::open_at(&path, config)?;
        Ok(Self::new(mode, ledger))
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn prompt(&self) -> String {
        "kranos> ".to_string()
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    /// Tokenizes and runs one input line.
    pub fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match shell_words::split(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(format!("could not parse input: {err}"));
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        if raw.starts_with('#') {
            return Ok(LoopControl::Continue);
        }

        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.find(command).map(|entry| entry.handler) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    /// Asks a yes/no question in interactive mode; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            CommandError::Kranos(err) if err.is_closed_books() => {
                output::error(&err);
                output::info("Reopen the month with `books open <YYYY-MM>` to change it.");
            }
            other => output::error(other),
        }
    }
}
