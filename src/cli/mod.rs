//! The `kranos_cli` command shell. Glue only: every rule lives in the core
//! services behind [`crate::GymLedger`].

pub mod args;
pub mod commands;
pub mod context;
pub mod help;
pub mod output;
pub mod registry;
mod shell;

pub use context::{CliMode, CommandError, CommandResult, LoopControl, ShellContext};
pub use shell::{run_cli, run_script, SCRIPT_ENV};
