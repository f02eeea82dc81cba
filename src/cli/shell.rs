use std::{
    env,
    io::{self, BufRead},
};

use rustyline::{
    completion::Completer, error::ReadlineError, history::DefaultHistory, Context, Editor, Helper,
    Highlighter, Hinter, Validator,
};

use crate::cli::context::{CliMode, LoopControl, ShellContext};
use crate::cli::output;
use crate::errors::CliError;

/// When set, commands are read line by line from stdin without prompting.
pub const SCRIPT_ENV: &str = "KRANOS_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = match env::var_os(SCRIPT_ENV) {
        Some(_) => CliMode::Script,
        None => CliMode::Interactive,
    };
    let mut context = ShellContext::from_env(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context, io::stdin().lock()),
    }
}

/// Runs every line of `input` as a command. A failing command is reported
/// and the script continues.
pub fn run_script(context: &mut ShellContext, input: impl BufRead) -> Result<(), CliError> {
    for line in input.lines() {
        if !execute(context, &line?) {
            break;
        }
    }
    Ok(())
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor: Editor<CommandNames, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(CommandNames(context.command_names())));
    output::info("Kranos gym ledger. Type `help` for commands.");

    loop {
        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) if context.confirm_exit()? => return Ok(()),
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line).ok();
        if !execute(context, line) {
            return Ok(());
        }
    }
}

/// Returns false once the shell should stop.
fn execute(context: &mut ShellContext, line: &str) -> bool {
    match context.process_line(line) {
        Ok(LoopControl::Continue) => context.running,
        Ok(LoopControl::Exit) => false,
        Err(err) => {
            context.report_error(err);
            context.running
        }
    }
}

/// Tab completion for the command word.
#[derive(Helper, Hinter, Highlighter, Validator)]
struct CommandNames(Vec<&'static str>);

impl Completer for CommandNames {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let head = &line[..pos];
        let word = head.trim_start();
        if word.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let needle = word.to_ascii_lowercase();
        let matches = self
            .0
            .iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| name.to_string())
            .collect();
        Ok((head.len() - word.len(), matches))
    }
}
