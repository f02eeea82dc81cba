use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("help", "Show available commands", "help [command]", cmd_help),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(meta.summary());
    output::info(format!("  Build hash   : {} ({})", meta.git_hash, meta.git_status));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Rustc        : {}", meta.rustc));
    output::info(format!(
        "  Schema ver   : v{}",
        kranos_storage_sqlite::SCHEMA_VERSION
    ));
    output::info(format!("  Currency     : {}", context.ledger.config().currency));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.registry.find(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
