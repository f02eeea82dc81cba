use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    output::section("Available commands");
    for entry in registry.iter() {
        output::info(format!("  {:<12} {}", entry.name, entry.description));
    }
    output::info("Use `help <command>` for details.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    output::info(format!("  Description: {}", entry.description));
    for (idx, usage) in entry.usage.lines().enumerate() {
        let label = if idx == 0 { "Usage:" } else { "      " };
        output::info(format!("  {label} {usage}"));
    }
}
