pub mod books;
pub mod members;
pub mod memberships;
pub mod plans;
pub mod reports;
pub mod system;

use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(books::definitions());
    commands.extend(members::definitions());
    commands.extend(plans::definitions());
    commands.extend(memberships::definitions());
    commands.extend(reports::definitions());
    commands
}
