use crate::cli::args::Args;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "books status <YYYY-MM>\n\
                     books close <YYYY-MM>\n\
                     books open <YYYY-MM>\n\
                     books list";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "books",
        "Show, close or reopen the books for a month",
        USAGE,
        cmd_books,
    )]
}

fn cmd_books(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: books <status|close|open|list>".into(),
        ));
    };
    let args = Args::parse(rest, &[], &[])?;
    match sub.to_lowercase().as_str() {
        "status" => {
            let month = args.required(0, "YYYY-MM")?;
            let status = context.ledger.book_status(month)?;
            output::info(format!("Books for {month}: {status}"));
            Ok(())
        }
        "close" => {
            let month = args.required(0, "YYYY-MM")?;
            let overview = context.ledger.month_overview(month)?;
            output::info(format!(
                "{} transaction(s), revenue {}",
                overview.summary.transaction_count,
                context.ledger.format_amount(overview.summary.total_revenue)
            ));
            context.ledger.set_book_status(month, "closed")?;
            output::success(format!("Books for {month} closed"));
            Ok(())
        }
        "open" => {
            let month = args.required(0, "YYYY-MM")?;
            context.ledger.set_book_status(month, "open")?;
            output::success(format!("Books for {month} reopened"));
            Ok(())
        }
        "list" => {
            let rows: Vec<Vec<String>> = context
                .ledger
                .book_statuses()?
                .into_iter()
                .map(|record| {
                    vec![
                        record.month.to_string(),
                        record.status.to_string(),
                        record
                            .closed_at
                            .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            output::table(&["Month", "Status", "Closed at"], &rows);
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown books subcommand `{other}`"
        ))),
    }
}
