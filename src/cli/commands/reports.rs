use kranos_domain::{format_date, FinancialSummary, PendingRenewal};

use crate::cli::args::{parse_number, Args};
use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::GymLedger;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "renewals",
            "List group-class memberships due for renewal",
            "renewals <YYYY-MM>\nrenewals upcoming [days]",
            cmd_renewals,
        ),
        CommandEntry::new(
            "report",
            "Revenue for an inclusive purchase-date range",
            "report <start YYYY-MM-DD> <end YYYY-MM-DD> [--json]",
            cmd_report,
        ),
        CommandEntry::new(
            "overview",
            "Book status and revenue for one month",
            "overview <YYYY-MM>",
            cmd_overview,
        ),
    ]
}

fn cmd_renewals(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &[], &[])?;
    let first = args.required(0, "YYYY-MM or `upcoming`")?;
    let renewals = if first.eq_ignore_ascii_case("upcoming") {
        let days = args
            .get(1)
            .map(|raw| parse_number::<u32>(raw, "days"))
            .transpose()?;
        let days_label = days.unwrap_or(context.ledger.config().renewal_window_days);
        output::section(format!("Renewals due in the next {days_label} day(s)"));
        context.ledger.upcoming_renewals(days)?
    } else {
        output::section(format!("Renewals due in {first}"));
        context.ledger.pending_renewals(first)?
    };
    output::table(
        &["Membership", "Member", "Phone", "Plan", "Ends"],
        &renewals.iter().map(renewal_row).collect::<Vec<_>>(),
    );
    Ok(())
}

fn cmd_report(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &[], &["--json"])?;
    let report = context
        .ledger
        .financial_report(args.required(0, "start")?, args.required(1, "end")?)?;

    if args.flag("--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::section(format!(
        "Revenue {} to {}",
        format_date(report.start),
        format_date(report.end)
    ));
    print_summary(&context.ledger, &report.summary);
    let rows: Vec<Vec<String>> = report
        .details
        .iter()
        .map(|detail| {
            vec![
                detail.membership_id.to_string(),
                format_date(detail.purchase_date),
                detail.member_name.clone(),
                detail.transaction_type.to_string(),
                detail.item_name.clone(),
                context.ledger.format_amount(detail.amount_paid),
            ]
        })
        .collect();
    output::table(
        &["Membership", "Purchased", "Member", "Type", "Item", "Paid"],
        &rows,
    );
    Ok(())
}

fn cmd_overview(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &[], &[])?;
    let month = args.required(0, "YYYY-MM")?;
    let overview = context.ledger.month_overview(month)?;
    output::section(format!("{} ({})", overview.month, overview.status));
    print_summary(&context.ledger, &overview.summary);
    Ok(())
}

fn print_summary(ledger: &GymLedger, summary: &FinancialSummary) {
    output::info(format!(
        "  Total             : {}",
        ledger.format_amount(summary.total_revenue)
    ));
    output::info(format!(
        "  Group class       : {}",
        ledger.format_amount(summary.group_class_revenue)
    ));
    output::info(format!(
        "  Personal training : {}",
        ledger.format_amount(summary.personal_training_revenue)
    ));
    output::info(format!("  Transactions      : {}", summary.transaction_count));
}

fn renewal_row(renewal: &PendingRenewal) -> Vec<String> {
    vec![
        renewal.membership_id.to_string(),
        renewal.member_name.clone(),
        renewal.phone.clone(),
        renewal.plan_name.clone(),
        format_date(renewal.end_date),
    ]
}

