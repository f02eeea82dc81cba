use kranos_core::{MembershipRequest, MembershipUpdate};
use kranos_domain::{format_date, Displayable, EntityId, TransactionType};

use crate::cli::args::{parse_id, parse_number, single_id, Args};
use crate::cli::commands::members::print_memberships;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "membership record-group <member> <plan> <start> [amount] \
                     [--purchased YYYY-MM-DD] [--method M]\n\
                     membership record-pt <member> <sessions> <start> <amount> \
                     [--purchased YYYY-MM-DD] [--method M] [--plan ID]\n\
                     membership update <id> <start> <amount> [--plan ID] [--purchased YYYY-MM-DD]\n\
                     membership delete <id>\n\
                     membership list <member>\n\
                     membership use-session <id>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "membership",
        "Record, change or remove membership purchases",
        USAGE,
        cmd_membership,
    )]
}

fn cmd_membership(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: membership <record-group|record-pt|update|delete|list|use-session>".into(),
        ));
    };
    match sub.to_lowercase().as_str() {
        "record-group" => record_group(context, rest),
        "record-pt" => record_personal_training(context, rest),
        "update" => update(context, rest),
        "delete" => {
            let id = single_id(rest, "membership")?;
            let label = context.ledger.membership(id)?.display_label();
            context.ledger.delete_membership(id)?;
            output::success(format!("Deleted {label}"));
            Ok(())
        }
        "list" => {
            let member = single_id(rest, "member")?;
            let memberships = context.ledger.memberships_for_member(member)?;
            print_memberships(&context.ledger, &memberships);
            Ok(())
        }
        "use-session" => {
            let id = single_id(rest, "membership")?;
            let remaining = context.ledger.consume_session(id)?;
            output::success(format!(
                "Session recorded on membership #{id}; {remaining} left"
            ));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown membership subcommand `{other}`"
        ))),
    }
}

fn record_group(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &["--purchased", "--method", "--end"], &[])?;
    let member = parse_id(args.required(0, "member")?, "member")?;
    let plan_id = parse_id(args.required(1, "plan")?, "plan")?;
    let start = args.required(2, "start")?;
    let amount = match args.get(3) {
        Some(raw) => parse_number(raw, "amount")?,
        None => context.ledger.plan(plan_id)?.default_amount,
    };

    let mut request = MembershipRequest::group_class(member, plan_id, start, amount);
    if let Some(date) = args.option("--purchased") {
        request = request.purchased_on(date);
    }
    if let Some(method) = args.option("--method") {
        request = request.paid_by(method);
    }
    if let Some(end) = args.option("--end") {
        request = request.with_end_date(end);
    }
    let id = context.ledger.record_membership(request)?;
    report_recorded(context, id)
}

fn record_personal_training(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &["--purchased", "--method", "--plan"], &[])?;
    let member = parse_id(args.required(0, "member")?, "member")?;
    let sessions = parse_number(args.required(1, "sessions")?, "sessions")?;
    let start = args.required(2, "start")?;
    let amount = parse_number(args.required(3, "amount")?, "amount")?;

    let mut request = MembershipRequest::personal_training(member, sessions, start, amount);
    if let Some(date) = args.option("--purchased") {
        request = request.purchased_on(date);
    }
    if let Some(method) = args.option("--method") {
        request = request.paid_by(method);
    }
    if let Some(plan) = args.option("--plan") {
        request = request.with_plan(parse_id(plan, "plan")?);
    }
    let id = context.ledger.record_membership(request)?;
    report_recorded(context, id)
}

fn update(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &["--plan", "--purchased"], &[])?;
    let id = parse_id(args.required(0, "id")?, "membership")?;
    let existing = context.ledger.membership(id)?;
    let plan_id = match args.option("--plan") {
        Some(raw) => Some(parse_id(raw, "plan")?),
        None => existing.plan_id,
    };
    let update = MembershipUpdate {
        plan_id,
        start_date: args.required(1, "start")?.to_string(),
        amount_paid: parse_number(args.required(2, "amount")?, "amount")?,
        purchase_date: args.option("--purchased").map(str::to_string),
    };
    context.ledger.update_membership(id, update)?;
    output::success(format!("Membership #{id} updated"));
    Ok(())
}

fn report_recorded(context: &ShellContext, id: EntityId) -> CommandResult {
    let membership = context.ledger.membership(id)?;
    let detail = match membership.transaction_type {
        TransactionType::GroupClass => format!(
            "{}, ends {}",
            membership
                .membership_kind
                .map(|kind| kind.to_string())
                .unwrap_or_default(),
            membership.end_date.map(format_date).unwrap_or_default()
        ),
        TransactionType::PersonalTraining => format!(
            "{} sessions",
            membership.sessions_total.unwrap_or_default()
        ),
    };
    output::success(format!("Membership #{id} recorded ({detail})"));
    Ok(())
}
