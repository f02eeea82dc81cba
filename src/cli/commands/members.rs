use kranos_domain::{
    format_date, parse_date, Displayable, Member, MemberUpdate, Membership, NewMember,
};

use crate::cli::args::{parse_id, single_id, Args};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::GymLedger;

const USAGE: &str = "member add <name> <phone> [--email E] [--joined YYYY-MM-DD]\n\
                     member list [search]\n\
                     member show <id>\n\
                     member edit <id> [--name N] [--phone P] [--email E] [--no-email]\n\
                     member deactivate <id>\n\
                     member reactivate <id>\n\
                     member purge <id>\n\
                     member refresh [id]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "member",
        "Add, inspect, deactivate or purge members",
        USAGE,
        cmd_member,
    )]
}

fn cmd_member(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: member <add|list|show|edit|deactivate|reactivate|purge|refresh>".into(),
        ));
    };
    match sub.to_lowercase().as_str() {
        "add" => add(context, rest),
        "list" => list(context, rest),
        "show" => show(context, rest),
        "edit" => edit(context, rest),
        "deactivate" => {
            let id = single_id(rest, "member")?;
            context.ledger.deactivate_member(id)?;
            output::success(format!("Member #{id} deactivated; history kept"));
            Ok(())
        }
        "reactivate" => {
            let id = single_id(rest, "member")?;
            let active = context.ledger.reactivate_member(id)?;
            let label = if active { "active" } else { "inactive" };
            output::success(format!("Member #{id} reactivated; now {label}"));
            Ok(())
        }
        "purge" => purge(context, rest),
        "refresh" => refresh(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown member subcommand `{other}`"
        ))),
    }
}

fn add(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &["--email", "--joined"], &[])?;
    let mut member = NewMember::new(args.required(0, "name")?, args.required(1, "phone")?);
    if let Some(email) = args.option("--email") {
        member = member.with_email(email);
    }
    if let Some(joined) = args.option("--joined") {
        member = member.with_join_date(parse_date(joined)?);
    }
    let id = context.ledger.add_member(member)?;
    output::success(format!("Member #{id} added"));
    Ok(())
}

fn list(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &[], &[])?;
    let members = match args.get(0) {
        Some(query) => context.ledger.search_members(query)?,
        None => context.ledger.members()?,
    };
    let rows: Vec<Vec<String>> = members.iter().map(member_row).collect();
    output::table(&["ID", "Name", "Phone", "Email", "Joined", "Status"], &rows);
    Ok(())
}

fn show(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let id = single_id(raw, "member")?;
    let member = context.ledger.member(id)?;
    output::section(member.display_label());
    output::info(format!("  Email  : {}", member.email.as_deref().unwrap_or("-")));
    output::info(format!(
        "  Joined : {}",
        member.join_date.map(format_date).unwrap_or_else(|| "-".into())
    ));
    output::info(format!("  Status : {}", status_label(&member)));
    let memberships = context.ledger.memberships_for_member(id)?;
    print_memberships(&context.ledger, &memberships);
    Ok(())
}

fn edit(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &["--name", "--phone", "--email"], &["--no-email"])?;
    let id = parse_id(args.required(0, "id")?, "member")?;
    let email = if args.flag("--no-email") {
        Some(None)
    } else {
        args.option("--email").map(|email| Some(email.to_string()))
    };
    let update = MemberUpdate {
        name: args.option("--name").map(str::to_string),
        phone: args.option("--phone").map(str::to_string),
        email,
    };
    let member = context.ledger.update_member(id, update)?;
    output::success(format!("Member #{id} updated: {}", member.display_label()));
    Ok(())
}

fn purge(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let id = single_id(raw, "member")?;
    let member = context.ledger.member(id)?;
    let prompt = format!(
        "Permanently delete {} and all of their memberships?",
        member.display_label()
    );
    if !context.confirm(&prompt)? {
        output::info("Purge cancelled.");
        return Ok(());
    }
    let removed = context.ledger.purge_member(id)?;
    output::success(format!(
        "Member #{id} purged ({removed} membership(s) removed)"
    ));
    Ok(())
}

fn refresh(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &[], &[])?;
    match args.get(0) {
        Some(raw_id) => {
            let id = parse_id(raw_id, "member")?;
            let active = context.ledger.refresh_member_status(id)?;
            let label = if active { "active" } else { "inactive" };
            output::success(format!("Member #{id} is {label}"));
        }
        None => {
            let changed = context.ledger.refresh_all_statuses()?;
            output::success(format!("{changed} member status(es) changed"));
        }
    }
    Ok(())
}

fn status_label(member: &Member) -> &'static str {
    if member.deactivated {
        "deactivated"
    } else if member.is_active {
        "active"
    } else {
        "inactive"
    }
}

fn member_row(member: &Member) -> Vec<String> {
    vec![
        member.id.to_string(),
        member.name.clone(),
        member.phone.clone(),
        member.email.clone().unwrap_or_default(),
        member.join_date.map(format_date).unwrap_or_default(),
        status_label(member).to_string(),
    ]
}

pub(crate) fn print_memberships(ledger: &GymLedger, memberships: &[Membership]) {
    let rows: Vec<Vec<String>> = memberships
        .iter()
        .map(|m| {
            let item = match (m.sessions_total, m.plan_id) {
                (Some(total), _) => format!(
                    "{} of {total} sessions left",
                    m.sessions_remaining.unwrap_or(0)
                ),
                (None, Some(plan_id)) => ledger
                    .plan(plan_id)
                    .map(|plan| plan.display_label())
                    .unwrap_or_else(|_| format!("plan #{plan_id}")),
                (None, None) => "-".into(),
            };
            vec![
                m.id.to_string(),
                m.transaction_type.to_string(),
                item,
                format_date(m.purchase_date),
                format_date(m.start_date),
                m.end_date.map(format_date).unwrap_or_default(),
                ledger.format_amount(m.amount_paid),
                m.membership_kind.map(|k| k.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    output::table(
        &["ID", "Type", "Item", "Purchased", "Start", "End", "Paid", "Kind"],
        &rows,
    );
}
