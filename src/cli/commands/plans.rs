use kranos_domain::{NewPlan, PlanType, PlanUpdate};

use crate::cli::args::{parse_id, parse_number, single_id, Args};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "plan add <name> <days> <amount> [--type group_class|personal_training]\n\
                     plan list [--all]\n\
                     plan edit <id> [--name N] [--days D] [--amount A]\n\
                     plan activate <id>\n\
                     plan deactivate <id>\n\
                     plan delete <id>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "plan",
        "Manage membership plans",
        USAGE,
        cmd_plan,
    )]
}

fn cmd_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: plan <add|list|edit|activate|deactivate|delete>".into(),
        ));
    };
    match sub.to_lowercase().as_str() {
        "add" => add(context, rest),
        "list" => list(context, rest),
        "edit" => edit(context, rest),
        "activate" | "deactivate" => {
            let id = single_id(rest, "plan")?;
            let active = sub.eq_ignore_ascii_case("activate");
            context.ledger.set_plan_active(id, active)?;
            let label = if active { "activated" } else { "deactivated" };
            output::success(format!("Plan #{id} {label}"));
            Ok(())
        }
        "delete" => {
            let id = single_id(rest, "plan")?;
            context.ledger.delete_plan(id)?;
            output::success(format!("Plan #{id} deleted"));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown plan subcommand `{other}`"
        ))),
    }
}

fn add(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &["--type"], &[])?;
    let plan_type = match args.option("--type") {
        Some(raw) => raw
            .parse::<PlanType>()
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?,
        None => PlanType::GroupClass,
    };
    let plan = NewPlan {
        name: args.required(0, "name")?.to_string(),
        duration_days: parse_number(args.required(1, "days")?, "duration")?,
        default_amount: parse_number(args.required(2, "amount")?, "amount")?,
        plan_type,
    };
    let id = context.ledger.add_plan(plan)?;
    output::success(format!("Plan #{id} added"));
    Ok(())
}

fn list(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &[], &["--all"])?;
    let plans = context.ledger.plans(!args.flag("--all"))?;
    let rows: Vec<Vec<String>> = plans
        .iter()
        .map(|plan| {
            vec![
                plan.id.to_string(),
                plan.display_name(),
                plan.plan_type.to_string(),
                context.ledger.format_amount(plan.default_amount),
                if plan.is_active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "Plan", "Type", "Default", "Active"], &rows);
    Ok(())
}

fn edit(context: &mut ShellContext, raw: &[&str]) -> CommandResult {
    let args = Args::parse(raw, &["--name", "--days", "--amount"], &[])?;
    let id = parse_id(args.required(0, "id")?, "plan")?;
    let update = PlanUpdate {
        name: args.option("--name").map(str::to_string),
        duration_days: args
            .option("--days")
            .map(|raw| parse_number(raw, "duration"))
            .transpose()?,
        default_amount: args
            .option("--amount")
            .map(|raw| parse_number(raw, "amount"))
            .transpose()?,
    };
    let plan = context.ledger.update_plan(id, update)?;
    output::success(format!("Plan #{id} is now {}", plan.display_name()));
    Ok(())
}
