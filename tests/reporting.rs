mod common;

use common::{add_member, add_plan, date, group_purchase, setup_ledger};
use kranos_core::{MembershipRequest, MembershipUpdate, RenewalWindow};
use kranos_domain::TransactionType;

#[test]
fn pending_renewals_for_a_month_are_ordered_by_end_date() {
    let ledger = setup_ledger();
    let plan = add_plan(&ledger, "Gold", 30);
    let zara = add_member(&ledger, "Zara", "9000000001");
    let amit = add_member(&ledger, "Amit", "9000000002");
    let meera = add_member(&ledger, "Meera", "9000000003");

    // Ends 2025-09-01, 2025-08-20 and 2025-08-05.
    group_purchase(&ledger, meera, plan, "2025-08-03", 2500.0);
    group_purchase(&ledger, amit, plan, "2025-07-22", 2500.0);
    group_purchase(&ledger, zara, plan, "2025-07-07", 2500.0);

    let renewals = ledger.pending_renewals("2025-08").unwrap();
    let found: Vec<(&str, _)> = renewals
        .iter()
        .map(|r| (r.member_name.as_str(), r.end_date))
        .collect();
    assert_eq!(
        found,
        [("Zara", date(2025, 8, 5)), ("Amit", date(2025, 8, 20))]
    );
    assert!(renewals.iter().all(|r| r.plan_name == "Gold"));
    assert_eq!(renewals[0].phone, "9000000001");
}

#[test]
fn upcoming_window_excludes_inactive_members_and_later_end_dates() {
    let ledger = setup_ledger();
    let plan = add_plan(&ledger, "Gold", 30);
    let due = add_member(&ledger, "Due", "9000000001");
    let later = add_member(&ledger, "Later", "9000000002");
    let gone = add_member(&ledger, "Gone", "9000000003");

    group_purchase(&ledger, due, plan, "2025-07-07", 2500.0);
    group_purchase(&ledger, later, plan, "2025-07-22", 2500.0);
    group_purchase(&ledger, gone, plan, "2025-07-08", 2500.0);
    ledger.deactivate_member(gone).unwrap();

    let names = |days| -> Vec<String> {
        ledger
            .upcoming_renewals(Some(days))
            .unwrap()
            .into_iter()
            .map(|r| r.member_name)
            .collect()
    };
    assert_eq!(names(10), ["Due"]);
    assert_eq!(names(30), ["Due", "Later"]);
    assert_eq!(
        ledger.upcoming_renewals(None).unwrap().len(),
        2,
        "defaults to the configured window"
    );
    let inverted = RenewalWindow::Range {
        start: date(2025, 9, 1),
        end: date(2025, 8, 1),
    };
    assert!(ledger.renewals(inverted).unwrap().is_empty());
}

#[test]
fn personal_training_is_never_a_pending_renewal() {
    let ledger = setup_ledger();
    let member = add_member(&ledger, "Arjun", "9000000001");
    ledger
        .record_membership(MembershipRequest::personal_training(member, 4, "2025-08-02", 2000.0))
        .unwrap();
    assert!(ledger.upcoming_renewals(Some(365)).unwrap().is_empty());
}

#[test]
fn financial_totals_cover_only_the_purchase_range() {
    let ledger = setup_ledger();
    let plan = add_plan(&ledger, "Gold", 30);
    let member = add_member(&ledger, "Arjun", "9000000001");
    let other = add_member(&ledger, "Bela", "9000000002");

    group_purchase(&ledger, member, plan, "2025-07-01", 2500.0);
    ledger
        .record_membership(
            MembershipRequest::personal_training(other, 12, "2025-07-31", 9000.5)
                .paid_by("UPI"),
        )
        .unwrap();
    let outside = group_purchase(&ledger, other, plan, "2025-08-01", 2500.0);

    let report = ledger.financial_report("2025-07-01", "2025-07-31").unwrap();
    assert_eq!(report.summary.total_revenue, 11500.5);
    assert_eq!(report.summary.group_class_revenue, 2500.0);
    assert_eq!(report.summary.personal_training_revenue, 9000.5);
    assert_eq!(report.summary.transaction_count, 2);
    let items: Vec<&str> = report.details.iter().map(|d| d.item_name.as_str()).collect();
    assert!(items.contains(&"12 sessions"));
    assert!(items.contains(&"Gold - 30 days"));
    assert!(report
        .details
        .iter()
        .any(|d| d.transaction_type == TransactionType::PersonalTraining));

    ledger
        .update_membership(
            outside,
            MembershipUpdate {
                plan_id: Some(plan),
                start_date: "2025-08-01".into(),
                amount_paid: 99999.0,
                purchase_date: None,
            },
        )
        .unwrap();
    let again = ledger.financial_report("2025-07-01", "2025-07-31").unwrap();
    assert_eq!(again.summary, report.summary);
}

#[test]
fn month_overview_and_report_errors() {
    let ledger = setup_ledger();
    let plan = add_plan(&ledger, "Gold", 30);
    let member = add_member(&ledger, "Arjun", "9000000001");
    group_purchase(&ledger, member, plan, "2025-07-10", 2500.0);
    ledger.close_books("2025-07").unwrap();

    let overview = ledger.month_overview("2025-07").unwrap();
    assert!(overview.status.is_closed());
    assert_eq!(overview.summary.transaction_count, 1);
    assert_eq!(ledger.format_amount(overview.summary.total_revenue), "INR 2500.00");

    assert!(ledger.financial_report("2025-08-01", "2025-07-01").is_err());
    assert!(ledger.financial_report("2025/07/01", "2025-07-31").is_err());
    let empty = ledger.financial_report("2024-01-01", "2024-01-31").unwrap();
    assert_eq!(empty.summary.transaction_count, 0);
    assert!(empty.details.is_empty());
}
