mod common;

use common::{add_member, add_plan, date, group_purchase, setup_ledger, setup_ledger_on};
use kranos_core::{MembershipRequest, MembershipUpdate};
use kranos_domain::{MembershipKind, TransactionType};

#[test]
fn thirty_day_plan_ends_on_its_thirtieth_day() {
    let ledger = setup_ledger();
    let member = add_member(&ledger, "Arjun", "9000000001");
    let plan = add_plan(&ledger, "Gold", 30);

    let first = group_purchase(&ledger, member, plan, "2025-01-01", 2500.0);
    let second = group_purchase(&ledger, member, plan, "2025-01-01", 2500.0);
    for id in [first, second] {
        assert_eq!(ledger.membership(id).unwrap().end_date, Some(date(2025, 1, 30)));
    }
}

#[test]
fn first_group_class_purchase_is_new_then_renewal() {
    let ledger = setup_ledger();
    let member = add_member(&ledger, "Arjun", "9000000001");
    let other = add_member(&ledger, "Bela", "9000000002");
    let plan = add_plan(&ledger, "Gold", 30);

    let pt = ledger
        .record_membership(MembershipRequest::personal_training(member, 10, "2024-12-15", 4000.0))
        .unwrap();
    assert_eq!(ledger.membership(pt).unwrap().membership_kind, None);

    let first = group_purchase(&ledger, member, plan, "2025-01-01", 2500.0);
    let other_first = group_purchase(&ledger, other, plan, "2025-01-05", 2500.0);
    ledger.delete_membership(other_first).unwrap();
    let second = group_purchase(&ledger, member, plan, "2025-02-01", 2500.0);

    assert_eq!(
        ledger.membership(first).unwrap().membership_kind,
        Some(MembershipKind::New)
    );
    assert_eq!(
        ledger.membership(second).unwrap().membership_kind,
        Some(MembershipKind::Renewal)
    );
}

#[test]
fn non_positive_amounts_never_write_rows() {
    let ledger = setup_ledger();
    let member = add_member(&ledger, "Arjun", "9000000001");
    let plan = add_plan(&ledger, "Gold", 30);

    for amount in [0.0, -10.0] {
        let group = MembershipRequest::group_class(member, plan, "2025-01-01", amount);
        assert!(ledger.record_membership(group).is_err());
        let pt = MembershipRequest::personal_training(member, 5, "2025-01-01", amount);
        assert!(ledger.record_membership(pt).is_err());
    }
    assert!(ledger.memberships_for_member(member).unwrap().is_empty());
}

#[test]
fn recording_refreshes_member_status() {
    let ledger = setup_ledger_on(date(2025, 1, 15));
    let member = add_member(&ledger, "Arjun", "9000000001");
    let plan = add_plan(&ledger, "Gold", 30);
    assert!(!ledger.member(member).unwrap().is_active);

    group_purchase(&ledger, member, plan, "2025-01-10", 2500.0);
    let stored = ledger.member(member).unwrap();
    assert!(stored.is_active);
    assert_eq!(stored.join_date, Some(date(2025, 1, 10)));
}

#[test]
fn personal_training_sessions_count_down() {
    let ledger = setup_ledger();
    let member = add_member(&ledger, "Arjun", "9000000001");
    let id = ledger
        .record_membership(MembershipRequest::personal_training(member, 2, "2025-07-20", 3000.0))
        .unwrap();

    let stored = ledger.membership(id).unwrap();
    assert_eq!(stored.transaction_type, TransactionType::PersonalTraining);
    assert_eq!(stored.sessions_remaining, Some(2));
    assert!(ledger.member(member).unwrap().is_active);

    assert_eq!(ledger.consume_session(id).unwrap(), 1);
    assert_eq!(ledger.consume_session(id).unwrap(), 0);
    assert!(ledger.consume_session(id).is_err());
    assert!(!ledger.member(member).unwrap().is_active);
}

#[test]
fn update_rechecks_the_gate_for_the_new_month() {
    let ledger = setup_ledger();
    let member = add_member(&ledger, "Arjun", "9000000001");
    let plan = add_plan(&ledger, "Gold", 30);
    let quarterly = add_plan(&ledger, "Silver", 90);
    let id = group_purchase(&ledger, member, plan, "2025-07-15", 2500.0);
    ledger.close_books("2025-06").unwrap();

    let moved = MembershipUpdate {
        plan_id: Some(plan),
        start_date: "2025-06-20".into(),
        amount_paid: 2500.0,
        purchase_date: Some("2025-06-20".into()),
    };
    assert!(ledger.update_membership(id, moved).unwrap_err().is_closed_books());

    let upgraded = MembershipUpdate {
        plan_id: Some(quarterly),
        start_date: "2025-07-15".into(),
        amount_paid: 6500.0,
        purchase_date: None,
    };
    ledger.update_membership(id, upgraded).unwrap();
    let stored = ledger.membership(id).unwrap();
    assert_eq!(stored.end_date, Some(date(2025, 10, 12)));
    assert_eq!(stored.amount_paid, 6500.0);
}

#[test]
fn deactivate_keeps_history_but_purge_removes_it() {
    let ledger = setup_ledger();
    let member = add_member(&ledger, "Arjun", "9000000001");
    let plan = add_plan(&ledger, "Gold", 30);
    group_purchase(&ledger, member, plan, "2025-07-20", 2500.0);
    group_purchase(&ledger, member, plan, "2025-07-25", 2500.0);

    ledger.deactivate_member(member).unwrap();
    assert!(!ledger.member(member).unwrap().is_active);
    assert_eq!(ledger.memberships_for_member(member).unwrap().len(), 2);

    assert_eq!(ledger.purge_member(member).unwrap(), 2);
    assert!(ledger.member(member).is_err());
}

#[test]
fn deactivated_member_stays_out_of_refreshes_and_renewals() {
    let ledger = setup_ledger();
    let member = add_member(&ledger, "Arjun", "9000000001");
    let plan = add_plan(&ledger, "Gold", 30);
    group_purchase(&ledger, member, plan, "2025-07-10", 2500.0);

    ledger.deactivate_member(member).unwrap();
    assert_eq!(ledger.refresh_all_statuses().unwrap(), 0);
    assert!(!ledger.refresh_member_status(member).unwrap());
    assert!(!ledger.member(member).unwrap().is_active);
    assert!(ledger.pending_renewals("2025-08").unwrap().is_empty());

    assert!(ledger.reactivate_member(member).unwrap());
    assert_eq!(ledger.pending_renewals("2025-08").unwrap().len(), 1);
}

#[test]
fn duplicate_phones_and_plans_are_rejected() {
    let ledger = setup_ledger();
    add_member(&ledger, "Arjun", "9000000001");
    add_plan(&ledger, "Gold", 30);

    let err = ledger
        .add_member(kranos_domain::NewMember::new("Other", "9000000001"))
        .unwrap_err();
    assert!(err.to_string().contains("9000000001"), "{err}");
    assert!(ledger
        .add_plan(kranos_domain::NewPlan::group_class("Gold", 30, 100.0))
        .is_err());
    add_plan(&ledger, "Gold", 90);
}
