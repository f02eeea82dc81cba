use chrono::{NaiveDate, TimeZone, Utc};
use kranos_core::{CoreError, GymStore};
use kranos_domain::{
    BookStatus, BookStatusRecord, MembershipKind, MonthKey, NewMember, NewMembership, NewPlan,
    TransactionType,
};
use kranos_storage_sqlite::{SqliteStore, DEFAULT_PLANS, SCHEMA_VERSION};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn group_class(member_id: i64, plan_id: i64, start: NaiveDate) -> NewMembership {
    NewMembership {
        member_id,
        plan_id: Some(plan_id),
        transaction_type: TransactionType::GroupClass,
        purchase_date: start,
        start_date: start,
        end_date: Some(start + chrono::Days::new(29)),
        amount_paid: 2500.0,
        payment_method: Some("UPI".into()),
        sessions_total: None,
        sessions_remaining: None,
        membership_kind: Some(MembershipKind::New),
    }
}

#[test]
fn schema_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("kranos.db");
    let member_id = {
        let store = SqliteStore::open(&path).expect("open");
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        store
            .insert_member(&NewMember::new("Arjun", "9000000001"))
            .unwrap()
    };

    let reopened = SqliteStore::open(&path).expect("reopen");
    let member = reopened.member(member_id).unwrap().expect("member persisted");
    assert_eq!(member.name, "Arjun");
    assert!(member.is_active);
    assert_eq!(reopened.path(), Some(path.as_path()));
}

#[test]
fn seeding_default_plans_is_idempotent() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.seed_default_plans().unwrap(), DEFAULT_PLANS.len());
    assert_eq!(store.seed_default_plans().unwrap(), 0);
    assert_eq!(store.list_plans().unwrap().len(), DEFAULT_PLANS.len());
}

#[test]
fn constraint_violations_map_to_core_errors() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .insert_member(&NewMember::new("Arjun", "9000000001"))
        .unwrap();
    let err = store
        .insert_member(&NewMember::new("Bela", "9000000001"))
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists(_)), "{err:?}");

    let plan = store
        .insert_plan(&NewPlan::group_class("Gold", 30, 2500.0))
        .unwrap();
    let err = store
        .insert_plan(&NewPlan::group_class("Gold", 30, 100.0))
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists(_)));

    let err = store
        .insert_membership(&group_class(4242, plan, date(2025, 1, 1)))
        .unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)), "{err:?}");
    assert!(err.to_string().contains("FOREIGN KEY"), "{err}");
}

#[test]
fn book_status_upsert_round_trips_timestamps() {
    let store = SqliteStore::open_in_memory().unwrap();
    let month = MonthKey::parse("2025-07").unwrap();
    assert!(store.book_status(month).unwrap().is_none());

    let at = Utc.with_ymd_and_hms(2025, 8, 2, 9, 30, 0).unwrap();
    store
        .upsert_book_status(&BookStatusRecord::closed(month, at))
        .unwrap();
    let stored = store.book_status(month).unwrap().unwrap();
    assert_eq!(stored.status, BookStatus::Closed);
    assert_eq!(stored.closed_at, Some(at));

    store
        .upsert_book_status(&BookStatusRecord::open(month))
        .unwrap();
    let stored = store.book_status(month).unwrap().unwrap();
    assert_eq!(stored.status, BookStatus::Open);
    assert_eq!(stored.closed_at, None);

    store
        .upsert_book_status(&BookStatusRecord::open(MonthKey::parse("2024-12").unwrap()))
        .unwrap();
    let months: Vec<String> = store
        .list_book_statuses()
        .unwrap()
        .iter()
        .map(|r| r.month.to_string())
        .collect();
    assert_eq!(months, vec!["2024-12", "2025-07"]);
}

#[test]
fn membership_rows_round_trip_every_column() {
    let store = SqliteStore::open_in_memory().unwrap();
    let member = store
        .insert_member(&NewMember::new("Arjun", "9000000001"))
        .unwrap();
    let pt = NewMembership {
        member_id: member,
        plan_id: None,
        transaction_type: TransactionType::PersonalTraining,
        purchase_date: date(2025, 3, 2),
        start_date: date(2025, 3, 3),
        end_date: None,
        amount_paid: 9000.5,
        payment_method: None,
        sessions_total: Some(12),
        sessions_remaining: Some(12),
        membership_kind: None,
    };
    let id = store.insert_membership(&pt).unwrap();
    let stored = store.membership(id).unwrap().unwrap();
    assert_eq!(stored, pt.clone().into_membership(id));
    assert!(!store.has_group_class_membership(member).unwrap());

    let mut used = stored;
    used.sessions_remaining = Some(11);
    store.update_membership(&used).unwrap();
    assert_eq!(
        store.membership(id).unwrap().unwrap().sessions_remaining,
        Some(11)
    );
}

#[test]
fn range_queries_are_inclusive_and_typed() {
    let store = SqliteStore::open_in_memory().unwrap();
    let member = store
        .insert_member(&NewMember::new("Arjun", "9000000001"))
        .unwrap();
    let plan = store
        .insert_plan(&NewPlan::group_class("Gold", 30, 2500.0))
        .unwrap();
    let ends_aug_5 = store
        .insert_membership(&group_class(member, plan, date(2025, 7, 7)))
        .unwrap();
    let ends_aug_31 = store
        .insert_membership(&group_class(member, plan, date(2025, 8, 2)))
        .unwrap();
    store
        .insert_membership(&group_class(member, plan, date(2025, 8, 3)))
        .unwrap();

    let ending: Vec<i64> = store
        .memberships_ending_between(date(2025, 8, 5), date(2025, 8, 31))
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ending, vec![ends_aug_5, ends_aug_31]);

    let purchased = store
        .memberships_purchased_between(date(2025, 8, 1), date(2025, 8, 2))
        .unwrap();
    assert_eq!(purchased.len(), 1);
    assert_eq!(purchased[0].id, ends_aug_31);
    assert!(store.has_group_class_membership(member).unwrap());
}

#[test]
fn deleting_a_member_cascades_to_memberships() {
    let store = SqliteStore::open_in_memory().unwrap();
    let member = store
        .insert_member(&NewMember::new("Arjun", "9000000001"))
        .unwrap();
    let plan = store
        .insert_plan(&NewPlan::group_class("Gold", 30, 2500.0))
        .unwrap();
    store
        .insert_membership(&group_class(member, plan, date(2025, 1, 1)))
        .unwrap();
    store
        .insert_membership(&group_class(member, plan, date(2025, 2, 1)))
        .unwrap();

    assert_eq!(store.count_plan_memberships(plan).unwrap(), 2);
    let err = store.delete_plan(plan).unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)));

    assert_eq!(store.delete_member(member).unwrap(), 2);
    assert!(store.memberships_for_member(member).unwrap().is_empty());
    assert!(matches!(
        store.delete_member(member).unwrap_err(),
        CoreError::MemberNotFound(_)
    ));
    store.delete_plan(plan).unwrap();
}

#[test]
fn missing_rows_report_not_found() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(matches!(
        store.set_member_active(7, false).unwrap_err(),
        CoreError::MemberNotFound(7)
    ));
    assert!(matches!(
        store.delete_membership(7).unwrap_err(),
        CoreError::MembershipNotFound(7)
    ));
    assert!(matches!(
        store.delete_plan(7).unwrap_err(),
        CoreError::PlanNotFound(7)
    ));
}

#[test]
fn version_one_databases_gain_the_deactivated_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kranos.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT NOT NULL UNIQUE,
                email TEXT,
                join_date TEXT,
                is_active INTEGER NOT NULL DEFAULT 1
            );
            INSERT INTO members (name, phone) VALUES ('Arjun', '9000000001');
            PRAGMA user_version = 1;",
        )
        .unwrap();
    }

    let store = SqliteStore::open(&path).expect("open v1 database");
    assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    let member = store.list_members().unwrap().remove(0);
    assert!(!member.deactivated);

    store.set_member_deactivated(member.id, true).unwrap();
    drop(store);
    let reopened = SqliteStore::open(&path).expect("reopen");
    assert!(reopened.member(member.id).unwrap().unwrap().deactivated);
    assert!(matches!(
        reopened.set_member_deactivated(999, true).unwrap_err(),
        CoreError::MemberNotFound(999)
    ));
}
