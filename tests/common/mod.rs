#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use kranos_config::Config;
use kranos_core::{FixedClock, MembershipRequest};
use kranos_domain::{EntityId, NewMember, NewPlan};
use kranos_reporter::GymLedger;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so database files live for the whole test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A ledger on a fresh SQLite file, without default plans, frozen at 2025-08-01.
pub fn setup_ledger() -> GymLedger {
    setup_ledger_on(date(2025, 8, 1))
}

pub fn setup_ledger_on(today: NaiveDate) -> GymLedger {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("kranos.db");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config = Config {
        seed_default_plans: false,
        ..Config::default()
    };
    GymLedger::open_at(&path, config)
        .expect("open ledger")
        .with_clock(Box::new(FixedClock::on(today)))
}

pub fn add_member(ledger: &GymLedger, name: &str, phone: &str) -> EntityId {
    ledger
        .add_member(NewMember::new(name, phone))
        .expect("add member")
}

pub fn add_plan(ledger: &GymLedger, name: &str, days: u32) -> EntityId {
    ledger
        .add_plan(NewPlan::group_class(name, days, 2500.0))
        .expect("add plan")
}

pub fn group_purchase(
    ledger: &GymLedger,
    member: EntityId,
    plan: EntityId,
    start: &str,
    amount: f64,
) -> EntityId {
    ledger
        .record_membership(MembershipRequest::group_class(member, plan, start, amount))
        .expect("record group-class membership")
}
