//! SQLite persistence for the gym ledger.
//!
//! One [`rusqlite::Connection`] is held for the life of the store behind a
//! mutex. Constraint violations are translated at this boundary: UNIQUE
//! becomes [`CoreError::AlreadyExists`], everything else (foreign keys
//! included) becomes [`CoreError::Storage`].

mod schema;

use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use kranos_core::{CoreError, GymStore};
use kranos_domain::{
    BookStatusRecord, EntityId, Member, Membership, MonthKey, NewMember, NewMembership, NewPlan,
    Plan, PlanType, TransactionType,
};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use tracing::{debug, info};

pub use schema::{DEFAULT_PLANS, SCHEMA_VERSION};
use schema::{MEMBERSHIP_COLUMNS, MEMBER_COLUMNS, PLAN_COLUMNS};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                CoreError::storage(format!("cannot create {}: {err}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).storage()?;
        schema::initialize(&conn).storage()?;
        debug!(path = %path.display(), "database opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().storage()?;
        schema::initialize(&conn).storage()?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> Result<i32, CoreError> {
        self.conn()?
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .storage()
    }

    /// Inserts the stock group-class plans that are not present yet and
    /// returns how many were added.
    pub fn seed_default_plans(&self) -> Result<usize, CoreError> {
        let conn = self.conn()?;
        let mut inserted = 0;
        for (name, duration_days, amount) in DEFAULT_PLANS {
            inserted += conn
                .execute(
                    "INSERT OR IGNORE INTO plans (name, duration_days, default_amount, plan_type)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![name, duration_days, amount, PlanType::GroupClass.as_str()],
                )
                .storage()?;
        }
        if inserted > 0 {
            info!(inserted, "default plans seeded");
        }
        Ok(inserted)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::storage("database connection lock poisoned"))
    }
}

impl GymStore for SqliteStore {
    fn book_status(&self, month: MonthKey) -> Result<Option<BookStatusRecord>, CoreError> {
        self.conn()?
            .query_row(
                "SELECT month_key, status, closed_at FROM monthly_book_status
                 WHERE month_key = ?1",
                [month.to_string()],
                map_book_status,
            )
            .optional()
            .storage()
    }

    fn upsert_book_status(&self, record: &BookStatusRecord) -> Result<(), CoreError> {
        self.conn()?
            .execute(
                "INSERT INTO monthly_book_status (month_key, status, closed_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(month_key) DO UPDATE
                 SET status = excluded.status, closed_at = excluded.closed_at",
                params![
                    record.month.to_string(),
                    record.status.as_str(),
                    record.closed_at
                ],
            )
            .storage()?;
        Ok(())
    }

    fn list_book_statuses(&self) -> Result<Vec<BookStatusRecord>, CoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT month_key, status, closed_at FROM monthly_book_status
                 ORDER BY month_key",
            )
            .storage()?;
        let rows = stmt.query_map([], map_book_status).storage()?;
        rows.collect::<rusqlite::Result<Vec<_>>>().storage()
    }

    fn insert_member(&self, member: &NewMember) -> Result<EntityId, CoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO members (name, phone, email, join_date) VALUES (?1, ?2, ?3, ?4)",
            params![member.name, member.phone, member.email, member.join_date],
        )
        .map_err(|err| duplicate_phone(err, &member.phone))?;
        Ok(conn.last_insert_rowid())
    }

    fn member(&self, id: EntityId) -> Result<Option<Member>, CoreError> {
        self.conn()?
            .query_row(
                &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"),
                [id],
                map_member,
            )
            .optional()
            .storage()
    }

    fn list_members(&self) -> Result<Vec<Member>, CoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {MEMBER_COLUMNS} FROM members ORDER BY name, id"
            ))
            .storage()?;
        let rows = stmt.query_map([], map_member).storage()?;
        rows.collect::<rusqlite::Result<Vec<_>>>().storage()
    }

    fn update_member(&self, member: &Member) -> Result<(), CoreError> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE members SET name = ?1, phone = ?2, email = ?3 WHERE id = ?4",
                params![member.name, member.phone, member.email, member.id],
            )
            .map_err(|err| duplicate_phone(err, &member.phone))?;
        expect_row(changed, CoreError::MemberNotFound(member.id))
    }

    fn set_member_active(&self, id: EntityId, active: bool) -> Result<(), CoreError> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE members SET is_active = ?1 WHERE id = ?2",
                params![active, id],
            )
            .storage()?;
        expect_row(changed, CoreError::MemberNotFound(id))
    }

    fn set_member_deactivated(&self, id: EntityId, deactivated: bool) -> Result<(), CoreError> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE members SET deactivated = ?1 WHERE id = ?2",
                params![deactivated, id],
            )
            .storage()?;
        expect_row(changed, CoreError::MemberNotFound(id))
    }

    fn set_member_join_date(&self, id: EntityId, join_date: NaiveDate) -> Result<(), CoreError> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE members SET join_date = ?1 WHERE id = ?2",
                params![join_date, id],
            )
            .storage()?;
        expect_row(changed, CoreError::MemberNotFound(id))
    }

    fn delete_member(&self, id: EntityId) -> Result<usize, CoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().storage()?;
        let memberships: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM memberships WHERE member_id = ?1",
                [id],
                |row| row.get(0),
            )
            .storage()?;
        let deleted = tx
            .execute("DELETE FROM members WHERE id = ?1", [id])
            .storage()?;
        if deleted == 0 {
            return Err(CoreError::MemberNotFound(id));
        }
        tx.commit().storage()?;
        Ok(usize::try_from(memberships).unwrap_or_default())
    }

    fn insert_plan(&self, plan: &NewPlan) -> Result<EntityId, CoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO plans (name, duration_days, default_amount, plan_type)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                plan.name,
                plan.duration_days,
                plan.default_amount,
                plan.plan_type.as_str()
            ],
        )
        .map_err(|err| duplicate_plan(err, &plan.name, plan.duration_days))?;
        Ok(conn.last_insert_rowid())
    }

    fn plan(&self, id: EntityId) -> Result<Option<Plan>, CoreError> {
        self.conn()?
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?1"),
                [id],
                map_plan,
            )
            .optional()
            .storage()
    }

    fn list_plans(&self) -> Result<Vec<Plan>, CoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PLAN_COLUMNS} FROM plans ORDER BY name, duration_days"
            ))
            .storage()?;
        let rows = stmt.query_map([], map_plan).storage()?;
        rows.collect::<rusqlite::Result<Vec<_>>>().storage()
    }

    fn update_plan(&self, plan: &Plan) -> Result<(), CoreError> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE plans SET name = ?1, duration_days = ?2, default_amount = ?3,
                 is_active = ?4, plan_type = ?5 WHERE id = ?6",
                params![
                    plan.name,
                    plan.duration_days,
                    plan.default_amount,
                    plan.is_active,
                    plan.plan_type.as_str(),
                    plan.id
                ],
            )
            .map_err(|err| duplicate_plan(err, &plan.name, plan.duration_days))?;
        expect_row(changed, CoreError::PlanNotFound(plan.id))
    }

    fn delete_plan(&self, id: EntityId) -> Result<(), CoreError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM plans WHERE id = ?1", [id])
            .storage()?;
        expect_row(changed, CoreError::PlanNotFound(id))
    }

    fn count_plan_memberships(&self, plan_id: EntityId) -> Result<usize, CoreError> {
        let count: i64 = self
            .conn()?
            .query_row(
                "SELECT COUNT(*) FROM memberships WHERE plan_id = ?1",
                [plan_id],
                |row| row.get(0),
            )
            .storage()?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn insert_membership(&self, membership: &NewMembership) -> Result<EntityId, CoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO memberships (member_id, plan_id, transaction_type, purchase_date,
                 start_date, end_date, amount_paid, payment_method, sessions_total,
                 sessions_remaining, membership_kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                membership.member_id,
                membership.plan_id,
                membership.transaction_type.as_str(),
                membership.purchase_date,
                membership.start_date,
                membership.end_date,
                membership.amount_paid,
                membership.payment_method,
                membership.sessions_total,
                membership.sessions_remaining,
                membership.membership_kind.map(|kind| kind.as_str()),
            ],
        )
        .storage()?;
        Ok(conn.last_insert_rowid())
    }

    fn membership(&self, id: EntityId) -> Result<Option<Membership>, CoreError> {
        self.conn()?
            .query_row(
                &format!("SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE id = ?1"),
                [id],
                map_membership,
            )
            .optional()
            .storage()
    }

    fn update_membership(&self, membership: &Membership) -> Result<(), CoreError> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE memberships SET plan_id = ?1, purchase_date = ?2, start_date = ?3,
                     end_date = ?4, amount_paid = ?5, payment_method = ?6,
                     sessions_total = ?7, sessions_remaining = ?8, membership_kind = ?9
                 WHERE id = ?10",
                params![
                    membership.plan_id,
                    membership.purchase_date,
                    membership.start_date,
                    membership.end_date,
                    membership.amount_paid,
                    membership.payment_method,
                    membership.sessions_total,
                    membership.sessions_remaining,
                    membership.membership_kind.map(|kind| kind.as_str()),
                    membership.id,
                ],
            )
            .storage()?;
        expect_row(changed, CoreError::MembershipNotFound(membership.id))
    }

    fn delete_membership(&self, id: EntityId) -> Result<(), CoreError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM memberships WHERE id = ?1", [id])
            .storage()?;
        expect_row(changed, CoreError::MembershipNotFound(id))
    }

    fn memberships_for_member(&self, member_id: EntityId) -> Result<Vec<Membership>, CoreError> {
        self.query_memberships(
            &format!(
                "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE member_id = ?1 ORDER BY id"
            ),
            params![member_id],
        )
    }

    fn has_group_class_membership(&self, member_id: EntityId) -> Result<bool, CoreError> {
        self.conn()?
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM memberships
                 WHERE member_id = ?1 AND transaction_type = ?2)",
                params![member_id, TransactionType::GroupClass.as_str()],
                |row| row.get(0),
            )
            .storage()
    }

    fn memberships_ending_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Membership>, CoreError> {
        self.query_memberships(
            &format!(
                "SELECT {MEMBERSHIP_COLUMNS} FROM memberships
                 WHERE transaction_type = ?1 AND end_date BETWEEN ?2 AND ?3
                 ORDER BY end_date, id"
            ),
            params![TransactionType::GroupClass.as_str(), start, end],
        )
    }

    fn memberships_purchased_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Membership>, CoreError> {
        self.query_memberships(
            &format!(
                "SELECT {MEMBERSHIP_COLUMNS} FROM memberships
                 WHERE purchase_date BETWEEN ?1 AND ?2
                 ORDER BY purchase_date, id"
            ),
            params![start, end],
        )
    }
}

impl SqliteStore {
    fn query_memberships(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Membership>, CoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).storage()?;
        let rows = stmt.query_map(params, map_membership).storage()?;
        rows.collect::<rusqlite::Result<Vec<_>>>().storage()
    }
}

trait StorageResultExt<T> {
    fn storage(self) -> Result<T, CoreError>;
}

impl<T> StorageResultExt<T> for rusqlite::Result<T> {
    fn storage(self) -> Result<T, CoreError> {
        self.map_err(|err| CoreError::storage(err.to_string()))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                ..
            },
            _,
        )
    )
}

fn duplicate_phone(err: rusqlite::Error, phone: &str) -> CoreError {
    if is_unique_violation(&err) {
        return CoreError::AlreadyExists(format!("a member with phone {phone} already exists"));
    }
    CoreError::storage(err.to_string())
}

fn duplicate_plan(err: rusqlite::Error, name: &str, duration_days: u32) -> CoreError {
    if is_unique_violation(&err) {
        return CoreError::AlreadyExists(format!(
            "plan {name} ({duration_days} days) already exists"
        ));
    }
    CoreError::storage(err.to_string())
}

fn expect_row(changed: usize, missing: CoreError) -> Result<(), CoreError> {
    if changed == 0 {
        Err(missing)
    } else {
        Ok(())
    }
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|err: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.to_string().into())
    })
}

fn parse_optional_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => parse_column(row, idx).map(Some),
        None => Ok(None),
    }
}

fn map_book_status(row: &Row<'_>) -> rusqlite::Result<BookStatusRecord> {
    Ok(BookStatusRecord {
        month: parse_column(row, 0)?,
        status: parse_column(row, 1)?,
        closed_at: row.get(2)?,
    })
}

fn map_member(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        join_date: row.get(4)?,
        is_active: row.get(5)?,
        deactivated: row.get(6)?,
    })
}

fn map_plan(row: &Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        id: row.get(0)?,
        name: row.get(1)?,
        duration_days: row.get(2)?,
        default_amount: row.get(3)?,
        is_active: row.get(4)?,
        plan_type: parse_column(row, 5)?,
    })
}

fn map_membership(row: &Row<'_>) -> rusqlite::Result<Membership> {
    Ok(Membership {
        id: row.get(0)?,
        member_id: row.get(1)?,
        plan_id: row.get(2)?,
        transaction_type: parse_column(row, 3)?,
        purchase_date: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        amount_paid: row.get(7)?,
        payment_method: row.get(8)?,
        sessions_total: row.get(9)?,
        sessions_remaining: row.get(10)?,
        membership_kind: parse_optional_column(row, 11)?,
    })
}
