use rusqlite::Connection;

/// Bumped whenever the DDL below changes shape.
pub const SCHEMA_VERSION: i32 = 2;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS members (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    phone       TEXT NOT NULL UNIQUE,
    email       TEXT,
    join_date   TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    deactivated INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS plans (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    duration_days   INTEGER NOT NULL CHECK (duration_days > 0),
    default_amount  REAL NOT NULL CHECK (default_amount >= 0),
    is_active       INTEGER NOT NULL DEFAULT 1,
    plan_type       TEXT NOT NULL DEFAULT 'group_class',
    UNIQUE (name, duration_days)
);

CREATE TABLE IF NOT EXISTS memberships (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id           INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    plan_id             INTEGER REFERENCES plans(id),
    transaction_type    TEXT NOT NULL,
    purchase_date       TEXT NOT NULL,
    start_date          TEXT NOT NULL,
    end_date            TEXT,
    amount_paid         REAL NOT NULL,
    payment_method      TEXT,
    sessions_total      INTEGER,
    sessions_remaining  INTEGER,
    membership_kind     TEXT
);

CREATE INDEX IF NOT EXISTS idx_memberships_member ON memberships(member_id);
CREATE INDEX IF NOT EXISTS idx_memberships_end_date ON memberships(end_date);
CREATE INDEX IF NOT EXISTS idx_memberships_purchase_date ON memberships(purchase_date);

CREATE TABLE IF NOT EXISTS monthly_book_status (
    month_key   TEXT PRIMARY KEY,
    status      TEXT NOT NULL CHECK (status IN ('open', 'closed')),
    closed_at   TEXT
);
";

/// Plans offered on a fresh database: `(name, duration_days, default_amount)`.
pub const DEFAULT_PLANS: &[(&str, u32, f64)] = &[
    ("Monthly", 30, 2500.0),
    ("Quarterly", 90, 6500.0),
    ("Half-Yearly", 180, 12000.0),
    ("Annual", 365, 20000.0),
];

pub fn initialize(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(CREATE_TABLES)?;
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version == 1 {
        conn.execute_batch(
            "ALTER TABLE members ADD COLUMN deactivated INTEGER NOT NULL DEFAULT 0;",
        )?;
    }
    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}

pub const MEMBER_COLUMNS: &str = "id, name, phone, email, join_date, is_active, deactivated";

pub const PLAN_COLUMNS: &str = "id, name, duration_days, default_amount, is_active, plan_type";

pub const MEMBERSHIP_COLUMNS: &str = "id, member_id, plan_id, transaction_type, purchase_date, \
     start_date, end_date, amount_paid, payment_method, sessions_total, sessions_remaining, \
     membership_kind";
