//! Monthly book closing: records which calendar months accept financial mutations.

use kranos_domain::{BookStatus, BookStatusRecord, MonthKey};
use tracing::{info, warn};

use crate::{Clock, CoreError, CoreResult, GymStore};

pub struct BookStatusService;

impl BookStatusService {
    /// Status of `month`; months without a row are open.
    ///
    /// Storage faults are logged and answered with `Open`.
    pub fn get_status(store: &dyn GymStore, month: MonthKey) -> BookStatus {
        match store.book_status(month) {
            Ok(record) => record.map(|r| r.status).unwrap_or_default(),
            Err(err) => {
                warn!(%month, error = %err, "book status lookup failed, treating month as open");
                BookStatus::Open
            }
        }
    }

    /// String entry point for callers holding a raw `YYYY-MM` key.
    pub fn get_status_for_key(store: &dyn GymStore, month_key: &str) -> BookStatus {
        match MonthKey::parse(month_key) {
            Ok(month) => Self::get_status(store, month),
            Err(err) => {
                warn!(month_key, error = %err, "unparsable month key, treating month as open");
                BookStatus::Open
            }
        }
    }

    /// Upserts the status of `month_key`. `status` must be `open` or `closed`;
    /// anything else fails without touching the ledger.
    pub fn set_status(
        store: &dyn GymStore,
        clock: &dyn Clock,
        month_key: &str,
        status: &str,
    ) -> CoreResult<BookStatus> {
        let status: BookStatus = status
            .parse()
            .map_err(|err: kranos_domain::BookStatusParseError| {
                CoreError::validation(err.to_string())
            })?;
        let month =
            MonthKey::parse(month_key).map_err(|err| CoreError::validation(err.to_string()))?;
        Self::apply(store, clock, month, status)?;
        Ok(status)
    }

    pub fn close_month(store: &dyn GymStore, clock: &dyn Clock, month: MonthKey) -> CoreResult<()> {
        Self::apply(store, clock, month, BookStatus::Closed)
    }

    pub fn open_month(store: &dyn GymStore, clock: &dyn Clock, month: MonthKey) -> CoreResult<()> {
        Self::apply(store, clock, month, BookStatus::Open)
    }

    /// Every month with a recorded status, oldest first.
    pub fn list_statuses(store: &dyn GymStore) -> CoreResult<Vec<BookStatusRecord>> {
        let mut records = store.list_book_statuses()?;
        records.sort_by_key(|record| record.month);
        Ok(records)
    }

    /// Gate for every financial mutation dated in `month`.
    pub fn ensure_open(store: &dyn GymStore, month: MonthKey) -> CoreResult<()> {
        if Self::get_status(store, month).is_closed() {
            return Err(CoreError::BooksClosed(month));
        }
        Ok(())
    }

    fn apply(
        store: &dyn GymStore,
        clock: &dyn Clock,
        month: MonthKey,
        status: BookStatus,
    ) -> CoreResult<()> {
        let record = match status {
            BookStatus::Open => BookStatusRecord::open(month),
            BookStatus::Closed => BookStatusRecord::closed(month, clock.now()),
        };
        store.upsert_book_status(&record)?;
        info!(%month, %status, "book status updated");
        Ok(())
    }
}
