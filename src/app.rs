//! `GymLedger`: the single entry point wiring configuration, storage and the
//! clock into the core services.

use std::path::Path;

use kranos_config::{Config, ConfigManager};
use kranos_core::{
    BookStatusService, Clock, GymStore, MemberService, MemberStatusService, MembershipRequest,
    MembershipService, MembershipUpdate, PlanService, RenewalWindow, ReportService, SystemClock,
};
use kranos_domain::{
    parse_date, BookStatus, BookStatusRecord, EntityId, FinancialReport, Member, MemberUpdate,
    Membership, MonthKey, MonthOverview, NewMember, NewPlan, PendingRenewal, Plan, PlanUpdate,
};
use kranos_storage_sqlite::SqliteStore;
use tracing::{debug, info};

use crate::errors::Result;

pub struct GymLedger {
    store: Box<dyn GymStore>,
    clock: Box<dyn Clock>,
    config: Config,
}

impl GymLedger {
    pub fn new(store: Box<dyn GymStore>, clock: Box<dyn Clock>, config: Config) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Loads the config under `manager` and opens the database it points at.
    pub fn open(manager: &ConfigManager) -> Result<Self> {
        let config = manager.load()?;
        let path = manager.database_path(&config);
        Self::open_at(&path, config)
    }

    pub fn open_at(path: &Path, config: Config) -> Result<Self> {
        let store = SqliteStore::open(path)?;
        if config.seed_default_plans {
            store.seed_default_plans()?;
        }
        info!(path = %path.display(), "gym ledger opened");
        Ok(Self::new(Box::new(store), Box::new(SystemClock), config))
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &dyn GymStore {
        self.store.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // Books

    pub fn book_status(&self, month_key: &str) -> Result<BookStatus> {
        let month = MonthKey::parse(month_key)?;
        Ok(BookStatusService::get_status(self.store(), month))
    }

    pub fn set_book_status(&self, month_key: &str, status: &str) -> Result<BookStatus> {
        Ok(BookStatusService::set_status(
            self.store(),
            self.clock(),
            month_key,
            status,
        )?)
    }

    pub fn close_books(&self, month_key: &str) -> Result<()> {
        let month = MonthKey::parse(month_key)?;
        BookStatusService::close_month(self.store(), self.clock(), month)?;
        Ok(())
    }

    pub fn open_books(&self, month_key: &str) -> Result<()> {
        let month = MonthKey::parse(month_key)?;
        BookStatusService::open_month(self.store(), self.clock(), month)?;
        Ok(())
    }

    pub fn book_statuses(&self) -> Result<Vec<BookStatusRecord>> {
        Ok(BookStatusService::list_statuses(self.store())?)
    }

    // Members

    pub fn add_member(&self, member: NewMember) -> Result<EntityId> {
        Ok(MemberService::add(self.store(), member)?)
    }

    pub fn update_member(&self, id: EntityId, update: MemberUpdate) -> Result<Member> {
        Ok(MemberService::update(self.store(), id, update)?)
    }

    pub fn member(&self, id: EntityId) -> Result<Member> {
        Ok(MemberService::get(self.store(), id)?)
    }

    pub fn members(&self) -> Result<Vec<Member>> {
        Ok(MemberService::list(self.store())?)
    }

    pub fn search_members(&self, query: &str) -> Result<Vec<Member>> {
        Ok(MemberService::search(self.store(), query)?)
    }

    pub fn deactivate_member(&self, id: EntityId) -> Result<()> {
        Ok(MemberService::deactivate_member(self.store(), id)?)
    }

    pub fn reactivate_member(&self, id: EntityId) -> Result<bool> {
        Ok(MemberService::reactivate_member(
            self.store(),
            self.clock(),
            id,
        )?)
    }

    pub fn purge_member(&self, id: EntityId) -> Result<usize> {
        Ok(MemberService::purge_member(self.store(), id)?)
    }

    pub fn refresh_member_status(&self, id: EntityId) -> Result<bool> {
        Ok(MemberStatusService::recompute_status(
            self.store(),
            self.clock(),
            id,
        )?)
    }

    pub fn refresh_all_statuses(&self) -> Result<usize> {
        Ok(MemberStatusService::recompute_all(self.store(), self.clock())?)
    }

    // Plans

    pub fn add_plan(&self, plan: NewPlan) -> Result<EntityId> {
        Ok(PlanService::add(self.store(), plan)?)
    }

    pub fn update_plan(&self, id: EntityId, update: PlanUpdate) -> Result<Plan> {
        Ok(PlanService::update(self.store(), id, update)?)
    }

    pub fn plan(&self, id: EntityId) -> Result<Plan> {
        Ok(PlanService::get(self.store(), id)?)
    }

    pub fn plans(&self, active_only: bool) -> Result<Vec<Plan>> {
        Ok(PlanService::list(self.store(), active_only)?)
    }

    pub fn set_plan_active(&self, id: EntityId, active: bool) -> Result<()> {
        Ok(PlanService::set_active(self.store(), id, active)?)
    }

    pub fn delete_plan(&self, id: EntityId) -> Result<()> {
        Ok(PlanService::delete(self.store(), id)?)
    }

    // Memberships

    pub fn record_membership(&self, request: MembershipRequest) -> Result<EntityId> {
        Ok(MembershipService::record_membership(
            self.store(),
            self.clock(),
            request,
        )?)
    }

    pub fn update_membership(&self, id: EntityId, update: MembershipUpdate) -> Result<()> {
        Ok(MembershipService::update_membership(
            self.store(),
            self.clock(),
            id,
            update,
        )?)
    }

    pub fn delete_membership(&self, id: EntityId) -> Result<()> {
        Ok(MembershipService::delete_membership(
            self.store(),
            self.clock(),
            id,
        )?)
    }

    pub fn membership(&self, id: EntityId) -> Result<Membership> {
        Ok(self
            .store()
            .membership(id)?
            .ok_or(kranos_core::CoreError::MembershipNotFound(id))?)
    }

    pub fn memberships_for_member(&self, member_id: EntityId) -> Result<Vec<Membership>> {
        Ok(MembershipService::list_for_member(self.store(), member_id)?)
    }

    pub fn consume_session(&self, id: EntityId) -> Result<u32> {
        Ok(MembershipService::consume_session(
            self.store(),
            self.clock(),
            id,
        )?)
    }

    // Reports

    pub fn pending_renewals(&self, month_key: &str) -> Result<Vec<PendingRenewal>> {
        let month = MonthKey::parse(month_key)?;
        self.renewals(RenewalWindow::Month(month))
    }

    /// Renewals due from today; `days` defaults to the configured window.
    pub fn upcoming_renewals(&self, days: Option<u32>) -> Result<Vec<PendingRenewal>> {
        let days = days.unwrap_or(self.config.renewal_window_days);
        self.renewals(RenewalWindow::Upcoming { days })
    }

    pub fn renewals(&self, window: RenewalWindow) -> Result<Vec<PendingRenewal>> {
        Ok(ReportService::pending_renewals(
            self.store(),
            self.clock(),
            window,
        )?)
    }

    pub fn financial_report(&self, start: &str, end: &str) -> Result<FinancialReport> {
        let (start, end) = (parse_date(start)?, parse_date(end)?);
        debug!(%start, %end, "building financial report");
        Ok(ReportService::financial_report(self.store(), start, end)?)
    }

    pub fn month_overview(&self, month_key: &str) -> Result<MonthOverview> {
        let month = MonthKey::parse(month_key)?;
        Ok(ReportService::month_overview(self.store(), month)?)
    }

    pub fn format_amount(&self, amount: f64) -> String {
        format!("{} {:.2}", self.config.currency, amount)
    }
}
