//! Pending-renewal and revenue reporting.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use kranos_domain::{
    EntityId, FinancialDetail, FinancialReport, FinancialSummary, Member, MonthKey,
    MonthOverview, PendingRenewal, Plan, TransactionType,
};
use tracing::debug;

use crate::{BookStatusService, Clock, CoreError, CoreResult, GymStore};

const UNKNOWN_MEMBER: &str = "Unknown member";
const UNKNOWN_PLAN: &str = "Unknown plan";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Window of end dates considered by [`ReportService::pending_renewals`].
pub enum RenewalWindow {
    Month(MonthKey),
    Range { start: NaiveDate, end: NaiveDate },
    /// `[today, today + days]`.
    Upcoming { days: u32 },
}

impl RenewalWindow {
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match *self {
            RenewalWindow::Month(month) => (month.first_day(), month.last_day()),
            RenewalWindow::Range { start, end } => (start, end),
            RenewalWindow::Upcoming { days } => (
                today,
                today
                    .checked_add_days(Days::new(u64::from(days)))
                    .unwrap_or(NaiveDate::MAX),
            ),
        }
    }
}

pub struct ReportService;

impl ReportService {
    /// Active members' group-class memberships ending inside `window`,
    /// ordered by end date then member name. An empty or inverted window
    /// yields an empty list.
    pub fn pending_renewals(
        store: &dyn GymStore,
        clock: &dyn Clock,
        window: RenewalWindow,
    ) -> CoreResult<Vec<PendingRenewal>> {
        let (start, end) = window.resolve(clock.today());
        if end < start {
            return Ok(Vec::new());
        }
        let mut lookup = Lookup::new(store);
        let mut renewals = Vec::new();
        for membership in store.memberships_ending_between(start, end)? {
            let (Some(end_date), Some(plan_id)) = (membership.end_date, membership.plan_id) else {
                continue;
            };
            if !membership.is_group_class() {
                continue;
            }
            let Some(member) = lookup.member(membership.member_id)? else {
                continue;
            };
            if !member.is_active || member.deactivated {
                continue;
            }
            let (member_name, phone) = (member.name.clone(), member.phone.clone());
            renewals.push(PendingRenewal {
                membership_id: membership.id,
                member_id: membership.member_id,
                member_name,
                phone,
                plan_name: lookup.plan_name(plan_id)?,
                end_date,
            });
        }
        renewals.sort_by(|a, b| {
            a.end_date
                .cmp(&b.end_date)
                .then_with(|| a.member_name.cmp(&b.member_name))
                .then(a.membership_id.cmp(&b.membership_id))
        });
        debug!(%start, %end, count = renewals.len(), "pending renewals computed");
        Ok(renewals)
    }

    /// Revenue from every membership purchased in `[start, end]`.
    pub fn financial_report(
        store: &dyn GymStore,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<FinancialReport> {
        if start > end {
            return Err(CoreError::validation(format!(
                "report start {start} is after end {end}"
            )));
        }
        let mut lookup = Lookup::new(store);
        let mut details = Vec::new();
        for membership in store.memberships_purchased_between(start, end)? {
            let member_name = lookup
                .member(membership.member_id)?
                .map(|member| member.name.clone())
                .unwrap_or_else(|| UNKNOWN_MEMBER.to_string());
            let item_name = match membership.transaction_type {
                TransactionType::PersonalTraining => {
                    format!("{} sessions", membership.sessions_total.unwrap_or(0))
                }
                TransactionType::GroupClass => match membership.plan_id {
                    Some(plan_id) => lookup.plan_name(plan_id)?,
                    None => UNKNOWN_PLAN.to_string(),
                },
            };
            details.push(FinancialDetail {
                membership_id: membership.id,
                purchase_date: membership.purchase_date,
                amount_paid: membership.amount_paid,
                transaction_type: membership.transaction_type,
                member_name,
                item_name,
            });
        }
        details.sort_by(|a, b| {
            a.purchase_date
                .cmp(&b.purchase_date)
                .then(a.membership_id.cmp(&b.membership_id))
        });
        let summary = FinancialSummary::from_details(&details);
        debug!(%start, %end, total = summary.total_revenue, "financial report generated");
        Ok(FinancialReport {
            start,
            end,
            summary,
            details,
        })
    }

    /// Book status and revenue summary for one month.
    pub fn month_overview(store: &dyn GymStore, month: MonthKey) -> CoreResult<MonthOverview> {
        let report = Self::financial_report(store, month.first_day(), month.last_day())?;
        Ok(MonthOverview {
            month,
            status: BookStatusService::get_status(store, month),
            summary: report.summary,
        })
    }
}

/// Memoizes member and plan rows for the duration of one report.
struct Lookup<'a> {
    store: &'a dyn GymStore,
    members: HashMap<EntityId, Option<Member>>,
    plans: HashMap<EntityId, Option<Plan>>,
}

impl<'a> Lookup<'a> {
    fn new(store: &'a dyn GymStore) -> Self {
        Self {
            store,
            members: HashMap::new(),
            plans: HashMap::new(),
        }
    }

    fn member(&mut self, id: EntityId) -> CoreResult<Option<&Member>> {
        if !self.members.contains_key(&id) {
            let member = self.store.member(id)?;
            self.members.insert(id, member);
        }
        Ok(self.members.get(&id).and_then(Option::as_ref))
    }

    fn plan_name(&mut self, id: EntityId) -> CoreResult<String> {
        if !self.plans.contains_key(&id) {
            let plan = self.store.plan(id)?;
            self.plans.insert(id, plan);
        }
        Ok(self
            .plans
            .get(&id)
            .and_then(Option::as_ref)
            .map(Plan::display_name)
            .unwrap_or_else(|| UNKNOWN_PLAN.to_string()))
    }
}
