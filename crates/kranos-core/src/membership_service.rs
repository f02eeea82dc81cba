//! The membership lifecycle engine: validates, gates and persists purchases.

use chrono::NaiveDate;
use kranos_domain::{
    membership_end_date, parse_date, EntityId, Membership, MembershipKind, MonthKey,
    NewMembership, Plan, TransactionType,
};
use tracing::{debug, info, warn};

use crate::{BookStatusService, Clock, CoreError, CoreResult, GymStore, MemberStatusService};

/// A purchase as submitted by a caller. Dates are raw `YYYY-MM-DD` strings so
/// that strict parsing is part of recording.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRequest {
    pub member_id: EntityId,
    pub plan_id: Option<EntityId>,
    pub transaction_type: TransactionType,
    pub start_date: String,
    /// Falls back to `start_date` when absent.
    pub purchase_date: Option<String>,
    /// Advisory only; group-class end dates are always derived from the plan.
    pub end_date: Option<String>,
    pub amount_paid: f64,
    pub payment_method: Option<String>,
    /// Personal-training session count.
    pub sessions: Option<i64>,
}

impl MembershipRequest {
    pub fn group_class(
        member_id: EntityId,
        plan_id: EntityId,
        start_date: impl Into<String>,
        amount_paid: f64,
    ) -> Self {
        Self {
            member_id,
            plan_id: Some(plan_id),
            transaction_type: TransactionType::GroupClass,
            start_date: start_date.into(),
            purchase_date: None,
            end_date: None,
            amount_paid,
            payment_method: None,
            sessions: None,
        }
    }

    pub fn personal_training(
        member_id: EntityId,
        sessions: i64,
        start_date: impl Into<String>,
        amount_paid: f64,
    ) -> Self {
        Self {
            member_id,
            plan_id: None,
            transaction_type: TransactionType::PersonalTraining,
            start_date: start_date.into(),
            purchase_date: None,
            end_date: None,
            amount_paid,
            payment_method: None,
            sessions: Some(sessions),
        }
    }

    pub fn purchased_on(mut self, date: impl Into<String>) -> Self {
        self.purchase_date = Some(date.into());
        self
    }

    pub fn paid_by(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    pub fn with_plan(mut self, plan_id: EntityId) -> Self {
        self.plan_id = Some(plan_id);
        self
    }
}

/// Editable fields of an existing membership.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipUpdate {
    pub plan_id: Option<EntityId>,
    pub start_date: String,
    pub amount_paid: f64,
    /// Moves the purchase into another month; both months must be open.
    pub purchase_date: Option<String>,
}

pub struct MembershipService;

impl MembershipService {
    /// Records a purchase and returns the new membership id.
    ///
    /// Checks run in a fixed order and the first failure wins: date parsing,
    /// the closed-books gate, amount, sessions, plan. Nothing is written unless
    /// all of them pass.
    pub fn record_membership(
        store: &dyn GymStore,
        clock: &dyn Clock,
        request: MembershipRequest,
    ) -> CoreResult<EntityId> {
        let start_date = parse_date(&request.start_date)?;
        let purchase_date = match request.purchase_date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => start_date,
        };
        BookStatusService::ensure_open(store, MonthKey::from_date(purchase_date))?;
        validate_amount(request.amount_paid)?;

        let row = match request.transaction_type {
            TransactionType::PersonalTraining => {
                Self::personal_training_row(store, &request, start_date, purchase_date)?
            }
            TransactionType::GroupClass => {
                Self::group_class_row(store, &request, start_date, purchase_date)?
            }
        };

        let id = store.insert_membership(&row).inspect_err(|err| {
            warn!(member_id = row.member_id, error = %err, "membership insert failed");
        })?;
        info!(
            membership_id = id,
            member_id = row.member_id,
            transaction_type = %row.transaction_type,
            amount = row.amount_paid,
            "membership recorded"
        );

        MemberStatusService::refresh_quietly(store, clock, row.member_id);
        backfill_join_date(store, row.member_id, start_date);
        Ok(id)
    }

    /// Changes plan, start date, amount and optionally the purchase date.
    ///
    /// The closed-books gate applies to the row's current month and to the
    /// month it would move into. Group-class end dates are recomputed.
    pub fn update_membership(
        store: &dyn GymStore,
        clock: &dyn Clock,
        id: EntityId,
        update: MembershipUpdate,
    ) -> CoreResult<()> {
        let start_date = parse_date(&update.start_date)?;
        let new_purchase_date = update.purchase_date.as_deref().map(parse_date).transpose()?;
        let mut membership = store
            .membership(id)?
            .ok_or(CoreError::MembershipNotFound(id))?;

        let current_month = membership.effective_month();
        BookStatusService::ensure_open(store, current_month)?;
        let purchase_date = new_purchase_date.unwrap_or(membership.purchase_date);
        let target_month = MonthKey::from_date(purchase_date);
        if target_month != current_month {
            BookStatusService::ensure_open(store, target_month)?;
        }
        validate_amount(update.amount_paid)?;

        match membership.transaction_type {
            TransactionType::GroupClass => {
                let plan_id = update.plan_id.ok_or_else(|| {
                    CoreError::validation("a group-class membership requires a plan")
                })?;
                let plan = duration_plan(store, plan_id)?;
                membership.end_date = Some(end_date_for(&plan, start_date)?);
                membership.plan_id = Some(plan_id);
            }
            TransactionType::PersonalTraining => {
                if let Some(plan_id) = update.plan_id {
                    require_plan(store, plan_id)?;
                }
                membership.plan_id = update.plan_id;
            }
        }
        membership.start_date = start_date;
        membership.purchase_date = purchase_date;
        membership.amount_paid = update.amount_paid;

        store.update_membership(&membership)?;
        info!(membership_id = id, "membership updated");
        MemberStatusService::refresh_quietly(store, clock, membership.member_id);
        backfill_join_date(store, membership.member_id, start_date);
        Ok(())
    }

    /// Deletes a membership unless its purchase month is closed.
    pub fn delete_membership(
        store: &dyn GymStore,
        clock: &dyn Clock,
        id: EntityId,
    ) -> CoreResult<()> {
        let membership = store
            .membership(id)?
            .ok_or(CoreError::MembershipNotFound(id))?;
        BookStatusService::ensure_open(store, membership.effective_month())?;
        store.delete_membership(id)?;
        info!(membership_id = id, member_id = membership.member_id, "membership deleted");
        MemberStatusService::refresh_quietly(store, clock, membership.member_id);
        Ok(())
    }

    /// Marks one personal-training session as used; returns the sessions left.
    pub fn consume_session(
        store: &dyn GymStore,
        clock: &dyn Clock,
        id: EntityId,
    ) -> CoreResult<u32> {
        let mut membership = store
            .membership(id)?
            .ok_or(CoreError::MembershipNotFound(id))?;
        if membership.transaction_type != TransactionType::PersonalTraining {
            return Err(CoreError::validation(format!(
                "membership {id} is not a personal-training package"
            )));
        }
        let remaining = membership.sessions_remaining.unwrap_or(0);
        if remaining == 0 {
            return Err(CoreError::validation(format!(
                "no sessions remaining on membership {id}"
            )));
        }
        membership.sessions_remaining = Some(remaining - 1);
        store.update_membership(&membership)?;
        debug!(membership_id = id, remaining = remaining - 1, "session consumed");
        MemberStatusService::refresh_quietly(store, clock, membership.member_id);
        Ok(remaining - 1)
    }

    /// The member's memberships, most recent purchase first.
    pub fn list_for_member(
        store: &dyn GymStore,
        member_id: EntityId,
    ) -> CoreResult<Vec<Membership>> {
        let mut memberships = store.memberships_for_member(member_id)?;
        memberships.sort_by(|a, b| {
            b.purchase_date
                .cmp(&a.purchase_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(memberships)
    }

    fn personal_training_row(
        store: &dyn GymStore,
        request: &MembershipRequest,
        start_date: NaiveDate,
        purchase_date: NaiveDate,
    ) -> CoreResult<NewMembership> {
        let sessions = request
            .sessions
            .filter(|count| *count > 0)
            .and_then(|count| u32::try_from(count).ok())
            .ok_or_else(|| CoreError::validation("sessions must be a positive whole number"))?;
        if let Some(plan_id) = request.plan_id {
            require_plan(store, plan_id)?;
        }
        Ok(NewMembership {
            member_id: request.member_id,
            plan_id: request.plan_id,
            transaction_type: TransactionType::PersonalTraining,
            purchase_date,
            start_date,
            end_date: None,
            amount_paid: request.amount_paid,
            payment_method: normalize_method(request.payment_method.as_deref()),
            sessions_total: Some(sessions),
            sessions_remaining: Some(sessions),
            membership_kind: None,
        })
    }

    fn group_class_row(
        store: &dyn GymStore,
        request: &MembershipRequest,
        start_date: NaiveDate,
        purchase_date: NaiveDate,
    ) -> CoreResult<NewMembership> {
        let plan_id = request
            .plan_id
            .ok_or_else(|| CoreError::validation("a group-class membership requires a plan"))?;
        let plan = duration_plan(store, plan_id)?;
        let end_date = end_date_for(&plan, start_date)?;
        if let Some(raw) = request.end_date.as_deref() {
            match parse_date(raw) {
                Ok(supplied) if supplied != end_date => {
                    debug!(%supplied, %end_date, "supplied end date replaced by plan duration");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "discarding unparsable end date");
                }
            }
        }
        let has_prior = store.has_group_class_membership(request.member_id)?;
        Ok(NewMembership {
            member_id: request.member_id,
            plan_id: Some(plan_id),
            transaction_type: TransactionType::GroupClass,
            purchase_date,
            start_date,
            end_date: Some(end_date),
            amount_paid: request.amount_paid,
            payment_method: normalize_method(request.payment_method.as_deref()),
            sessions_total: None,
            sessions_remaining: None,
            membership_kind: Some(MembershipKind::classify(has_prior)),
        })
    }
}

fn validate_amount(amount: f64) -> CoreResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::validation("amount paid must be greater than zero"));
    }
    Ok(())
}

fn require_plan(store: &dyn GymStore, plan_id: EntityId) -> CoreResult<Plan> {
    store.plan(plan_id)?.ok_or(CoreError::PlanNotFound(plan_id))
}

fn duration_plan(store: &dyn GymStore, plan_id: EntityId) -> CoreResult<Plan> {
    let plan = require_plan(store, plan_id)?;
    if plan.duration_days == 0 {
        return Err(CoreError::validation(format!(
            "plan {} has no valid duration",
            plan.display_name()
        )));
    }
    Ok(plan)
}

fn end_date_for(plan: &Plan, start_date: NaiveDate) -> CoreResult<NaiveDate> {
    membership_end_date(start_date, plan.duration_days).ok_or_else(|| {
        CoreError::validation(format!(
            "cannot compute end date for plan {} from {start_date}",
            plan.display_name()
        ))
    })
}

fn normalize_method(method: Option<&str>) -> Option<String> {
    method
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Pulls `join_date` back to `start_date` when it is unset or later.
fn backfill_join_date(store: &dyn GymStore, member_id: EntityId, start_date: NaiveDate) {
    let result = store.member(member_id).and_then(|member| match member {
        Some(member) if member.join_date.map_or(true, |joined| start_date < joined) => {
            store.set_member_join_date(member_id, start_date)
        }
        _ => Ok(()),
    });
    if let Err(err) = result {
        warn!(member_id, error = %err, "join date backfill failed");
    }
}
