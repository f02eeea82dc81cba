//! In-process [`GymStore`] with the same constraint semantics as the SQLite
//! backend, for the service tests.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
};

use chrono::NaiveDate;
use kranos_domain::{
    BookStatusRecord, EntityId, Identifiable, Member, Membership, MonthKey, NewMember,
    NewMembership, NewPlan, Plan, TransactionType,
};

use crate::{CoreError, GymStore};

#[derive(Debug, Default)]
struct State {
    members: BTreeMap<EntityId, Member>,
    plans: BTreeMap<EntityId, Plan>,
    memberships: BTreeMap<EntityId, Membership>,
    books: BTreeMap<MonthKey, BookStatusRecord>,
    last_id: EntityId,
}

impl State {
    fn next_id(&mut self) -> EntityId {
        self.last_id += 1;
        self.last_id
    }

    fn check_membership_refs(
        &self,
        member_id: EntityId,
        plan_id: Option<EntityId>,
    ) -> Result<(), CoreError> {
        let plan_missing = plan_id.is_some_and(|id| !self.plans.contains_key(&id));
        if !self.members.contains_key(&member_id) || plan_missing {
            return Err(CoreError::storage("FOREIGN KEY constraint failed"));
        }
        Ok(())
    }

    fn phone_taken(&self, phone: &str, except: Option<EntityId>) -> bool {
        self.members
            .values()
            .any(|m| m.phone == phone && Some(m.id) != except)
    }

    fn plan_taken(&self, name: &str, duration_days: u32, except: Option<EntityId>) -> bool {
        self.plans.values().any(|p| {
            p.name == name && p.duration_days == duration_days && Some(p.id) != except
        })
    }
}

/// Overwrites an existing row; `missing` is returned when there is none.
fn replace_row<T: Identifiable + Clone>(
    rows: &mut BTreeMap<EntityId, T>,
    row: &T,
    missing: CoreError,
) -> Result<(), CoreError> {
    match rows.get_mut(&row.id()) {
        Some(stored) => {
            *stored = row.clone();
            Ok(())
        }
        None => Err(missing),
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    outage: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with a storage error.
    pub fn simulate_outage(&self, enabled: bool) {
        self.outage.store(enabled, Ordering::SeqCst);
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, CoreError> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(CoreError::storage("store unavailable"));
        }
        self.state
            .lock()
            .map_err(|_| CoreError::storage("store lock poisoned"))
    }
}

impl GymStore for MemoryStore {
    fn book_status(&self, month: MonthKey) -> Result<Option<BookStatusRecord>, CoreError> {
        Ok(self.state()?.books.get(&month).cloned())
    }

    fn upsert_book_status(&self, record: &BookStatusRecord) -> Result<(), CoreError> {
        self.state()?.books.insert(record.month, record.clone());
        Ok(())
    }

    fn list_book_statuses(&self) -> Result<Vec<BookStatusRecord>, CoreError> {
        Ok(self.state()?.books.values().cloned().collect())
    }

    fn insert_member(&self, member: &NewMember) -> Result<EntityId, CoreError> {
        let mut state = self.state()?;
        if state.phone_taken(&member.phone, None) {
            return Err(CoreError::AlreadyExists(format!(
                "a member with phone {} already exists",
                member.phone
            )));
        }
        let id = state.next_id();
        state.members.insert(
            id,
            Member {
                id,
                name: member.name.clone(),
                phone: member.phone.clone(),
                email: member.email.clone(),
                join_date: member.join_date,
                is_active: true,
                deactivated: false,
            },
        );
        Ok(id)
    }

    fn member(&self, id: EntityId) -> Result<Option<Member>, CoreError> {
        Ok(self.state()?.members.get(&id).cloned())
    }

    fn list_members(&self) -> Result<Vec<Member>, CoreError> {
        let mut members: Vec<Member> = self.state()?.members.values().cloned().collect();
        members.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    fn update_member(&self, member: &Member) -> Result<(), CoreError> {
        let mut state = self.state()?;
        if state.phone_taken(&member.phone, Some(member.id)) {
            return Err(CoreError::AlreadyExists(format!(
                "a member with phone {} already exists",
                member.phone
            )));
        }
        let stored = state
            .members
            .get_mut(&member.id)
            .ok_or(CoreError::MemberNotFound(member.id))?;
        stored.name = member.name.clone();
        stored.phone = member.phone.clone();
        stored.email = member.email.clone();
        Ok(())
    }

    fn set_member_active(&self, id: EntityId, active: bool) -> Result<(), CoreError> {
        let mut state = self.state()?;
        let member = state
            .members
            .get_mut(&id)
            .ok_or(CoreError::MemberNotFound(id))?;
        member.is_active = active;
        Ok(())
    }

    fn set_member_deactivated(&self, id: EntityId, deactivated: bool) -> Result<(), CoreError> {
        let mut state = self.state()?;
        let member = state
            .members
            .get_mut(&id)
            .ok_or(CoreError::MemberNotFound(id))?;
        member.deactivated = deactivated;
        Ok(())
    }

    fn set_member_join_date(&self, id: EntityId, join_date: NaiveDate) -> Result<(), CoreError> {
        let mut state = self.state()?;
        let member = state
            .members
            .get_mut(&id)
            .ok_or(CoreError::MemberNotFound(id))?;
        member.join_date = Some(join_date);
        Ok(())
    }

    fn delete_member(&self, id: EntityId) -> Result<usize, CoreError> {
        let mut state = self.state()?;
        if state.members.remove(&id).is_none() {
            return Err(CoreError::MemberNotFound(id));
        }
        let before = state.memberships.len();
        state.memberships.retain(|_, m| m.member_id != id);
        Ok(before - state.memberships.len())
    }

    fn insert_plan(&self, plan: &NewPlan) -> Result<EntityId, CoreError> {
        let mut state = self.state()?;
        if state.plan_taken(&plan.name, plan.duration_days, None) {
            return Err(CoreError::AlreadyExists(format!(
                "plan {} ({} days) already exists",
                plan.name, plan.duration_days
            )));
        }
        let id = state.next_id();
        state.plans.insert(
            id,
            Plan {
                id,
                name: plan.name.clone(),
                duration_days: plan.duration_days,
                default_amount: plan.default_amount,
                is_active: true,
                plan_type: plan.plan_type,
            },
        );
        Ok(id)
    }

    fn plan(&self, id: EntityId) -> Result<Option<Plan>, CoreError> {
        Ok(self.state()?.plans.get(&id).cloned())
    }

    fn list_plans(&self) -> Result<Vec<Plan>, CoreError> {
        let mut plans: Vec<Plan> = self.state()?.plans.values().cloned().collect();
        plans.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.duration_days.cmp(&b.duration_days))
        });
        Ok(plans)
    }

    fn update_plan(&self, plan: &Plan) -> Result<(), CoreError> {
        let mut state = self.state()?;
        if state.plan_taken(&plan.name, plan.duration_days, Some(plan.id)) {
            return Err(CoreError::AlreadyExists(format!(
                "plan {} ({} days) already exists",
                plan.name, plan.duration_days
            )));
        }
        replace_row(&mut state.plans, plan, CoreError::PlanNotFound(plan.id))
    }

    fn delete_plan(&self, id: EntityId) -> Result<(), CoreError> {
        let mut state = self.state()?;
        if state.memberships.values().any(|m| m.plan_id == Some(id)) {
            return Err(CoreError::storage("FOREIGN KEY constraint failed"));
        }
        state
            .plans
            .remove(&id)
            .map(|_| ())
            .ok_or(CoreError::PlanNotFound(id))
    }

    fn count_plan_memberships(&self, plan_id: EntityId) -> Result<usize, CoreError> {
        Ok(self
            .state()?
            .memberships
            .values()
            .filter(|m| m.plan_id == Some(plan_id))
            .count())
    }

    fn insert_membership(&self, membership: &NewMembership) -> Result<EntityId, CoreError> {
        let mut state = self.state()?;
        state.check_membership_refs(membership.member_id, membership.plan_id)?;
        let id = state.next_id();
        state
            .memberships
            .insert(id, membership.clone().into_membership(id));
        Ok(id)
    }

    fn membership(&self, id: EntityId) -> Result<Option<Membership>, CoreError> {
        Ok(self.state()?.memberships.get(&id).cloned())
    }

    fn update_membership(&self, membership: &Membership) -> Result<(), CoreError> {
        let mut state = self.state()?;
        state.check_membership_refs(membership.member_id, membership.plan_id)?;
        replace_row(
            &mut state.memberships,
            membership,
            CoreError::MembershipNotFound(membership.id),
        )
    }

    fn delete_membership(&self, id: EntityId) -> Result<(), CoreError> {
        self.state()?
            .memberships
            .remove(&id)
            .map(|_| ())
            .ok_or(CoreError::MembershipNotFound(id))
    }

    fn memberships_for_member(&self, member_id: EntityId) -> Result<Vec<Membership>, CoreError> {
        Ok(self
            .state()?
            .memberships
            .values()
            .filter(|m| m.member_id == member_id)
            .cloned()
            .collect())
    }

    fn has_group_class_membership(&self, member_id: EntityId) -> Result<bool, CoreError> {
        Ok(self
            .state()?
            .memberships
            .values()
            .any(|m| m.member_id == member_id && m.transaction_type == TransactionType::GroupClass))
    }

    fn memberships_ending_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Membership>, CoreError> {
        Ok(self
            .state()?
            .memberships
            .values()
            .filter(|m| m.is_group_class())
            .filter(|m| m.end_date.is_some_and(|d| d >= start && d <= end))
            .cloned()
            .collect())
    }

    fn memberships_purchased_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Membership>, CoreError> {
        Ok(self
            .state()?
            .memberships
            .values()
            .filter(|m| m.purchase_date >= start && m.purchase_date <= end)
            .cloned()
            .collect())
    }
}
