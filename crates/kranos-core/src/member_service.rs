//! Member CRUD plus the two distinct removal semantics.

use std::collections::BTreeSet;

use kranos_domain::{EntityId, Member, MemberUpdate, MonthKey, NewMember};
use tracing::info;

use crate::{BookStatusService, Clock, CoreError, CoreResult, GymStore, MemberStatusService};

pub struct MemberService;

impl MemberService {
    /// Adds a member; phone numbers are unique.
    pub fn add(store: &dyn GymStore, member: NewMember) -> CoreResult<EntityId> {
        let cleaned = NewMember {
            name: required(&member.name, "member name")?,
            phone: required(&member.phone, "phone")?,
            email: optional(member.email.as_deref()),
            join_date: member.join_date,
        };
        let id = store.insert_member(&cleaned)?;
        info!(member_id = id, "member added");
        Ok(id)
    }

    pub fn update(store: &dyn GymStore, id: EntityId, update: MemberUpdate) -> CoreResult<Member> {
        let mut member = Self::get(store, id)?;
        if let Some(name) = update.name.as_deref() {
            member.name = required(name, "member name")?;
        }
        if let Some(phone) = update.phone.as_deref() {
            member.phone = required(phone, "phone")?;
        }
        if let Some(email) = update.email {
            member.email = optional(email.as_deref());
        }
        store.update_member(&member)?;
        Ok(member)
    }

    pub fn get(store: &dyn GymStore, id: EntityId) -> CoreResult<Member> {
        store.member(id)?.ok_or(CoreError::MemberNotFound(id))
    }

    pub fn list(store: &dyn GymStore) -> CoreResult<Vec<Member>> {
        store.list_members()
    }

    /// Case-insensitive match on name or phone.
    pub fn search(store: &dyn GymStore, query: &str) -> CoreResult<Vec<Member>> {
        let needle = query.trim().to_lowercase();
        Ok(store
            .list_members()?
            .into_iter()
            .filter(|m| m.name.to_lowercase().contains(&needle) || m.phone.contains(&needle))
            .collect())
    }

    /// Soft removal: keeps every membership row and holds the member
    /// inactive through later status refreshes.
    pub fn deactivate_member(store: &dyn GymStore, id: EntityId) -> CoreResult<()> {
        Self::get(store, id)?;
        store.set_member_deactivated(id, true)?;
        store.set_member_active(id, false)?;
        info!(member_id = id, "member deactivated");
        Ok(())
    }

    /// Lifts a deactivation and re-derives the active flag from history.
    pub fn reactivate_member(
        store: &dyn GymStore,
        clock: &dyn Clock,
        id: EntityId,
    ) -> CoreResult<bool> {
        Self::get(store, id)?;
        store.set_member_deactivated(id, false)?;
        let active = MemberStatusService::recompute_status(store, clock, id)?;
        info!(member_id = id, active, "member reactivated");
        Ok(active)
    }

    /// Hard removal of the member and all of their memberships.
    ///
    /// Refused when any of those memberships sits in a closed month, since
    /// removing it would change frozen books. Returns the number of
    /// memberships removed.
    pub fn purge_member(store: &dyn GymStore, id: EntityId) -> CoreResult<usize> {
        Self::get(store, id)?;
        let months: BTreeSet<MonthKey> = store
            .memberships_for_member(id)?
            .iter()
            .map(|m| m.effective_month())
            .collect();
        for month in months {
            BookStatusService::ensure_open(store, month)?;
        }
        let removed = store.delete_member(id)?;
        info!(member_id = id, memberships = removed, "member purged");
        Ok(removed)
    }
}

fn required(value: &str, field: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
