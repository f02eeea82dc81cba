//! Keeps each member's active flag consistent with their purchase history.

use kranos_domain::EntityId;
use tracing::{debug, info, warn};

use crate::{Clock, CoreError, CoreResult, GymStore};

pub struct MemberStatusService;

impl MemberStatusService {
    /// Recomputes and stores the member's active flag.
    ///
    /// A member is active while any group-class membership with a plan has
    /// not passed its last day, or any personal-training package still has
    /// sessions left, unless the member has been deactivated.
    pub fn recompute_status(
        store: &dyn GymStore,
        clock: &dyn Clock,
        member_id: EntityId,
    ) -> CoreResult<bool> {
        let today = clock.today();
        let member = store
            .member(member_id)?
            .ok_or(CoreError::MemberNotFound(member_id))?;
        let active = !member.deactivated
            && store
                .memberships_for_member(member_id)?
                .iter()
                .any(|membership| membership.grants_access_on(today));
        store.set_member_active(member_id, active)?;
        debug!(member_id, active, %today, "member status recomputed");
        Ok(active)
    }

    /// Best-effort refresh after a successful mutation. Failures are logged and
    /// the previous flag is left in place.
    pub fn refresh_quietly(store: &dyn GymStore, clock: &dyn Clock, member_id: EntityId) {
        if let Err(err) = Self::recompute_status(store, clock, member_id) {
            warn!(member_id, error = %err, "member status refresh failed, keeping previous status");
        }
    }

    /// Recomputes every member; returns how many flags changed.
    pub fn recompute_all(store: &dyn GymStore, clock: &dyn Clock) -> CoreResult<usize> {
        let mut changed = 0;
        for member in store.list_members()? {
            let active = Self::recompute_status(store, clock, member.id)?;
            if active != member.is_active {
                changed += 1;
            }
        }
        info!(changed, "member statuses refreshed");
        Ok(changed)
    }
}
