use kranos_domain::{EntityId, NewPlan, Plan, PlanUpdate};
use tracing::info;

use crate::{CoreError, CoreResult, GymStore};

pub struct PlanService;

impl PlanService {
    pub fn add(store: &dyn GymStore, plan: NewPlan) -> CoreResult<EntityId> {
        let name = plan.name.trim().to_string();
        validate(&name, plan.duration_days, plan.default_amount)?;
        let id = store.insert_plan(&NewPlan { name, ..plan })?;
        info!(plan_id = id, "plan added");
        Ok(id)
    }

    /// Edits a plan. Existing memberships keep the end dates they were
    /// recorded with.
    pub fn update(store: &dyn GymStore, id: EntityId, update: PlanUpdate) -> CoreResult<Plan> {
        let mut plan = Self::get(store, id)?;
        if let Some(name) = update.name {
            plan.name = name.trim().to_string();
        }
        if let Some(duration_days) = update.duration_days {
            plan.duration_days = duration_days;
        }
        if let Some(amount) = update.default_amount {
            plan.default_amount = amount;
        }
        validate(&plan.name, plan.duration_days, plan.default_amount)?;
        store.update_plan(&plan)?;
        Ok(plan)
    }

    pub fn set_active(store: &dyn GymStore, id: EntityId, active: bool) -> CoreResult<()> {
        let mut plan = Self::get(store, id)?;
        plan.is_active = active;
        store.update_plan(&plan)?;
        info!(plan_id = id, active, "plan availability changed");
        Ok(())
    }

    pub fn get(store: &dyn GymStore, id: EntityId) -> CoreResult<Plan> {
        store.plan(id)?.ok_or(CoreError::PlanNotFound(id))
    }

    /// With `active_only`, the plans offered for purchase.
    pub fn list(store: &dyn GymStore, active_only: bool) -> CoreResult<Vec<Plan>> {
        let plans = store.list_plans()?;
        Ok(plans
            .into_iter()
            .filter(|plan| !active_only || plan.is_active)
            .collect())
    }

    /// Deletes a plan that no membership references.
    pub fn delete(store: &dyn GymStore, id: EntityId) -> CoreResult<()> {
        let plan = Self::get(store, id)?;
        let references = store.count_plan_memberships(id)?;
        if references > 0 {
            return Err(CoreError::InUse(format!(
                "plan {} is referenced by {references} membership(s); deactivate it instead",
                plan.display_name()
            )));
        }
        store.delete_plan(id)?;
        info!(plan_id = id, "plan deleted");
        Ok(())
    }
}

fn validate(name: &str, duration_days: u32, amount: f64) -> CoreResult<()> {
    if name.is_empty() {
        return Err(CoreError::validation("plan name is required"));
    }
    if duration_days == 0 {
        return Err(CoreError::validation("plan duration must be positive"));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::validation("plan amount must not be negative"));
    }
    Ok(())
}
