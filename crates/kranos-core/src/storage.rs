use chrono::NaiveDate;
use kranos_domain::{
    BookStatusRecord, EntityId, Member, Membership, MonthKey, NewMember, NewMembership, NewPlan,
    Plan,
};

use crate::CoreError;

/// Abstraction over the relational store holding members, plans, memberships
/// and the monthly book status ledger.
///
/// Implementations own constraint enforcement: unique phone numbers, unique
/// `(name, duration_days)` plans and membership foreign keys. A unique
/// violation surfaces as [`CoreError::AlreadyExists`]; every other fault,
/// foreign keys included, as [`CoreError::Storage`].
pub trait GymStore: Send + Sync {
    fn book_status(&self, month: MonthKey) -> Result<Option<BookStatusRecord>, CoreError>;
    /// Inserts or overwrites the row for `record.month`.
    fn upsert_book_status(&self, record: &BookStatusRecord) -> Result<(), CoreError>;
    fn list_book_statuses(&self) -> Result<Vec<BookStatusRecord>, CoreError>;

    fn insert_member(&self, member: &NewMember) -> Result<EntityId, CoreError>;
    fn member(&self, id: EntityId) -> Result<Option<Member>, CoreError>;
    /// Members ordered by name, then id.
    fn list_members(&self) -> Result<Vec<Member>, CoreError>;
    /// Overwrites name, phone and email.
    fn update_member(&self, member: &Member) -> Result<(), CoreError>;
    fn set_member_active(&self, id: EntityId, active: bool) -> Result<(), CoreError>;
    fn set_member_deactivated(&self, id: EntityId, deactivated: bool) -> Result<(), CoreError>;
    fn set_member_join_date(&self, id: EntityId, join_date: NaiveDate) -> Result<(), CoreError>;
    /// Deletes the member and every membership row referencing it, atomically.
    /// Returns the number of memberships removed.
    fn delete_member(&self, id: EntityId) -> Result<usize, CoreError>;

    fn insert_plan(&self, plan: &NewPlan) -> Result<EntityId, CoreError>;
    fn plan(&self, id: EntityId) -> Result<Option<Plan>, CoreError>;
    /// Plans ordered by name, then duration.
    fn list_plans(&self) -> Result<Vec<Plan>, CoreError>;
    fn update_plan(&self, plan: &Plan) -> Result<(), CoreError>;
    fn delete_plan(&self, id: EntityId) -> Result<(), CoreError>;
    fn count_plan_memberships(&self, plan_id: EntityId) -> Result<usize, CoreError>;

    fn insert_membership(&self, membership: &NewMembership) -> Result<EntityId, CoreError>;
    fn membership(&self, id: EntityId) -> Result<Option<Membership>, CoreError>;
    fn update_membership(&self, membership: &Membership) -> Result<(), CoreError>;
    fn delete_membership(&self, id: EntityId) -> Result<(), CoreError>;
    fn memberships_for_member(&self, member_id: EntityId) -> Result<Vec<Membership>, CoreError>;
    fn has_group_class_membership(&self, member_id: EntityId) -> Result<bool, CoreError>;
    /// Group-class memberships whose end date lies in `[start, end]`.
    fn memberships_ending_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Membership>, CoreError>;
    /// Memberships of every type purchased in `[start, end]`.
    fn memberships_purchased_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Membership>, CoreError>;
}
