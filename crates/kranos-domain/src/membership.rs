//! Domain models for membership purchases (the financial transactions).

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Distinguishes duration-based group-class purchases from session packs.
pub enum TransactionType {
    GroupClass,
    PersonalTraining,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::GroupClass => "group_class",
            TransactionType::PersonalTraining => "personal_training",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::GroupClass => "Group Class",
            TransactionType::PersonalTraining => "Personal Training",
        };
        f.write_str(label)
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "group_class" => Ok(TransactionType::GroupClass),
            "personal_training" => Ok(TransactionType::PersonalTraining),
            other => Err(format!("unknown transaction type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// New for a member's first group-class purchase, Renewal afterwards.
/// Assigned once at creation and never recalculated.
pub enum MembershipKind {
    New,
    Renewal,
}

impl MembershipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipKind::New => "New",
            MembershipKind::Renewal => "Renewal",
        }
    }

    pub fn classify(has_prior_group_class: bool) -> Self {
        if has_prior_group_class {
            MembershipKind::Renewal
        } else {
            MembershipKind::New
        }
    }
}

impl fmt::Display for MembershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "New" => Ok(MembershipKind::New),
            "Renewal" => Ok(MembershipKind::Renewal),
            other => Err(format!("unknown membership kind `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Membership {
    pub id: EntityId,
    pub member_id: EntityId,
    pub plan_id: Option<EntityId>,
    pub transaction_type: TransactionType,
    pub purchase_date: NaiveDate,
    pub start_date: NaiveDate,
    /// Inclusive last day; only for group-class purchases.
    pub end_date: Option<NaiveDate>,
    pub amount_paid: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub sessions_total: Option<u32>,
    pub sessions_remaining: Option<u32>,
    pub membership_kind: Option<MembershipKind>,
}

impl Membership {
    /// Month whose book status gates creating or deleting this row.
    pub fn effective_month(&self) -> MonthKey {
        MonthKey::from_date(self.purchase_date)
    }

    pub fn is_group_class(&self) -> bool {
        self.transaction_type == TransactionType::GroupClass
    }

    /// Whether this purchase still entitles the member to attend on `today`.
    pub fn grants_access_on(&self, today: NaiveDate) -> bool {
        match self.transaction_type {
            TransactionType::GroupClass => {
                self.plan_id.is_some() && self.end_date.is_some_and(|end| end >= today)
            }
            TransactionType::PersonalTraining => self.sessions_remaining.unwrap_or(0) > 0,
        }
    }
}

impl Identifiable for Membership {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Displayable for Membership {
    fn display_label(&self) -> String {
        format!(
            "membership #{} ({} from {})",
            self.id,
            self.transaction_type,
            format_date(self.start_date)
        )
    }
}

/// Insert payload produced by the lifecycle engine after validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMembership {
    pub member_id: EntityId,
    pub plan_id: Option<EntityId>,
    pub transaction_type: TransactionType,
    pub purchase_date: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub amount_paid: f64,
    pub payment_method: Option<String>,
    pub sessions_total: Option<u32>,
    pub sessions_remaining: Option<u32>,
    pub membership_kind: Option<MembershipKind>,
}

impl NewMembership {
    pub fn into_membership(self, id: EntityId) -> Membership {
        Membership {
            id,
            member_id: self.member_id,
            plan_id: self.plan_id,
            transaction_type: self.transaction_type,
            purchase_date: self.purchase_date,
            start_date: self.start_date,
            end_date: self.end_date,
            amount_paid: self.amount_paid,
            payment_method: self.payment_method,
            sessions_total: self.sessions_total,
            sessions_remaining: self.sessions_remaining,
            membership_kind: self.membership_kind,
        }
    }
}
