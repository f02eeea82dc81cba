//! Report rows returned by the renewal and financial queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{book::BookStatus, common::*, membership::TransactionType};

/// An active member's group-class membership ending inside a queried window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRenewal {
    pub membership_id: EntityId,
    pub member_id: EntityId,
    pub member_name: String,
    pub phone: String,
    pub plan_name: String,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialDetail {
    pub membership_id: EntityId,
    pub purchase_date: NaiveDate,
    pub amount_paid: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub member_name: String,
    /// Plan display name, or `"{n} sessions"` for personal training.
    pub item_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    pub total_revenue: f64,
    pub group_class_revenue: f64,
    pub personal_training_revenue: f64,
    pub transaction_count: usize,
}

impl FinancialSummary {
    pub fn from_details(details: &[FinancialDetail]) -> Self {
        details.iter().fold(Self::default(), |mut acc, detail| {
            acc.total_revenue += detail.amount_paid;
            match detail.transaction_type {
                TransactionType::GroupClass => acc.group_class_revenue += detail.amount_paid,
                TransactionType::PersonalTraining => {
                    acc.personal_training_revenue += detail.amount_paid
                }
            }
            acc.transaction_count += 1;
            acc
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub summary: FinancialSummary,
    pub details: Vec<FinancialDetail>,
}

/// Book status and revenue for one month, as shown before closing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthOverview {
    pub month: MonthKey,
    pub status: BookStatus,
    pub summary: FinancialSummary,
}
