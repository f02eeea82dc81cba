//! Purchasable plan templates.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    GroupClass,
    PersonalTraining,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::GroupClass => "group_class",
            PlanType::PersonalTraining => "personal_training",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlanType::GroupClass => "Group Class",
            PlanType::PersonalTraining => "Personal Training",
        };
        f.write_str(label)
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(|c: char| c == '-' || c == ' ', "_");
        match normalized.as_str() {
            "group_class" | "gc" => Ok(PlanType::GroupClass),
            "personal_training" | "pt" => Ok(PlanType::PersonalTraining),
            other => Err(format!("unknown plan type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: EntityId,
    pub name: String,
    pub duration_days: u32,
    pub default_amount: f64,
    /// Inactive plans stay linked to history but are not offered for purchase.
    pub is_active: bool,
    pub plan_type: PlanType,
}

impl Plan {
    /// Name shown on reports; unique because `(name, duration_days)` is.
    pub fn display_name(&self) -> String {
        format!("{} - {} days", self.name, self.duration_days)
    }
}

impl Identifiable for Plan {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Displayable for Plan {
    fn display_label(&self) -> String {
        self.display_name()
    }
}

/// Insert payload for a plan row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPlan {
    pub name: String,
    pub duration_days: u32,
    pub default_amount: f64,
    pub plan_type: PlanType,
}

impl NewPlan {
    pub fn group_class(name: impl Into<String>, duration_days: u32, default_amount: f64) -> Self {
        Self {
            name: name.into(),
            duration_days,
            default_amount,
            plan_type: PlanType::GroupClass,
        }
    }
}

/// Editable plan fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub duration_days: Option<u32>,
    pub default_amount: Option<f64>,
}
