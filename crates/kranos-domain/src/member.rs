//! Gym members.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: EntityId,
    pub name: String,
    /// Unique across all members.
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Never later than the earliest membership start date once one exists.
    pub join_date: Option<NaiveDate>,
    /// Derived from membership history by the status deriver.
    pub is_active: bool,
    /// Set by an explicit deactivation; forces `is_active` off until the
    /// member is reactivated.
    #[serde(default)]
    pub deactivated: bool,
}

impl Identifiable for Member {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Displayable for Member {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.phone)
    }
}

/// Insert payload for a member row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMember {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub join_date: Option<NaiveDate>,
}

impl NewMember {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: None,
            join_date: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_join_date(mut self, join_date: NaiveDate) -> Self {
        self.join_date = Some(join_date);
        self
    }
}

/// Editable member fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
}
