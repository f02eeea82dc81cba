use kranos_domain::{DateParseError, EntityId, MonthKey};
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0}")]
    InvalidDate(#[from] DateParseError),
    #[error("Books for {0} are closed")]
    BooksClosed(MonthKey),
    #[error("Plan not found: {0}")]
    PlanNotFound(EntityId),
    #[error("Member not found: {0}")]
    MemberNotFound(EntityId),
    #[error("Membership not found: {0}")]
    MembershipNotFound(EntityId),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("In use: {0}")]
    InUse(String),
    #[error("Database error: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        CoreError::Storage(message.into())
    }

    pub fn is_closed_books(&self) -> bool {
        matches!(self, CoreError::BooksClosed(_))
    }
}
