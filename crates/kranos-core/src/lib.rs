//! kranos-core
//!
//! Business logic for the Kranos gym ledger: book closing, the membership
//! lifecycle, member status derivation and reporting.
//! Depends on kranos-domain. No CLI, no terminal I/O; persistence goes
//! through the [`GymStore`] trait handed to every service call.

pub mod book_status_service;
pub mod error;
pub mod member_service;
pub mod member_status_service;
pub mod membership_service;
#[cfg(test)]
mod memory;
pub mod plan_service;
pub mod report_service;
pub mod storage;
pub mod time;

pub use book_status_service::*;
pub use error::{CoreError, CoreResult};
pub use member_service::*;
pub use member_status_service::*;
pub use membership_service::*;
#[cfg(test)]
pub(crate) use memory::MemoryStore;
pub use plan_service::*;
pub use report_service::*;
pub use storage::GymStore;
pub use time::{Clock, FixedClock, SystemClock};
