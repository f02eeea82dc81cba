//! kranos-domain
//!
//! Pure domain models (Member, Plan, Membership, book status, report rows).
//! No I/O, no CLI, no storage. Only data types, date rules and core enums.

pub mod book;
pub mod common;
pub mod member;
pub mod membership;
pub mod plan;
pub mod report;

pub use book::*;
pub use common::*;
pub use member::*;
pub use membership::*;
pub use plan::*;
pub use report::*;
