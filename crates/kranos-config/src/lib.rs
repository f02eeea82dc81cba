//! kranos-config
//!
//! Persistent settings for the gym ledger: where the database lives, how
//! amounts are labelled and how logging is filtered.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{resolve_base_dir, ConfigManager, HOME_ENV};
pub use model::Config;
