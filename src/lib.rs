#![doc(test(attr(deny(warnings))))]

//! Kranos gym ledger: membership purchases, month-level book closing,
//! member status and revenue reporting, plus the `kranos_cli` shell.

pub mod app;
pub mod cli;
pub mod errors;
pub mod utils;

pub use app::GymLedger;
pub use errors::{CliError, KranosError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Like [`init`], using `filter` when `RUST_LOG` is unset.
pub fn init_with_filter(filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::debug!("kranos tracing initialized");
    });
}
