pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_DIRECTIVE: &str = "warn,kranos_reporter=info,kranos_core=info";

/// Installs the global subscriber once. `RUST_LOG` wins over `fallback`,
/// which wins over [`DEFAULT_LOG_DIRECTIVE`]. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_tracing(fallback: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback.unwrap_or(DEFAULT_LOG_DIRECTIVE)))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
