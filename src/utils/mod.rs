pub mod paths;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
/// `RUST_LOG` overrides the `budget_pulse=info` default.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("budget_pulse=info"));

        // Another subscriber may already be installed by an embedding app.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
