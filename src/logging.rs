//! Tracing bootstrap
//!
//! Host applications call this once at startup; tests may call it
//! repeatedly (later calls are no-ops).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigie_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
