//! Tracing initialization for the TaskEase backend.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured default level applies.
/// Safe to call once per process; a second call reports a config error.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|err| Error::config(format!("Failed to initialize tracing: {}", err)))
}
