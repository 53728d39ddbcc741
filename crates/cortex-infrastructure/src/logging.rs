//! Structured logging with tracing
//!
//! Configures the tracing subscriber once at process start. `CORTEX_LOG`
//! overrides the configured level with a full env-filter expression.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use cortex_domain::error::{Error, Result};

use crate::config::LoggingConfig;

/// Environment variable consulted for the log filter
pub const LOG_ENV_VAR: &str = "CORTEX_LOG";

/// Initialize logging with the provided configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = if config.json_format {
        let layer = fmt::layer().json().with_target(true);
        Registry::default().with(filter).with(layer).try_init()
    } else {
        let layer = fmt::layer().with_target(true);
        Registry::default().with(filter).with(layer).try_init()
    };

    result.map_err(|e| Error::config(format!("failed to initialize logging: {e}")))
}
