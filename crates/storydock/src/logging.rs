//! Subscriber installation for hosts that do not bring their own.

use storydock_core::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable whose directives override [`LoggingConfig::filter`].
pub const LOG_ENV: &str = "STORYDOCK_LOG";

/// Install a global `fmt` subscriber.
///
/// Returns `false` when a global subscriber was already installed; the
/// existing one is kept.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "logging initialised");
    }
    installed
}
