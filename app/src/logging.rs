//! Installs the process-wide `tracing` subscriber.

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Initializes logging from the configuration.
///
/// `RUST_LOG`, when set and valid, takes precedence over the configured
/// levels. Records emitted through the `log` crate are forwarded to `tracing`.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => build_filter(config)?,
  };

  tracing_log::LogTracer::init().map_err(|e| Error::LoggingInit(e.to_string()))?;

  let subscriber = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_ansi(config.ansi)
    .with_target(true)
    .finish();

  tracing::subscriber::set_global_default(subscriber)
    .map_err(|e| Error::LoggingInit(e.to_string()))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
  let directives = config.directives()?;
  EnvFilter::try_new(&directives).map_err(|e| Error::InvalidConfigValue {
    field: "logging".to_string(),
    message: format!("'{}': {}", directives, e),
  })
}
