use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the `energy_app` crate.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Configuration file not found: {0}")]
  ConfigNotFound(String),

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidConfigValue { field: String, message: String },

  #[error("Failed to read dataset {}: {source}", .path.display())]
  DatasetRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse dataset: {0}")]
  DatasetParse(#[source] serde_json::Error),

  #[error("Invalid year '{0}': expected a non-negative integer")]
  InvalidYear(String),

  #[error("Invalid field '{0}'")]
  InvalidField(String),

  #[error("Invalid year range: {0}")]
  InvalidRange(String),

  #[error("Invalid country list: {0}")]
  InvalidCountries(String),

  #[error("Failed to initialize logging: {0}")]
  LoggingInit(String),

  #[error("Failed to render output: {0}")]
  Output(#[source] serde_json::Error),

  #[error(transparent)]
  Container(#[from] energy_ioc::Error),
}

/// A specialized `Result` type for `energy_app` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
