//! Application configuration, loaded from a YAML file.

use crate::error::{Error, Result};
use energy_ioc::ContainerOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASE_NAME: &str = "energy_app";
const DEFAULT_CONFIG_EXTENSION: &str = "yaml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
  /// JSON file holding the country energy records. Relative paths are
  /// resolved against the directory of the configuration file.
  pub dataset_path: PathBuf,
  #[serde(default)]
  pub logging: LoggingConfig,
  #[serde(default)]
  pub container: ContainerOptions,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
  /// Default level: "trace", "debug", "info", "warn", "error" or "off".
  #[serde(default = "default_level")]
  pub level: String,
  /// Per-target overrides, e.g. `energy_ioc: debug`.
  #[serde(default)]
  pub targets: BTreeMap<String, String>,
  #[serde(default = "default_ansi")]
  pub ansi: bool,
}

fn default_level() -> String {
  "info".to_string()
}

fn default_ansi() -> bool {
  true
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_level(),
      targets: BTreeMap::new(),
      ansi: default_ansi(),
    }
  }
}

impl LoggingConfig {
  /// Renders the levels as `EnvFilter` directives, e.g. `info,energy_ioc=debug`.
  pub fn directives(&self) -> Result<String> {
    let mut directives = vec![parse_level("logging.level", &self.level)?];
    for (target, level) in &self.targets {
      let field = format!("logging.targets.{}", target);
      directives.push(format!("{}={}", target, parse_level(&field, level)?));
    }
    Ok(directives.join(","))
  }
}

fn parse_level(field: &str, raw: &str) -> Result<String> {
  LevelFilter::from_str(raw)
    .map(|level| level.to_string().to_lowercase())
    .map_err(|e| Error::InvalidConfigValue {
      field: field.to_string(),
      message: format!("'{}' is not a log level ({})", raw, e),
    })
}

impl AppConfig {
  /// Parses a YAML document. Relative paths are left untouched.
  pub fn from_yaml(source: &str) -> Result<Self> {
    let config: AppConfig =
      serde_yaml::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))?;
    config.logging.directives()?;
    Ok(config)
  }
}

/// Finds the configuration file in the working directory.
///
/// With an environment suffix (from the argument, `ENERGY_ENV` or `APP_ENV`),
/// `energy_app.<env>.yaml` is preferred over `energy_app.yaml`.
pub fn find_config_file(environment_suffix: Option<&str>) -> Result<PathBuf> {
  let env_from_var = environment_suffix
    .map(|s| s.to_string())
    .or_else(|| env::var("ENERGY_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok());

  find_config_file_in(Path::new("."), env_from_var.as_deref())
}

/// Like [`find_config_file`], searching `dir` and consulting no environment variables.
pub fn find_config_file_in(dir: &Path, environment_suffix: Option<&str>) -> Result<PathBuf> {
  let mut files_to_check: Vec<String> = Vec::new();

  if let Some(env_str) = environment_suffix {
    if !env_str.is_empty() {
      files_to_check.push(format!(
        "{}.{}.{}",
        DEFAULT_CONFIG_BASE_NAME, env_str, DEFAULT_CONFIG_EXTENSION
      ));
    }
  }
  files_to_check.push(format!(
    "{}.{}",
    DEFAULT_CONFIG_BASE_NAME, DEFAULT_CONFIG_EXTENSION
  ));

  for file_name in &files_to_check {
    let path = dir.join(file_name);
    if path.is_file() {
      return Ok(path);
    }
  }

  Err(Error::ConfigNotFound(format!(
    "Searched for: {:?} in {:?}. Provide a config file or check ENERGY_ENV/APP_ENV.",
    files_to_check, dir
  )))
}

/// Reads and parses the configuration at `path`.
pub fn load_config(path: &Path) -> Result<AppConfig> {
  let source = fs::read_to_string(path)?;
  let mut config = AppConfig::from_yaml(&source)?;

  if config.dataset_path.is_relative() {
    if let Some(parent) = path.parent() {
      config.dataset_path = parent.join(&config.dataset_path);
    }
  }
  Ok(config)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn minimal_config_uses_defaults() {
    let config = AppConfig::from_yaml("dataset_path: data/energy.json\n").unwrap();

    assert_eq!(config.dataset_path, PathBuf::from("data/energy.json"));
    assert_eq!(config.logging, LoggingConfig::default());
    assert_eq!(config.container, ContainerOptions::default());
  }

  #[test]
  fn full_config_is_parsed() {
    let yaml = r#"
dataset_path: /srv/energy.json
logging:
  level: warn
  ansi: false
  targets:
    energy_ioc: TRACE
    energy_app: debug
container:
  detect_cycles: true
"#;
    let config = AppConfig::from_yaml(yaml).unwrap();

    assert!(config.container.detect_cycles);
    assert!(!config.logging.ansi);
    assert_eq!(
      config.logging.directives().unwrap(),
      "warn,energy_app=debug,energy_ioc=trace"
    );
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let err = AppConfig::from_yaml("dataset_path: x.json\nport: 8080\n").unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)), "got {:?}", err);
  }

  #[test]
  fn bad_level_is_rejected() {
    let err = AppConfig::from_yaml("dataset_path: x.json\nlogging:\n  level: loud\n").unwrap_err();
    match err {
      Error::InvalidConfigValue { field, .. } => assert_eq!(field, "logging.level"),
      other => panic!("unexpected error: {:?}", other),
    }
  }
}
