use energy_app::{bootstrap, config, logging, Error, Result};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
  match run() {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!(error = %e, "energy_app failed");
      eprintln!("[energy_app:ERROR] {}", e);
      ExitCode::FAILURE
    }
  }
}

fn run() -> Result<()> {
  let config_path = config::find_config_file(None)?;
  let config = config::load_config(&config_path)?;
  logging::init_logging(&config.logging)?;
  info!(config = %config_path.display(), "starting energy_app");

  let container = bootstrap::build_container(config);
  let controller = bootstrap::controller(&container)?;

  let report = serde_json::json!({
    "stats": controller.stats(),
    "countries": controller.all_countries(),
  });
  let rendered = serde_json::to_string_pretty(&report).map_err(Error::Output)?;
  println!("{}", rendered);
  Ok(())
}
