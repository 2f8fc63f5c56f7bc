//! The composition root: registers every service the application resolves.

use crate::config::AppConfig;
use crate::controller::QueryController;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::repository::{EnergyRepository, InMemoryRepository};
use energy_ioc::{Container, Definition};
use std::sync::Arc;
use tracing::info;

pub const CONFIG: &str = "config";
pub const DATASET: &str = "dataset";
pub const REPOSITORY: &str = "repository";
pub const CONTROLLER: &str = "controller";

/// Builds the application container.
///
/// Nothing is loaded here: the dataset is read on the first resolution that
/// needs it, and a failed load is retried on the next one.
pub fn build_container(config: AppConfig) -> Container {
  let container = Container::with_options(config.container);

  container.register_instance(CONFIG, config);

  container.register_singleton(
    DATASET,
    Definition::new(|args| {
      let config = args.get::<AppConfig>(0)?;
      let dataset = Dataset::from_path(&config.dataset_path)?;
      info!(
        path = %config.dataset_path.display(),
        records = dataset.len(),
        "dataset loaded"
      );
      Ok(dataset)
    }),
    &[CONFIG],
  );

  container.register_singleton(
    REPOSITORY,
    Definition::shared(|args| {
      let repository = InMemoryRepository::new(args.get::<Dataset>(0)?);
      Ok(Arc::new(repository) as Arc<dyn EnergyRepository>)
    }),
    &[DATASET],
  );

  container.register_transient(
    CONTROLLER,
    Definition::new(|args| Ok(QueryController::new(args.get::<dyn EnergyRepository>(0)?))),
    &[REPOSITORY],
  );

  container
}

/// Resolves a fresh controller from `container`.
pub fn controller(container: &Container) -> Result<Arc<QueryController>> {
  Ok(container.get::<QueryController>(CONTROLLER)?)
}
