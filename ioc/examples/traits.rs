use energy_ioc::{resolve, Container, Definition};
use std::sync::Arc;

// 1. The abstraction.
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. A concrete implementation.
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. A service that depends on the abstraction, not the implementation.
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  let container = Container::new();

  // The container stores the logger as an `Arc<dyn Logger>`.
  container.register_singleton(
    "logger",
    Definition::shared(|_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>)),
    &[],
  );

  // ReportService never builds its own logger: it receives the resolved one.
  container.register_singleton(
    "reports",
    Definition::new(|args| {
      Ok(ReportService {
        logger: args.get::<dyn Logger>(0)?,
      })
    }),
    &["logger"],
  );

  println!("Resolving the high-level service...");
  let report_service = resolve!(container, ReportService, "reports");

  println!("Using the service...");
  report_service.generate_report();
}
