// ioc/tests/macros.rs

//! Tests for the resolution macros `resolve!` and `maybe_resolve!`.

use energy_ioc::{maybe_resolve, resolve, Container, Definition};
use std::sync::Arc;

// --- Test Fixtures ---

struct MacroTestService {
  value: i32,
}
trait MacroTestTrait: Send + Sync {
  fn value(&self) -> i32;
}
impl MacroTestTrait for MacroTestService {
  fn value(&self) -> i32 {
    self.value
  }
}

fn container() -> Container {
  let container = Container::new();
  container.register_singleton(
    "service",
    Definition::infallible(|_| MacroTestService { value: 42 }),
    &[],
  );
  container.register_singleton(
    "trait_service",
    Definition::shared(|_| Ok(Arc::new(MacroTestService { value: 44 }) as Arc<dyn MacroTestTrait>)),
    &[],
  );
  container
}

#[test]
fn test_maybe_resolve() {
  let container = container();

  // Success cases
  assert_eq!(maybe_resolve!(container, MacroTestService, "service").unwrap().value, 42);
  assert_eq!(
    maybe_resolve!(container, trait MacroTestTrait, "trait_service")
      .unwrap()
      .value(),
    44
  );

  // Failure cases: unknown name, and a known name holding another type.
  assert!(maybe_resolve!(container, MacroTestService, "missing_name").is_none());
  assert!(maybe_resolve!(container, trait MacroTestTrait, "service").is_none());
  assert!(maybe_resolve!(container, String, "service").is_none());
}

#[test]
fn test_resolve_accepts_references_and_arcs() {
  let container = Arc::new(container());
  let by_ref = &container;

  let first = resolve!(by_ref, MacroTestService, "service");
  let second = resolve!(container, MacroTestService, "service");
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
#[should_panic(expected = "Failed to resolve required service 'missing'")]
fn test_resolve_panics_on_missing_concrete_service() {
  let container = container();
  resolve!(container, MacroTestService, "missing");
}

#[test]
#[should_panic(expected = "Failed to resolve required trait service 'service'")]
fn test_resolve_panics_on_mismatched_trait_service() {
  let container = container();
  resolve!(container, trait MacroTestTrait, "service");
}

#[test]
#[should_panic(expected = "no service registered under the name 'missing'")]
fn test_resolve_panic_carries_the_error() {
  let container = container();
  resolve!(container, trait MacroTestTrait, "missing");
}
