use energy_ioc::{resolve, Container, Error};
use std::panic;

struct UnregisteredService;

fn main() {
  let container = Container::new();

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never registered...");

  // The container is not unwind safe; nothing is observed after a panic anyway.
  let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
    let _service = resolve!(container, UnregisteredService, "unregistered");
  }));

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible `get()` method ---
  println!("\nNow, attempting to resolve using the fallible `get()` method...");

  match container.get::<UnregisteredService>("unregistered") {
    Ok(_) => panic!("Should not have found the service!"),
    Err(Error::NotRegistered(name)) => println!("Correctly received NotRegistered for '{}'.", name),
    Err(other) => panic!("Unexpected error: {}", other),
  }
}
