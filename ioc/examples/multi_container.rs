use energy_ioc::Container;

// A function that configures dependencies and runs some logic.
// By accepting a `&Container`, it can be tested with a controlled environment.
fn process_data(container: &Container) -> String {
  container.register_instance("data", "test data".to_string());

  let data = container
    .get::<String>("data")
    .expect("Data not found in container");
  format!("Processed: {}", data.to_uppercase())
}

fn main() {
  println!("--- Running with a dedicated container ---");
  let test_container = Container::new();
  let result = process_data(&test_container);

  println!("Result: {}", result);
  assert_eq!(result, "Processed: TEST DATA");

  // A second container never sees what the first one registered.
  let other_container = Container::new();
  assert!(
    other_container.get::<String>("data").is_err(),
    "Dependency should not have leaked into another container!"
  );

  println!("\nVerified that containers are isolated from each other.");
}
