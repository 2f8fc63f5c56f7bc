use energy_ioc::{Container, Definition, Error, Instance, LifecycleKind};
use pretty_assertions::assert_eq;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Mutex,
};

// --- Test Fixtures ---

// The trait must be Send + Sync for the container to accept it.
trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}

struct EnglishGreeter;
impl Greeter for EnglishGreeter {
  fn greet(&self) -> String {
    "Hello!".to_string()
  }
}

#[derive(Debug, PartialEq, Eq)]
struct SimpleService {
  id: u32,
}

// --- Basic Tests ---

#[test]
fn test_singleton_returns_identical_instance() {
  // Arrange
  let container = Container::new();
  let constructions = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&constructions);
  container.register_singleton(
    "simple",
    Definition::infallible(move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
      SimpleService { id: 101 }
    }),
    &[],
  );

  // Act
  let handles: Vec<Instance> = (0..5)
    .map(|_| container.get_instance("simple").unwrap())
    .collect();

  // Assert
  for handle in &handles[1..] {
    assert!(Instance::ptr_eq(&handles[0], handle));
  }
  let r1 = container.get::<SimpleService>("simple").unwrap();
  let r2 = container.get::<SimpleService>("simple").unwrap();
  assert_eq!(r1.id, 101);
  assert!(Arc::ptr_eq(&r1, &r2));
  assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_transient_returns_distinct_instances() {
  // Arrange
  let container = Container::new();
  let constructions = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&constructions);
  container.register_transient(
    "simple",
    Definition::infallible(move |_| SimpleService {
      id: counter.fetch_add(1, Ordering::SeqCst) as u32,
    }),
    &[],
  );

  // Act
  let resolved: Vec<Arc<SimpleService>> = (0..4)
    .map(|_| container.get::<SimpleService>("simple").unwrap())
    .collect();

  // Assert
  for (i, a) in resolved.iter().enumerate() {
    for b in &resolved[i + 1..] {
      assert!(!Arc::ptr_eq(a, b));
    }
  }
  let ids: Vec<u32> = resolved.iter().map(|s| s.id).collect();
  assert_eq!(ids, vec![0, 1, 2, 3]);
  assert_eq!(constructions.load(Ordering::SeqCst), 4);
}

#[test]
fn test_dependency_order_is_preserved() {
  // Arrange
  let container = Container::new();
  container.register_instance("a", "value of a".to_string());
  container.register_instance("b", "value of b".to_string());
  container.register_transient(
    "ordered",
    Definition::new(|args| {
      let values = (0..args.len())
        .map(|i| args.get::<String>(i).map(|s| (*s).clone()))
        .collect::<Result<Vec<_>, _>>()?;
      Ok(values)
    }),
    &["b", "a"],
  );

  // Act
  let ordered = container.get::<Vec<String>>("ordered").unwrap();

  // Assert
  assert_eq!(*ordered, vec!["value of b".to_string(), "value of a".to_string()]);
}

#[test]
fn test_arguments_can_be_inspected_untyped() {
  let container = Container::new();
  container.register_instance("name", "energy".to_string());
  container.register_instance("port", 8080_u16);
  container.register_instance("host", "localhost".to_string());
  container.register_transient(
    "text_count",
    Definition::infallible(|args| args.iter().filter(|dep| dep.is::<String>()).count()),
    &["name", "port", "host"],
  );

  assert_eq!(*container.get::<usize>("text_count").unwrap(), 2);
}

#[test]
fn test_empty_dependency_list_passes_no_arguments() {
  let container = Container::new();
  container.register_transient("count", Definition::infallible(|args| args.len()), &[]);

  assert_eq!(*container.get::<usize>("count").unwrap(), 0);
}

#[test]
fn test_unregistered_name_fails_without_side_effects() {
  let container = Container::new();
  container.register_instance("present", 1_u8);

  match container.get_instance("absent") {
    Err(Error::NotRegistered(name)) => assert_eq!(name, "absent"),
    other => panic!("expected NotRegistered, got {:?}", other),
  }
  assert!(!container.contains("absent"));
  assert_eq!(container.len(), 1);
}

#[test]
fn test_failed_singleton_construction_is_retried() {
  // Arrange: fails on the first call, succeeds afterwards.
  let container = Container::new();
  let attempts = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&attempts);
  container.register_singleton(
    "flaky",
    Definition::new(move |_| {
      if counter.fetch_add(1, Ordering::SeqCst) == 0 {
        Err("database not ready".into())
      } else {
        Ok(SimpleService { id: 7 })
      }
    }),
    &[],
  );

  // Act & Assert
  let first = container.get_instance("flaky");
  match first {
    Err(Error::Construction { name, source }) => {
      assert_eq!(name, "flaky");
      assert_eq!(source.to_string(), "database not ready");
    }
    other => panic!("expected a construction failure, got {:?}", other),
  }

  let second = container.get::<SimpleService>("flaky").unwrap();
  let third = container.get::<SimpleService>("flaky").unwrap();
  assert_eq!(second.id, 7);
  assert!(Arc::ptr_eq(&second, &third));
  assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_singleton_and_transient_end_to_end() {
  // A repository singleton shared by transient services with their own tags.
  struct Repo {
    id: u64,
  }
  struct Service {
    repo: Arc<Repo>,
    tag: u64,
  }

  let container = Container::new();
  let next = Arc::new(AtomicUsize::new(1000));

  let repo_ids = Arc::clone(&next);
  container.register_singleton(
    "repo",
    Definition::infallible(move |_| Repo {
      id: repo_ids.fetch_add(1, Ordering::SeqCst) as u64,
    }),
    &[],
  );
  let tags = Arc::clone(&next);
  container.register_transient(
    "service",
    Definition::new(move |args| {
      Ok(Service {
        repo: args.get::<Repo>(0)?,
        tag: tags.fetch_add(1, Ordering::SeqCst) as u64,
      })
    }),
    &["repo"],
  );

  let first = container.get::<Service>("service").unwrap();
  let second = container.get::<Service>("service").unwrap();

  assert!(Arc::ptr_eq(&first.repo, &second.repo));
  assert_eq!(first.repo.id, second.repo.id);
  assert_ne!(first.tag, second.tag);
}

#[test]
fn test_trait_resolution() {
  let container = Container::new();
  container.register_singleton(
    "greeter",
    Definition::shared(|_| Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)),
    &[],
  );

  let greeter = container.get::<dyn Greeter>("greeter").unwrap();
  assert_eq!(greeter.greet(), "Hello!");
  assert_eq!(container.lifecycle_of("greeter"), Some(LifecycleKind::Singleton));
}

#[test]
fn test_forward_references_resolve_lazily() {
  let container = Container::new();
  container.register_transient(
    "consumer",
    Definition::new(|args| Ok(format!("uses {}", args.get::<String>(0)?))),
    &["provider"],
  );

  // Nothing is registered under "provider" yet.
  assert!(matches!(
    container.get_instance("consumer"),
    Err(Error::NotRegistered(ref name)) if name == "provider"
  ));

  container.register_instance("provider", "late provider".to_string());
  assert_eq!(*container.get::<String>("consumer").unwrap(), "uses late provider");
}

#[test]
fn test_type_mismatch_is_reported() {
  let container = Container::new();
  container.register_instance("port", 8080_u16);

  match container.get::<String>("port") {
    Err(Error::TypeMismatch { name, expected, actual }) => {
      assert_eq!(name, "port");
      assert_eq!(expected, std::any::type_name::<String>());
      assert_eq!(actual, "u16");
    }
    other => panic!("expected a type mismatch, got {:?}", other),
  }
}

#[test]
fn test_registered_instance_is_shared() {
  let container = Container::new();
  let log = Arc::new(Mutex::new(Vec::<String>::new()));
  container.register_shared("log", Arc::clone(&log));

  container
    .get::<Mutex<Vec<String>>>("log")
    .unwrap()
    .lock()
    .unwrap()
    .push("written through the container".to_string());

  assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_names_are_sorted() {
  let container = Container::new();
  assert!(container.is_empty());
  container.register_instance("zeta", 1_i32);
  container.register_transient("alpha", Definition::infallible(|_| 2_i32), &[]);

  assert_eq!(container.names(), vec!["alpha".to_string(), "zeta".to_string()]);
  assert_eq!(container.lifecycle_of("alpha"), Some(LifecycleKind::Transient));
  assert_eq!(container.lifecycle_of("missing"), None);
}
