//! Lifecycle strategies: how a registered definition becomes an instance.

use crate::core::{next_slot_id, Args, BuildGuard, Definition, Instance, WaitGuard};
use crate::error::{Error, Result};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// The callback a strategy uses to resolve its dependencies by name.
pub type Resolver<'a> = &'a dyn Fn(&str) -> Result<Instance>;

/// Turns a registered definition into an instance.
///
/// `resolve` re-enters the owning container, so a strategy never needs to
/// know which container it lives in.
pub trait Lifecycle: Send + Sync {
  fn get_instance(&self, resolve: Resolver<'_>) -> Result<Instance>;

  fn kind(&self) -> LifecycleKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
  Singleton,
  Transient,
}

impl fmt::Display for LifecycleKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LifecycleKind::Singleton => f.write_str("singleton"),
      LifecycleKind::Transient => f.write_str("transient"),
    }
  }
}

// What both strategies share: the service name (for diagnostics), the
// definition, and the ordered dependency names.
struct Recipe {
  name: String,
  definition: Definition,
  dependencies: Arc<[String]>,
}

impl Recipe {
  fn new(name: &str, definition: Definition, dependencies: &[&str]) -> Self {
    Self {
      name: name.to_owned(),
      definition,
      dependencies: dependencies.iter().map(|d| (*d).to_owned()).collect(),
    }
  }

  fn build(&self, resolve: Resolver<'_>) -> Result<Instance> {
    // Dependencies resolve in declaration order; the first failure aborts.
    let values = self
      .dependencies
      .iter()
      .map(|dependency| resolve(dependency.as_str()))
      .collect::<Result<Vec<_>>>()?;

    let args = Args::new(Arc::clone(&self.dependencies), values);
    self
      .definition
      .construct(args)
      .map_err(|source| Error::Construction {
        name: self.name.clone(),
        source,
      })
  }
}

impl fmt::Debug for Recipe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Recipe")
      .field("name", &self.name)
      .field("produces", &self.definition.produces())
      .field("dependencies", &self.dependencies)
      .finish()
  }
}

/// Builds its instance once, on first resolution, and hands out the same
/// instance afterwards.
///
/// The first construction runs under a re-entrant lock: concurrent first
/// resolutions from other threads wait for it instead of building a second
/// instance. A failed construction leaves the slot empty, so the next
/// resolution starts over.
///
/// A thread that would block on a slot whose builder is itself waiting on a
/// slot this thread builds gets [`Error::CircularDependency`] instead of a
/// deadlock. This holds whether or not the container detects cycles.
pub struct Singleton {
  id: usize,
  recipe: Recipe,
  slot: ReentrantMutex<RefCell<Option<Instance>>>,
}

impl Singleton {
  pub fn new(name: &str, definition: Definition, dependencies: &[&str]) -> Self {
    Self {
      id: next_slot_id(),
      recipe: Recipe::new(name, definition, dependencies),
      slot: ReentrantMutex::new(RefCell::new(None)),
    }
  }

  /// A singleton that already holds `instance` and never constructs.
  pub fn with_instance(name: &str, instance: Instance) -> Self {
    Self {
      id: next_slot_id(),
      recipe: Recipe::new(name, Definition::prebuilt(instance.type_name()), &[]),
      slot: ReentrantMutex::new(RefCell::new(Some(instance))),
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.slot.lock().borrow().is_some()
  }

  fn acquire(&self) -> Result<ReentrantMutexGuard<'_, RefCell<Option<Instance>>>> {
    if let Some(slot) = self.slot.try_lock() {
      return Ok(slot);
    }
    let _waiting = WaitGuard::enter(self.id, &self.recipe.name)?;
    Ok(self.slot.lock())
  }
}

impl Lifecycle for Singleton {
  fn get_instance(&self, resolve: Resolver<'_>) -> Result<Instance> {
    let slot = self.acquire()?;
    if let Some(instance) = slot.borrow().as_ref() {
      trace!(service = %self.recipe.name, "singleton cache hit");
      return Ok(instance.clone());
    }

    // No `RefCell` borrow is held while building: a cyclic graph re-enters
    // this method on the same thread and must recurse, not panic.
    let _building = BuildGuard::enter(self.id, &self.recipe.name);
    let instance = self.recipe.build(resolve)?;
    debug!(
      service = %self.recipe.name,
      produces = self.recipe.definition.produces(),
      "constructed singleton"
    );

    let mut cached = slot.borrow_mut();
    Ok(cached.get_or_insert(instance).clone())
  }

  fn kind(&self) -> LifecycleKind {
    LifecycleKind::Singleton
  }
}

impl fmt::Debug for Singleton {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Singleton")
      .field("recipe", &self.recipe)
      .field("initialized", &self.is_initialized())
      .finish()
  }
}

/// Builds a fresh instance on every resolution and keeps nothing.
pub struct Transient {
  recipe: Recipe,
}

impl Transient {
  pub fn new(name: &str, definition: Definition, dependencies: &[&str]) -> Self {
    Self {
      recipe: Recipe::new(name, definition, dependencies),
    }
  }
}

impl Lifecycle for Transient {
  fn get_instance(&self, resolve: Resolver<'_>) -> Result<Instance> {
    let instance = self.recipe.build(resolve)?;
    trace!(service = %self.recipe.name, "constructed transient");
    Ok(instance)
  }

  fn kind(&self) -> LifecycleKind {
    LifecycleKind::Transient
  }
}

impl fmt::Debug for Transient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Transient")
      .field("recipe", &self.recipe)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn no_dependencies(name: &str) -> Result<Instance> {
    Err(Error::NotRegistered(name.to_owned()))
  }

  #[test]
  fn singleton_builds_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let singleton = Singleton::new(
      "counter",
      Definition::infallible(move |_| counter.fetch_add(1, Ordering::SeqCst)),
      &[],
    );

    assert!(!singleton.is_initialized());
    let first = singleton.get_instance(&no_dependencies).unwrap();
    let second = singleton.get_instance(&no_dependencies).unwrap();

    assert!(singleton.is_initialized());
    assert!(Instance::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn cached_singleton_skips_dependency_resolution() {
    let lookups = AtomicUsize::new(0);
    let resolve = |_: &str| -> Result<Instance> {
      lookups.fetch_add(1, Ordering::SeqCst);
      Ok(Instance::new(1_u8))
    };
    let singleton = Singleton::new("s", Definition::infallible(|_| ()), &["dep"]);

    singleton.get_instance(&resolve).unwrap();
    singleton.get_instance(&resolve).unwrap();
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn transient_builds_every_time() {
    let transient = Transient::new("t", Definition::infallible(|_| String::from("fresh")), &[]);
    let first = transient.get_instance(&no_dependencies).unwrap();
    let second = transient.get_instance(&no_dependencies).unwrap();
    assert!(!Instance::ptr_eq(&first, &second));
    assert_eq!(transient.kind(), LifecycleKind::Transient);
  }

  #[test]
  fn dependency_failure_propagates_unchanged() {
    let transient = Transient::new("t", Definition::infallible(|_| ()), &["absent"]);
    match transient.get_instance(&no_dependencies) {
      Err(Error::NotRegistered(name)) => assert_eq!(name, "absent"),
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  fn prebuilt_singleton_never_constructs() {
    let singleton = Singleton::with_instance("cfg", Instance::new(42_i64));
    assert!(singleton.is_initialized());
    let instance = singleton.get_instance(&no_dependencies).unwrap();
    assert_eq!(*instance.downcast::<i64>().unwrap(), 42);
  }
}
