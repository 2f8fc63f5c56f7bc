//! The main `Container` struct and its associated methods.

use crate::core::{Definition, Instance, ResolutionGuard};
use crate::error::{Error, Result};
use crate::lifecycle::{Lifecycle, LifecycleKind, Singleton, Transient};
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(0);

/// Behaviour switches for a [`Container`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ContainerOptions {
  /// Report circular dependencies as [`Error::CircularDependency`].
  ///
  /// Off by default: a cyclic graph then recurses until the stack overflows.
  pub detect_cycles: bool,
}

/// The service provider.
///
/// Holds one lifecycle strategy per service name. Registration and resolution
/// both take `&self`, so a container can be shared across threads behind an
/// `Arc` once the composition root has filled it.
pub struct Container {
  id: usize,
  options: ContainerOptions,
  registrations: DashMap<String, Arc<dyn Lifecycle>>,
}

impl Default for Container {
  fn default() -> Self {
    Self::with_options(ContainerOptions::default())
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a new, empty `Container` with the given behaviour switches.
  pub fn with_options(options: ContainerOptions) -> Self {
    Self {
      id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
      options,
      registrations: DashMap::new(),
    }
  }

  /// Returns the options this container was created with.
  pub fn options(&self) -> ContainerOptions {
    self.options
  }

  // --- Registration ---

  /// Stores `lifecycle` under `name`, replacing any earlier registration.
  pub fn register(&self, name: &str, lifecycle: impl Lifecycle + 'static) {
    let kind = lifecycle.kind();
    let previous = self
      .registrations
      .insert(name.to_owned(), Arc::new(lifecycle));

    match previous {
      Some(old) => debug!(
        service = name,
        lifecycle = %kind,
        replaced = %old.kind(),
        "replaced existing registration"
      ),
      None => debug!(service = name, lifecycle = %kind, "registered service"),
    }
  }

  /// Registers a service built once, on first resolution.
  ///
  /// `dependencies` are resolved in order and passed to `definition`
  /// positionally. They may name services that are registered later.
  pub fn register_singleton(&self, name: &str, definition: Definition, dependencies: &[&str]) {
    self.register(name, Singleton::new(name, definition, dependencies));
  }

  /// Registers a service built anew on every resolution.
  pub fn register_transient(&self, name: &str, definition: Definition, dependencies: &[&str]) {
    self.register(name, Transient::new(name, definition, dependencies));
  }

  /// Registers an already built value as a singleton.
  pub fn register_instance<T: Any + Send + Sync>(&self, name: &str, value: T) {
    self.register(name, Singleton::with_instance(name, Instance::new(value)));
  }

  /// Registers an already shared value, e.g. an `Arc<dyn Trait>`, as a singleton.
  pub fn register_shared<I: ?Sized + Any + Send + Sync>(&self, name: &str, value: Arc<I>) {
    self.register(name, Singleton::with_instance(name, Instance::from_arc(value)));
  }

  // --- Resolution ---

  /// Resolves the service registered under `name`.
  ///
  /// Dependencies of the service are resolved through this same container.
  pub fn get_instance(&self, name: &str) -> Result<Instance> {
    let _guard = if self.options.detect_cycles {
      match ResolutionGuard::enter(self.id, name) {
        Ok(guard) => Some(guard),
        Err(error) => {
          warn!(service = name, %error, "refusing to resolve circular dependency");
          return Err(error);
        }
      }
    } else {
      None
    };

    // Clone the strategy out so no map shard stays locked while it builds.
    let lifecycle = self
      .registrations
      .get(name)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or_else(|| Error::NotRegistered(name.to_owned()))?;

    trace!(service = name, lifecycle = %lifecycle.kind(), "resolving service");
    lifecycle.get_instance(&|dependency: &str| self.get_instance(dependency))
  }

  /// Resolves `name` and downcasts it to `T`, which may be a trait object.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    let instance = self.get_instance(name)?;
    instance.downcast::<T>().ok_or_else(|| Error::TypeMismatch {
      name: name.to_owned(),
      expected: type_name::<T>(),
      actual: instance.type_name(),
    })
  }

  // --- Introspection ---

  /// Returns `true` if a service is registered under `name`.
  pub fn contains(&self, name: &str) -> bool {
    self.registrations.contains_key(name)
  }

  /// Returns the lifecycle `name` was registered with, if any.
  pub fn lifecycle_of(&self, name: &str) -> Option<LifecycleKind> {
    self.registrations.get(name).map(|entry| entry.value().kind())
  }

  /// The registered names, sorted.
  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self
      .registrations
      .iter()
      .map(|entry| entry.key().clone())
      .collect();
    names.sort();
    names
  }

  /// Returns the number of registered services.
  pub fn len(&self) -> usize {
    self.registrations.len()
  }

  /// Returns `true` if nothing is registered.
  pub fn is_empty(&self) -> bool {
    self.registrations.is_empty()
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("options", &self.options)
      .field("services", &self.names())
      .finish()
  }
}
