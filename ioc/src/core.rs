//! Core data structures shared by the container and its lifecycle strategies.

use crate::error::{BoxError, Error, Result};
use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

thread_local! {
  // The names currently being resolved on this thread, tagged with the id of the
  // container resolving them. Only containers with `detect_cycles` push onto it.
  static RESOLVING_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard used to detect circular dependencies.
///
/// Entering pushes the service name onto the thread-local resolution stack and
/// fails if the same container is already resolving that name further up the
/// stack. Dropping the guard pops the entry again, on success and error alike.
pub(crate) struct ResolutionGuard {
  _private: (),
}

impl ResolutionGuard {
  pub(crate) fn enter(container_id: usize, name: &str) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      let start = stack
        .iter()
        .position(|(id, entry)| *id == container_id && entry == name);

      if let Some(start) = start {
        let mut chain: Vec<String> = stack[start..]
          .iter()
          .filter(|(id, _)| *id == container_id)
          .map(|(_, entry)| entry.clone())
          .collect();
        chain.push(name.to_owned());
        return Err(Error::CircularDependency { chain });
      }

      stack.push((container_id, name.to_owned()));
      Ok(Self { _private: () })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    // Guards are strictly nested, so ours is always the top entry.
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().pop();
    });
  }
}

// --- Cross-thread Build Tracking ---

static NEXT_SLOT_ID: AtomicUsize = AtomicUsize::new(0);

// Which thread is constructing which singleton slot, and which slot each
// blocked thread is waiting for. Together they form a wait-for graph.
struct WaitGraph {
  builders: BTreeMap<usize, (ThreadId, String)>,
  waiting: Vec<(ThreadId, usize, String)>,
}

static IN_FLIGHT: Mutex<WaitGraph> = parking_lot::const_mutex(WaitGraph {
  builders: BTreeMap::new(),
  waiting: Vec::new(),
});

/// Allocates a process-unique id for a singleton slot.
pub(crate) fn next_slot_id() -> usize {
  NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Marks the current thread as the builder of a singleton slot.
///
/// Must be entered while holding the slot lock and before any dependency is
/// resolved. A nested build of the same slot on the same thread leaves the
/// outer record in place.
pub(crate) struct BuildGuard {
  slot: Option<usize>,
}

impl BuildGuard {
  pub(crate) fn enter(slot: usize, name: &str) -> Self {
    let mut graph = IN_FLIGHT.lock();
    if graph.builders.contains_key(&slot) {
      return Self { slot: None };
    }
    graph
      .builders
      .insert(slot, (thread::current().id(), name.to_owned()));
    Self { slot: Some(slot) }
  }
}

impl Drop for BuildGuard {
  fn drop(&mut self) {
    if let Some(slot) = self.slot {
      IN_FLIGHT.lock().builders.remove(&slot);
    }
  }
}

/// Records that the current thread is about to block on a singleton slot.
///
/// Fails with [`Error::CircularDependency`] instead when the slot's builder is,
/// directly or through other threads, waiting on a slot this thread builds.
/// Registration and the check happen under one lock, so of the threads closing
/// such a loop the last one to arrive always sees it.
pub(crate) struct WaitGuard {
  thread: ThreadId,
}

impl WaitGuard {
  pub(crate) fn enter(slot: usize, name: &str) -> Result<Self> {
    let me = thread::current().id();
    let mut graph = IN_FLIGHT.lock();

    let mut chain = vec![name.to_owned()];
    let mut wanted = slot;
    // Each hop follows a distinct waiting thread, so this bounds the walk.
    for _ in 0..=graph.waiting.len() {
      let owner = match graph.builders.get(&wanted) {
        Some((owner, _)) => *owner,
        None => break,
      };
      if owner == me {
        let closing = chain[chain.len() - 1].clone();
        chain.insert(0, closing);
        return Err(Error::CircularDependency { chain });
      }
      match graph.waiting.iter().find(|(waiter, _, _)| *waiter == owner) {
        Some((_, next, next_name)) => {
          chain.push(next_name.clone());
          wanted = *next;
        }
        None => break,
      }
    }

    graph.waiting.push((me, slot, name.to_owned()));
    Ok(Self { thread: me })
  }
}

impl Drop for WaitGuard {
  fn drop(&mut self) {
    IN_FLIGHT
      .lock()
      .waiting
      .retain(|(waiter, _, _)| *waiter != self.thread);
  }
}

/// An opaque, cheaply clonable handle to a resolved service.
///
/// The container never looks inside an instance. Call sites recover the
/// concrete service with [`Instance::downcast`], which also works for trait
/// objects registered through [`Definition::shared`].
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Instance {
  /// Wraps an owned value.
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  /// Wraps an already shared value. `T` may be unsized, e.g. `dyn Trait`.
  pub fn from_arc<T: ?Sized + Any + Send + Sync>(shared: Arc<T>) -> Self {
    Self {
      value: Arc::new(shared),
      type_name: type_name::<T>(),
    }
  }

  /// Returns the wrapped service if it was stored as a `T`.
  pub fn downcast<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.value.downcast_ref::<Arc<T>>().cloned()
  }

  pub fn is<T: ?Sized + Any + Send + Sync>(&self) -> bool {
    self.value.is::<Arc<T>>()
  }

  /// The name of the type this instance was created from.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// Returns `true` if both handles point at the same service instance.
  pub fn ptr_eq(this: &Self, other: &Self) -> bool {
    Arc::ptr_eq(&this.value, &other.value)
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Instance")
      .field("type_name", &self.type_name)
      .finish()
  }
}

/// The resolved dependencies handed to a [`Definition`], in declaration order.
pub struct Args {
  names: Arc<[String]>,
  values: Vec<Instance>,
}

impl Args {
  pub(crate) fn new(names: Arc<[String]>, values: Vec<Instance>) -> Self {
    debug_assert_eq!(names.len(), values.len());
    Self { names, values }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// The dependency name declared at position `index`.
  pub fn name(&self, index: usize) -> Option<&str> {
    self.names.get(index).map(String::as_str)
  }

  pub fn instance(&self, index: usize) -> Option<&Instance> {
    self.values.get(index)
  }

  /// Returns the dependency at position `index` as a `T`.
  ///
  /// Fails with [`Error::MissingArgument`] when fewer dependencies were
  /// declared, and with [`Error::TypeMismatch`] naming the dependency when it
  /// holds another type.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
    let instance = self.values.get(index).ok_or(Error::MissingArgument {
      index,
      len: self.values.len(),
    })?;

    instance.downcast::<T>().ok_or_else(|| Error::TypeMismatch {
      name: self.names[index].clone(),
      expected: type_name::<T>(),
      actual: instance.type_name(),
    })
  }

  /// The resolved dependencies, in declaration order.
  pub fn iter(&self) -> impl Iterator<Item = &Instance> {
    self.values.iter()
  }
}

impl fmt::Debug for Args {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map()
      .entries(self.names.iter().zip(self.values.iter()))
      .finish()
  }
}

type Factory = dyn Fn(Args) -> std::result::Result<Instance, BoxError> + Send + Sync;

/// A factory that builds one service instance from its resolved dependencies.
pub struct Definition {
  factory: Box<Factory>,
  produces: &'static str,
}

impl Definition {
  /// A fallible factory producing a concrete `T`.
  pub fn new<T, F>(factory: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Args) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    Self {
      factory: Box::new(move |args: Args| factory(args).map(Instance::new)),
      produces: type_name::<T>(),
    }
  }

  /// A factory that cannot fail.
  pub fn infallible<T, F>(factory: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Args) -> T + Send + Sync + 'static,
  {
    Self::new(move |args| Ok(factory(args)))
  }

  /// A fallible factory producing an already shared `I`, typically a trait
  /// object such as `Arc<dyn Repository>`.
  pub fn shared<I, F>(factory: F) -> Self
  where
    I: ?Sized + Any + Send + Sync,
    F: Fn(Args) -> std::result::Result<Arc<I>, BoxError> + Send + Sync + 'static,
  {
    Self {
      factory: Box::new(move |args: Args| factory(args).map(Instance::from_arc)),
      produces: type_name::<I>(),
    }
  }

  // Backs pre-built instances, whose cache slot is filled from the start.
  pub(crate) fn prebuilt(produces: &'static str) -> Self {
    Self {
      factory: Box::new(|_: Args| -> std::result::Result<Instance, BoxError> {
        Err("a pre-built instance is never constructed".into())
      }),
      produces,
    }
  }

  /// The name of the type this definition produces.
  pub fn produces(&self) -> &'static str {
    self.produces
  }

  pub(crate) fn construct(&self, args: Args) -> std::result::Result<Instance, BoxError> {
    (self.factory)(args)
  }
}

impl fmt::Debug for Definition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Definition")
      .field("produces", &self.produces)
      .finish_non_exhaustive()
  }
}
