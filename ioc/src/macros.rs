//! Public macros for ergonomic service resolution.

/// Resolves a required service from a container.
///
/// Use it where a missing or mistyped service is a wiring bug rather than a
/// recoverable condition. For the fallible form, call [`Container::get`]
/// directly or use [`maybe_resolve!`].
///
/// [`Container::get`]: crate::Container::get
///
/// # Panics
///
/// Panics with the resolution error if the service cannot be resolved.
///
/// # Examples
///
/// ```
/// use energy_ioc::{resolve, Container, Definition};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// let container = Container::new();
/// container.register_instance("motd", String::from("hello"));
/// container.register_singleton(
///   "greeter",
///   Definition::shared(|_| Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)),
///   &[],
/// );
///
/// let message = resolve!(container, String, "motd");
/// assert_eq!(*message, "hello");
///
/// let greeter = resolve!(container, trait Greeter, "greeter");
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
  // resolve!(container, trait MyTrait, "name")
  ($container:expr, trait $trait_ident:ident, $name:expr) => {
    match $container.get::<dyn $trait_ident>($name) {
      ::std::result::Result::Ok(service) => service,
      ::std::result::Result::Err(error) => panic!(
        "Failed to resolve required trait service '{}' ({}): {}",
        $name,
        ::std::any::type_name::<dyn $trait_ident>(),
        error
      ),
    }
  };

  // resolve!(container, MyService, "name")
  ($container:expr, $type:ty, $name:expr) => {
    match $container.get::<$type>($name) {
      ::std::result::Result::Ok(service) => service,
      ::std::result::Result::Err(error) => panic!(
        "Failed to resolve required service '{}' ({}): {}",
        $name,
        ::std::any::type_name::<$type>(),
        error
      ),
    }
  };
}

/// Resolves a service from a container, returning `None` on any failure.
///
/// ```
/// use energy_ioc::{maybe_resolve, Container};
///
/// let container = Container::new();
/// container.register_instance("answer", 42_u32);
///
/// assert_eq!(maybe_resolve!(container, u32, "answer").as_deref(), Some(&42));
/// assert!(maybe_resolve!(container, u32, "question").is_none());
/// assert!(maybe_resolve!(container, String, "answer").is_none());
/// ```
#[macro_export]
macro_rules! maybe_resolve {
  ($container:expr, trait $trait_ident:ident, $name:expr) => {
    $container.get::<dyn $trait_ident>($name).ok()
  };

  ($container:expr, $type:ty, $name:expr) => {
    $container.get::<$type>($name).ok()
  };
}
