use thiserror::Error;

/// Error type produced by a service [`Definition`](crate::Definition).
///
/// Factories may fail for any reason; the container keeps the original error
/// as the source of [`Error::Construction`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for every fallible container operation.
#[derive(Debug, Error)]
pub enum Error {
  /// Resolution was requested for a name that has no registration.
  #[error("no service registered under the name '{0}'")]
  NotRegistered(String),

  /// The service's definition returned an error while building the instance.
  #[error("failed to construct service '{name}': {source}")]
  Construction {
    name: String,
    #[source]
    source: BoxError,
  },

  /// A resolved instance was downcast to a type it does not hold.
  #[error("service '{name}' holds a `{actual}`, not a `{expected}`")]
  TypeMismatch {
    name: String,
    expected: &'static str,
    actual: &'static str,
  },

  /// A definition asked for a positional dependency that was never declared.
  #[error("dependency argument {index} requested, but only {len} were resolved")]
  MissingArgument { index: usize, len: usize },

  /// Only reported by containers created with `detect_cycles` enabled.
  #[error("circular dependency detected: {}", .chain.join(" -> "))]
  CircularDependency { chain: Vec<String> },
}

impl Error {
  /// The service name this error is about, when it names one.
  pub fn service_name(&self) -> Option<&str> {
    match self {
      Error::NotRegistered(name)
      | Error::Construction { name, .. }
      | Error::TypeMismatch { name, .. } => Some(name.as_str()),
      Error::CircularDependency { chain } => chain.last().map(String::as_str),
      Error::MissingArgument { .. } => None,
    }
  }
}

/// A specialized `Result` type for `energy_ioc` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
