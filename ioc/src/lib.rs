//! # Energy IoC
//!
//! A small, thread-safe service provider (Inversion of Control container).
//!
//! Services are registered under a name together with a [`Definition`] (a
//! factory) and an ordered list of the names they depend on. Resolving a name
//! resolves its dependencies first, through the same container, and hands
//! them to the factory positionally.
//!
//! ## Core Concepts
//!
//! - **Container**: owns the registrations and is the single resolution entry point.
//! - **Lifecycles**: a [`Singleton`] builds its instance once, lazily; a
//!   [`Transient`] builds a new one on every resolution.
//! - **Instances**: resolution yields an opaque [`Instance`]; callers downcast it,
//!   or use the typed [`Container::get`] and the [`resolve!`] macro.
//! - **No global state**: build a container in the composition root and pass it
//!   to whatever needs it.
//!
//! ## Quick Start
//!
//! ```
//! use energy_ioc::{resolve, Container, Definition};
//! use std::sync::Arc;
//!
//! struct Repository {
//!   url: String,
//! }
//!
//! struct Service {
//!   repo: Arc<Repository>,
//! }
//!
//! let container = Container::new();
//!
//! // Forward references are fine: nothing resolves until it is requested.
//! container.register_transient(
//!   "service",
//!   Definition::new(|args| Ok(Service { repo: args.get::<Repository>(0)? })),
//!   &["repo"],
//! );
//! container.register_singleton(
//!   "repo",
//!   Definition::infallible(|_| Repository { url: "mysql://localhost/energy".into() }),
//!   &[],
//! );
//!
//! let first = resolve!(container, Service, "service");
//! let second = resolve!(container, Service, "service");
//!
//! // Two transient services sharing one singleton repository.
//! assert!(!Arc::ptr_eq(&first, &second));
//! assert!(Arc::ptr_eq(&first.repo, &second.repo));
//! assert_eq!(first.repo.url, "mysql://localhost/energy");
//! ```

mod container;
mod core;
mod error;
mod lifecycle;
mod macros;

pub use crate::core::{Args, Definition, Instance};
pub use container::{Container, ContainerOptions};
pub use error::{BoxError, Error, Result};
pub use lifecycle::{Lifecycle, LifecycleKind, Resolver, Singleton, Transient};
