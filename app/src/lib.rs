//! # Energy App
//!
//! Read-only queries over a country energy dataset, assembled through the
//! `energy_ioc` service provider.
//!
//! [`bootstrap::build_container`] is the composition root. It registers the
//! configuration, the dataset, the repository and the query controller;
//! callers then resolve what they need from the container they were handed.

pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod repository;

pub use error::{Error, Result};
