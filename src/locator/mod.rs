//! Type-keyed service locator.
//!
//! Provides a thread-safe registry of factories and singleton instances
//! addressed by type identity, decoupling consumers from concrete construction.

mod error;
mod registry;

pub use error::LocatorError;
pub use registry::{Lifetime, ServiceInfo, ServiceLocator};
