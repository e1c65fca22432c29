//! Composition core for unidirectional-data-flow applications.
//!
//! - [`locator`]: type-keyed service locator for dependency injection
//! - [`udf`]: event → action → state → view-state pipeline
//! - [`net`]: HTTP collaborator consumed by interactors
//! - [`config`], [`logging`]: ambient configuration and tracing setup

pub mod config;
pub mod locator;
pub mod logging;
pub mod net;
pub mod udf;
