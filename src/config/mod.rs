//! Configuration loading.
//!
//! Reads `config.toml` from the platform config directory. Every section and
//! field is optional; missing values fall back to defaults.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{CoreConfig, LoggingConfig, NetworkConfig, ViewModelConfig};
