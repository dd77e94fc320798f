//! Crate configuration.

mod loader;
mod types;

pub use loader::{load_config, load_config_from_str, validate_config};
pub use types::{Config, ServicesConfig};

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration parsed but holds an invalid value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
