//! Configuration management for smartsave
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use smartsave::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Naming pattern: {}", config.naming.pattern);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `SMARTSAVE__<section>__<key>`
//!
//! Examples:
//! - `SMARTSAVE__SERVER__BIND_ADDR=127.0.0.1:9000`
//! - `SMARTSAVE__NAMING__AI_ENABLED=true`
//! - `SMARTSAVE__NAMING__AI_TIMEOUT_SECONDS=5`
//!
//! Provider credentials are read from `SMARTSAVE_PROVIDER_<ID>_API_KEY` and
//! `SMARTSAVE_PROVIDER_<ID>_SECRET_KEY`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/smartsave.toml`.
//! This can be overridden using the `SMARTSAVE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{Config, HistoryConfig, HttpConfig, NamingConfig, ServerConfig};
pub use sources::apply_secret_overrides;
pub use validation::{AI_TIMEOUT_RANGE, ValidationError, validate_naming};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
