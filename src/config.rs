//! Configuration management for rackpack
//!
//! Settings are loaded from environment variables with defaults. Command line
//! flags override individual fields after loading.
//!
//! # Environment Variables
//!
//! - `APP_NAME`: Application name used in the storage prefix - required for
//!   dispatcher config generation, no default
//! - `RAILS_ENV`, then `RACK_ENV`: Environment name - default: "production"
//! - `RACKPACK_LOG_LEVEL`: Logging level - default: "info"
//! - `RACKPACK_DISPATCHER_FILE`: Dispatcher config file name - default: ".http-dispatcher.json"
//!
//! # Example
//!
//! ```no_run
//! use rackpack::RackpackConfig;
//!
//! let config = RackpackConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use crate::dispatcher::{DEFAULT_ENV_NAME, DISPATCHER_CONFIG_FILE};
use crate::error::PackError;
use crate::util::logging::level_from_name;
use std::env;
use std::path::Path;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackpackConfig {
    /// Application name; empty when unset
    pub app_name: String,

    /// Environment name, `None` when neither RAILS_ENV nor RACK_ENV is set
    pub env_name: Option<String>,

    /// Dispatcher config file name, relative to the project root
    pub dispatcher_file: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl Default for RackpackConfig {
    /// Loads from environment variables, falling back to defaults
    fn default() -> Self {
        let app_name = env::var("APP_NAME").unwrap_or_default();

        let env_name = non_empty_var("RAILS_ENV").or_else(|| non_empty_var("RACK_ENV"));

        let dispatcher_file = non_empty_var("RACKPACK_DISPATCHER_FILE")
            .unwrap_or_else(|| DISPATCHER_CONFIG_FILE.to_string());

        let log_level = env::var("RACKPACK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            app_name,
            env_name,
            dispatcher_file,
            log_level,
        }
    }
}

impl RackpackConfig {
    /// Validates the configuration
    ///
    /// Checks that the dispatcher file is a bare file name and that the log
    /// level is one `parse_level` knows. `APP_NAME` is not checked here: it
    /// only matters once a default dispatcher config is rendered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let file = Path::new(&self.dispatcher_file);
        if self.dispatcher_file.is_empty()
            || file.components().count() != 1
            || file.file_name().is_none()
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Dispatcher file must be a plain file name, got {:?}",
                self.dispatcher_file
            )));
        }

        if level_from_name(&self.log_level).is_none() {
            return Err(ConfigError::ParseError {
                field: "RACKPACK_LOG_LEVEL".to_string(),
                error: format!(
                    "unknown level {:?}, expected trace, debug, info, warn or error",
                    self.log_level
                ),
            });
        }

        Ok(())
    }

    /// Application name, failing when it is required but absent
    pub fn require_app_name(&self) -> Result<&str, PackError> {
        if self.app_name.is_empty() {
            Err(PackError::MissingRequiredInput("APP_NAME".to_string()))
        } else {
            Ok(&self.app_name)
        }
    }

    pub fn env_name_or_default(&self) -> &str {
        self.env_name.as_deref().unwrap_or(DEFAULT_ENV_NAME)
    }
}
