//! Error taxonomy for adapter selection, resolution and dispatcher emission

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while selecting an adapter or producing its configuration
#[derive(Debug, Error)]
pub enum PackError {
    /// No registered adapter matched the project's dependencies.
    ///
    /// Recoverable: callers fall back to a generic build.
    #[error("No framework adapter matched the project dependencies")]
    NoAdapterFound,

    /// The adapter catalog is wired incorrectly (missing parent, cycle, no `web` entry)
    #[error("Adapter catalog invariant violated: {0}")]
    InvariantViolation(String),

    /// A required external input was absent
    #[error("{0} environment variable must be set")]
    MissingRequiredInput(String),

    /// An external input was present but unusable
    #[error("{name} is invalid: {reason}")]
    InvalidInput { name: String, reason: String },

    /// The web command could not be split into an argument vector
    #[error("Cannot tokenize web command {command:?}: {reason}")]
    InvalidWebCommand { command: String, reason: String },

    /// The lock file exists but could not be read
    #[error("Failed to read lock file {path:?}: {source}")]
    Lockfile {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    /// Writing the dispatcher config failed
    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },
}

impl PackError {
    /// Whether the build may continue with a generic fallback
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PackError::NoAdapterFound)
    }
}

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, PackError>;
