//! rackpack - framework adapter selection for Ruby application builds
//!
//! Given a project's `Gemfile.lock`, rackpack picks the most specific framework
//! adapter (plain Rack, Rails 2, Rails 3), folds its specialization chain into
//! default config vars and process types, and writes the http-dispatcher
//! config that fronts the web process.
//!
//! # Example Usage
//!
//! ```no_run
//! use rackpack::{AdapterRegistry, BuildPipeline, RackpackConfig, RealFileSystem};
//! use std::path::Path;
//!
//! let fs = RealFileSystem;
//! let registry = AdapterRegistry::with_defaults();
//! let pipeline = BuildPipeline::new(&fs, &registry, Path::new("/app"));
//!
//! let summary = pipeline.compile(&RackpackConfig::default())?;
//! println!("web: {}", summary.web_command);
//! # Ok::<(), rackpack::PackError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`adapter`]: adapter descriptors and the registry that selects among them
//! - [`oracle`]: dependency lookups backed by `Gemfile.lock`
//! - [`resolver`]: folding an adapter chain into a [`ResolvedConfig`]
//! - [`dispatcher`]: http-dispatcher config rendering and installation
//! - [`pipeline`]: one build invocation tying the above together

pub mod adapter;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fs;
pub mod oracle;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod util;

pub use adapter::{
    AdapterDescriptor, AdapterId, AdapterRegistry, DetectionRule, VersionConstraint,
    WebCommandPlan, DISPATCHER_PROCESS,
};
pub use config::{ConfigError, RackpackConfig};
pub use dispatcher::{DispatcherConfigEmitter, EmitOutcome};
pub use error::{PackError, Result};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use oracle::{DependencyOracle, GemVersion, LockfileOracle, StaticOracle};
pub use output::{CompileSummary, DetectionReport, DispatcherStatus, ReleaseDocument};
pub use pipeline::BuildPipeline;
pub use resolver::{ConfigResolver, ResolvedConfig};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_rackpack() {
        assert_eq!(NAME, "rackpack");
    }
}
