//! One build invocation against one project tree
//!
//! Reads the lock file, selects and resolves an adapter, and installs the
//! dispatcher config. Every call recomputes from the tree; nothing is cached
//! between invocations because dependencies may change between builds.

use crate::adapter::AdapterRegistry;
use crate::config::RackpackConfig;
use crate::dispatcher::{DispatcherConfigEmitter, EmitOutcome};
use crate::error::{PackError, Result};
use crate::fs::FileSystem;
use crate::oracle::{LockfileOracle, StaticOracle};
use crate::output::{CompileSummary, DetectionReport};
use crate::resolver::{ConfigResolver, ResolvedConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct BuildPipeline<'a> {
    fs: &'a dyn FileSystem,
    registry: &'a AdapterRegistry,
    root: PathBuf,
    overrides: StaticOracle,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(fs: &'a dyn FileSystem, registry: &'a AdapterRegistry, root: &Path) -> Self {
        Self {
            fs,
            registry,
            root: root.to_path_buf(),
            overrides: StaticOracle::new(),
        }
    }

    /// Gem versions layered over the lock file
    pub fn with_overrides(mut self, overrides: StaticOracle) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_oracle(&self) -> Result<(bool, StaticOracle)> {
        let lockfile = LockfileOracle::load(self.fs, &self.root)?;
        let present = lockfile.lockfile_present();
        let mut oracle = StaticOracle::from(&lockfile);
        if !self.overrides.is_empty() {
            debug!("Applying gem overrides");
            oracle = oracle.overlay(self.overrides.clone());
        }
        Ok((present, oracle))
    }

    pub fn detect(&self) -> Result<DetectionReport> {
        let (lockfile_present, oracle) = self.load_oracle()?;
        let candidates = self.registry.candidates(&oracle)?;

        let report = match self.registry.select(&oracle) {
            Ok(adapter) => DetectionReport {
                lockfile_present,
                adapter: Some(adapter.id.clone()),
                name: Some(adapter.name.clone()),
                candidates: candidates.iter().map(|a| a.id.clone()).collect(),
            },
            Err(PackError::NoAdapterFound) => DetectionReport {
                lockfile_present,
                adapter: None,
                name: None,
                candidates: Vec::new(),
            },
            Err(e) => return Err(e),
        };
        Ok(report)
    }

    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let (_, oracle) = self.load_oracle()?;
        ConfigResolver::new(self.registry).select_and_resolve(&oracle)
    }

    /// Installs the dispatcher config for an already resolved adapter
    pub fn install_dispatcher(
        &self,
        resolved: &ResolvedConfig,
        config: &RackpackConfig,
    ) -> Result<EmitOutcome> {
        DispatcherConfigEmitter::new(self.fs)
            .with_file_name(config.dispatcher_file.clone())
            .install(
                &self.root,
                &resolved.web_command,
                &config.app_name,
                config.env_name.as_deref(),
            )
    }

    /// Resolve, then install the dispatcher config
    pub fn compile(&self, config: &RackpackConfig) -> Result<CompileSummary> {
        info!("Compiling {}", self.root.display());

        let resolved = self.resolve().map_err(|e| {
            if e.is_recoverable() {
                warn!("{}; a generic build should be used instead", e);
            }
            e
        })?;

        let outcome = self.install_dispatcher(&resolved, config)?;
        Ok(CompileSummary::new(&resolved, &outcome))
    }
}
