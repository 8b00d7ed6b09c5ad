//! Layered configuration resolution
//!
//! The selected adapter's chain is folded root to leaf: for config vars and
//! process types a more specific adapter's entry replaces its ancestor's entry
//! with the same key. Values are never merged. The web command comes from the
//! selected adapter alone, because its shape differs per framework.

use crate::adapter::{AdapterDescriptor, AdapterId, AdapterRegistry};
use crate::error::{PackError, Result};
use crate::oracle::DependencyOracle;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Configuration derived for one build; never cached between builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub adapter: AdapterId,
    pub name: String,
    /// Adapter ids root first
    pub chain: Vec<AdapterId>,
    pub config_vars: BTreeMap<String, String>,
    pub process_types: BTreeMap<String, String>,
    pub web_command: String,
    pub addons: Vec<String>,
}

impl ResolvedConfig {
    /// Config vars the harness should export because `current` lacks them.
    ///
    /// Values already present in the environment always win, even when empty.
    pub fn env_defaults(&self, current: &HashMap<String, String>) -> BTreeMap<String, String> {
        self.config_vars
            .iter()
            .filter(|(key, _)| !current.contains_key(*key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

pub struct ConfigResolver<'a> {
    registry: &'a AdapterRegistry,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(registry: &'a AdapterRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(
        &self,
        adapter: &AdapterDescriptor,
        oracle: &dyn DependencyOracle,
    ) -> Result<ResolvedConfig> {
        let chain = self.registry.ancestry(&adapter.id)?;

        let mut config_vars = BTreeMap::new();
        let mut process_types = BTreeMap::new();
        let mut addons: Vec<String> = Vec::new();

        for layer in &chain {
            debug!(
                layer = %layer.id,
                config_vars = layer.config_vars.len(),
                process_types = layer.process_types.len(),
                "Applying adapter layer"
            );
            config_vars.extend(layer.config_vars.clone());
            process_types.extend(layer.process_types.clone());
            for addon in &layer.addons {
                if !addons.contains(addon) {
                    addons.push(addon.clone());
                }
            }
        }

        if !process_types.contains_key("web") {
            return Err(PackError::InvariantViolation(format!(
                "adapter '{}' resolved without a 'web' process type",
                adapter.id
            )));
        }

        let web_command = adapter.resolve_web_command(oracle).ok_or_else(|| {
            PackError::InvariantViolation(format!(
                "adapter '{}' declares no web command",
                adapter.id
            ))
        })?;

        info!(adapter = %adapter.id, web = %web_command, "Resolved adapter configuration");

        Ok(ResolvedConfig {
            adapter: adapter.id.clone(),
            name: adapter.name.clone(),
            chain: chain.iter().map(|a| a.id.clone()).collect(),
            config_vars,
            process_types,
            web_command,
            addons,
        })
    }

    /// Selects the adapter for `oracle` and resolves it
    pub fn select_and_resolve(&self, oracle: &dyn DependencyOracle) -> Result<ResolvedConfig> {
        let adapter = self.registry.select(oracle)?;
        self.resolve(adapter, oracle)
    }
}
