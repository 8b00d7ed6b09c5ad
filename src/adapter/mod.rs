//! Framework adapter definitions
//!
//! An adapter is plain data: how to detect it, which adapter it specializes,
//! the config vars and process types it forces, and how to pick its web
//! command. Specialization is resolved by folding the chain of descriptors
//! (see [`crate::resolver`]), never by overriding methods.

#[macro_use]
pub mod id_enum_macro;

pub mod adapter_id;
pub mod rack;
pub mod rails2;
pub mod rails3;
pub mod registry;
pub mod ruby;

pub use adapter_id::AdapterId;
pub use registry::AdapterRegistry;

use crate::oracle::{DependencyOracle, GemVersion};
use std::collections::BTreeMap;
use tracing::trace;

/// Process type every web-capable adapter points `web` at.
///
/// The orchestrator starts the dispatcher; the dispatcher execs the real
/// web command from its config file.
pub const DISPATCHER_PROCESS: &str = "http-dispatcher";

/// Constraint on the locked version of a gem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// Any locked version
    Any,
    /// `min <= version < max`
    Range { min: GemVersion, max: GemVersion },
}

impl VersionConstraint {
    pub fn range(min: (u64, u64, u64), max: (u64, u64, u64)) -> Self {
        VersionConstraint::Range {
            min: GemVersion::new(min.0, min.1, min.2),
            max: GemVersion::new(max.0, max.1, max.2),
        }
    }

    pub fn contains(&self, version: &GemVersion) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Range { min, max } => min <= version && version < max,
        }
    }
}

/// Detection predicate: a gem locked at a version satisfying the constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRule {
    pub gem: String,
    pub constraint: VersionConstraint,
}

impl DetectionRule {
    pub fn any_version(gem: &str) -> Self {
        Self {
            gem: gem.to_string(),
            constraint: VersionConstraint::Any,
        }
    }

    pub fn version_range(gem: &str, min: (u64, u64, u64), max: (u64, u64, u64)) -> Self {
        Self {
            gem: gem.to_string(),
            constraint: VersionConstraint::range(min, max),
        }
    }

    pub fn matches(&self, oracle: &dyn DependencyOracle) -> bool {
        match oracle.locked_version(&self.gem) {
            Some(version) => self.constraint.contains(&version),
            None => false,
        }
    }
}

/// One entry of a web command plan: use `command` when `gem` is bundled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebProbe {
    pub gem: String,
    pub command: String,
}

/// Priority-ordered web server probes with an explicit fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebCommandPlan {
    pub probes: Vec<WebProbe>,
    pub fallback: String,
}

impl WebCommandPlan {
    pub fn new(fallback: &str) -> Self {
        Self {
            probes: Vec::new(),
            fallback: fallback.to_string(),
        }
    }

    pub fn probe(mut self, gem: &str, command: &str) -> Self {
        self.probes.push(WebProbe {
            gem: gem.to_string(),
            command: command.to_string(),
        });
        self
    }

    /// First probe whose gem is bundled wins, otherwise the fallback
    pub fn resolve(&self, oracle: &dyn DependencyOracle) -> &str {
        for probe in &self.probes {
            if oracle.has_dependency(&probe.gem) {
                trace!(gem = %probe.gem, "Web server gem bundled");
                return &probe.command;
            }
        }
        &self.fallback
    }
}

/// Declarative shape of one framework adapter
#[derive(Debug, Clone)]
pub struct AdapterDescriptor {
    pub id: AdapterId,
    /// Human-facing name, shared between adapters of the same framework
    pub name: String,
    pub parent: Option<AdapterId>,
    /// `None` for adapters that only exist as a base for others
    pub detection: Option<DetectionRule>,
    pub config_vars: BTreeMap<String, String>,
    pub process_types: BTreeMap<String, String>,
    pub addons: Vec<String>,
    pub web: Option<WebCommandPlan>,
}

impl AdapterDescriptor {
    pub fn new(id: AdapterId) -> Self {
        Self {
            name: id.name(),
            id,
            parent: None,
            detection: None,
            config_vars: BTreeMap::new(),
            process_types: BTreeMap::new(),
            addons: Vec::new(),
            web: None,
        }
    }

    pub fn extends(mut self, parent: AdapterId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn detected_by(mut self, rule: DetectionRule) -> Self {
        self.detection = Some(rule);
        self
    }

    pub fn config_var(mut self, key: &str, value: &str) -> Self {
        self.config_vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn process_type(mut self, role: &str, command: &str) -> Self {
        self.process_types
            .insert(role.to_string(), command.to_string());
        self
    }

    pub fn addon(mut self, addon: &str) -> Self {
        self.addons.push(addon.to_string());
        self
    }

    pub fn web_command(mut self, plan: WebCommandPlan) -> Self {
        self.web = Some(plan);
        self
    }

    /// Whether this adapter can be picked by selection at all
    pub fn is_selectable(&self) -> bool {
        self.detection.is_some()
    }

    pub fn detect(&self, oracle: &dyn DependencyOracle) -> bool {
        self.detection
            .as_ref()
            .map(|rule| rule.matches(oracle))
            .unwrap_or(false)
    }

    /// Default `web` command for this adapter alone; ancestors are never consulted
    pub fn resolve_web_command(&self, oracle: &dyn DependencyOracle) -> Option<String> {
        self.web
            .as_ref()
            .map(|plan| plan.resolve(oracle).to_string())
    }
}
