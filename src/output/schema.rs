//! Serializable documents handed to the outer build harness

use crate::adapter::AdapterId;
use crate::dispatcher::EmitOutcome;
use crate::resolver::ResolvedConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of adapter detection, including every matching candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    pub lockfile_present: bool,
    pub adapter: Option<AdapterId>,
    pub name: Option<String>,
    pub candidates: Vec<AdapterId>,
}

impl DetectionReport {
    pub fn is_detected(&self) -> bool {
        self.adapter.is_some()
    }
}

/// Release document: add-ons, default config vars and process types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDocument {
    pub addons: Vec<String>,
    pub config_vars: BTreeMap<String, String>,
    pub default_process_types: BTreeMap<String, String>,
}

impl From<&ResolvedConfig> for ReleaseDocument {
    fn from(resolved: &ResolvedConfig) -> Self {
        Self {
            addons: resolved.addons.clone(),
            config_vars: resolved.config_vars.clone(),
            default_process_types: resolved.process_types.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherStatus {
    Custom,
    Generated,
}

/// What `compile` decided and wrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileSummary {
    pub adapter: AdapterId,
    pub name: String,
    pub web_command: String,
    pub dispatcher: DispatcherStatus,
    pub dispatcher_path: PathBuf,
    pub config_vars: BTreeMap<String, String>,
    pub process_types: BTreeMap<String, String>,
}

impl CompileSummary {
    pub fn new(resolved: &ResolvedConfig, outcome: &EmitOutcome) -> Self {
        let (dispatcher, dispatcher_path) = match outcome {
            EmitOutcome::SkippedExisting { path } => (DispatcherStatus::Custom, path.clone()),
            EmitOutcome::Rendered { path, .. } => (DispatcherStatus::Generated, path.clone()),
        };
        Self {
            adapter: resolved.adapter.clone(),
            name: resolved.name.clone(),
            web_command: resolved.web_command.clone(),
            dispatcher,
            dispatcher_path,
            config_vars: resolved.config_vars.clone(),
            process_types: resolved.process_types.clone(),
        }
    }
}
