//! Output formatting for multiple formats
//!
//! Reports are rendered as JSON, YAML, or human-readable text. The release
//! document is always YAML because that is what the build harness reads.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::output::{CompileSummary, DetectionReport, DispatcherStatus, ReleaseDocument};
use crate::resolver::ResolvedConfig;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_detection(&self, report: &DetectionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Yaml => to_yaml(report),
            OutputFormat::Human => Ok(detection_human(report)),
        }
    }

    pub fn format_resolved(&self, resolved: &ResolvedConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(resolved),
            OutputFormat::Yaml => to_yaml(resolved),
            OutputFormat::Human => Ok(resolved_human(resolved)),
        }
    }

    pub fn format_compile(&self, summary: &CompileSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(summary),
            OutputFormat::Yaml => to_yaml(summary),
            OutputFormat::Human => Ok(compile_human(summary)),
        }
    }

    pub fn format_release(release: &ReleaseDocument) -> Result<String> {
        to_yaml(release)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).context("Failed to serialize output to YAML")
}

fn push_map(output: &mut String, title: &str, map: &BTreeMap<String, String>) {
    output.push_str(&format!("{}:\n", title));
    if map.is_empty() {
        output.push_str("\u{2514}\u{2500} (none)\n");
        return;
    }
    let width = map.keys().map(|k| k.len()).max().unwrap_or(0);
    let last = map.len() - 1;
    for (i, (key, value)) in map.iter().enumerate() {
        let branch = if i == last { "\u{2514}" } else { "\u{251C}" };
        output.push_str(&format!(
            "{}\u{2500} {:width$}  {}\n",
            branch,
            key,
            value,
            width = width
        ));
    }
}

fn detection_human(report: &DetectionReport) -> String {
    let mut output = String::new();

    match (&report.adapter, &report.name) {
        (Some(adapter), Some(name)) => {
            output.push_str("\u{2713} Adapter Detected\n");
            output.push_str(RULE);
            output.push_str("\n\n");
            output.push_str(&format!("Adapter:     {} ({})\n", adapter, name));
        }
        _ => {
            output.push_str("\u{26A0} No Adapter Detected\n");
            output.push_str(RULE);
            output.push_str("\n\n");
        }
    }

    output.push_str(&format!(
        "Lockfile:    {}\n",
        if report.lockfile_present {
            "Gemfile.lock"
        } else {
            "(missing)"
        }
    ));

    if report.candidates.len() > 1 {
        let names: Vec<&str> = report.candidates.iter().map(|c| c.as_str()).collect();
        output.push_str(&format!("Candidates:  {}\n", names.join(", ")));
    }

    output
}

fn resolved_human(resolved: &ResolvedConfig) -> String {
    let mut output = String::new();

    output.push_str(&format!("\u{2713} {} ({})\n", resolved.name, resolved.adapter));
    output.push_str(RULE);
    output.push_str("\n\n");

    let chain: Vec<&str> = resolved.chain.iter().map(|c| c.as_str()).collect();
    output.push_str(&format!("Chain:        {}\n", chain.join(" \u{2192} ")));
    output.push_str(&format!("Web Command:  {}\n", resolved.web_command));
    if !resolved.addons.is_empty() {
        output.push_str(&format!("Add-ons:      {}\n", resolved.addons.join(", ")));
    }
    output.push('\n');

    push_map(&mut output, "Config Vars", &resolved.config_vars);
    output.push('\n');
    push_map(&mut output, "Process Types", &resolved.process_types);

    output
}

fn compile_human(summary: &CompileSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("\u{2713} Compiled {} app\n", summary.name));
    output.push_str(RULE);
    output.push_str("\n\n");

    output.push_str(&format!("Adapter:      {}\n", summary.adapter));
    output.push_str(&format!("Web Command:  {}\n", summary.web_command));
    let status = match summary.dispatcher {
        DispatcherStatus::Custom => "kept existing",
        DispatcherStatus::Generated => "generated",
    };
    output.push_str(&format!(
        "Dispatcher:   {} ({})\n\n",
        summary.dispatcher_path.display(),
        status
    ));

    push_map(&mut output, "Config Vars", &summary.config_vars);
    output.push('\n');
    push_map(&mut output, "Process Types", &summary.process_types);

    output
}
