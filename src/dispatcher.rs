//! HTTP dispatcher config generation
//!
//! The dispatcher fronts every web process: it serves `public/` from disk,
//! maps `/storage` onto an object-storage bucket and proxies everything else
//! to the application process, which it spawns from an argv array.
//!
//! A dispatcher config already present in the project always wins and is
//! never read or rewritten.

use crate::error::{PackError, Result};
use crate::fs::FileSystem;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DISPATCHER_CONFIG_FILE: &str = ".http-dispatcher.json";

pub const DEFAULT_ENV_NAME: &str = "production";

const STORAGE_ROOT: &str = "/storage";
const STORAGE_BUCKET: &str = "lalala-assets";
const PUBLIC_DIR: &str = "public";
const CONFIG_MODE: u32 = 0o644;

/// One routing rule; field names and order are a wire contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum DispatchRule {
    #[serde(rename = "fs")]
    Fs {
        #[serde(rename = "match")]
        match_path: String,
        path: String,
    },
    #[serde(rename = "aws-s3")]
    AwsS3 {
        bucket: String,
        #[serde(rename = "match")]
        match_path: String,
        prefix: String,
    },
    #[serde(rename = "proc")]
    Proc { args: Vec<String> },
}

/// Rendered dispatcher config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub rules: Vec<DispatchRule>,
}

impl Artifact {
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.rules).map_err(|e| {
            PackError::InvariantViolation(format!("dispatcher rules not serializable: {}", e))
        })?;
        json.push('\n');
        Ok(json)
    }
}

/// Terminal states of dispatcher config generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// A custom config exists and was left untouched
    SkippedExisting { path: PathBuf },
    /// A default config was rendered (and, from `install`, written)
    Rendered { path: PathBuf, artifact: Artifact },
}

impl EmitOutcome {
    pub fn message(&self) -> String {
        match self {
            EmitOutcome::SkippedExisting { path } => format!(
                "Using custom http-dispatcher config: {}",
                display_name(path)
            ),
            EmitOutcome::Rendered { .. } => "Using default http-dispatcher config".to_string(),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Splits a shell command line into argv, honoring quotes and escapes
pub fn tokenize(command: &str) -> Result<Vec<String>> {
    let args = shell_words::split(command).map_err(|e| PackError::InvalidWebCommand {
        command: command.to_string(),
        reason: e.to_string(),
    })?;
    if args.is_empty() {
        return Err(PackError::InvalidWebCommand {
            command: command.to_string(),
            reason: "command is empty".to_string(),
        });
    }
    Ok(args)
}

/// `/storage/<app>/<env>`
pub fn storage_prefix(app_name: &str, env_name: &str) -> String {
    format!("{}/{}/{}", STORAGE_ROOT, app_name, env_name)
}

pub struct DispatcherConfigEmitter<'a> {
    fs: &'a dyn FileSystem,
    file_name: String,
}

impl<'a> DispatcherConfigEmitter<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            file_name: DISPATCHER_CONFIG_FILE.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn config_path(&self, root: &Path) -> PathBuf {
        self.fs.join(root, &self.file_name)
    }

    /// Renders the config without touching the file system
    pub fn render(
        &self,
        root: &Path,
        web_command: &str,
        app_name: &str,
        env_name: Option<&str>,
        existing_file: bool,
    ) -> Result<EmitOutcome> {
        let path = self.config_path(root);
        if existing_file {
            return Ok(EmitOutcome::SkippedExisting { path });
        }

        if app_name.is_empty() {
            return Err(PackError::MissingRequiredInput("APP_NAME".to_string()));
        }
        if app_name.contains('/') {
            return Err(PackError::InvalidInput {
                name: "APP_NAME".to_string(),
                reason: "must not contain '/'".to_string(),
            });
        }
        let env_name = match env_name {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_ENV_NAME,
        };

        let args = tokenize(web_command)?;
        debug!(?args, "Tokenized web command");

        let rules = vec![
            DispatchRule::Fs {
                match_path: "/".to_string(),
                path: PUBLIC_DIR.to_string(),
            },
            DispatchRule::AwsS3 {
                bucket: STORAGE_BUCKET.to_string(),
                match_path: STORAGE_ROOT.to_string(),
                prefix: storage_prefix(app_name, env_name),
            },
            DispatchRule::Proc { args },
        ];

        Ok(EmitOutcome::Rendered {
            path,
            artifact: Artifact { rules },
        })
    }

    /// Renders the config and writes it into `root` unless one already exists
    pub fn install(
        &self,
        root: &Path,
        web_command: &str,
        app_name: &str,
        env_name: Option<&str>,
    ) -> Result<EmitOutcome> {
        let existing = self.fs.exists(&self.config_path(root));
        let outcome = self.render(root, web_command, app_name, env_name, existing)?;

        if let EmitOutcome::Rendered { path, artifact } = &outcome {
            let json = artifact.to_json()?;
            self.fs
                .write_atomic(path, json.as_bytes(), CONFIG_MODE)
                .map_err(|e| PackError::Io {
                    path: path.clone(),
                    source: e.into(),
                })?;
        }

        info!("{}", outcome.message());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    const PUMA: &str = "bundle exec puma -b tcp://0.0.0.0:$PORT";

    fn rendered_rules(outcome: EmitOutcome) -> Vec<DispatchRule> {
        match outcome {
            EmitOutcome::Rendered { artifact, .. } => artifact.rules,
            other => panic!("expected rendered config, got {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_respects_quotes() {
        let args = tokenize(r#"bundle exec ruby -e "puts 'hi there'" --name=a\ b"#).unwrap();
        assert_eq!(
            args,
            vec!["bundle", "exec", "ruby", "-e", "puts 'hi there'", "--name=a b"]
        );
    }

    #[test]
    fn test_tokenize_keeps_variables_literal() {
        assert_eq!(
            tokenize(PUMA).unwrap(),
            vec!["bundle", "exec", "puma", "-b", "tcp://0.0.0.0:$PORT"]
        );
    }

    #[test]
    fn test_tokenize_rejects_unbalanced_quote() {
        assert!(matches!(
            tokenize("bundle exec 'rails server"),
            Err(PackError::InvalidWebCommand { .. })
        ));
    }

    #[test]
    fn test_tokenize_rejects_empty() {
        assert!(matches!(
            tokenize("   "),
            Err(PackError::InvalidWebCommand { .. })
        ));
    }

    #[test]
    fn test_render_rules() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs);

        let outcome = emitter
            .render(Path::new("/mock"), PUMA, "acme", Some("production"), false)
            .unwrap();

        assert_eq!(
            rendered_rules(outcome),
            vec![
                DispatchRule::Fs {
                    match_path: "/".to_string(),
                    path: "public".to_string(),
                },
                DispatchRule::AwsS3 {
                    bucket: "lalala-assets".to_string(),
                    match_path: "/storage".to_string(),
                    prefix: "/storage/acme/production".to_string(),
                },
                DispatchRule::Proc {
                    args: vec![
                        "bundle".to_string(),
                        "exec".to_string(),
                        "puma".to_string(),
                        "-b".to_string(),
                        "tcp://0.0.0.0:$PORT".to_string(),
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_env_name_defaults_to_production() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs);

        for env_name in [None, Some("")] {
            let rules = rendered_rules(
                emitter
                    .render(Path::new("/mock"), PUMA, "acme", env_name, false)
                    .unwrap(),
            );
            assert!(matches!(
                &rules[1],
                DispatchRule::AwsS3 { prefix, .. } if prefix == "/storage/acme/production"
            ));
        }
    }

    #[test]
    fn test_render_existing_skips_validation() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs);

        let outcome = emitter
            .render(Path::new("/mock"), "", "", None, true)
            .unwrap();
        assert_eq!(
            outcome,
            EmitOutcome::SkippedExisting {
                path: PathBuf::from("/mock/.http-dispatcher.json")
            }
        );
        assert_eq!(
            outcome.message(),
            "Using custom http-dispatcher config: .http-dispatcher.json"
        );
    }

    #[test]
    fn test_json_wire_format() {
        let artifact = Artifact {
            rules: vec![
                DispatchRule::Fs {
                    match_path: "/".to_string(),
                    path: "public".to_string(),
                },
                DispatchRule::AwsS3 {
                    bucket: "lalala-assets".to_string(),
                    match_path: "/storage".to_string(),
                    prefix: "/storage/acme/production".to_string(),
                },
                DispatchRule::Proc {
                    args: vec!["rackup".to_string()],
                },
            ],
        };

        let compact = serde_json::to_string(&artifact.rules).unwrap();
        assert_eq!(
            compact,
            r#"[{"type":"fs","match":"/","path":"public"},{"type":"aws-s3","bucket":"lalala-assets","match":"/storage","prefix":"/storage/acme/production"},{"type":"proc","args":["rackup"]}]"#
        );
        assert!(artifact.to_json().unwrap().ends_with("]\n"));
    }

    #[test]
    fn test_install_writes_once() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs);

        let outcome = emitter
            .install(Path::new("/mock"), PUMA, "acme", None)
            .unwrap();

        assert!(matches!(outcome, EmitOutcome::Rendered { .. }));
        assert_eq!(fs.writes(), vec![PathBuf::from("/mock/.http-dispatcher.json")]);
        assert_eq!(fs.mode_of(".http-dispatcher.json"), Some(0o644));

        let written = fs
            .read_to_string(Path::new("/mock/.http-dispatcher.json"))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[2]["args"][2], "puma");
    }

    #[test]
    fn test_install_keeps_custom_config() {
        let fs = MockFileSystem::new();
        fs.add_file(".http-dispatcher.json", "[{\"custom\":true}]");
        let emitter = DispatcherConfigEmitter::new(&fs);

        let outcome = emitter
            .install(Path::new("/mock"), PUMA, "acme", None)
            .unwrap();

        assert!(matches!(outcome, EmitOutcome::SkippedExisting { .. }));
        assert!(fs.writes().is_empty());
        assert_eq!(
            fs.read_to_string(Path::new("/mock/.http-dispatcher.json"))
                .unwrap(),
            "[{\"custom\":true}]"
        );
    }

    #[test]
    fn test_install_missing_app_name_writes_nothing() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs);

        let result = emitter.install(Path::new("/mock"), PUMA, "", Some("production"));

        assert!(matches!(
            result,
            Err(PackError::MissingRequiredInput(ref name)) if name == "APP_NAME"
        ));
        assert!(fs.writes().is_empty());
        assert!(!fs.exists(Path::new("/mock/.http-dispatcher.json")));
    }

    #[test]
    fn test_slash_in_app_name_rejected() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs);

        let result = emitter.install(Path::new("/mock"), PUMA, "team/app", None);

        assert!(matches!(
            result,
            Err(PackError::InvalidInput { ref name, .. }) if name == "APP_NAME"
        ));
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn test_existing_config_ignores_bad_app_name() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs);

        let outcome = emitter
            .render(Path::new("/mock"), PUMA, "team/app", None, true)
            .unwrap();
        assert!(matches!(outcome, EmitOutcome::SkippedExisting { .. }));
    }

    #[test]
    fn test_install_bad_command_writes_nothing() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs);

        let result = emitter.install(Path::new("/mock"), "thin \"start", "acme", None);

        assert!(matches!(result, Err(PackError::InvalidWebCommand { .. })));
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn test_custom_file_name() {
        let fs = MockFileSystem::new();
        let emitter = DispatcherConfigEmitter::new(&fs).with_file_name("dispatch.json");

        emitter
            .install(Path::new("/mock"), PUMA, "acme", None)
            .unwrap();
        assert_eq!(fs.writes(), vec![PathBuf::from("/mock/dispatch.json")]);
    }
}
