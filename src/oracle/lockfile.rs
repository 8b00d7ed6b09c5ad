//! Bundler lock file reader

use super::{DependencyOracle, GemVersion};
use crate::error::{PackError, Result};
use crate::fs::FileSystem;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const LOCKFILE_NAME: &str = "Gemfile.lock";

/// Sections whose `specs:` block lists resolved gems
const SPEC_SECTIONS: &[&str] = &["GEM", "GIT", "PATH"];

fn spec_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^    ([^\s(]+) \(([^)]+)\)\s*$").expect("lock file spec regex compiles")
    })
}

/// Oracle answering from the `specs:` entries of a `Gemfile.lock`.
///
/// A project without a lock file has no dependencies at all, which keeps
/// every adapter's detection false.
#[derive(Debug, Clone, Default)]
pub struct LockfileOracle {
    present: bool,
    gems: BTreeMap<String, String>,
}

impl LockfileOracle {
    /// Reads `Gemfile.lock` from the project root
    pub fn load(fs: &dyn FileSystem, root: &Path) -> Result<Self> {
        let path = fs.join(root, LOCKFILE_NAME);
        if !fs.is_file(&path) {
            debug!("No {} in {}", LOCKFILE_NAME, root.display());
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&path).map_err(|e| PackError::Lockfile {
            path: path.clone(),
            source: e.into(),
        })?;
        let oracle = Self::parse(&content);
        debug!(gems = oracle.gems.len(), "Parsed {}", path.display());
        Ok(oracle)
    }

    pub fn parse(content: &str) -> Self {
        let mut gems = BTreeMap::new();
        let mut in_spec_section = false;
        let mut in_specs = false;

        for line in content.lines() {
            if !line.starts_with(' ') {
                in_spec_section = SPEC_SECTIONS.contains(&line.trim());
                in_specs = false;
                continue;
            }
            if !in_spec_section {
                continue;
            }
            if line.trim_end() == "  specs:" {
                in_specs = true;
                continue;
            }
            if !in_specs {
                continue;
            }

            if let Some(caps) = spec_line().captures(line) {
                let name = caps[1].to_string();
                let version = caps[2].to_string();
                if let Some(previous) = gems.get(&name) {
                    if previous != &version {
                        warn!(
                            gem = %name,
                            "Gem locked twice ({} and {}), keeping first",
                            previous,
                            version
                        );
                    }
                    continue;
                }
                gems.insert(name, version);
            }
        }

        Self {
            present: true,
            gems,
        }
    }

    pub fn lockfile_present(&self) -> bool {
        self.present
    }

    /// Locked gems and their raw version strings, sorted by name
    pub fn gems(&self) -> impl Iterator<Item = (&str, &str)> {
        self.gems.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl DependencyOracle for LockfileOracle {
    fn has_dependency(&self, name: &str) -> bool {
        self.gems.contains_key(name)
    }

    fn locked_version(&self, name: &str) -> Option<GemVersion> {
        let raw = self.gems.get(name)?;
        let version = GemVersion::parse(raw);
        if version.is_none() {
            warn!(gem = %name, "Unparseable locked version {:?}", raw);
        }
        version
    }
}
