//! Dependency oracles
//!
//! Adapters never read lock files themselves. They ask a [`DependencyOracle`]
//! whether a gem is bundled and which version is locked.

pub mod lockfile;
pub mod version;

pub use lockfile::{LockfileOracle, LOCKFILE_NAME};
pub use version::GemVersion;

use std::collections::BTreeMap;

/// Answers dependency questions about one project
pub trait DependencyOracle {
    /// Whether the gem appears in the resolved dependency set
    fn has_dependency(&self, name: &str) -> bool {
        self.locked_version(name).is_some()
    }

    /// The locked version of the gem, if present and parseable
    fn locked_version(&self, name: &str) -> Option<GemVersion>;
}

impl<T: DependencyOracle + ?Sized> DependencyOracle for &T {
    fn has_dependency(&self, name: &str) -> bool {
        (**self).has_dependency(name)
    }

    fn locked_version(&self, name: &str) -> Option<GemVersion> {
        (**self).locked_version(name)
    }
}

/// In-memory oracle with a fixed gem set
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    gems: BTreeMap<String, Option<GemVersion>>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a gem; an unparseable version leaves it present but unversioned
    pub fn with_gem(mut self, name: &str, version: &str) -> Self {
        self.insert(name, version);
        self
    }

    pub fn insert(&mut self, name: &str, version: &str) {
        self.gems
            .insert(name.to_string(), GemVersion::parse(version));
    }

    /// Layers `other` over `self`, replacing entries with the same name
    pub fn overlay(mut self, other: StaticOracle) -> Self {
        self.gems.extend(other.gems);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.gems.is_empty()
    }
}

impl DependencyOracle for StaticOracle {
    fn has_dependency(&self, name: &str) -> bool {
        self.gems.contains_key(name)
    }

    fn locked_version(&self, name: &str) -> Option<GemVersion> {
        self.gems.get(name).cloned().flatten()
    }
}

impl From<&LockfileOracle> for StaticOracle {
    fn from(lockfile: &LockfileOracle) -> Self {
        let mut oracle = StaticOracle::new();
        for (name, version) in lockfile.gems() {
            oracle.insert(name, version);
        }
        oracle
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for StaticOracle {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut oracle = StaticOracle::new();
        for (name, version) in iter {
            oracle.insert(name, version);
        }
        oracle
    }
}
