//! Gem version normalization onto semantic versions

use semver::Version;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A locked gem version, ordered with semantic-version rules.
///
/// RubyGems versions are looser than semver: `2.3` and `4.0.0.beta1` are both
/// valid. They are normalized by zero-filling to three components, turning a
/// trailing alphabetic segment into a pre-release and dropping any platform
/// suffix (`1.13.3-x86_64-linux`). Numeric segments past the third become
/// build metadata, which semver orders above the bare release. The original
/// text is kept for display.
#[derive(Debug, Clone)]
pub struct GemVersion {
    raw: String,
    semver: Version,
}

impl GemVersion {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let semver = normalize(raw)?;
        Some(Self {
            raw: raw.to_string(),
            semver,
        })
    }

    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            raw: format!("{}.{}.{}", major, minor, patch),
            semver: Version::new(major, minor, patch),
        }
    }

    pub fn as_semver(&self) -> &Version {
        &self.semver
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn normalize(raw: &str) -> Option<Version> {
    let without_platform = raw.split('-').next()?;

    let mut numbers: Vec<u64> = Vec::new();
    let mut tail: Vec<&str> = Vec::new();
    for segment in without_platform.split('.') {
        if segment.is_empty() {
            return None;
        }
        if tail.is_empty() {
            if let Ok(n) = segment.parse::<u64>() {
                numbers.push(n);
                continue;
            }
            if !segment.starts_with(|c: char| c.is_ascii_alphabetic()) {
                return None;
            }
        }
        tail.push(segment);
    }

    if numbers.is_empty() {
        return None;
    }

    let mut extra: Vec<String> = numbers.iter().skip(3).map(|n| n.to_string()).collect();
    numbers.resize(3, 0);
    let mut text = format!("{}.{}.{}", numbers[0], numbers[1], numbers[2]);

    if extra.is_empty() {
        // `3.0.0.rc1` precedes `3.0.0`
        if !tail.is_empty() {
            text.push('-');
            text.push_str(&tail.join("."));
        }
    } else {
        // `3.0.0.1` and `3.0.0.1.rc1` both follow `3.0.0`; build metadata
        // sorts above the bare release without reaching the next patch
        if tail.is_empty() {
            while extra.last().map(|n| n == "0").unwrap_or(false) {
                extra.pop();
            }
        }
        extra.extend(tail.iter().map(|t| t.to_string()));
        if !extra.is_empty() {
            text.push('+');
            text.push_str(&extra.join("."));
        }
    }
    Version::parse(&text).ok()
}

impl PartialEq for GemVersion {
    fn eq(&self, other: &Self) -> bool {
        self.semver == other.semver
    }
}

impl Eq for GemVersion {}

impl PartialOrd for GemVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GemVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semver.cmp(&other.semver)
    }
}

impl fmt::Display for GemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for GemVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}
