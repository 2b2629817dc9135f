//! Version extraction and comparison.
//!
//! Tools print versions in many shapes (`Python 3.11.4`, `git version
//! 2.45.1.windows.1`, `cc (GCC) 13.2.0`). We take the first dotted
//! numeric token and compare component-wise, treating missing components
//! as zero.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\.(\d+)(?:\.(\d+))?(?:\.(\d+))?").unwrap());

/// A dotted numeric version, `major.minor[.patch[.build]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    /// Build from numeric components.
    pub fn new(parts: impl Into<Vec<u64>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }

    /// Find the first version number in free-form tool output.
    pub fn extract(output: &str) -> Option<Version> {
        let caps = VERSION_REGEX.captures(output)?;
        let parts = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        Some(Version { parts })
    }

    pub fn major(&self) -> u64 {
        self.parts.first().copied().unwrap_or(0)
    }

    /// Whether this version is at least `minimum`.
    pub fn satisfies(&self, minimum: &Version) -> bool {
        self >= minimum
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.parts.iter().map(u64::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// Error parsing a declared version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{0}': expected digits separated by dots")]
pub struct ParseVersionError(String);

impl FromStr for Version {
    type Err = ParseVersionError;

    /// Strict parse of a declared version such as `3.10` or `3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseVersionError(s.to_string()));
        }
        let parts = trimmed
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseVersionError(s.to_string()))?;
        Ok(Version { parts })
    }
}

impl TryFrom<String> for Version {
    type Error = ParseVersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> String {
        v.to_string()
    }
}
