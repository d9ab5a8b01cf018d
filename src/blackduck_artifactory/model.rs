use crate::error::{BlackDuckError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Property name to accepted values. A value of `"*"` only tests presence.
pub type PropertyQuery = BTreeMap<String, BTreeSet<String>>;

/// Wildcard value used by presence-only queries.
pub const ANY_VALUE: &str = "*";

/// A location inside a named Artifactory repository.
///
/// The repository root is represented by an empty `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoPath {
    repo_key: String,
    path: String,
}

impl RepoPath {
    pub fn new(repo_key: impl Into<String>, path: impl AsRef<str>) -> Result<Self> {
        let repo_key: String = repo_key.into();
        let repo_key = repo_key.trim().trim_matches('/');
        if repo_key.is_empty() || repo_key.contains('/') {
            return Err(BlackDuckError::InvalidRepoPath(repo_key.to_string()));
        }
        Ok(Self {
            repo_key: repo_key.to_string(),
            path: path.as_ref().trim().trim_matches('/').to_string(),
        })
    }

    /// The repository root itself.
    pub fn root(repo_key: impl Into<String>) -> Result<Self> {
        Self::new(repo_key, "")
    }

    pub fn repo_key(&self) -> &str {
        &self.repo_key
    }

    /// Path relative to the repository root; empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.repo_key)
        } else {
            write!(f, "{}/{}", self.repo_key, self.path)
        }
    }
}

impl FromStr for RepoPath {
    type Err = BlackDuckError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_matches('/');
        let parsed = match trimmed.split_once('/') {
            Some((repo_key, path)) => Self::new(repo_key, path),
            None => Self::root(trimmed),
        };
        parsed.map_err(|_| BlackDuckError::InvalidRepoPath(s.to_string()))
    }
}

// Stored as its display string so it can key JSON objects.
impl Serialize for RepoPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RepoPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A Black Duck project identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameVersion {
    pub name: String,
    pub version: String,
}

impl NameVersion {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for NameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
