//! # Storage Layer
//!
//! The [`PropertyStore`] trait is the boundary to whatever actually persists
//! properties on repository paths. The property service never talks to a
//! backend directly.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryPropertyStore`]: lock-protected map, for tests and embedding
//! - [`fs::FilePropertyStore`]: a single JSON document on disk
//! - [`crate::artifactory::properties::ArtifactoryPropertyStore`]: Artifactory REST API
//!
//! ## Query Semantics
//!
//! [`PropertyStore::items_by_properties`] takes a name to value-set multimap. A
//! path matches when it carries **any** of the named properties with a value
//! matching **any** of that name's patterns. `*` matches any run of characters
//! and `?` a single character, so `{"name": {"*"}}` is a presence test. Results
//! contain each path once.

use crate::error::Result;
use crate::model::{PropertyQuery, RepoPath};

pub mod fs;
pub mod memory;

/// Abstract interface for per-path property storage.
///
/// All methods take `&self` so a store can be shared between callers.
pub trait PropertyStore {
    /// Whether `name` is set on `path`
    fn has_property(&self, path: &RepoPath, name: &str) -> Result<bool>;

    /// Raw stored value; `None` when the property is not set
    fn get_property(&self, path: &RepoPath, name: &str) -> Result<Option<String>>;

    /// Create or overwrite a property
    fn set_property(&self, path: &RepoPath, name: &str, value: &str) -> Result<()>;

    /// Remove a property
    fn delete_property(&self, path: &RepoPath, name: &str) -> Result<()>;

    /// Every path under `repo_keys` matching `query`
    fn items_by_properties(&self, query: &PropertyQuery, repo_keys: &[&str])
        -> Result<Vec<RepoPath>>;
}

impl<T: PropertyStore + ?Sized> PropertyStore for &T {
    fn has_property(&self, path: &RepoPath, name: &str) -> Result<bool> {
        (**self).has_property(path, name)
    }

    fn get_property(&self, path: &RepoPath, name: &str) -> Result<Option<String>> {
        (**self).get_property(path, name)
    }

    fn set_property(&self, path: &RepoPath, name: &str, value: &str) -> Result<()> {
        (**self).set_property(path, name, value)
    }

    fn delete_property(&self, path: &RepoPath, name: &str) -> Result<()> {
        (**self).delete_property(path, name)
    }

    fn items_by_properties(
        &self,
        query: &PropertyQuery,
        repo_keys: &[&str],
    ) -> Result<Vec<RepoPath>> {
        (**self).items_by_properties(query, repo_keys)
    }
}

/// Matches `value` against a pattern where `*` is any run and `?` any one character.
pub fn wildcard_match(pattern: &str, value: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let value: Vec<char> = value.chars().collect();

    let (mut p, mut v) = (0, 0);
    // Position of the last `*` seen and the value index it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while v < value.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, v));
                p += 1;
            }
            Some(&c) if c == '?' || c == value[v] => {
                p += 1;
                v += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    v = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Whether a path's properties satisfy `query` under the semantics above.
pub(crate) fn properties_match<'a>(
    query: &PropertyQuery,
    mut lookup: impl FnMut(&str) -> Option<&'a str>,
) -> bool {
    query.iter().any(|(name, patterns)| {
        lookup(name).is_some_and(|value| {
            patterns
                .iter()
                .any(|pattern| wildcard_match(pattern, value))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    #[test]
    fn star_matches_anything() {
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*", "anything at all"));
    }

    #[test]
    fn literal_patterns_match_exactly() {
        assert!(wildcard_match("maven", "maven"));
        assert!(!wildcard_match("maven", "maven2"));
        assert!(!wildcard_match("maven", "mave"));
    }

    #[test]
    fn embedded_wildcards() {
        assert!(wildcard_match("org.apache:*:2.?", "org.apache:commons-io:2.6"));
        assert!(wildcard_match("*-SNAPSHOT", "1.0-SNAPSHOT"));
        assert!(!wildcard_match("*-SNAPSHOT", "1.0-RELEASE"));
        assert!(wildcard_match("a*b*c", "aXXbYYbZc"));
        assert!(!wildcard_match("a?c", "ac"));
    }

    #[test]
    fn query_matches_when_any_name_matches() {
        let props: HashMap<&str, &str> = [("blackduck.forge", "maven")].into_iter().collect();
        let mut query = PropertyQuery::new();
        query.insert("blackduck.originId".into(), BTreeSet::from(["*".to_string()]));
        assert!(!properties_match(&query, |name| props.get(name).copied()));

        query.insert("blackduck.forge".into(), BTreeSet::from(["npm".to_string(), "maven".to_string()]));
        assert!(properties_match(&query, |name| props.get(name).copied()));
    }

    #[test]
    fn empty_query_matches_nothing() {
        let props: HashMap<&str, &str> = [("a", "b")].into_iter().collect();
        assert!(!properties_match(&PropertyQuery::new(), |name| props
            .get(name)
            .copied()));
    }
}
