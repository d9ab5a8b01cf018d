use super::{properties_match, PropertyStore};
use crate::error::{BlackDuckError, Result};
use crate::model::{PropertyQuery, RepoPath};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

type PathProperties = BTreeMap<String, String>;

/// In-memory property store.
///
/// Uses a `RwLock` so one store can back services on several threads.
/// Paths are kept ordered, which makes query results deterministic.
#[derive(Default)]
pub struct InMemoryPropertyStore {
    paths: RwLock<BTreeMap<RepoPath, PathProperties>>,
    simulate_failure: AtomicBool,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a store error.
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    /// All properties currently set on `path`.
    pub fn properties(&self, path: &RepoPath) -> PathProperties {
        self.paths.read().get(path).cloned().unwrap_or_default()
    }

    fn check_available(&self) -> Result<()> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err(BlackDuckError::Store("Simulated store failure".to_string()));
        }
        Ok(())
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn has_property(&self, path: &RepoPath, name: &str) -> Result<bool> {
        self.check_available()?;
        Ok(self
            .paths
            .read()
            .get(path)
            .is_some_and(|props| props.contains_key(name)))
    }

    fn get_property(&self, path: &RepoPath, name: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self
            .paths
            .read()
            .get(path)
            .and_then(|props| props.get(name).cloned()))
    }

    fn set_property(&self, path: &RepoPath, name: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.paths
            .write()
            .entry(path.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete_property(&self, path: &RepoPath, name: &str) -> Result<()> {
        self.check_available()?;
        let mut paths = self.paths.write();
        if let Some(props) = paths.get_mut(path) {
            props.remove(name);
            if props.is_empty() {
                paths.remove(path);
            }
        }
        Ok(())
    }

    fn items_by_properties(
        &self,
        query: &PropertyQuery,
        repo_keys: &[&str],
    ) -> Result<Vec<RepoPath>> {
        self.check_available()?;
        let paths = self.paths.read();
        Ok(paths
            .iter()
            .filter(|(path, _)| repo_keys.contains(&path.repo_key()))
            .filter(|(_, props)| properties_match(query, |name| props.get(name).map(String::as_str)))
            .map(|(path, _)| path.clone())
            .collect())
    }
}
