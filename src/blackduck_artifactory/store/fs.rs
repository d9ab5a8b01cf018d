use super::{properties_match, PropertyStore};
use crate::error::{BlackDuckError, Result};
use crate::model::{PropertyQuery, RepoPath};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

type PropertyIndex = BTreeMap<RepoPath, BTreeMap<String, String>>;

/// File-backed property store.
///
/// All properties live in one JSON document keyed by repo path:
///
/// ```text
/// {
///   "libs-release/com/acme/app-1.0.jar": {
///     "blackduck.projectName": "app",
///     "blackduck.scanTime": "2019-03-14T15:09:26.535"
///   }
/// }
/// ```
///
/// Every call loads the document; writes replace it atomically.
pub struct FilePropertyStore {
    data_file: PathBuf,
    lock: Mutex<()>,
}

impl FilePropertyStore {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    fn load_index(&self) -> Result<PropertyIndex> {
        if !self.data_file.exists() {
            return Ok(PropertyIndex::new());
        }
        let content = fs::read_to_string(&self.data_file).map_err(BlackDuckError::Io)?;
        if content.trim().is_empty() {
            return Ok(PropertyIndex::new());
        }
        let index: PropertyIndex =
            serde_json::from_str(&content).map_err(BlackDuckError::Serialization)?;
        Ok(index)
    }

    fn save_index(&self, index: &PropertyIndex) -> Result<()> {
        let dir = match self.data_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(BlackDuckError::Io)?;
        }

        let content = serde_json::to_string_pretty(index).map_err(BlackDuckError::Serialization)?;

        // Atomic write: readers never see a half-written document
        let tmp_file = dir.join(format!(".properties-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(BlackDuckError::Io)?;
        fs::rename(&tmp_file, &self.data_file).map_err(BlackDuckError::Io)?;
        Ok(())
    }
}

impl PropertyStore for FilePropertyStore {
    fn has_property(&self, path: &RepoPath, name: &str) -> Result<bool> {
        let _guard = self.lock.lock();
        let index = self.load_index()?;
        Ok(index.get(path).is_some_and(|props| props.contains_key(name)))
    }

    fn get_property(&self, path: &RepoPath, name: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        let index = self.load_index()?;
        Ok(index.get(path).and_then(|props| props.get(name).cloned()))
    }

    fn set_property(&self, path: &RepoPath, name: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut index = self.load_index()?;
        index
            .entry(path.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        self.save_index(&index)
    }

    fn delete_property(&self, path: &RepoPath, name: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut index = self.load_index()?;
        let Some(props) = index.get_mut(path) else {
            return Ok(());
        };
        if props.remove(name).is_none() {
            return Ok(());
        }
        if props.is_empty() {
            index.remove(path);
        }
        self.save_index(&index)
    }

    fn items_by_properties(
        &self,
        query: &PropertyQuery,
        repo_keys: &[&str],
    ) -> Result<Vec<RepoPath>> {
        let _guard = self.lock.lock();
        let index = self.load_index()?;
        Ok(index
            .iter()
            .filter(|(path, _)| repo_keys.contains(&path.repo_key()))
            .filter(|(_, props)| properties_match(query, |name| props.get(name).map(String::as_str)))
            .map(|(path, _)| path.clone())
            .collect())
    }
}
