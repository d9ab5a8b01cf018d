//! [`PropertyStore`] over the Artifactory REST API.
//!
//! Single properties go through the storage API
//! (`/api/storage/{repo}/{path}?properties=...`); bulk queries are translated
//! into AQL and posted to `/api/search/aql`.

use super::client::{ArtifactoryClient, ResponseExt};
use crate::error::Result;
use crate::model::{PropertyQuery, RepoPath};
use crate::store::PropertyStore;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

pub struct ArtifactoryPropertyStore {
    client: ArtifactoryClient,
}

impl ArtifactoryPropertyStore {
    pub fn new(client: ArtifactoryClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct StoragePropertiesResponse {
    #[serde(default)]
    properties: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AqlResponse {
    #[serde(default)]
    results: Vec<AqlItem>,
}

#[derive(Debug, Deserialize)]
struct AqlItem {
    repo: String,
    path: String,
    name: String,
}

impl AqlItem {
    fn into_repo_path(self) -> Result<RepoPath> {
        let relative = match (self.path.as_str(), self.name.as_str()) {
            (".", ".") => String::new(),
            (".", name) => name.to_string(),
            (path, name) => format!("{}/{}", path, name),
        };
        RepoPath::new(self.repo, relative)
    }
}

impl PropertyStore for ArtifactoryPropertyStore {
    fn has_property(&self, path: &RepoPath, name: &str) -> Result<bool> {
        Ok(self.get_property(path, name)?.is_some())
    }

    fn get_property(&self, path: &RepoPath, name: &str) -> Result<Option<String>> {
        let response = self
            .client
            .request(Method::GET, storage_segments(path))?
            .query(&[("properties", name)])
            .send()?;
        // Artifactory answers 404 when none of the requested properties is set.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: StoragePropertiesResponse = response.check_status()?.json()?;
        Ok(body
            .properties
            .get(name)
            .map(|values| values.first().cloned().unwrap_or_default()))
    }

    fn set_property(&self, path: &RepoPath, name: &str, value: &str) -> Result<()> {
        let assignment = format!("{}={}", escape_property_value(name), escape_property_value(value));
        self.client
            .request(Method::PUT, storage_segments(path))?
            .query(&[("properties", assignment.as_str()), ("recursive", "0")])
            .send()?
            .check_status()?;
        Ok(())
    }

    fn delete_property(&self, path: &RepoPath, name: &str) -> Result<()> {
        let response = self
            .client
            .request(Method::DELETE, storage_segments(path))?
            .query(&[("properties", name), ("recursive", "0")])
            .send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response.check_status()?;
        Ok(())
    }

    fn items_by_properties(
        &self,
        query: &PropertyQuery,
        repo_keys: &[&str],
    ) -> Result<Vec<RepoPath>> {
        let Some(aql) = build_aql(query, repo_keys) else {
            return Ok(Vec::new());
        };
        let body: AqlResponse = self
            .client
            .request(Method::POST, ["api", "search", "aql"])?
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(aql)
            .send()?
            .check_status()?
            .json()?;

        let mut found = BTreeSet::new();
        for item in body.results {
            found.insert(item.into_repo_path()?);
        }
        Ok(found.into_iter().collect())
    }
}

/// `api/storage/{repo}/{path...}`, one URL segment per path component.
fn storage_segments(path: &RepoPath) -> Vec<&str> {
    let mut segments = vec!["api", "storage", path.repo_key()];
    segments.extend(path.path().split('/').filter(|segment| !segment.is_empty()));
    segments
}

/// Backslash-escapes the characters Artifactory uses as property separators.
pub fn escape_property_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ',' | '|' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// AQL search for items in `repo_keys` carrying any of the queried properties.
///
/// Returns `None` when the query cannot match anything.
pub fn build_aql(query: &PropertyQuery, repo_keys: &[&str]) -> Option<String> {
    let property_terms: Vec<Value> = query
        .iter()
        .flat_map(|(name, patterns)| {
            patterns
                .iter()
                .map(move |pattern| json!({ format!("@{}", name): { "$match": pattern } }))
        })
        .collect();
    if property_terms.is_empty() || repo_keys.is_empty() {
        return None;
    }

    let repo_terms: Vec<Value> = repo_keys
        .iter()
        .map(|repo_key| json!({ "repo": repo_key }))
        .collect();

    let criteria = json!({
        "$and": [
            { "$or": repo_terms },
            { "$or": property_terms },
        ],
        "type": "any",
    });
    Some(format!(
        "items.find({}).include(\"repo\",\"path\",\"name\")",
        criteria
    ))
}
