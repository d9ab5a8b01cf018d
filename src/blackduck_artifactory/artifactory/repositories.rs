//! Repository configuration REST calls (`/api/repositories/{key}`).

use super::client::{ArtifactoryClient, ResponseExt};
use crate::error::Result;
use log::debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_REPOSITORY_LAYOUT: &str = "simple-default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    Local,
    Remote,
    Virtual,
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepositoryType::Local => "local",
            RepositoryType::Remote => "remote",
            RepositoryType::Virtual => "virtual",
        };
        f.write_str(name)
    }
}

/// The subset of Artifactory's repository configuration this tool manages.
///
/// Unknown fields in responses are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfiguration {
    pub key: String,

    #[serde(rename = "rclass")]
    pub repository_type: RepositoryType,

    #[serde(rename = "packageType")]
    pub package_type: String,

    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    #[serde(rename = "externalDependenciesEnabled", default)]
    pub external_dependencies_enabled: bool,

    #[serde(rename = "repoLayoutRef", default = "default_layout")]
    pub repository_layout: String,
}

fn default_layout() -> String {
    DEFAULT_REPOSITORY_LAYOUT.to_string()
}

impl RepositoryConfiguration {
    pub fn new(
        key: impl Into<String>,
        repository_type: RepositoryType,
        package_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            repository_type,
            package_type: package_type.into(),
            remote_url: None,
            external_dependencies_enabled: false,
            repository_layout: default_layout(),
        }
    }

    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.repository_layout = layout.into();
        self
    }

    pub fn with_external_dependencies(mut self, enabled: bool) -> Self {
        self.external_dependencies_enabled = enabled;
        self
    }
}

pub struct RepositoriesApi {
    client: ArtifactoryClient,
}

impl RepositoriesApi {
    pub fn new(client: ArtifactoryClient) -> Self {
        Self { client }
    }

    pub fn create_repository(&self, configuration: &RepositoryConfiguration) -> Result<()> {
        self.client
            .request(Method::PUT, endpoint(&configuration.key))?
            .json(configuration)
            .send()?
            .check_status()?;
        debug!(
            "Created {} repository {}",
            configuration.repository_type, configuration.key
        );
        Ok(())
    }

    pub fn get_repository(&self, key: &str) -> Result<RepositoryConfiguration> {
        let configuration = self
            .client
            .request(Method::GET, endpoint(key))?
            .send()?
            .check_status()?
            .json()?;
        Ok(configuration)
    }

    pub fn delete_repository(&self, key: &str) -> Result<()> {
        self.client
            .request(Method::DELETE, endpoint(key))?
            .send()?
            .check_status()?;
        debug!("Deleted repository {}", key);
        Ok(())
    }
}

fn endpoint(key: &str) -> [&str; 3] {
    ["api", "repositories", key]
}
