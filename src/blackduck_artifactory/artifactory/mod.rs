//! # Artifactory REST
//!
//! A blocking client and the two REST surfaces this tool talks to:
//!
//! - [`properties`]: a [`PropertyStore`](crate::store::PropertyStore) backed by
//!   the storage and AQL search APIs
//! - [`repositories`]: repository configuration create/get/delete

pub mod client;
pub mod properties;
pub mod repositories;

pub use client::ArtifactoryClient;
pub use properties::ArtifactoryPropertyStore;
pub use repositories::{RepositoriesApi, RepositoryConfiguration, RepositoryType};
