//! # Configuration
//!
//! Settings are loaded with [`confique`] from layered sources, highest priority first:
//! 1. **Environment variables**: `BD_ARTIFACTORY_URL`, `BD_DATE_TIME_ZONE`, etc.
//! 2. **Explicit file**: the TOML file passed with `--config`.
//! 3. **User file**: `blackduck-artifactory.toml` in the OS config directory
//!    (via the `directories` crate).
//! 4. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `artifactory_url` | `BD_ARTIFACTORY_URL` | unset | Artifactory base URL; unset means the local file store |
//! | `artifactory_username` | `BD_ARTIFACTORY_USERNAME` | unset | Basic auth user |
//! | `artifactory_password` | `BD_ARTIFACTORY_PASSWORD` | unset | Basic auth password |
//! | `date_time_pattern` | `BD_DATE_TIME_PATTERN` | `%Y-%m-%dT%H:%M:%S%.3f` | Pattern for date properties |
//! | `date_time_zone` | `BD_DATE_TIME_ZONE` | unset | IANA zone for the `...Converted` companions |
//! | `artifact_cutoff_date` | `BD_ARTIFACT_CUTOFF_DATE` | unset | Artifacts modified before this are not scanned |
//! | `store_file` | `BD_STORE_FILE` | data dir `properties.json` | File store location |
//! | `log_level` | `BD_LOG_LEVEL` | `info` | trace, debug, info, warn or error |

use crate::datetime::{DateTimeManager, DEFAULT_DATE_TIME_PATTERN};
use crate::error::{BlackDuckError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "blackduck-artifactory.toml";
pub const STORE_FILENAME: &str = "properties.json";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlackDuckConfig {
    /// Artifactory base URL, e.g. "http://localhost:8081/artifactory".
    #[config(env = "BD_ARTIFACTORY_URL")]
    pub artifactory_url: Option<String>,

    #[config(env = "BD_ARTIFACTORY_USERNAME")]
    pub artifactory_username: Option<String>,

    #[config(env = "BD_ARTIFACTORY_PASSWORD")]
    pub artifactory_password: Option<String>,

    /// chrono strftime pattern used to store date properties.
    #[config(env = "BD_DATE_TIME_PATTERN", default = "%Y-%m-%dT%H:%M:%S%.3f")]
    pub date_time_pattern: String,

    #[config(env = "BD_DATE_TIME_ZONE")]
    pub date_time_zone: Option<String>,

    #[config(env = "BD_ARTIFACT_CUTOFF_DATE")]
    pub artifact_cutoff_date: Option<String>,

    #[config(env = "BD_STORE_FILE")]
    pub store_file: Option<PathBuf>,

    #[config(env = "BD_LOG_LEVEL", default = "info")]
    pub log_level: String,
}

impl Default for BlackDuckConfig {
    fn default() -> Self {
        Self {
            artifactory_url: None,
            artifactory_username: None,
            artifactory_password: None,
            date_time_pattern: DEFAULT_DATE_TIME_PATTERN.to_string(),
            date_time_zone: None,
            artifact_cutoff_date: None,
            store_file: None,
            log_level: "info".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "blackduck", "blackduck-artifactory")
}

/// Path of the per-user config file, when the OS has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

impl BlackDuckConfig {
    /// Loads the layered configuration. An explicit file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(BlackDuckError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", path.display()),
                )));
            }
            builder = builder.file(path);
        }
        if let Some(path) = user_config_path() {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    pub fn date_time_manager(&self) -> Result<DateTimeManager> {
        DateTimeManager::new(&self.date_time_pattern, self.date_time_zone.as_deref())
    }

    /// Location of the file store: `store_file` or the user data directory.
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store_file
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(STORE_FILENAME)))
    }

    /// The configured Artifactory URL, ignoring blank values.
    pub fn artifactory_url(&self) -> Option<&str> {
        self.artifactory_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
