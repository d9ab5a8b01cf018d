//! Populating Black Duck metadata on inspected artifacts.
//!
//! The inspector tags each cached artifact with its `originId` and `forge`.
//! Once Black Duck reports on those components, the vulnerability counts,
//! policy status and component link are copied onto every matching path.

use crate::error::{BlackDuckError, Result};
use crate::model::{PropertyQuery, RepoPath};
use crate::properties::vocabulary::{
    COMPONENT_VERSION_URL, FORGE, HIGH_VULNERABILITIES, INSPECTION_STATUS, LAST_INSPECTION,
    LOW_VULNERABILITIES, MEDIUM_VULNERABILITIES, ORIGIN_ID, POLICY_STATUS,
};
use crate::properties::PropertyService;
use crate::store::PropertyStore;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Written when Black Duck has no component version link for an artifact.
pub const UNAVAILABLE: &str = "Unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InspectionStatus {
    Pending,
    Success,
    Failure,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Pending => "PENDING",
            InspectionStatus::Success => "SUCCESS",
            InspectionStatus::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspectionStatus {
    type Err = BlackDuckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(InspectionStatus::Pending),
            "SUCCESS" => Ok(InspectionStatus::Success),
            "FAILURE" => Ok(InspectionStatus::Failure),
            _ => Err(BlackDuckError::InvalidInspectionStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyStatus {
    InViolation,
    NotInViolation,
    InViolationOverridden,
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyStatus::InViolation => "IN_VIOLATION",
            PolicyStatus::NotInViolation => "NOT_IN_VIOLATION",
            PolicyStatus::InViolationOverridden => "IN_VIOLATION_OVERRIDDEN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VulnerabilityAggregate {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

/// One component as reported by Black Duck for a cached artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetaData {
    #[serde(default)]
    pub origin_id: String,
    #[serde(default)]
    pub forge: String,
    #[serde(default)]
    pub high_severity_count: u32,
    #[serde(default)]
    pub medium_severity_count: u32,
    #[serde(default)]
    pub low_severity_count: u32,
    pub policy_status: PolicyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_version_link: Option<String>,
}

impl ArtifactMetaData {
    pub fn vulnerabilities(&self) -> VulnerabilityAggregate {
        VulnerabilityAggregate {
            high: self.high_severity_count,
            medium: self.medium_severity_count,
            low: self.low_severity_count,
        }
    }
}

pub fn set_inspection_status<S: PropertyStore>(
    service: &PropertyService<S>,
    path: &RepoPath,
    status: InspectionStatus,
) -> Result<()> {
    service.set_property(path, &INSPECTION_STATUS, status.as_str())
}

/// Whether `path` currently carries exactly `status`. Unknown values never match.
pub fn assert_inspection_status<S: PropertyStore>(
    service: &PropertyService<S>,
    path: &RepoPath,
    status: InspectionStatus,
) -> Result<bool> {
    let current = service.get_property(path, &INSPECTION_STATUS)?;
    Ok(current
        .and_then(|value| value.parse::<InspectionStatus>().ok())
        .is_some_and(|current| current == status))
}

/// Writes vulnerability counts, policy status and component link onto `path`
/// and marks it inspected at `inspected_at`.
pub fn populate_metadata<S: PropertyStore>(
    service: &PropertyService<S>,
    path: &RepoPath,
    vulnerabilities: VulnerabilityAggregate,
    policy_status: PolicyStatus,
    component_version_url: Option<&str>,
    inspected_at: &DateTime<Utc>,
) -> Result<()> {
    service.set_property(path, &HIGH_VULNERABILITIES, &vulnerabilities.high.to_string())?;
    service.set_property(path, &MEDIUM_VULNERABILITIES, &vulnerabilities.medium.to_string())?;
    service.set_property(path, &LOW_VULNERABILITIES, &vulnerabilities.low.to_string())?;
    service.set_property(path, &POLICY_STATUS, &policy_status.to_string())?;
    service.set_property(
        path,
        &COMPONENT_VERSION_URL,
        component_version_url.unwrap_or(UNAVAILABLE),
    )?;
    set_inspection_status(service, path, InspectionStatus::Success)?;
    service.set_property_from_date(path, &LAST_INSPECTION, inspected_at)
}

/// Copies each metadata entry onto the paths in `repo_key` tagged with the
/// same origin id and forge. Entries missing either identifier are skipped.
///
/// Returns the number of paths updated.
pub fn populate_from_id_metadata<S: PropertyStore>(
    service: &PropertyService<S>,
    repo_key: &str,
    metadata: &[ArtifactMetaData],
    inspected_at: &DateTime<Utc>,
) -> Result<usize> {
    let mut updated = 0;
    for entry in metadata {
        let origin_id = entry.origin_id.trim();
        let forge = entry.forge.trim();
        if origin_id.is_empty() || forge.is_empty() {
            debug!("Skipping metadata without origin id or forge: {:?}", entry);
            continue;
        }

        for path in paths_with_origin(service, repo_key, origin_id, forge)? {
            populate_metadata(
                service,
                &path,
                entry.vulnerabilities(),
                entry.policy_status,
                entry.component_version_link.as_deref(),
                inspected_at,
            )?;
            updated += 1;
        }
    }

    info!("Populated Black Duck metadata on {} item(s) in {}", updated, repo_key);
    Ok(updated)
}

/// Populates `repo_key` only while its root is marked `PENDING`.
///
/// The root is marked `SUCCESS` once every entry is applied. On failure it is
/// marked `FAILURE` and the error is returned. Returns `None` when the
/// repository was not pending and nothing was touched.
pub fn populate_metadata_for_repo<S: PropertyStore>(
    service: &PropertyService<S>,
    repo_key: &str,
    metadata: &[ArtifactMetaData],
    inspected_at: &DateTime<Utc>,
) -> Result<Option<usize>> {
    let root = RepoPath::root(repo_key)?;
    if !assert_inspection_status(service, &root, InspectionStatus::Pending)? {
        debug!("{} is not pending inspection, skipping metadata population", repo_key);
        return Ok(None);
    }

    debug!("Populating metadata on {}", repo_key);
    match populate_from_id_metadata(service, repo_key, metadata, inspected_at) {
        Ok(updated) => {
            set_inspection_status(service, &root, InspectionStatus::Success)?;
            Ok(Some(updated))
        }
        Err(e) => {
            error!(
                "Populating artifact metadata in repository {} failed: {}",
                repo_key, e
            );
            set_inspection_status(service, &root, InspectionStatus::Failure)?;
            Err(e)
        }
    }
}

fn paths_with_origin<S: PropertyStore>(
    service: &PropertyService<S>,
    repo_key: &str,
    origin_id: &str,
    forge: &str,
) -> Result<Vec<RepoPath>> {
    let mut query = PropertyQuery::new();
    query.insert(
        ORIGIN_ID.name.to_string(),
        BTreeSet::from([origin_id.to_string()]),
    );

    // The query may be looser than exact equality (wildcard characters in ids).
    let mut matching = Vec::new();
    for path in service.get_items_containing_properties_and_values(&query, &[repo_key])? {
        let same_origin = service.get_property(&path, &ORIGIN_ID)?.as_deref() == Some(origin_id);
        let same_forge = service.get_property(&path, &FORGE)?.as_deref() == Some(forge);
        if same_origin && same_forge {
            matching.push(path);
        }
    }
    Ok(matching)
}
