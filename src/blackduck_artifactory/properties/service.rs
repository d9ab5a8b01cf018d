//! Typed access to Black Duck properties on repository paths.
//!
//! `PropertyService` holds no state of its own beyond its collaborators: the
//! [`PropertyStore`] that persists values and the [`DateTimeManager`] that
//! renders dates. Concurrent writes to the same path are last-write-wins.

use super::vocabulary::{PropertyDefinition, PROJECT_NAME, PROJECT_VERSION_NAME, PROPERTIES};
use crate::datetime::DateTimeManager;
use crate::error::{BlackDuckError, Result};
use crate::model::{NameVersion, PropertyQuery, RepoPath, ANY_VALUE};
use crate::store::PropertyStore;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};

/// Key of the exclusion list in cleanup parameters.
pub const EXCLUDED_PROPERTIES_PARAM: &str = "properties";

/// Caller-supplied cleanup parameters, e.g. `{"properties": ["blackduck.projectName"]}`.
pub type CleanupParams = HashMap<String, Vec<String>>;

pub struct PropertyService<S: PropertyStore> {
    store: S,
    date_time: DateTimeManager,
    vocabulary: &'static [PropertyDefinition],
}

impl<S: PropertyStore> PropertyService<S> {
    pub fn new(store: S, date_time: DateTimeManager) -> Self {
        Self {
            store,
            date_time,
            vocabulary: PROPERTIES,
        }
    }

    /// Replace the set of definitions that bulk cleanup iterates.
    pub fn with_vocabulary(mut self, vocabulary: &'static [PropertyDefinition]) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn vocabulary(&self) -> &'static [PropertyDefinition] {
        self.vocabulary
    }

    pub fn date_time(&self) -> &DateTimeManager {
        &self.date_time
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_property(&self, path: &RepoPath, property: &PropertyDefinition) -> Result<bool> {
        self.store.has_property(path, property.name)
    }

    /// Stored value with surrounding whitespace stripped.
    ///
    /// Blank values are reported as absent; callers never see an empty string.
    pub fn get_property(
        &self,
        path: &RepoPath,
        property: &PropertyDefinition,
    ) -> Result<Option<String>> {
        self.get_property_by_name(path, property.name)
    }

    fn get_property_by_name(&self, path: &RepoPath, name: &str) -> Result<Option<String>> {
        let value = self.store.get_property(path, name)?;
        Ok(value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    pub fn get_property_as_integer(
        &self,
        path: &RepoPath,
        property: &PropertyDefinition,
    ) -> Result<Option<i64>> {
        self.get_property(path, property)?
            .map(|value| {
                value.parse::<i64>().map_err(|source| BlackDuckError::Parse {
                    property: property.name.to_string(),
                    value,
                    source,
                })
            })
            .transpose()
    }

    pub fn get_date_from_property(
        &self,
        path: &RepoPath,
        property: &PropertyDefinition,
    ) -> Result<Option<DateTime<Utc>>> {
        self.get_property(path, property)?
            .map(|value| self.date_time.string_to_date(&value))
            .transpose()
    }

    pub fn set_property(
        &self,
        path: &RepoPath,
        property: &PropertyDefinition,
        value: &str,
    ) -> Result<()> {
        self.set_property_by_name(path, property.name, value)
    }

    fn set_property_by_name(&self, path: &RepoPath, name: &str, value: &str) -> Result<()> {
        self.store.set_property(path, name, value)?;
        debug!("Set property {} to {} on {}", name, value, path);
        Ok(())
    }

    /// Stores `date` under the property name, plus its time-zone converted
    /// rendering under the companion time name when one is available.
    ///
    /// Without a converted rendering the companion is left as it was.
    pub fn set_property_from_date(
        &self,
        path: &RepoPath,
        property: &PropertyDefinition,
        date: &DateTime<Utc>,
    ) -> Result<()> {
        let value = self.date_time.date_to_string(date);
        self.set_property(path, property, &value)?;

        if let Some(converted) = self.date_time.date_to_converted_string(date) {
            self.set_property_by_name(path, property.time_name, &converted)?;
        }
        Ok(())
    }

    /// Removes the property and its companion time property, each only if present.
    pub fn delete_property(&self, path: &RepoPath, property: &PropertyDefinition) -> Result<()> {
        self.delete_property_by_name(path, property.name)?;
        self.delete_property_by_name(path, property.time_name)
    }

    fn delete_property_by_name(&self, path: &RepoPath, name: &str) -> Result<()> {
        if self.store.has_property(path, name)? {
            self.store.delete_property(path, name)?;
            debug!("Removed property {} from {}", name, path);
        }
        Ok(())
    }

    /// Paths in `repo_key` carrying any of `properties`, whatever their value.
    pub fn get_items_containing_properties(
        &self,
        repo_key: &str,
        properties: &[&PropertyDefinition],
    ) -> Result<Vec<RepoPath>> {
        let mut query = PropertyQuery::new();
        for property in properties {
            query
                .entry(property.name.to_string())
                .or_default()
                .insert(ANY_VALUE.to_string());
        }

        let found = self.get_items_containing_properties_and_values(&query, &[repo_key])?;
        // The store contract promises unique paths; enforce it for the combined query anyway.
        let unique: BTreeSet<RepoPath> = found.into_iter().collect();
        Ok(unique.into_iter().collect())
    }

    pub fn get_items_containing_properties_and_values(
        &self,
        query: &PropertyQuery,
        repo_keys: &[&str],
    ) -> Result<Vec<RepoPath>> {
        if query.is_empty() || repo_keys.is_empty() {
            return Ok(Vec::new());
        }
        self.store.items_by_properties(query, repo_keys)
    }

    /// The project identity on `path`, only when both name and version are set.
    pub fn get_project_name_version(&self, path: &RepoPath) -> Result<Option<NameVersion>> {
        let project_name = self.get_property(path, &PROJECT_NAME)?;
        let project_version_name = self.get_property(path, &PROJECT_VERSION_NAME)?;

        Ok(match (project_name, project_version_name) {
            (Some(name), Some(version)) => Some(NameVersion::new(name, version)),
            _ => None,
        })
    }

    /// Removes every vocabulary property from every path in `repo_key`, except
    /// those excluded by `params`.
    ///
    /// Candidate paths are gathered with one presence query per definition and
    /// de-duplicated before the per-path cleanup runs. Returns the number of
    /// paths visited.
    pub fn delete_all_blackduck_properties_from_repo(
        &self,
        repo_key: &str,
        params: &CleanupParams,
    ) -> Result<usize> {
        let mut candidates = BTreeSet::new();
        for property in self.vocabulary {
            let found = self.get_items_containing_properties(repo_key, &[property])?;
            debug!(
                "Found {} item(s) in {} with property {}",
                found.len(),
                repo_key,
                property.name
            );
            candidates.extend(found);
        }

        for path in &candidates {
            self.delete_all_blackduck_properties_from_repo_path(path, params)?;
        }

        info!(
            "Removed Black Duck properties from {} item(s) in {}",
            candidates.len(),
            repo_key
        );
        Ok(candidates.len())
    }

    /// Removes every vocabulary property (and companion) from `path`, except
    /// definitions whose name is listed under `params["properties"]`.
    pub fn delete_all_blackduck_properties_from_repo_path(
        &self,
        path: &RepoPath,
        params: &CleanupParams,
    ) -> Result<()> {
        for property in self.vocabulary {
            if is_property_in_params(property, params) {
                continue;
            }
            self.delete_property(path, property)?;
        }
        Ok(())
    }
}

fn is_property_in_params(property: &PropertyDefinition, params: &CleanupParams) -> bool {
    params
        .get(EXCLUDED_PROPERTIES_PARAM)
        .is_some_and(|excluded| excluded.iter().any(|name| name == property.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::DEFAULT_DATE_TIME_PATTERN;
    use crate::properties::vocabulary::{FORGE, HIGH_VULNERABILITIES, ORIGIN_ID, SCAN_TIME};
    use crate::store::memory::InMemoryPropertyStore;
    use chrono::{TimeZone, Timelike};

    fn path(raw: &str) -> RepoPath {
        raw.parse().unwrap()
    }

    fn service(store: &InMemoryPropertyStore) -> PropertyService<&InMemoryPropertyStore> {
        PropertyService::new(store, DateTimeManager::default())
    }

    fn zoned_service(store: &InMemoryPropertyStore) -> PropertyService<&InMemoryPropertyStore> {
        let manager = DateTimeManager::new(DEFAULT_DATE_TIME_PATTERN, Some("Asia/Tokyo")).unwrap();
        PropertyService::new(store, manager)
    }

    fn exclude(names: &[&str]) -> CleanupParams {
        let mut params = CleanupParams::new();
        params.insert(
            EXCLUDED_PROPERTIES_PARAM.to_string(),
            names.iter().map(|name| name.to_string()).collect(),
        );
        params
    }

    #[test]
    fn set_then_get_returns_value() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");

        service.set_property(&p, &PROJECT_NAME, "Foo").unwrap();
        assert_eq!(
            service.get_property(&p, &PROJECT_NAME).unwrap().as_deref(),
            Some("Foo")
        );
        assert!(service.has_property(&p, &PROJECT_NAME).unwrap());
    }

    #[test]
    fn blank_values_read_as_absent() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");

        service.set_property(&p, &PROJECT_NAME, "").unwrap();
        assert_eq!(service.get_property(&p, &PROJECT_NAME).unwrap(), None);

        service.set_property(&p, &PROJECT_NAME, " \t ").unwrap();
        assert_eq!(service.get_property(&p, &PROJECT_NAME).unwrap(), None);
        // Presence is reported as-is; only reads normalize.
        assert!(service.has_property(&p, &PROJECT_NAME).unwrap());
    }

    #[test]
    fn values_are_stripped() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");

        service.set_property(&p, &FORGE, "  maven \n").unwrap();
        assert_eq!(
            service.get_property(&p, &FORGE).unwrap().as_deref(),
            Some("maven")
        );
    }

    #[test]
    fn integer_accessor_parses_and_propagates_errors() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");

        assert_eq!(
            service.get_property_as_integer(&p, &HIGH_VULNERABILITIES).unwrap(),
            None
        );

        service.set_property(&p, &HIGH_VULNERABILITIES, " 12 ").unwrap();
        assert_eq!(
            service.get_property_as_integer(&p, &HIGH_VULNERABILITIES).unwrap(),
            Some(12)
        );

        service.set_property(&p, &HIGH_VULNERABILITIES, "twelve").unwrap();
        let err = service
            .get_property_as_integer(&p, &HIGH_VULNERABILITIES)
            .unwrap_err();
        assert!(matches!(err, BlackDuckError::Parse { ref value, .. } if value == "twelve"));
    }

    #[test]
    fn date_round_trip_at_pattern_precision() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");
        let date = Utc
            .with_ymd_and_hms(2021, 7, 4, 12, 30, 15)
            .unwrap()
            .with_nanosecond(250_999_999)
            .unwrap();

        service.set_property_from_date(&p, &SCAN_TIME, &date).unwrap();
        let read = service.get_date_from_property(&p, &SCAN_TIME).unwrap().unwrap();
        assert_eq!(read, date.with_nanosecond(250_000_000).unwrap());
    }

    #[test]
    fn malformed_date_is_surfaced() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");

        service.set_property(&p, &SCAN_TIME, "not a date").unwrap();
        let err = service.get_date_from_property(&p, &SCAN_TIME).unwrap_err();
        assert!(matches!(err, BlackDuckError::DateFormat { .. }));
    }

    #[test]
    fn date_without_zone_leaves_companion_untouched() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");
        store
            .set_property(&p, SCAN_TIME.time_name, "earlier value")
            .unwrap();

        service
            .set_property_from_date(&p, &SCAN_TIME, &Utc::now())
            .unwrap();

        assert_eq!(
            store.get_property(&p, SCAN_TIME.time_name).unwrap().as_deref(),
            Some("earlier value")
        );
    }

    #[test]
    fn date_with_zone_writes_companion() {
        let store = InMemoryPropertyStore::new();
        let service = zoned_service(&store);
        let p = path("repo/a.jar");
        let date = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();

        service.set_property_from_date(&p, &SCAN_TIME, &date).unwrap();

        assert_eq!(
            store.get_property(&p, SCAN_TIME.name).unwrap().as_deref(),
            Some("2021-01-01T00:00:00.000")
        );
        assert_eq!(
            store.get_property(&p, SCAN_TIME.time_name).unwrap().as_deref(),
            Some("2021-01-01T09:00:00.000")
        );
    }

    #[test]
    fn delete_removes_name_and_companion_and_is_idempotent() {
        let store = InMemoryPropertyStore::new();
        let service = zoned_service(&store);
        let p = path("repo/a.jar");
        service
            .set_property_from_date(&p, &SCAN_TIME, &Utc::now())
            .unwrap();

        service.delete_property(&p, &SCAN_TIME).unwrap();
        assert!(!store.has_property(&p, SCAN_TIME.name).unwrap());
        assert!(!store.has_property(&p, SCAN_TIME.time_name).unwrap());

        service.delete_property(&p, &SCAN_TIME).unwrap();
    }

    #[test]
    fn project_name_version_requires_both_halves() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");

        assert_eq!(service.get_project_name_version(&p).unwrap(), None);

        service.set_property(&p, &PROJECT_NAME, "Foo").unwrap();
        assert_eq!(service.get_project_name_version(&p).unwrap(), None);

        service.set_property(&p, &PROJECT_VERSION_NAME, "  ").unwrap();
        assert_eq!(service.get_project_name_version(&p).unwrap(), None);

        service.set_property(&p, &PROJECT_VERSION_NAME, "1.0").unwrap();
        assert_eq!(
            service.get_project_name_version(&p).unwrap(),
            Some(NameVersion::new("Foo", "1.0"))
        );
    }

    #[test]
    fn items_containing_properties_is_a_deduplicated_union() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        service.set_property(&path("repo/a"), &ORIGIN_ID, "x").unwrap();
        service.set_property(&path("repo/b"), &FORGE, "maven").unwrap();
        service.set_property(&path("repo/c"), &ORIGIN_ID, "y").unwrap();
        service.set_property(&path("repo/c"), &FORGE, "npmjs").unwrap();
        service.set_property(&path("repo/d"), &PROJECT_NAME, "z").unwrap();
        service.set_property(&path("other/e"), &FORGE, "maven").unwrap();

        let found = service
            .get_items_containing_properties("repo", &[&ORIGIN_ID, &FORGE])
            .unwrap();
        assert_eq!(found, vec![path("repo/a"), path("repo/b"), path("repo/c")]);
    }

    #[test]
    fn items_containing_values_passes_query_through() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        service.set_property(&path("one/a"), &FORGE, "maven").unwrap();
        service.set_property(&path("two/b"), &FORGE, "maven").unwrap();
        service.set_property(&path("two/c"), &FORGE, "npmjs").unwrap();

        let mut query = PropertyQuery::new();
        query.insert(FORGE.name.to_string(), BTreeSet::from(["maven".to_string()]));
        let found = service
            .get_items_containing_properties_and_values(&query, &["one", "two"])
            .unwrap();
        assert_eq!(found, vec![path("one/a"), path("two/b")]);
    }

    #[test]
    fn empty_query_finds_nothing() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        service.set_property(&path("repo/a"), &FORGE, "maven").unwrap();

        assert!(service
            .get_items_containing_properties("repo", &[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn path_cleanup_respects_exclusions() {
        let store = InMemoryPropertyStore::new();
        let service = zoned_service(&store);
        let p = path("repo/a.jar");
        service.set_property(&p, &PROJECT_NAME, "Foo").unwrap();
        store
            .set_property(&p, PROJECT_NAME.time_name, "companion")
            .unwrap();
        service.set_property(&p, &PROJECT_VERSION_NAME, "1.0").unwrap();
        service
            .set_property_from_date(&p, &SCAN_TIME, &Utc::now())
            .unwrap();

        service
            .delete_all_blackduck_properties_from_repo_path(&p, &exclude(&[PROJECT_NAME.name]))
            .unwrap();

        let remaining = store.properties(&p);
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains_key(PROJECT_NAME.name));
        assert!(remaining.contains_key(PROJECT_NAME.time_name));
    }

    #[test]
    fn exclusion_never_matches_time_names() {
        let store = InMemoryPropertyStore::new();
        let service = zoned_service(&store);
        let p = path("repo/a.jar");
        service
            .set_property_from_date(&p, &SCAN_TIME, &Utc::now())
            .unwrap();

        service
            .delete_all_blackduck_properties_from_repo_path(&p, &exclude(&[SCAN_TIME.time_name]))
            .unwrap();

        assert!(store.properties(&p).is_empty());
    }

    #[test]
    fn missing_or_empty_exclusion_deletes_everything() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");

        service.set_property(&p, &PROJECT_NAME, "Foo").unwrap();
        service
            .delete_all_blackduck_properties_from_repo_path(&p, &CleanupParams::new())
            .unwrap();
        assert!(store.properties(&p).is_empty());

        service.set_property(&p, &PROJECT_NAME, "Foo").unwrap();
        service
            .delete_all_blackduck_properties_from_repo_path(&p, &exclude(&[]))
            .unwrap();
        assert!(store.properties(&p).is_empty());

        let mut unrelated = CleanupParams::new();
        unrelated.insert("repos".to_string(), vec![PROJECT_NAME.name.to_string()]);
        service.set_property(&p, &PROJECT_NAME, "Foo").unwrap();
        service
            .delete_all_blackduck_properties_from_repo_path(&p, &unrelated)
            .unwrap();
        assert!(store.properties(&p).is_empty());
    }

    #[test]
    fn cleanup_leaves_foreign_properties_alone() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        let p = path("repo/a.jar");
        store.set_property(&p, "build.number", "42").unwrap();
        service.set_property(&p, &FORGE, "maven").unwrap();

        service
            .delete_all_blackduck_properties_from_repo_path(&p, &CleanupParams::new())
            .unwrap();

        assert_eq!(store.properties(&p).len(), 1);
        assert!(store.has_property(&p, "build.number").unwrap());
    }

    #[test]
    fn repo_cleanup_visits_each_tagged_path_once() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        service.set_property(&path("repo/a"), &PROJECT_NAME, "Foo").unwrap();
        service.set_property(&path("repo/a"), &FORGE, "maven").unwrap();
        service.set_property(&path("repo/b"), &SCAN_TIME, "x").unwrap();
        service.set_property(&path("other/c"), &FORGE, "maven").unwrap();

        let visited = service
            .delete_all_blackduck_properties_from_repo("repo", &CleanupParams::new())
            .unwrap();

        assert_eq!(visited, 2);
        assert!(store.properties(&path("repo/a")).is_empty());
        assert!(store.properties(&path("repo/b")).is_empty());
        assert_eq!(store.properties(&path("other/c")).len(), 1);
    }

    #[test]
    fn store_failures_propagate() {
        let store = InMemoryPropertyStore::new();
        let service = service(&store);
        store.set_simulate_failure(true);

        let p = path("repo/a");
        assert!(service.get_property(&p, &FORGE).is_err());
        assert!(service.set_property(&p, &FORGE, "maven").is_err());
        assert!(service.delete_property(&p, &FORGE).is_err());
        assert!(service
            .delete_all_blackduck_properties_from_repo("repo", &CleanupParams::new())
            .is_err());
    }
}
