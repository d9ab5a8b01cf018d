//! Deciding whether an artifact needs a (re)scan.

use crate::error::Result;
use crate::model::RepoPath;
use crate::properties::vocabulary::SCAN_TIME;
use crate::properties::PropertyService;
use crate::store::PropertyStore;
use chrono::{DateTime, Utc};
use log::{error, warn};

/// Whether `path`, last modified at `last_modified`, should be scanned now.
///
/// Artifacts older than a configured `cutoff` (in the date pattern) are never
/// scanned. Otherwise an artifact is scanned when it has no scan time yet or
/// was modified since. A scan time that no longer parses forces a rescan.
pub fn should_scan_now<S: PropertyStore>(
    service: &PropertyService<S>,
    path: &RepoPath,
    last_modified: &DateTime<Utc>,
    cutoff: Option<&str>,
) -> Result<bool> {
    let date_time = service.date_time();
    let last_modified = last_modified.timestamp_millis();

    if let Some(cutoff) = cutoff.map(str::trim).filter(|cutoff| !cutoff.is_empty()) {
        match date_time.time_from_string(cutoff) {
            Ok(cutoff_time) if last_modified < cutoff_time => {
                warn!(
                    "{} was not scanned because the cutoff was set and the artifact is too old",
                    path
                );
                return Ok(false);
            }
            Ok(_) => {}
            Err(e) => error!(
                "The pattern {} does not match the cutoff date {}: {}",
                date_time.pattern(),
                cutoff,
                e
            ),
        }
    }

    let Some(scan_time) = service.get_property(path, &SCAN_TIME)? else {
        return Ok(true);
    };

    match date_time.time_from_string(&scan_time) {
        Ok(scanned_at) => Ok(last_modified >= scanned_at),
        Err(e) => {
            error!("Could not parse the scan time of {}, rescanning: {}", path, e);
            Ok(true)
        }
    }
}
