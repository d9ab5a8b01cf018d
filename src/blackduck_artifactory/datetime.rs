//! Date/time conversion for date-typed properties.
//!
//! Dates are always stored in UTC using the configured pattern. When a time zone
//! is configured, a second "converted" rendering in that zone is produced for
//! display; without one there is no converted form.

use crate::error::{BlackDuckError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

pub const DEFAULT_DATE_TIME_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeManager {
    pattern: String,
    time_zone: Option<Tz>,
}

impl Default for DateTimeManager {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_TIME_PATTERN.to_string(),
            time_zone: None,
        }
    }
}

impl DateTimeManager {
    /// Validates `pattern` and resolves `time_zone` (an IANA name such as
    /// `Europe/Berlin`). A blank zone means no converted rendering.
    pub fn new(pattern: &str, time_zone: Option<&str>) -> Result<Self> {
        validate_pattern(pattern)?;

        let time_zone = match time_zone.map(str::trim).filter(|zone| !zone.is_empty()) {
            Some(zone) => Some(zone.parse::<Tz>().map_err(|err| {
                BlackDuckError::InvalidTimeZone {
                    zone: zone.to_string(),
                    message: err.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            pattern: pattern.to_string(),
            time_zone,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn time_zone(&self) -> Option<Tz> {
        self.time_zone
    }

    /// Canonical stored form of `date`, rendered in UTC.
    pub fn date_to_string(&self, date: &DateTime<Utc>) -> String {
        date.format(&self.pattern).to_string()
    }

    /// Secondary rendering in the configured zone, if one is configured.
    pub fn date_to_converted_string(&self, date: &DateTime<Utc>) -> Option<String> {
        self.time_zone
            .map(|zone| date.with_timezone(&zone).format(&self.pattern).to_string())
    }

    /// Parses a stored value as a UTC wall-clock time.
    ///
    /// Date-only patterns resolve to midnight.
    pub fn string_to_date(&self, value: &str) -> Result<DateTime<Utc>> {
        match NaiveDateTime::parse_from_str(value, &self.pattern) {
            Ok(naive) => Ok(naive.and_utc()),
            Err(datetime_err) => NaiveDate::parse_from_str(value, &self.pattern)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
                .ok_or_else(|| BlackDuckError::DateFormat {
                    value: value.to_string(),
                    pattern: self.pattern.clone(),
                    source: datetime_err,
                }),
        }
    }

    /// Epoch milliseconds of a stored value.
    pub fn time_from_string(&self, value: &str) -> Result<i64> {
        Ok(self.string_to_date(value)?.timestamp_millis())
    }
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.trim().is_empty() {
        return Err(BlackDuckError::InvalidDatePattern(
            "pattern cannot be empty".to_string(),
        ));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(BlackDuckError::InvalidDatePattern(pattern.to_string()));
    }
    Ok(())
}
