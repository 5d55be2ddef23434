//! UTC instants for domain records.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A point in time, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Year component for `QC-SAM-YYYY-NNNNN` style numbers.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Review due dates; negative values move backwards.
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn year_reads_calendar_year() {
        assert_eq!(at(2026, 3, 1).year(), 2026);
    }

    #[test]
    fn plus_days_crosses_year_boundary() {
        let due = at(2026, 12, 29).plus_days(5);
        assert_eq!(due, at(2027, 1, 3));
        assert_eq!(due.year(), 2027);
        assert_eq!(due.plus_days(-5), at(2026, 12, 29));
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let encoded = serde_json::to_value(at(2026, 5, 4)).unwrap();
        assert_eq!(encoded, serde_json::json!("2026-05-04T12:00:00Z"));
    }
}
