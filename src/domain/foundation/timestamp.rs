//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Shifts the timestamp by a signed duration.
    pub fn plus(&self, duration: Duration) -> Self {
        Self(self.0 + duration)
    }

    /// Shifts the timestamp back by a signed duration.
    pub fn minus(&self, duration: Duration) -> Self {
        Self(self.0 - duration)
    }

    pub fn plus_minutes(&self, minutes: i64) -> Self {
        self.plus(Duration::minutes(minutes))
    }

    pub fn plus_hours(&self, hours: i64) -> Self {
        self.plus(Duration::hours(hours))
    }

    pub fn plus_days(&self, days: i64) -> Self {
        self.plus(Duration::days(days))
    }

    /// Returns this instant as seen from the given UTC offset.
    pub fn in_offset(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.0.with_timezone(&offset)
    }

    /// Returns the `[start, end)` bounds of the local calendar day containing
    /// this instant, for a business running at `offset`.
    pub fn local_day_bounds(&self, offset: FixedOffset) -> (Timestamp, Timestamp) {
        let local_date = self.in_offset(offset).date_naive();
        let start = local_midnight(local_date, offset);
        (start, start.plus_days(1))
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Timestamp {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    // Fixed offsets have no gaps, so the local midnight always exists.
    let utc = naive - Duration::seconds(offset.local_minus_utc() as i64);
    Timestamp(utc.and_utc())
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}
