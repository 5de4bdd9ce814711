//! Lightweight cron expression parser.
//!
//! Supports `MIN HOUR DOM MON DOW` (5 fields, no seconds). Each field accepts
//! `*`, `*/N`, `N`, `A-B`, `A-B/N` and comma lists of those. Day-of-week 0
//! and 7 are both Sunday. When both day-of-month and day-of-week are
//! restricted a day matching either one fires, as in classic cron.
//!
//! Schedules are evaluated in a fixed UTC offset. The business runs in
//! Asia/Colombo, which has no daylight saving.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::foundation::Timestamp;

/// Upper bound on search steps; a valid schedule always fires well within
/// four years (Feb 29 is the rarest day).
const MAX_SEARCH_STEPS: u32 = 200_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("Invalid cron expression '{expression}': need 5 fields (MIN HOUR DOM MON DOW)")]
    FieldCount { expression: String },

    #[error("Invalid cron field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl CronError {
    fn field(field: &str, reason: impl Into<String>) -> Self {
        CronError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Set of allowed values for one field, as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldSet {
    bits: u64,
    any: bool,
}

impl FieldSet {
    fn contains(&self, value: u32) -> bool {
        self.bits & (1u64 << value) != 0
    }

    fn parse(field: &str, min: u32, max: u32) -> Result<Self, CronError> {
        let mut bits = 0u64;
        for item in field.split(',') {
            bits |= Self::parse_item(field, item.trim(), min, max)?;
        }
        Ok(Self {
            bits,
            any: field == "*",
        })
    }

    fn parse_item(field: &str, item: &str, min: u32, max: u32) -> Result<u64, CronError> {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| CronError::field(field, format!("bad step '{}'", step)))?;
                if step == 0 {
                    return Err(CronError::field(field, "step must be positive"));
                }
                (range, step)
            }
            None => (item, 1),
        };

        let (start, end) = if range == "*" {
            (min, max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(field, a, min, max)?, parse_value(field, b, min, max)?)
        } else {
            let v = parse_value(field, range, min, max)?;
            // "N/step" runs from N to the end of the field
            if step > 1 {
                (v, max)
            } else {
                (v, v)
            }
        };

        if start > end {
            return Err(CronError::field(field, format!("range {}-{} is reversed", start, end)));
        }

        Ok((start..=end)
            .step_by(step as usize)
            .fold(0u64, |acc, v| acc | (1u64 << v)))
    }
}

fn parse_value(field: &str, raw: &str, min: u32, max: u32) -> Result<u32, CronError> {
    let v: u32 = raw
        .parse()
        .map_err(|_| CronError::field(field, format!("'{}' is not a number", raw)))?;
    if v < min || v > max {
        return Err(CronError::field(
            field,
            format!("{} is outside {}-{}", v, min, max),
        ));
    }
    Ok(v)
}

/// A parsed cron schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    minutes: FieldSet,
    hours: FieldSet,
    days_of_month: FieldSet,
    months: FieldSet,
    days_of_week: FieldSet,
}

impl FromStr for CronSchedule {
    type Err = CronError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        let [min, hour, dom, mon, dow] = parts.as_slice() else {
            return Err(CronError::FieldCount {
                expression: expression.to_string(),
            });
        };

        let mut days_of_week = FieldSet::parse(dow, 0, 7)?;
        // Fold 7 onto Sunday.
        if days_of_week.contains(7) {
            days_of_week.bits = (days_of_week.bits & !(1u64 << 7)) | 1;
        }

        Ok(Self {
            expression: parts.join(" "),
            minutes: FieldSet::parse(min, 0, 59)?,
            hours: FieldSet::parse(hour, 0, 23)?,
            days_of_month: FieldSet::parse(dom, 1, 31)?,
            months: FieldSet::parse(mon, 1, 12)?,
            days_of_week,
        })
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl CronSchedule {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.days_of_month.contains(date.day());
        let dow = self
            .days_of_week
            .contains(date.weekday().num_days_from_sunday());
        match (self.days_of_month.any, self.days_of_week.any) {
            (true, true) => true,
            (true, false) => dow,
            (false, true) => dom,
            (false, false) => dom || dow,
        }
    }

    /// First fire time strictly after `after`, evaluated in `offset`.
    ///
    /// Returns `None` for schedules that can never fire (e.g. Feb 31).
    pub fn next_after(&self, after: Timestamp, offset: FixedOffset) -> Option<Timestamp> {
        let local = after.in_offset(offset).naive_local();
        let mut candidate = local.with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);

        for _ in 0..MAX_SEARCH_STEPS {
            if !self.months.contains(candidate.month()) {
                candidate = first_of_next_month(candidate.date())?;
                continue;
            }
            if !self.day_matches(candidate.date()) {
                candidate = candidate.date().succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.hours.contains(candidate.hour()) {
                candidate = candidate.with_minute(0)? + Duration::hours(1);
                continue;
            }
            if !self.minutes.contains(candidate.minute()) {
                candidate += Duration::minutes(1);
                continue;
            }
            let utc = candidate - Duration::seconds(offset.local_minus_utc() as i64);
            return Some(Timestamp::from_datetime(utc.and_utc()));
        }
        None
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
    }

    fn colombo() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn utc0() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn schedule(expr: &str) -> CronSchedule {
        expr.parse().unwrap()
    }

    #[test]
    fn every_five_minutes() {
        let next = schedule("*/5 * * * *").next_after(utc(2026, 2, 22, 10, 2), utc0());
        assert_eq!(next, Some(utc(2026, 2, 22, 10, 5)));
    }

    #[test]
    fn next_is_strictly_after_a_matching_instant() {
        let next = schedule("*/5 * * * *").next_after(utc(2026, 2, 22, 10, 5), utc0());
        assert_eq!(next, Some(utc(2026, 2, 22, 10, 10)));
    }

    #[test]
    fn six_am_colombo_is_half_past_midnight_utc() {
        let next = schedule("0 6 * * *").next_after(utc(2026, 3, 1, 12, 0), colombo());
        assert_eq!(next, Some(utc(2026, 3, 2, 0, 30)));
    }

    #[test]
    fn midnight_colombo_is_previous_evening_utc() {
        let next = schedule("0 0 * * *").next_after(utc(2026, 3, 1, 12, 0), colombo());
        assert_eq!(next, Some(utc(2026, 3, 1, 18, 30)));
    }

    #[test]
    fn hour_rollover_into_next_day() {
        let next = schedule("30 1 * * *").next_after(utc(2026, 12, 31, 23, 45), utc0());
        assert_eq!(next, Some(utc(2027, 1, 1, 1, 30)));
    }

    #[test]
    fn ranges_and_lists() {
        let s = schedule("0,30 9-17 * * 1-5");
        // Saturday 2026-02-21 -> Monday 09:00
        assert_eq!(s.next_after(utc(2026, 2, 21, 12, 0), utc0()), Some(utc(2026, 2, 23, 9, 0)));
        // Monday 17:30 -> Tuesday 09:00
        assert_eq!(s.next_after(utc(2026, 2, 23, 17, 30), utc0()), Some(utc(2026, 2, 24, 9, 0)));
    }

    #[test]
    fn sunday_as_seven() {
        let s = schedule("0 8 * * 7");
        // 2026-02-22 is a Sunday
        assert_eq!(s.next_after(utc(2026, 2, 20, 0, 0), utc0()), Some(utc(2026, 2, 22, 8, 0)));
    }

    #[test]
    fn restricted_dom_and_dow_match_either() {
        // 1st of month or any Monday
        let s = schedule("0 0 1 * 1");
        // 2026-02-24 is a Tuesday; next Monday is 03-02, but 03-01 comes first
        assert_eq!(s.next_after(utc(2026, 2, 24, 0, 0), utc0()), Some(utc(2026, 3, 1, 0, 0)));
    }

    #[test]
    fn month_restriction_skips_ahead() {
        let s = schedule("0 0 29 2 *");
        assert_eq!(s.next_after(utc(2026, 3, 1, 0, 0), utc0()), Some(utc(2028, 2, 29, 0, 0)));
    }

    #[test]
    fn impossible_dates_never_fire() {
        assert_eq!(schedule("0 0 31 2 *").next_after(utc(2026, 1, 1, 0, 0), utc0()), None);
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(matches!("bad".parse::<CronSchedule>(), Err(CronError::FieldCount { .. })));
        assert!("60 * * * *".parse::<CronSchedule>().is_err());
        assert!("*/0 * * * *".parse::<CronSchedule>().is_err());
        assert!("5-1 * * * *".parse::<CronSchedule>().is_err());
        assert!("* * 0 * *".parse::<CronSchedule>().is_err());
        assert!("a * * * *".parse::<CronSchedule>().is_err());
    }

    #[test]
    fn display_normalizes_whitespace() {
        assert_eq!(schedule("  0   6 * * * ").to_string(), "0 6 * * *");
    }
}
