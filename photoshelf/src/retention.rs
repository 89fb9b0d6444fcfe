use std::fmt;

use thiserror::Error;
use time::{Duration, OffsetDateTime};

// A year counts as 52 weeks here, not a calendar year.
const WEEKS_PER_YEAR: i64 = 52;

#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("unrecognized retention unit `{0}` (expected day, week, or year)")]
    InvalidUnit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionUnit {
    Day,
    Week,
    Year,
}

/// How long assets stay in the local library before they become eligible
/// for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPeriod {
    value: u32,
    unit: RetentionUnit,
}

impl RetentionPeriod {
    pub fn new(value: u32, unit: &str) -> Result<Self, RetentionError> {
        let unit = match unit {
            "day" => RetentionUnit::Day,
            "week" => RetentionUnit::Week,
            "year" => RetentionUnit::Year,
            other => return Err(RetentionError::InvalidUnit(other.to_string())),
        };
        Ok(Self { value, unit })
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn unit(&self) -> RetentionUnit {
        self.unit
    }

    /// Absolute length of the retention window.
    pub fn duration(&self) -> Duration {
        let value = i64::from(self.value);
        match self.unit {
            RetentionUnit::Day => Duration::days(value),
            RetentionUnit::Week => Duration::weeks(value),
            RetentionUnit::Year => Duration::weeks(value * WEEKS_PER_YEAR),
        }
    }

    /// Cutoff instant for a run starting at `now`. Assets created strictly
    /// before it are eligible for deletion.
    pub fn cutoff_from(&self, now: OffsetDateTime) -> OffsetDateTime {
        now - self.duration()
    }
}

impl fmt::Display for RetentionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            RetentionUnit::Day => "day",
            RetentionUnit::Week => "week",
            RetentionUnit::Year => "year",
        };
        if self.value == 1 {
            write!(f, "1 {unit}")
        } else {
            write!(f, "{} {unit}s", self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_and_weeks_convert_directly() {
        let days = RetentionPeriod::new(30, "day").unwrap();
        assert_eq!(days.duration(), Duration::days(30));

        let weeks = RetentionPeriod::new(3, "week").unwrap();
        assert_eq!(weeks.duration(), Duration::weeks(3));
    }

    #[test]
    fn years_are_exactly_fifty_two_weeks() {
        let period = RetentionPeriod::new(2, "year").unwrap();
        assert_eq!(period.duration(), Duration::weeks(104));
        assert_ne!(period.duration(), Duration::days(730));
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let err = RetentionPeriod::new(1, "month").unwrap_err();
        assert!(matches!(err, RetentionError::InvalidUnit(unit) if unit == "month"));
    }

    #[test]
    fn cutoff_is_now_minus_duration() {
        let period = RetentionPeriod::new(30, "day").unwrap();
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(100);
        assert_eq!(
            period.cutoff_from(now),
            OffsetDateTime::UNIX_EPOCH + Duration::days(70)
        );
    }

    #[test]
    fn display_pluralizes() {
        assert_eq!(RetentionPeriod::new(30, "day").unwrap().to_string(), "30 days");
        assert_eq!(RetentionPeriod::new(1, "year").unwrap().to_string(), "1 year");
    }
}
