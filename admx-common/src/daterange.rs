//! Inclusive report date windows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An inclusive [since, until] day window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl DateRange {
    /// Build a validated range (until must not precede since)
    pub fn new(since: NaiveDate, until: NaiveDate) -> Result<Self> {
        if until < since {
            return Err(Error::InvalidInput(format!(
                "invalid date range: until {} precedes since {}",
                until, since
            )));
        }
        Ok(Self { since, until })
    }

    /// Parse from a pair of "YYYY-MM-DD" strings
    pub fn parse(since: &str, until: &str) -> Result<Self> {
        let since = NaiveDate::parse_from_str(since, "%Y-%m-%d")
            .map_err(|e| Error::InvalidInput(format!("invalid since date '{}': {}", since, e)))?;
        let until = NaiveDate::parse_from_str(until, "%Y-%m-%d")
            .map_err(|e| Error::InvalidInput(format!("invalid until date '{}': {}", until, e)))?;
        Self::new(since, until)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.since <= date && date <= self.until
    }

    /// Number of days in the window (inclusive)
    pub fn num_days(&self) -> i64 {
        (self.until - self.since).num_days() + 1
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.since, self.until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_valid() {
        let range = DateRange::parse("2024-05-01", "2024-05-07").unwrap();
        assert_eq!(range.num_days(), 7);
        assert!(range.contains(d("2024-05-01")));
        assert!(range.contains(d("2024-05-07")));
        assert!(!range.contains(d("2024-05-08")));
    }

    #[test]
    fn test_parse_rejects_inverted() {
        assert!(DateRange::parse("2024-05-07", "2024-05-01").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DateRange::parse("yesterday", "2024-05-01").is_err());
    }

    #[test]
    fn test_single_day() {
        let range = DateRange::parse("2024-05-01", "2024-05-01").unwrap();
        assert_eq!(range.num_days(), 1);
    }
}
