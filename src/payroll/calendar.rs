//! Month keys and inclusive date ranges.
//!
//! Plain calendar dates carry no timezone, so stepping a range one day at a time
//! never drifts across DST boundaries.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display(fmt = "{:04}-{:02}", year, month)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month `{0}`, expected YYYY-MM")]
pub struct InvalidMonth(pub String);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| MonthKey { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Validated on construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }
}

impl FromStr for MonthKey {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive `[start, end]` range of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days, both ends included.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |day| {
            day.checked_add_days(Days::new(1)).filter(|next| *next <= end)
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_key_parses_and_prints() {
        let key: MonthKey = "2024-02".parse().unwrap();
        assert_eq!(key.to_string(), "2024-02");
        assert_eq!(key.first_day(), d(2024, 2, 1));
        assert_eq!(key.last_day(), d(2024, 2, 29));
        assert!(key.contains(d(2024, 2, 15)));
        assert!(!key.contains(d(2024, 3, 1)));
    }

    #[test]
    fn december_ends_on_the_31st() {
        let key: MonthKey = "2023-12".parse().unwrap();
        assert_eq!(key.last_day(), d(2023, 12, 31));
        assert_eq!(key.range().len(), 31);
    }

    #[test]
    fn malformed_months_are_rejected() {
        for raw in ["2024-13", "2024-1", "24-01", "2024/01", "", "abcd-ef"] {
            assert!(raw.parse::<MonthKey>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn month_key_round_trips_through_json() {
        let key: MonthKey = serde_json::from_str("\"2024-03\"").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-03\"");
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let range = DateRange::new(d(2024, 3, 10), d(2024, 3, 12)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(days, vec![d(2024, 3, 10), d(2024, 3, 11), d(2024, 3, 12)]);
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn range_crosses_month_and_leap_day() {
        let range = DateRange::new(d(2024, 2, 28), d(2024, 3, 1)).unwrap();
        assert_eq!(range.days().count(), 3);
    }

    #[test]
    fn single_day_range() {
        let range = DateRange::new(d(2024, 3, 10), d(2024, 3, 10)).unwrap();
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn reversed_range_is_refused() {
        assert!(DateRange::new(d(2024, 3, 12), d(2024, 3, 10)).is_none());
    }
}
