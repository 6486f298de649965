use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar month used for time decay and sliding windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Accepts `YYYY-MM` or anything starting with `YYYY-MM-DD`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let head = trimmed.get(..7)?;
        let date = NaiveDate::parse_from_str(&format!("{head}-01"), "%Y-%m-%d").ok()?;
        if trimmed.len() > 7 {
            let full = trimmed.get(..10)?;
            NaiveDate::parse_from_str(full, "%Y-%m-%d").ok()?;
        }
        Some(Self::from_date(date))
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(index: i64) -> Self {
        let year = index.div_euclid(12) as i32;
        let month = index.rem_euclid(12) as u32 + 1;
        Self { year, month }
    }

    pub fn shift(self, delta: i64) -> Self {
        Self::from_index(self.index() + delta)
    }

    /// Whole months from `self` to `later`; negative when `later` precedes `self`.
    pub fn months_until(self, later: YearMonth) -> i64 {
        later.index() - self.index()
    }

    /// Inclusive range; empty when `end` precedes `start`.
    pub fn range(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
        let span = start.months_until(end);
        if span < 0 {
            return Vec::new();
        }
        (0..=span).map(|offset| start.shift(offset)).collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_month_and_date_forms() {
        assert_eq!(YearMonth::parse("2025-03"), YearMonth::new(2025, 3));
        assert_eq!(YearMonth::parse("2025-03-17"), YearMonth::new(2025, 3));
        assert_eq!(YearMonth::parse("2025-13"), None);
        assert_eq!(YearMonth::parse("March"), None);
        assert_eq!(YearMonth::parse("2025-02-31"), None);
    }

    #[test]
    fn shift_crosses_year_boundaries() {
        let january = YearMonth::new(2025, 1).expect("valid");
        assert_eq!(january.shift(-1).to_string(), "2024-12");
        assert_eq!(january.shift(-13).to_string(), "2023-12");
        assert_eq!(january.shift(12).to_string(), "2026-01");
    }

    #[test]
    fn range_is_inclusive_and_ordered() {
        let start = YearMonth::new(2024, 11).expect("valid");
        let end = YearMonth::new(2025, 2).expect("valid");
        let labels: Vec<String> = YearMonth::range(start, end)
            .into_iter()
            .map(|month| month.to_string())
            .collect();
        assert_eq!(labels, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert!(YearMonth::range(end, start).is_empty());
    }
}
