use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Bucket size used when grouping records by time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Granularity {
    #[default]
    Day,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// Derive the bucket key for a calendar date
    pub fn bucket_key(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Quarter => format!("{:04}-Q{}", date.year(), quarter_of(date)),
            Granularity::Year => format!("{:04}", date.year()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }
}

impl From<&str> for Granularity {
    /// Unknown values fall back to `Day`.
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" => Granularity::Month,
            "quarter" | "quarterly" => Granularity::Quarter,
            "year" | "yearly" | "annual" => Granularity::Year,
            _ => Granularity::Day,
        }
    }
}

impl From<String> for Granularity {
    fn from(value: String) -> Self {
        Granularity::from(value.as_str())
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Parse a bucket key back into the first day of the period it represents.
///
/// Recognizes `YYYY-MM-DD`, `YYYY-MM`, `YYYY-QN` and `YYYY`.
pub fn period_start(time_period: &str) -> Option<NaiveDate> {
    let period = time_period.trim();

    if let Some((year, quarter)) = period.split_once("-Q") {
        let year: i32 = year.parse().ok()?;
        let quarter: u32 = quarter.parse().ok()?;
        if !(1..=4).contains(&quarter) {
            return None;
        }
        return NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1);
    }

    match period.len() {
        10 => NaiveDate::parse_from_str(period, "%Y-%m-%d").ok(),
        7 => {
            let (year, month) = period.split_once('-')?;
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        4 => NaiveDate::from_ymd_opt(period.parse().ok()?, 1, 1),
        _ => None,
    }
}

/// Order two bucket keys by the date they represent.
///
/// Keys that cannot be parsed sort after parsable ones, then by plain string order.
pub fn compare_periods(a: &str, b: &str) -> Ordering {
    match (period_start(a), period_start(b)) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bucket_keys() {
        let d = date(2023, 11, 5);
        assert_eq!(Granularity::Day.bucket_key(d), "2023-11-05");
        assert_eq!(Granularity::Month.bucket_key(d), "2023-11");
        assert_eq!(Granularity::Quarter.bucket_key(d), "2023-Q4");
        assert_eq!(Granularity::Year.bucket_key(d), "2023");
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(Granularity::Quarter.bucket_key(date(2024, 1, 1)), "2024-Q1");
        assert_eq!(Granularity::Quarter.bucket_key(date(2024, 3, 31)), "2024-Q1");
        assert_eq!(Granularity::Quarter.bucket_key(date(2024, 4, 1)), "2024-Q2");
        assert_eq!(Granularity::Quarter.bucket_key(date(2024, 9, 30)), "2024-Q3");
        assert_eq!(Granularity::Quarter.bucket_key(date(2024, 12, 31)), "2024-Q4");
    }

    #[test]
    fn test_unknown_granularity_falls_back_to_day() {
        assert_eq!(Granularity::from("week"), Granularity::Day);
        assert_eq!(Granularity::from(""), Granularity::Day);
        assert_eq!(Granularity::from("Quarter"), Granularity::Quarter);
        assert_eq!(Granularity::from(" YEAR "), Granularity::Year);
    }

    #[test]
    fn test_granularity_deserializes_lossily() {
        let g: Granularity = serde_json::from_str("\"fortnight\"").unwrap();
        assert_eq!(g, Granularity::Day);
        let g: Granularity = serde_json::from_str("\"month\"").unwrap();
        assert_eq!(g, Granularity::Month);
    }

    #[test]
    fn test_period_start() {
        assert_eq!(period_start("2023-02-10"), Some(date(2023, 2, 10)));
        assert_eq!(period_start("2023-02"), Some(date(2023, 2, 1)));
        assert_eq!(period_start("2023-Q3"), Some(date(2023, 7, 1)));
        assert_eq!(period_start("2023"), Some(date(2023, 1, 1)));
        assert_eq!(period_start("2023-Q5"), None);
        assert_eq!(period_start("not a date"), None);
    }

    #[test]
    fn test_compare_periods_across_years() {
        assert_eq!(compare_periods("2022-Q4", "2023-Q1"), Ordering::Less);
        assert_eq!(compare_periods("2023-12", "2023-02"), Ordering::Greater);
        assert_eq!(compare_periods("2023", "garbage"), Ordering::Less);
    }
}
