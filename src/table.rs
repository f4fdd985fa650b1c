//! Sortable, paginated table view of aggregated series

use crate::aggregation::{AggregatedSeries, compare_periods};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

pub const DEFAULT_ROWS_PER_PAGE: usize = 5;

/// One table row: a single bucket of a single provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub time_period: String,
    pub provider: String,
    pub total_consumption: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    #[default]
    TimePeriod,
    Provider,
    TotalConsumption,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "timeperiod" => Ok(SortColumn::TimePeriod),
            "provider" => Ok(SortColumn::Provider),
            "totalconsumption" => Ok(SortColumn::TotalConsumption),
            _ => Err(format!("Unknown sort column: {}", s)),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// Active sort of the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSort {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl TableSort {
    /// Sort requested from a column header.
    ///
    /// Requesting the column that is already sorted ascending flips it to
    /// descending; anything else sorts ascending by the requested column.
    pub fn request(self, column: SortColumn) -> Self {
        let order = if self.column == column && self.order == SortOrder::Asc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        Self { column, order }
    }

    fn compare(&self, a: &TableRow, b: &TableRow) -> Ordering {
        let ordering = match self.column {
            SortColumn::TimePeriod => compare_periods(&a.time_period, &b.time_period),
            SortColumn::TotalConsumption => a.total_consumption.total_cmp(&b.total_consumption),
            SortColumn::Provider => a
                .provider
                .to_lowercase()
                .cmp(&b.provider.to_lowercase()),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// A page of rows plus the information needed to render pagination controls
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePage {
    pub rows: Vec<TableRow>,
    pub page: usize,
    pub rows_per_page: usize,
    pub total: usize,
    pub sort: TableSort,
}

impl TablePage {
    pub fn empty(rows_per_page: usize, sort: TableSort) -> Self {
        Self {
            rows: Vec::new(),
            page: 0,
            rows_per_page,
            total: 0,
            sort,
        }
    }

    pub fn page_count(&self) -> usize {
        if self.rows_per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.rows_per_page)
        }
    }
}

/// Flatten series into one row per bucket
pub fn flatten(series: &[AggregatedSeries]) -> Vec<TableRow> {
    series
        .iter()
        .flat_map(|s| {
            s.aggregated_values.iter().map(|v| TableRow {
                time_period: v.time_period.clone(),
                provider: s.provider.clone(),
                total_consumption: v.total_consumption,
            })
        })
        .collect()
}

/// Stable sort of rows
pub fn sort_rows(rows: &mut [TableRow], sort: TableSort) {
    rows.sort_by(|a, b| sort.compare(a, b));
}

/// Sort and slice rows into the requested page
pub fn paginate(mut rows: Vec<TableRow>, sort: TableSort, page: usize, rows_per_page: usize) -> TablePage {
    let total = rows.len();
    sort_rows(&mut rows, sort);

    let start = page.saturating_mul(rows_per_page).min(total);
    let end = start.saturating_add(rows_per_page).min(total);

    TablePage {
        rows: rows.drain(start..end).collect(),
        page,
        rows_per_page,
        total,
        sort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::BucketTotal;

    fn row(period: &str, provider: &str, total: f64) -> TableRow {
        TableRow {
            time_period: period.to_string(),
            provider: provider.to_string(),
            total_consumption: total,
        }
    }

    #[test]
    fn test_flatten() {
        let series = vec![AggregatedSeries {
            provider: "AWS".to_string(),
            budget: None,
            aggregated_values: vec![
                BucketTotal {
                    time_period: "2023-01".to_string(),
                    total_consumption: 1.0,
                },
                BucketTotal {
                    time_period: "2023-02".to_string(),
                    total_consumption: 2.0,
                },
            ],
        }];

        let rows = flatten(&series);
        assert_eq!(rows, vec![row("2023-01", "AWS", 1.0), row("2023-02", "AWS", 2.0)]);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("totalConsumption".parse::<SortColumn>(), Ok(SortColumn::TotalConsumption));
        assert_eq!("time_period".parse::<SortColumn>(), Ok(SortColumn::TimePeriod));
        assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("size".parse::<SortColumn>().is_err());
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_request_toggles() {
        let sort = TableSort::default();
        let flipped = sort.request(SortColumn::TimePeriod);
        assert_eq!(flipped.order, SortOrder::Desc);

        let back = flipped.request(SortColumn::TimePeriod);
        assert_eq!(back.order, SortOrder::Asc);

        let other = flipped.request(SortColumn::Provider);
        assert_eq!(other.column, SortColumn::Provider);
        assert_eq!(other.order, SortOrder::Asc);
    }

    #[test]
    fn test_sort_by_time_period_uses_dates() {
        let mut rows = vec![
            row("2023-Q1", "AWS", 1.0),
            row("2022-Q4", "AWS", 2.0),
            row("2022-Q2", "GCP", 3.0),
        ];
        sort_rows(&mut rows, TableSort::default());
        let periods: Vec<&str> = rows.iter().map(|r| r.time_period.as_str()).collect();
        assert_eq!(periods, vec!["2022-Q2", "2022-Q4", "2023-Q1"]);
    }

    #[test]
    fn test_sort_by_consumption_descending() {
        let mut rows = vec![row("2023", "a", 2.0), row("2023", "b", 10.0), row("2023", "c", 5.0)];
        sort_rows(
            &mut rows,
            TableSort {
                column: SortColumn::TotalConsumption,
                order: SortOrder::Desc,
            },
        );
        let totals: Vec<f64> = rows.iter().map(|r| r.total_consumption).collect();
        assert_eq!(totals, vec![10.0, 5.0, 2.0]);
    }

    #[test]
    fn test_sort_by_provider_ignores_case() {
        let mut rows = vec![row("2023", "gcp", 1.0), row("2023", "AWS", 1.0), row("2023", "Azure", 1.0)];
        sort_rows(
            &mut rows,
            TableSort {
                column: SortColumn::Provider,
                order: SortOrder::Asc,
            },
        );
        let providers: Vec<&str> = rows.iter().map(|r| r.provider.as_str()).collect();
        assert_eq!(providers, vec!["AWS", "Azure", "gcp"]);
    }

    #[test]
    fn test_paginate() {
        let rows: Vec<TableRow> = (1..=12)
            .map(|d| row(&format!("2023-01-{:02}", d), "AWS", d as f64))
            .collect();

        let first = paginate(rows.clone(), TableSort::default(), 0, 5);
        assert_eq!(first.rows.len(), 5);
        assert_eq!(first.total, 12);
        assert_eq!(first.page_count(), 3);
        assert_eq!(first.rows[0].time_period, "2023-01-01");

        let last = paginate(rows.clone(), TableSort::default(), 2, 5);
        assert_eq!(last.rows.len(), 2);
        assert_eq!(last.rows[1].time_period, "2023-01-12");

        let beyond = paginate(rows, TableSort::default(), 7, 5);
        assert!(beyond.rows.is_empty());
        assert_eq!(beyond.total, 12);
    }
}
