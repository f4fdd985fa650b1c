use super::dimension::Dimension;
use super::granularity::{Granularity, period_start};
use super::records::{AggregatedSeries, Aggregation, BucketTotal, ConsumptionRecord, SkippedRecord};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Running totals for one series
#[derive(Debug, Default)]
struct SeriesData {
    buckets: HashMap<String, f64>,
    budget: Option<f64>,
}

impl SeriesData {
    fn add(&mut self, bucket: String, consumption: f64) {
        let total = self.buckets.entry(bucket).or_insert(0.0);
        if consumption.is_finite() {
            *total += consumption;
        }
    }

    fn add_budget(&mut self, budget: f64) {
        if budget.is_finite() {
            *self.budget.get_or_insert(0.0) += budget;
        }
    }

    fn into_series(self, key: String) -> AggregatedSeries {
        let mut values: Vec<(Option<NaiveDate>, BucketTotal)> = self
            .buckets
            .into_iter()
            .map(|(time_period, total)| {
                let start = period_start(&time_period);
                let total_consumption = if total.is_finite() { total } else { 0.0 };
                (
                    start,
                    BucketTotal {
                        time_period,
                        total_consumption,
                    },
                )
            })
            .collect();

        // Quarter keys are re-parsed to their first day so ordering never
        // depends on the string format of the bucket.
        values.sort_by(|(a_start, a), (b_start, b)| match (a_start, b_start) {
            (Some(x), Some(y)) => x.cmp(y).then_with(|| a.time_period.cmp(&b.time_period)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.time_period.cmp(&b.time_period),
        });

        AggregatedSeries {
            provider: key,
            budget: self.budget,
            aggregated_values: values.into_iter().map(|(_, v)| v).collect(),
        }
    }
}

/// Group records by provider and time bucket, summing consumption.
///
/// Only records whose calendar date lies in `[from, to]` are kept. Records
/// whose date cannot be parsed are reported in [`Aggregation::skipped`].
pub fn aggregate(
    records: &[ConsumptionRecord],
    granularity: Granularity,
    from: NaiveDate,
    to: NaiveDate,
) -> Aggregation {
    aggregate_by(records, Dimension::CloudProvider, granularity, from, to)
}

/// Same as [`aggregate`], grouping by an arbitrary dimension
pub fn aggregate_by(
    records: &[ConsumptionRecord],
    dimension: Dimension,
    granularity: Granularity,
    from: NaiveDate,
    to: NaiveDate,
) -> Aggregation {
    let mut grouped: BTreeMap<String, SeriesData> = BTreeMap::new();
    let mut skipped = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Some(date) = record.calendar_date() else {
            let reason = if record.date.is_some() {
                "unparsable date"
            } else {
                "missing date"
            };
            skipped.push(SkippedRecord {
                index,
                date: record.date.clone().unwrap_or_default(),
                reason: reason.to_string(),
            });
            continue;
        };

        if date < from || date > to {
            continue;
        }

        let data = grouped
            .entry(dimension.key_of(record).to_string())
            .or_default();
        data.add(granularity.bucket_key(date), record.consumption);

        if dimension.tracks_budget() {
            if let Some(budget) = record.budget {
                data.add_budget(budget);
            }
        }
    }

    if !skipped.is_empty() {
        warn!(
            "Skipped {} of {} records without a usable date",
            skipped.len(),
            records.len()
        );
    }

    let series: Vec<AggregatedSeries> = grouped
        .into_iter()
        .map(|(key, data)| data.into_series(key))
        .collect();

    debug!(
        "Aggregated {} records into {} {} series by {}",
        records.len(),
        series.len(),
        dimension,
        granularity
    );

    Aggregation { series, skipped }
}
