//! Aggregation properties over realistic record sets

mod common;
use chart_builder::aggregation::{
    ConsumptionRecord, Dimension, Granularity, aggregate, aggregate_by, period_start,
};
use chrono::NaiveDate;
use common::record;
use std::collections::HashMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn mixed_records() -> Vec<ConsumptionRecord> {
    vec![
        record("2022-12-31", "AWS", 100.0),
        record("2023-01-01", "AWS", 1.5),
        record("2023-01-01", "GCP", 2.0),
        record("2023-02-14", "AWS", 3.0),
        record("2023-03-31", "Azure", 4.0),
        record("2023-04-01", "Azure", 5.0),
        record("2023-07-19T08:00:00Z", "GCP", 6.0),
        record("2023-10-02", "AWS", 7.25),
        record("2023-12-31", "GCP", 8.0),
        record("2024-01-01", "AWS", 100.0),
        record("not-a-date", "AWS", 100.0),
    ]
}

#[test]
fn test_every_record_lands_in_one_bucket() {
    let records = mixed_records();
    let (from, to) = (date(2023, 1, 1), date(2023, 12, 31));

    for granularity in [
        Granularity::Day,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ] {
        let result = aggregate(&records, granularity, from, to);

        let mut expected: HashMap<(String, String), f64> = HashMap::new();
        for r in &records {
            let Some(d) = r.calendar_date() else { continue };
            if d < from || d > to {
                continue;
            }
            *expected
                .entry((r.provider_name.clone(), granularity.bucket_key(d)))
                .or_insert(0.0) += r.consumption;
        }

        let mut actual: HashMap<(String, String), f64> = HashMap::new();
        for series in &result.series {
            for value in &series.aggregated_values {
                let previous = actual.insert(
                    (series.provider.clone(), value.time_period.clone()),
                    value.total_consumption,
                );
                assert!(previous.is_none(), "duplicate bucket for {}", series.provider);
            }
        }

        assert_eq!(actual, expected, "sums differ for {}", granularity);
        assert_eq!(result.skipped.len(), 1);
    }
}

#[test]
fn test_buckets_are_ordered_by_start_date() {
    let records = vec![
        record("2024-02-01", "AWS", 1.0),
        record("2022-11-15", "AWS", 1.0),
        record("2023-05-05", "AWS", 1.0),
        record("2023-01-20", "AWS", 1.0),
    ];
    let (from, to) = (date(2020, 1, 1), date(2025, 1, 1));

    for granularity in [
        Granularity::Day,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ] {
        let result = aggregate(&records, granularity, from, to);
        let starts: Vec<NaiveDate> = result.series[0]
            .aggregated_values
            .iter()
            .map(|v| period_start(&v.time_period).unwrap())
            .collect();
        assert!(
            starts.windows(2).all(|w| w[0] <= w[1]),
            "{} buckets out of order: {:?}",
            granularity,
            starts
        );
    }

    let quarters = aggregate(&records, Granularity::Quarter, from, to);
    let periods: Vec<&str> = quarters.series[0]
        .aggregated_values
        .iter()
        .map(|v| v.time_period.as_str())
        .collect();
    assert_eq!(periods, vec!["2022-Q4", "2023-Q1", "2023-Q2", "2024-Q1"]);
}

#[test]
fn test_range_bounds_are_inclusive() {
    let records = vec![
        record("2023-03-31", "AWS", 1.0),
        record("2023-04-01", "AWS", 2.0),
        record("2023-06-30", "AWS", 4.0),
        record("2023-07-01", "AWS", 8.0),
    ];

    let result = aggregate(&records, Granularity::Year, date(2023, 4, 1), date(2023, 6, 30));

    assert_eq!(result.series.len(), 1);
    assert_eq!(result.series[0].aggregated_values[0].total_consumption, 6.0);
}

#[test]
fn test_providers_are_sorted_and_separate() {
    let result = aggregate(
        &mixed_records(),
        Granularity::Year,
        date(2023, 1, 1),
        date(2023, 12, 31),
    );
    let providers: Vec<&str> = result.series.iter().map(|s| s.provider.as_str()).collect();
    assert_eq!(providers, vec!["AWS", "Azure", "GCP"]);
    assert_eq!(result.series[0].aggregated_values[0].total_consumption, 11.75);
    assert_eq!(result.series[2].aggregated_values[0].total_consumption, 16.0);
}

#[test]
fn test_empty_records() {
    let result = aggregate(&[], Granularity::Month, date(2023, 1, 1), date(2023, 12, 31));
    assert!(result.series.is_empty());
}

#[test]
fn test_negative_consumption_is_summed() {
    let records = vec![record("2023-01-01", "AWS", 5.0), record("2023-01-02", "AWS", -8.0)];
    let result = aggregate(&records, Granularity::Month, date(2023, 1, 1), date(2023, 1, 31));
    assert_eq!(result.series[0].aggregated_values[0].total_consumption, -3.0);
}

#[test]
fn test_group_by_region_with_unknown_key() {
    let mut eu = record("2023-01-01", "AWS", 1.0);
    eu.region = Some("AWS-eu-west-1".to_string());
    let unknown = record("2023-01-02", "AWS", 2.0);

    let result = aggregate_by(
        &[eu, unknown],
        Dimension::Region,
        Granularity::Month,
        date(2023, 1, 1),
        date(2023, 1, 31),
    );

    let keys: Vec<&str> = result.series.iter().map(|s| s.provider.as_str()).collect();
    assert_eq!(keys, vec!["AWS-eu-west-1", "Unknown"]);
}

#[test]
fn test_output_serializes_in_wire_format() {
    let records = vec![record("2023-01-05", "AWS", 10.0), record("2023-02-10", "AWS", 5.0)];
    let result = aggregate(&records, Granularity::Month, date(2023, 1, 1), date(2023, 12, 31));

    assert_eq!(
        serde_json::to_value(&result.series).unwrap(),
        serde_json::json!([{
            "provider": "AWS",
            "aggregatedValues": [
                {"timePeriod": "2023-01", "totalConsumption": 10.0},
                {"timePeriod": "2023-02", "totalConsumption": 5.0}
            ]
        }])
    );
}
