//! Consumption aggregation
//!
//! Buckets flat consumption records by provider (or another dimension) and by
//! a time granularity, summing consumption per bucket.

pub mod aggregator;
pub mod dimension;
pub mod granularity;
pub mod records;

pub use aggregator::{aggregate, aggregate_by};
pub use dimension::{Dimension, UNKNOWN_KEY};
pub use granularity::{Granularity, compare_periods, period_start};
pub use records::{AggregatedSeries, Aggregation, BucketTotal, ConsumptionRecord, SkippedRecord};
