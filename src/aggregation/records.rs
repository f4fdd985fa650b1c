use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single consumption sample as delivered by the fixture or the data API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    /// Calendar date, `YYYY-MM-DD` or an RFC 3339 timestamp. `None` when the
    /// field is missing or null.
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub provider_name: String,
    /// NaN when the value is not a number
    #[serde(default, deserialize_with = "lenient_consumption")]
    pub consumption: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl ConsumptionRecord {
    pub fn new(date: impl Into<String>, provider_name: impl Into<String>, consumption: f64) -> Self {
        Self {
            date: Some(date.into()),
            provider_name: provider_name.into(),
            consumption,
            region: None,
            account: None,
            service: None,
            financial_domain: None,
            budget: None,
        }
    }

    /// Calendar date of the record, if the `date` field can be parsed
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_record_date)
    }
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(date) => Some(date),
        other => Some(other.to_string()),
    })
}

fn lenient_consumption<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

pub(crate) fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Total consumption of one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTotal {
    pub time_period: String,
    pub total_consumption: f64,
}

/// Buckets of one provider (or dimension key), ordered by represented date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSeries {
    #[serde(alias = "key")]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default)]
    pub aggregated_values: Vec<BucketTotal>,
}

impl AggregatedSeries {
    pub fn total(&self) -> f64 {
        self.aggregated_values
            .iter()
            .map(|v| v.total_consumption)
            .sum()
    }
}

/// A record that was left out of an aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// Position in the input slice
    pub index: usize,
    pub date: String,
    pub reason: String,
}

/// Result of an aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub series: Vec<AggregatedSeries>,
    pub skipped: Vec<SkippedRecord>,
}

impl Aggregation {
    pub fn into_series(self) -> Vec<AggregatedSeries> {
        self.series
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
