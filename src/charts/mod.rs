//! Chart option builders
//!
//! Translates aggregated series into ECharts option objects. Every chart kind
//! has its own builder; dispatch happens over the closed [`ChartType`] enum.

pub mod options;

use crate::aggregation::{AggregatedSeries, Dimension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use options::build_options;

pub const DEFAULT_TITLE: &str = "Cloud Provider Chart";

/// Chart errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Unsupported chart type: {0}")]
    UnsupportedChartType(String),
}

pub type ChartResult<T> = Result<T, ChartError>;

/// Supported chart kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Pie,
    Treemap,
    Area,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Treemap => "treemap",
            ChartType::Area => "area",
        }
    }

    /// Line, bar and area charts share a category time axis
    pub fn is_cartesian(&self) -> bool {
        matches!(self, ChartType::Line | ChartType::Bar | ChartType::Area)
    }
}

impl FromStr for ChartType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            "treemap" | "tree_map" => Ok(ChartType::Treemap),
            "area" => Ok(ChartType::Area),
            _ => Err(ChartError::UnsupportedChartType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ChartType {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChartType> for String {
    fn from(value: ChartType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation settings of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub dimension: Dimension,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            title: DEFAULT_TITLE.to_string(),
            x_axis: None,
            y_axis: None,
            dimension: Dimension::CloudProvider,
        }
    }
}

/// ECharts option object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartOptions(pub Value);

impl ChartOptions {
    /// Options without any series
    pub fn is_empty(&self) -> bool {
        self.0
            .get("series")
            .and_then(Value::as_array)
            .is_none_or(|series| series.is_empty())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Convenience wrapper that parses the chart kind before building
pub fn build_options_for(
    chart_type: &str,
    title: &str,
    dimension: Dimension,
    series: &[AggregatedSeries],
) -> ChartResult<ChartOptions> {
    let spec = ChartSpec {
        chart_type: chart_type.parse()?,
        title: title.to_string(),
        dimension,
        ..Default::default()
    };
    Ok(build_options(&spec, series))
}
