//! Dashboard persistence API
//!
//! Wire types and an HTTP client for the external dashboard service that
//! stores chart layouts and chart configurations per user.

pub mod client;

use crate::aggregation::{Dimension, Granularity};
use crate::charts::ChartType;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

pub use client::{ClientError, ClientResult, DashboardClient};

/// Maximum display value meaning "no limit"
pub const MAX_DISPLAY_ALL: &str = "All";

/// Position and size of a chart on the dashboard grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Persisted configuration of one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartInfo {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: StoredChartType,
    #[serde(default = "default_x_axis")]
    pub x_axis: String,
    #[serde(default = "default_y_axis")]
    pub y_axis: String,
    #[serde(default = "default_dimension")]
    pub dimension: String,
    #[serde(default)]
    pub group_by: Granularity,
    #[serde(default = "default_max_display")]
    pub max_display: String,
}

/// Chart type as stored by the dashboard service. Types this crate cannot
/// render are kept verbatim so one bad chart does not spoil the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredChartType {
    Supported(ChartType),
    Unsupported(String),
}

impl StoredChartType {
    pub fn supported(&self) -> Option<ChartType> {
        match self {
            StoredChartType::Supported(chart_type) => Some(*chart_type),
            StoredChartType::Unsupported(_) => None,
        }
    }
}

impl From<ChartType> for StoredChartType {
    fn from(value: ChartType) -> Self {
        StoredChartType::Supported(value)
    }
}

impl PartialEq<ChartType> for StoredChartType {
    fn eq(&self, other: &ChartType) -> bool {
        self.supported() == Some(*other)
    }
}

fn default_x_axis() -> String {
    "time".to_string()
}

fn default_y_axis() -> String {
    "value".to_string()
}

fn default_dimension() -> String {
    "Account".to_string()
}

fn default_max_display() -> String {
    MAX_DISPLAY_ALL.to_string()
}

impl ChartInfo {
    /// Chart info with the defaults the dashboard service expects
    pub fn new(title: impl Into<String>, chart_type: ChartType, group_by: Granularity) -> Self {
        Self {
            title: title.into(),
            chart_type: chart_type.into(),
            x_axis: default_x_axis(),
            y_axis: default_y_axis(),
            dimension: default_dimension(),
            group_by,
            max_display: default_max_display(),
        }
    }
}

/// Layout part of an add/update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for DashboardInfo {
    fn default() -> Self {
        Self {
            id: None,
            x: 0,
            y: 0,
            width: 6,
            height: 4,
        }
    }
}

/// Body of add and update calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub dashboard_info: DashboardInfo,
    pub chart_info: ChartInfo,
}

impl ChartRequest {
    /// Request for a new chart; a chart id is generated when none is given
    pub fn for_new_chart(chart_info: ChartInfo, chart_id: Option<String>) -> Self {
        Self {
            dashboard_info: DashboardInfo {
                id: Some(chart_id.unwrap_or_else(generate_chart_id)),
                ..Default::default()
            },
            chart_info,
        }
    }

    /// Request for an existing chart, keeping the default layout
    pub fn for_update(chart_info: ChartInfo) -> Self {
        Self {
            dashboard_info: DashboardInfo::default(),
            chart_info,
        }
    }
}

/// `chart<unix millis>`
pub fn generate_chart_id() -> String {
    format!("chart{}", Utc::now().timestamp_millis())
}

/// A user's dashboard: layout order plus chart configurations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub dashboard_order: Vec<LayoutItem>,
    #[serde(default)]
    pub charts: HashMap<String, ChartInfo>,
}

/// A laid-out chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTile<'a> {
    pub layout: &'a LayoutItem,
    pub chart: &'a ChartInfo,
    pub chart_type: ChartType,
}

impl Dashboard {
    /// Charts in layout order. Layout entries without a chart, or whose chart
    /// type is unsupported, are skipped.
    pub fn tiles(&self) -> Vec<DashboardTile<'_>> {
        self.dashboard_order
            .iter()
            .filter_map(|layout| {
                let Some(chart) = self.charts.get(&layout.id) else {
                    warn!("Dashboard layout references unknown chart {}", layout.id);
                    return None;
                };
                match &chart.chart_type {
                    StoredChartType::Supported(chart_type) => Some(DashboardTile {
                        layout,
                        chart,
                        chart_type: *chart_type,
                    }),
                    StoredChartType::Unsupported(kind) => {
                        warn!("Skipping chart {} with unsupported type '{}'", layout.id, kind);
                        None
                    }
                }
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dashboard_order.is_empty()
    }
}

/// Query of the server-side filter endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct FilterQuery {
    pub dimension: Dimension,
    pub group_by: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub max_display: String,
}

impl FilterQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("dimension", self.dimension.to_string()),
            ("groupBy", self.group_by.to_string()),
            ("from", self.from.format("%Y-%m-%d").to_string()),
            ("to", self.to.format("%Y-%m-%d").to_string()),
            ("maxDisplay", self.max_display.clone()),
        ]
    }
}
