//! Chart builder view
//!
//! Combines a data source, the chart option builders and the table into the
//! data behind the chart-builder page: one configuration value in, chart
//! options plus a table page out.

use crate::aggregation::{AggregatedSeries, Dimension, Granularity, UNKNOWN_KEY};
use crate::charts::{ChartOptions, ChartSpec, ChartType, DEFAULT_TITLE, build_options, options::empty_options};
use crate::dashboard::{ChartInfo, ChartRequest, MAX_DISPLAY_ALL};
use crate::error::AppError;
use crate::source::{SeriesQuery, SeriesSource};
use crate::table::{self, TablePage, TableSort};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// How many series to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaxDisplay {
    #[default]
    All,
    /// Keep the series with the largest total consumption
    Limit(usize),
}

impl FromStr for MaxDisplay {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(MaxDisplay::All);
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n > 0 => Ok(MaxDisplay::Limit(n)),
            _ => Err(AppError::BadRequest(format!(
                "maxDisplay must be 'all' or a positive integer, got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for MaxDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDisplay::All => f.write_str(MAX_DISPLAY_ALL),
            MaxDisplay::Limit(n) => write!(f, "{}", n),
        }
    }
}

impl MaxDisplay {
    pub fn apply(&self, mut series: Vec<AggregatedSeries>) -> Vec<AggregatedSeries> {
        let MaxDisplay::Limit(limit) = *self else {
            return series;
        };
        if series.len() <= limit {
            return series;
        }

        let mut ranked: Vec<(usize, f64)> = series.iter().map(|s| s.total()).enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let keep: BTreeSet<usize> = ranked.into_iter().take(limit).map(|(i, _)| i).collect();

        let mut index = 0;
        series.retain(|_| {
            let kept = keep.contains(&index);
            index += 1;
            kept
        });
        series
    }
}

/// Outcome of loading data: distinguishes "nothing to show" from "failed"
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Fetched<T> {
    Data(T),
    Empty,
    Failed(String),
}

impl<T> Fetched<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Fetched::Failed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Fetched::Data(data) => Some(data),
            _ => None,
        }
    }
}

impl Fetched<Vec<AggregatedSeries>> {
    pub fn from_result(result: Result<Vec<AggregatedSeries>, AppError>) -> Self {
        match result {
            Ok(series) if series.is_empty() => Fetched::Empty,
            Ok(series) => Fetched::Data(series),
            Err(e) => Fetched::Failed(e.to_string()),
        }
    }
}

/// Provider part of a series name: everything before the first `-`
pub fn provider_prefix(name: &str) -> &str {
    let prefix = name.split('-').next().unwrap_or_default();
    if prefix.is_empty() { UNKNOWN_KEY } else { prefix }
}

/// Distinct providers of the series, in order of first appearance
pub fn available_providers(series: &[AggregatedSeries]) -> Vec<String> {
    let mut providers: Vec<String> = Vec::new();
    for s in series {
        let provider = provider_prefix(&s.provider);
        if !providers.iter().any(|p| p == provider) {
            providers.push(provider.to_string());
        }
    }
    providers
}

/// Keep series whose provider prefix is selected
pub fn filter_by_providers(series: Vec<AggregatedSeries>, selected: &[String]) -> Vec<AggregatedSeries> {
    series
        .into_iter()
        .filter(|s| {
            let provider = provider_prefix(&s.provider);
            selected.iter().any(|p| p == provider)
        })
        .collect()
}

/// Everything the chart-builder page lets a user configure
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBuilderState {
    pub chart_type: ChartType,
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub group_by: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub max_display: MaxDisplay,
    pub dimension: Dimension,
    /// `None` selects every available provider
    pub providers: Option<Vec<String>>,
    pub sort: TableSort,
    pub page: usize,
    pub rows_per_page: usize,
}

impl Default for ChartBuilderState {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            title: DEFAULT_TITLE.to_string(),
            x_axis: "time".to_string(),
            y_axis: "consumption".to_string(),
            group_by: Granularity::Day,
            from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            to: Local::now().date_naive(),
            max_display: MaxDisplay::All,
            dimension: Dimension::CloudProvider,
            providers: None,
            sort: TableSort::default(),
            page: 0,
            rows_per_page: table::DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl ChartBuilderState {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.from > self.to {
            return Err(AppError::BadRequest(format!(
                "from date {} is after to date {}",
                self.from, self.to
            )));
        }
        if self.rows_per_page == 0 {
            return Err(AppError::BadRequest("rowsPerPage must be positive".to_string()));
        }
        Ok(())
    }

    fn query(&self) -> SeriesQuery {
        SeriesQuery {
            dimension: self.dimension,
            group_by: self.group_by,
            from: self.from,
            to: self.to,
            max_display: self.max_display.to_string(),
        }
    }

    fn chart_spec(&self) -> ChartSpec {
        ChartSpec {
            chart_type: self.chart_type,
            title: self.title.clone(),
            x_axis: Some(self.x_axis.clone()),
            y_axis: Some(self.y_axis.clone()),
            dimension: self.dimension,
        }
    }

    /// Chart configuration as persisted by the dashboard service
    pub fn chart_info(&self) -> ChartInfo {
        ChartInfo {
            title: self.title.clone(),
            chart_type: self.chart_type.into(),
            x_axis: self.x_axis.clone(),
            y_axis: self.y_axis.clone(),
            dimension: self.dimension.to_string(),
            group_by: self.group_by,
            max_display: self.max_display.to_string(),
        }
    }
}

/// Rendered chart-builder page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub status: Fetched<usize>,
    pub options: ChartOptions,
    pub table: TablePage,
    pub available_providers: Vec<String>,
    pub selected_providers: Vec<String>,
    pub show_provider_filter: bool,
}

pub struct ChartBuilder {
    source: Arc<dyn SeriesSource>,
}

impl ChartBuilder {
    pub fn new(source: Arc<dyn SeriesSource>) -> Self {
        Self { source }
    }

    pub async fn render(&self, state: &ChartBuilderState) -> ChartView {
        let loaded = Fetched::from_result(self.source.load(&state.query()).await);
        let show_provider_filter = state.dimension.supports_provider_filter();

        let series = match loaded {
            Fetched::Data(series) => state.max_display.apply(series),
            Fetched::Empty => Vec::new(),
            Fetched::Failed(message) => {
                error!("Failed to load chart data from {} source: {}", self.source.name(), message);
                return ChartView {
                    status: Fetched::Failed(message),
                    options: empty_options(&state.title),
                    table: TablePage::empty(state.rows_per_page, state.sort),
                    available_providers: Vec::new(),
                    selected_providers: Vec::new(),
                    show_provider_filter,
                };
            }
        };

        let available = available_providers(&series);
        let selected = match &state.providers {
            Some(selected) if show_provider_filter => selected.clone(),
            _ => available.clone(),
        };
        let series = if show_provider_filter {
            filter_by_providers(series, &selected)
        } else {
            series
        };

        if series.is_empty() {
            warn!("No data for {} chart '{}'", state.chart_type, state.title);
        }

        let options = build_options(&state.chart_spec(), &series);
        let table = table::paginate(
            table::flatten(&series),
            state.sort,
            state.page,
            state.rows_per_page,
        );
        let status = if series.is_empty() {
            Fetched::Empty
        } else {
            Fetched::Data(series.len())
        };

        info!(
            "Rendered {} chart with {} series and {} table rows",
            state.chart_type,
            series.len(),
            table.total
        );

        ChartView {
            status,
            options,
            table,
            available_providers: available,
            selected_providers: selected,
            show_provider_filter,
        }
    }

    /// Request that saves the current chart to the dashboard
    pub fn chart_request(state: &ChartBuilderState, chart_id: Option<String>) -> ChartRequest {
        ChartRequest::for_new_chart(state.chart_info(), chart_id)
    }
}
