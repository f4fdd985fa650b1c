use crate::{
    aggregation::Granularity,
    builder::{ChartBuilderState, ChartView},
    error::AppError,
    server::AppState,
    table::{SortColumn, SortOrder, TableSort},
};
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Create chart builder preview routes
pub fn create_chart_builder_routes() -> Router<AppState> {
    Router::new().route("/api/chart-builder/view", get(get_chart_view))
}

/// Query parameters mirroring the chart builder panel
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartViewQuery {
    pub chart_type: Option<String>,
    pub title: Option<String>,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub group_by: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub max_display: Option<String>,
    pub dimension: Option<String>,
    /// Comma separated provider names
    pub providers: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub rows_per_page: Option<String>,
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!("{} must be a YYYY-MM-DD date, got '{}'", field, value))
    })
}

fn parse_count(field: &str, value: &str) -> Result<usize, AppError> {
    value.trim().parse().map_err(|_| {
        AppError::BadRequest(format!("{} must be a non-negative integer, got '{}'", field, value))
    })
}

impl ChartViewQuery {
    /// Build the builder state, falling back to defaults for absent parameters
    pub fn into_state(self, default_rows_per_page: usize) -> Result<ChartBuilderState, AppError> {
        let mut state = ChartBuilderState {
            rows_per_page: default_rows_per_page,
            ..Default::default()
        };

        if let Some(chart_type) = self.chart_type {
            state.chart_type = chart_type.parse()?;
        }
        if let Some(title) = self.title {
            state.title = title;
        }
        if let Some(x_axis) = self.x_axis {
            state.x_axis = x_axis;
        }
        if let Some(y_axis) = self.y_axis {
            state.y_axis = y_axis;
        }
        if let Some(group_by) = self.group_by {
            state.group_by = Granularity::from(group_by.as_str());
        }
        if let Some(from) = self.from {
            state.from = parse_date("from", &from)?;
        }
        if let Some(to) = self.to {
            state.to = parse_date("to", &to)?;
        }
        if let Some(max_display) = self.max_display {
            state.max_display = max_display.parse()?;
        }
        if let Some(dimension) = self.dimension {
            state.dimension = dimension.parse().map_err(AppError::BadRequest)?;
        }
        if let Some(providers) = self.providers {
            state.providers = Some(
                providers
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }
        let column: SortColumn = match self.sort_by {
            Some(column) => column.parse().map_err(AppError::BadRequest)?,
            None => SortColumn::default(),
        };
        let order: SortOrder = match self.order {
            Some(order) => order.parse().map_err(AppError::BadRequest)?,
            None => SortOrder::default(),
        };
        state.sort = TableSort { column, order };
        if let Some(page) = self.page {
            state.page = parse_count("page", &page)?;
        }
        if let Some(rows_per_page) = self.rows_per_page {
            state.rows_per_page = parse_count("rowsPerPage", &rows_per_page)?;
        }

        state.validate()?;
        Ok(state)
    }
}

/// Render chart options and the table page for the requested configuration
async fn get_chart_view(
    State(state): State<AppState>,
    Query(params): Query<ChartViewQuery>,
) -> Result<Json<ChartView>, AppError> {
    let builder_state = params.into_state(state.config.table.rows_per_page)?;
    let view = state.builder.render(&builder_state).await;
    Ok(Json(view))
}
