use super::{ChartOptions, ChartSpec, ChartType};
use crate::aggregation::{AggregatedSeries, Dimension, compare_periods};
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_X_AXIS_NAME: &str = "Time";
const DEFAULT_Y_AXIS_NAME: &str = "Consumption";

/// Build chart options for the given series
pub fn build_options(spec: &ChartSpec, series: &[AggregatedSeries]) -> ChartOptions {
    if series.is_empty() {
        debug!("No series to chart, returning empty {} options", spec.chart_type);
        return empty_options(&spec.title);
    }

    let options = match spec.chart_type {
        ChartType::Bar if spec.dimension == Dimension::FinancialDomain => {
            budget_bar_options(spec, series)
        }
        ChartType::Line | ChartType::Bar | ChartType::Area => cartesian_options(spec, series),
        ChartType::Pie => pie_options(spec, series),
        ChartType::Treemap => treemap_options(spec, series),
    };

    ChartOptions(options)
}

/// Options rendered when there is nothing to show
pub fn empty_options(title: &str) -> ChartOptions {
    ChartOptions(json!({
        "title": { "text": title, "left": "center" },
        "tooltip": {},
        "xAxis": { "type": "category", "data": [] },
        "yAxis": { "type": "value" },
        "series": []
    }))
}

/// Union of all time periods, ordered by the date they represent
fn all_time_periods(series: &[AggregatedSeries]) -> Vec<String> {
    let mut periods: Vec<String> = series
        .iter()
        .flat_map(|s| s.aggregated_values.iter().map(|v| v.time_period.clone()))
        .collect();
    periods.sort_by(|a, b| compare_periods(a, b));
    periods.dedup();
    periods
}

fn axis_name(name: &Option<String>, default: &str) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n.clone(),
        _ => default.to_string(),
    }
}

fn title_block(title: &str) -> Value {
    json!({ "text": title, "left": "center" })
}

fn cartesian_options(spec: &ChartSpec, series: &[AggregatedSeries]) -> Value {
    let periods = all_time_periods(series);
    let is_area = spec.chart_type == ChartType::Area;
    let is_bar = spec.chart_type == ChartType::Bar;

    let series_data: Vec<Value> = series
        .iter()
        .map(|s| {
            let by_period: HashMap<&str, f64> = s
                .aggregated_values
                .iter()
                .map(|v| (v.time_period.as_str(), v.total_consumption))
                .collect();
            let values: Vec<f64> = periods
                .iter()
                .map(|p| by_period.get(p.as_str()).copied().unwrap_or(0.0))
                .collect();

            let mut entry = json!({
                "name": s.provider,
                "type": if is_bar { "bar" } else { "line" },
                "data": values,
                "smooth": !is_bar,
                "symbol": "circle",
                "symbolSize": 8,
                "connectNulls": true
            });
            if is_area {
                entry["areaStyle"] = json!({});
            }
            if is_bar {
                entry["stack"] = json!("total");
            }
            entry
        })
        .collect();

    let legend: Vec<&str> = series.iter().map(|s| s.provider.as_str()).collect();

    json!({
        "title": title_block(&spec.title),
        "tooltip": { "trigger": "axis", "axisPointer": { "type": "shadow" } },
        "legend": { "data": legend, "top": "bottom" },
        "grid": { "left": "10%", "right": "10%", "bottom": "15%", "containLabel": true },
        "xAxis": {
            "type": "category",
            "data": periods,
            "name": axis_name(&spec.x_axis, DEFAULT_X_AXIS_NAME)
        },
        "yAxis": { "type": "value", "name": axis_name(&spec.y_axis, DEFAULT_Y_AXIS_NAME) },
        "series": series_data
    })
}

fn pie_options(spec: &ChartSpec, series: &[AggregatedSeries]) -> Value {
    let slices: Vec<Value> = series
        .iter()
        .map(|s| json!({ "name": s.provider, "value": s.total() }))
        .collect();

    json!({
        "title": title_block(&spec.title),
        "tooltip": { "trigger": "item", "formatter": "{b}: {c} ({d}%)" },
        "legend": { "orient": "vertical", "left": "left" },
        "series": [{
            "name": axis_name(&spec.y_axis, DEFAULT_Y_AXIS_NAME),
            "type": "pie",
            "radius": "50%",
            "data": slices,
            "emphasis": {
                "itemStyle": {
                    "shadowBlur": 10,
                    "shadowOffsetX": 0,
                    "shadowColor": "rgba(0, 0, 0, 0.5)"
                }
            }
        }]
    })
}

fn treemap_options(spec: &ChartSpec, series: &[AggregatedSeries]) -> Value {
    let nodes: Vec<Value> = series
        .iter()
        .map(|s| {
            let children: Vec<Value> = s
                .aggregated_values
                .iter()
                .map(|v| json!({ "name": v.time_period, "value": v.total_consumption }))
                .collect();
            json!({ "name": s.provider, "value": s.total(), "children": children })
        })
        .collect();

    json!({
        "title": title_block(&spec.title),
        "tooltip": { "formatter": "{b}: {c}" },
        "series": [{
            "name": spec.title,
            "type": "treemap",
            "roam": false,
            "leafDepth": 1,
            "data": nodes
        }]
    })
}

/// Per-key split of consumption against budget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSplit {
    pub within_budget: f64,
    pub remaining: f64,
    pub over_budget: f64,
}

impl BudgetSplit {
    /// Keys without a budget count everything as within budget
    pub fn new(consumed: f64, budget: Option<f64>) -> Self {
        match budget {
            Some(budget) => Self {
                within_budget: consumed.min(budget).max(0.0),
                remaining: (budget - consumed).max(0.0),
                over_budget: (consumed - budget).max(0.0),
            },
            None => Self {
                within_budget: consumed,
                remaining: 0.0,
                over_budget: 0.0,
            },
        }
    }
}

fn budget_bar_options(spec: &ChartSpec, series: &[AggregatedSeries]) -> Value {
    let keys: Vec<&str> = series.iter().map(|s| s.provider.as_str()).collect();
    let splits: Vec<BudgetSplit> = series
        .iter()
        .map(|s| BudgetSplit::new(s.total(), s.budget))
        .collect();

    let stacked = |name: &str, color: &str, pick: fn(&BudgetSplit) -> f64| {
        json!({
            "name": name,
            "type": "bar",
            "stack": "budget",
            "itemStyle": { "color": color },
            "data": splits.iter().map(pick).collect::<Vec<f64>>()
        })
    };

    json!({
        "title": title_block(&spec.title),
        "tooltip": { "trigger": "axis", "axisPointer": { "type": "shadow" } },
        "legend": {
            "data": ["Within Budget", "Remaining Budget", "Over Budget"],
            "top": "bottom"
        },
        "grid": { "left": "10%", "right": "10%", "bottom": "15%", "containLabel": true },
        "xAxis": {
            "type": "category",
            "data": keys,
            "name": axis_name(&spec.x_axis, "Financial Domain")
        },
        "yAxis": { "type": "value", "name": axis_name(&spec.y_axis, DEFAULT_Y_AXIS_NAME) },
        "series": [
            stacked("Within Budget", "#720e9e", |s| s.within_budget),
            stacked("Remaining Budget", "#c9b3e6", |s| s.remaining),
            stacked("Over Budget", "#d32f2f", |s| s.over_budget)
        ]
    })
}
