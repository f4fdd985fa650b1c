use crate::{
    Config,
    aggregation::{Dimension, Granularity, aggregate_by},
    builder::{ChartBuilder, ChartBuilderState},
    source::{FixtureSource, create_source},
    table::{self, TableSort},
};
use chrono::{Local, NaiveDate};
use clap::Args;
use tracing::{info, warn};

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn parse_dimension(value: &str) -> Result<Dimension, String> {
    value.parse()
}

fn parse_granularity(value: &str) -> Result<Granularity, String> {
    Ok(Granularity::from(value))
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    #[arg(long, help = "Fixture file (defaults to data.fixture_path)")]
    fixture: Option<String>,
    #[arg(long, help = "Bucket size (day, month, quarter, year)", default_value = "day", value_parser = parse_granularity)]
    group_by: Granularity,
    #[arg(long, help = "First included date (YYYY-MM-DD)", default_value = "2023-01-01", value_parser = parse_date)]
    from: NaiveDate,
    #[arg(long, help = "Last included date (YYYY-MM-DD), defaults to today", value_parser = parse_date)]
    to: Option<NaiveDate>,
    #[arg(long, help = "Grouping dimension", default_value = "CloudProvider", value_parser = parse_dimension)]
    dimension: Dimension,
    #[arg(long, help = "Print flattened table rows instead of series")]
    table: bool,
}

#[derive(Args, Debug)]
pub struct OptionsArgs {
    #[arg(long, help = "Chart type (line, bar, area, pie, treemap)", default_value = "line")]
    chart_type: String,
    #[arg(long, help = "Chart title", default_value = crate::charts::DEFAULT_TITLE)]
    title: String,
    #[arg(long, help = "Bucket size (day, month, quarter, year)", default_value = "day", value_parser = parse_granularity)]
    group_by: Granularity,
    #[arg(long, help = "First included date (YYYY-MM-DD)", default_value = "2023-01-01", value_parser = parse_date)]
    from: NaiveDate,
    #[arg(long, help = "Last included date (YYYY-MM-DD), defaults to today", value_parser = parse_date)]
    to: Option<NaiveDate>,
    #[arg(long, help = "Grouping dimension", default_value = "CloudProvider", value_parser = parse_dimension)]
    dimension: Dimension,
    #[arg(long, help = "Maximum number of series ('all' or a number)", default_value = "all")]
    max_display: String,
}

pub fn handle_aggregate_command(
    args: AggregateArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.fixture.unwrap_or_else(|| config.data.fixture_path.clone());
    let source = FixtureSource::from_file(&path)?;
    let to = args.to.unwrap_or_else(|| Local::now().date_naive());

    info!(
        "Aggregating {} records by {} and {} from {} to {}",
        source.records().len(),
        args.dimension,
        args.group_by,
        args.from,
        to
    );

    let aggregation = aggregate_by(source.records(), args.dimension, args.group_by, args.from, to);
    for skipped in &aggregation.skipped {
        warn!("Record {} skipped: {} ({})", skipped.index, skipped.reason, skipped.date);
    }

    let output = if args.table {
        let rows = table::flatten(&aggregation.series);
        let page = table::paginate(rows, TableSort::default(), 0, usize::MAX);
        serde_json::to_string_pretty(&page.rows)?
    } else {
        serde_json::to_string_pretty(&aggregation.series)?
    };
    println!("{}", output);
    Ok(())
}

pub async fn handle_options_command(
    args: OptionsArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = create_source(config)?;
    let builder = ChartBuilder::new(source);

    let state = ChartBuilderState {
        chart_type: args.chart_type.parse()?,
        title: args.title,
        group_by: args.group_by,
        from: args.from,
        to: args.to.unwrap_or_else(|| Local::now().date_naive()),
        max_display: args.max_display.parse()?,
        dimension: args.dimension,
        rows_per_page: config.table.rows_per_page,
        ..Default::default()
    };
    state.validate()?;

    let view = builder.render(&state).await;
    if let crate::builder::Fetched::Failed(message) = &view.status {
        return Err(message.clone().into());
    }

    println!("{}", serde_json::to_string_pretty(&view.options)?);
    Ok(())
}
