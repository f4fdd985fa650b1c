use crate::{
    Config,
    aggregation::Granularity,
    charts::ChartType,
    dashboard::{ChartInfo, ChartRequest},
    source::dashboard_client,
};
use clap::{Args, Subcommand};
use tracing::info;

#[derive(Args, Debug)]
pub struct ChartArgs {
    #[arg(long, help = "Chart title")]
    title: String,
    #[arg(long, help = "Chart type (line, bar, area, pie, treemap)", default_value = "line")]
    chart_type: String,
    #[arg(long, help = "Bucket size (day, month, quarter, year)", default_value = "day")]
    group_by: String,
    #[arg(long, help = "Data dimension", default_value = "Account")]
    dimension: String,
    #[arg(long, help = "Maximum number of series", default_value = "All")]
    max_display: String,
}

impl ChartArgs {
    fn chart_info(&self) -> Result<ChartInfo, Box<dyn std::error::Error>> {
        let chart_type: ChartType = self.chart_type.parse()?;
        let mut info = ChartInfo::new(
            self.title.clone(),
            chart_type,
            Granularity::from(self.group_by.as_str()),
        );
        info.dimension = self.dimension.clone();
        info.max_display = self.max_display.clone();
        Ok(info)
    }
}

#[derive(Subcommand)]
pub enum DashboardAction {
    /// Show the dashboard layout and charts
    Show,
    /// Add a chart to the dashboard
    Add {
        #[arg(long, help = "Chart id (generated when omitted)")]
        chart_id: Option<String>,
        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Update an existing chart
    Update {
        #[arg(long, help = "Chart id")]
        chart_id: String,
        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Delete a chart
    Delete {
        #[arg(long, help = "Chart id")]
        chart_id: String,
    },
}

pub async fn handle_dashboard_command(
    action: DashboardAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = dashboard_client(config)?;

    match action {
        DashboardAction::Show => {
            let dashboard = client.get_dashboard().await?;
            let tiles = dashboard.tiles();
            info!("Dashboard has {} laid-out charts", tiles.len());
            println!("{}", serde_json::to_string_pretty(&tiles)?);
        }
        DashboardAction::Add { chart_id, chart } => {
            let request = ChartRequest::for_new_chart(chart.chart_info()?, chart_id);
            let created = client.add_chart(&request).await?;
            println!("{}", created);
        }
        DashboardAction::Update { chart_id, chart } => {
            let request = ChartRequest::for_update(chart.chart_info()?);
            client.update_chart(&chart_id, &request).await?;
            println!("Updated chart {}", chart_id);
        }
        DashboardAction::Delete { chart_id } => {
            client.delete_chart(&chart_id).await?;
            println!("Deleted chart {}", chart_id);
        }
    }

    Ok(())
}
