pub mod dashboard;
pub mod data;

use crate::{Config, Server};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the chart builder preview service
    Serve,
    /// Aggregate consumption records and print the series as JSON
    Aggregate {
        #[command(flatten)]
        args: data::AggregateArgs,
    },
    /// Print chart options for the configured data source
    Options {
        #[command(flatten)]
        args: data::OptionsArgs,
    },
    /// Manage charts on the dashboard service
    Dashboard {
        #[command(subcommand)]
        action: dashboard::DashboardAction,
    },
}

pub async fn handle_command(
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve => {
            let server = Server::new(config.clone())?;
            server.run().await?;
            Ok(())
        }
        Commands::Aggregate { args } => data::handle_aggregate_command(args, config),
        Commands::Options { args } => data::handle_options_command(args, config).await,
        Commands::Dashboard { action } => {
            dashboard::handle_dashboard_command(action, config).await
        }
    }
}
