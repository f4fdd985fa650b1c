use crate::{
    builder::ChartBuilder,
    config::Config,
    error::AppError,
    routes::{create_chart_builder_routes, create_health_routes},
    source::{SeriesSource, create_source},
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared state of the preview service
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub builder: Arc<ChartBuilder>,
}

pub struct Server {
    pub config: Arc<Config>,
    source: Arc<dyn SeriesSource>,
}

impl Server {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let source = create_source(&config)?;
        Ok(Self::with_source(config, source))
    }

    /// Server backed by an explicit data source
    pub fn with_source(config: Config, source: Arc<dyn SeriesSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }

    pub fn create_app(&self) -> Router {
        let state = AppState {
            config: self.config.clone(),
            builder: Arc::new(ChartBuilder::new(self.source.clone())),
        };

        Router::new()
            .merge(create_health_routes())
            .merge(create_chart_builder_routes())
            .with_state(state)
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let app = self.create_app();

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to address: {}", e)))?;

        info!("Server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
