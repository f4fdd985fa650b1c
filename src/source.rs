//! Data sources feeding the chart builder
//!
//! Series come either from a local JSON fixture aggregated in-process, or from
//! the data API's server-side filter endpoint.

use crate::aggregation::{AggregatedSeries, ConsumptionRecord, Dimension, Granularity, aggregate_by};
use crate::config::{Config, DataSourceKind};
use crate::dashboard::{DashboardClient, FilterQuery};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// What to load
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub dimension: Dimension,
    pub group_by: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Forwarded to the data API; local sources apply the limit in the builder
    pub max_display: String,
}

/// Trait for aggregated series sources
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn load(&self, query: &SeriesQuery) -> Result<Vec<AggregatedSeries>, AppError>;

    fn name(&self) -> &'static str;
}

/// Records read from a JSON file, aggregated locally
pub struct FixtureSource {
    records: Vec<ConsumptionRecord>,
}

impl FixtureSource {
    pub fn new(records: Vec<ConsumptionRecord>) -> Self {
        Self { records }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Fixture(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let records: Vec<ConsumptionRecord> = serde_json::from_str(&contents).map_err(|e| {
            AppError::Fixture(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        info!("Loaded {} consumption records from {}", records.len(), path.display());
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[ConsumptionRecord] {
        &self.records
    }
}

#[async_trait]
impl SeriesSource for FixtureSource {
    async fn load(&self, query: &SeriesQuery) -> Result<Vec<AggregatedSeries>, AppError> {
        let aggregation = aggregate_by(
            &self.records,
            query.dimension,
            query.group_by,
            query.from,
            query.to,
        );
        debug!(
            "Fixture aggregation produced {} series ({} records skipped)",
            aggregation.series.len(),
            aggregation.skipped.len()
        );
        Ok(aggregation.into_series())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

/// Server-side aggregation through the data API
pub struct ApiSource {
    client: DashboardClient,
}

impl ApiSource {
    pub fn new(client: DashboardClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SeriesSource for ApiSource {
    async fn load(&self, query: &SeriesQuery) -> Result<Vec<AggregatedSeries>, AppError> {
        let filter = FilterQuery {
            dimension: query.dimension,
            group_by: query.group_by,
            from: query.from,
            to: query.to,
            max_display: query.max_display.clone(),
        };
        Ok(self.client.filter_data(&filter).await?)
    }

    fn name(&self) -> &'static str {
        "api"
    }
}

/// Dashboard client built from configuration
pub fn dashboard_client(config: &Config) -> Result<DashboardClient, AppError> {
    Ok(DashboardClient::with_timeout(
        config.api.base_url.clone(),
        config.api.user_id.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?)
}

/// Create the configured series source
pub fn create_source(config: &Config) -> Result<Arc<dyn SeriesSource>, AppError> {
    let source: Arc<dyn SeriesSource> = match config.data.source {
        DataSourceKind::Fixture => Arc::new(FixtureSource::from_file(&config.data.fixture_path)?),
        DataSourceKind::Api => Arc::new(ApiSource::new(dashboard_client(config)?)),
    };
    info!("Using {} data source", source.name());
    Ok(source)
}
