use super::{ChartRequest, Dashboard, FilterQuery};
use crate::aggregation::AggregatedSeries;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Dashboard API client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Dashboard API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid dashboard API URL: {0}")]
    InvalidUrl(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// HTTP client for the dashboard persistence service
#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: Url,
    user_id: String,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, user_id, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parsed,
            user_id: user_id.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Base URL extended with percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn dashboard_url(&self, segments: &[&str]) -> Url {
        let mut all = vec!["api", "dashboard", self.user_id.as_str()];
        all.extend_from_slice(segments);
        self.endpoint(&all)
    }

    /// Fetch the layout and chart configurations of the user's dashboard
    pub async fn get_dashboard(&self) -> ClientResult<Dashboard> {
        let url = self.dashboard_url(&[]);
        debug!("Fetching dashboard from {}", url);

        let response = self.client.get(url).send().await?;
        let dashboard: Dashboard = decode_json(check_status(response).await?).await?;

        info!(
            "Loaded dashboard for user {} with {} charts",
            self.user_id,
            dashboard.charts.len()
        );
        Ok(dashboard)
    }

    /// Add a chart; returns the id assigned by the service
    pub async fn add_chart(&self, request: &ChartRequest) -> ClientResult<String> {
        let url = self.dashboard_url(&["add"]);
        debug!("Adding chart '{}' via {}", request.chart_info.title, url);

        let response = self.client.post(url).json(request).send().await?;
        let body = check_status(response).await?.text().await?;
        let chart_id = parse_created_id(&body)
            .or_else(|| request.dashboard_info.id.clone())
            .ok_or_else(|| ClientError::Decode("response did not contain a chart id".to_string()))?;

        info!("Added chart {} for user {}", chart_id, self.user_id);
        Ok(chart_id)
    }

    pub async fn update_chart(&self, chart_id: &str, request: &ChartRequest) -> ClientResult<()> {
        let url = self.dashboard_url(&["update", chart_id]);
        debug!("Updating chart {} via {}", chart_id, url);

        let response = self.client.put(url).json(request).send().await?;
        check_status(response).await?;

        info!("Updated chart {} for user {}", chart_id, self.user_id);
        Ok(())
    }

    pub async fn delete_chart(&self, chart_id: &str) -> ClientResult<()> {
        let url = self.dashboard_url(&["delete", chart_id]);
        debug!("Deleting chart {} via {}", chart_id, url);

        let response = self.client.delete(url).send().await?;
        check_status(response).await?;

        info!("Deleted chart {} for user {}", chart_id, self.user_id);
        Ok(())
    }

    /// Server-side aggregation of consumption data
    pub async fn filter_data(&self, query: &FilterQuery) -> ClientResult<Vec<AggregatedSeries>> {
        let url = self.endpoint(&["api", "data", "filter"]);
        debug!("Requesting filtered data from {} with {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(&query.to_query_pairs())
            .send()
            .await?;
        let series: Vec<AggregatedSeries> = decode_json(check_status(response).await?).await?;

        debug!("Received {} series from data API", series.len());
        Ok(series)
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Accepts `"chart1"`, `{"id": "chart1"}`, `{"chartId": "chart1"}`, a bare
/// number, or plain text.
fn parse_created_id(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(id)) => Some(id),
        Ok(Value::Number(id)) => Some(id.to_string()),
        Ok(Value::Object(map)) => ["id", "chartId"]
            .iter()
            .find_map(|field| match map.get(*field) {
                Some(Value::String(id)) => Some(id.clone()),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            }),
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    }
}
