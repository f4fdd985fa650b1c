use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chart_builder::{Config, Server, aggregation::ConsumptionRecord, source::FixtureSource};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Test harness wrapping an app backed by in-memory records
pub struct TestHarness {
    #[allow(dead_code)]
    pub config: Config,
    pub app: Router,
}

impl TestHarness {
    pub fn with_records(records: Vec<ConsumptionRecord>) -> Self {
        let config = Config::default();
        let server = Server::with_source(config.clone(), Arc::new(FixtureSource::new(records)));
        let app = server.create_app();
        Self { config, app }
    }

    /// Harness backed by the bundled sample data
    #[allow(dead_code)]
    pub fn with_sample_data() -> Self {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/consumption.json");
        let source = FixtureSource::from_file(path).unwrap();
        Self::with_records(source.records().to_vec())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}

#[allow(dead_code)]
pub fn record(date: &str, provider: &str, consumption: f64) -> ConsumptionRecord {
    ConsumptionRecord::new(date, provider, consumption)
}
