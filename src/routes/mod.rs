pub mod chart_builder;
pub mod health;

pub use chart_builder::create_chart_builder_routes;
pub use health::create_health_routes;
