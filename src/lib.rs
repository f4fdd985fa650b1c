pub mod aggregation;
pub mod builder;
pub mod charts;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod routes;
pub mod server;
pub mod source;
pub mod table;

pub use config::Config;
pub use server::Server;
