pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod observability;
pub mod metrics_server;
pub mod store;

pub use engine::{AnalyticsEngine, EngineConfig};
pub use error::AnalyticsError;
