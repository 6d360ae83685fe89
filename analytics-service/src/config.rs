use serde::Deserialize;
use std::fs;

use crate::engine::EngineConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Only the `[engine]` table, for tools that never talk to the database.
#[derive(Debug, Clone, Default, Deserialize)]
struct EngineOnly {
    #[serde(default)]
    engine: EngineConfig,
}

fn config_path() -> String {
    std::env::var("ANALYTICS_CONFIG").unwrap_or_else(|_| "analytics-config.toml".to_string())
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();
        let contents = fs::read_to_string(&path)?;
        let cfg = Self::from_toml(&contents)?;
        tracing::info!(path = %path, "configuration loaded");
        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Engine settings from the config file, or the defaults when there is no file.
pub fn load_engine_config() -> anyhow::Result<EngineConfig> {
    let path = config_path();
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let cfg: EngineOnly = toml::from_str(&contents)?;
            Ok(cfg.engine)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path, "no config file, using default engine settings");
            Ok(EngineConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}
