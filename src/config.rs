use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window: Duration,
    /// Optional JSON file defining the resource registry; the built-in
    /// dashboard registry is used when unset.
    pub resource_schema_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("APP_PORT must be a valid u16")?;

        let rate_limit_max_requests = env::var("RATE_LIMIT_MAX_REQUESTS")
            .unwrap_or_else(|_| "120".to_string())
            .parse::<u32>()
            .context("RATE_LIMIT_MAX_REQUESTS must be a valid u32")?;

        let window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .context("RATE_LIMIT_WINDOW_SECS must be a valid u64")?;

        let resource_schema_path = env::var("RESOURCE_SCHEMA_PATH").ok();

        Ok(Self {
            host,
            port,
            rate_limit_max_requests,
            rate_limit_window: Duration::from_secs(window_secs),
            resource_schema_path,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
