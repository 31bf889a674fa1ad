pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

use crate::config::Config;
use crate::error::Result;
use crate::services::pipeline_service::Pipeline;
use reqwest::Client;
use sqlx::SqlitePool;
use std::time::Duration;

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

pub fn build_pipeline(config: &Config, pool: SqlitePool) -> Result<Pipeline> {
    let client = build_http_client(Duration::from_secs(config.http_timeout_secs))?;
    Ok(Pipeline::new(config.pipeline_config(), pool, client))
}
