use crate::error::{Error, Result};
use crate::services::pipeline_service::{MissingPayloadPolicy, PipelineConfig, ProbePolicy};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub user_api_base_url: String,
    pub user_api_endpoint: String,
    pub users_csv_path: PathBuf,
    pub probe_interval_secs: u64,
    pub probe_max_attempts: u32,
    pub http_timeout_secs: u64,
    pub schedule: String,
    pub missing_payload_policy: MissingPayloadPolicy,
    pub log_format: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            database_url: get_env("DATABASE_URL")?,
            user_api_base_url: get_env_or("USER_API_BASE_URL", "https://randomuser.me"),
            user_api_endpoint: get_env_or("USER_API_ENDPOINT", "api/"),
            users_csv_path: PathBuf::from(get_env_or("USERS_CSV_PATH", "/tmp/users.csv")),
            probe_interval_secs: get_env_parse_or("PROBE_INTERVAL_SECS", 60)?,
            probe_max_attempts: get_env_parse_or("PROBE_MAX_ATTEMPTS", 10)?,
            http_timeout_secs: get_env_parse_or("HTTP_TIMEOUT_SECS", 60)?,
            schedule: get_env_or("PIPELINE_SCHEDULE", "0 0 0 * * *"),
            missing_payload_policy: get_env_parse_or(
                "MISSING_PAYLOAD_POLICY",
                MissingPayloadPolicy::Fail,
            )?,
            log_format: get_env_or("LOG_FORMAT", "compact"),
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            api_base_url: self.user_api_base_url.clone(),
            api_endpoint: self.user_api_endpoint.clone(),
            users_csv_path: self.users_csv_path.clone(),
            probe: ProbePolicy {
                interval: Duration::from_secs(self.probe_interval_secs),
                max_attempts: self.probe_max_attempts,
            },
            missing_payload_policy: self.missing_payload_policy,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
