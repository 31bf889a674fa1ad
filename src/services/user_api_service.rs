use crate::error::{Error, Result};
use anyhow::Context as _;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

#[derive(Clone)]
pub struct UserApiService {
    client: Client,
    url: String,
}

impl UserApiService {
    pub fn new(client: Client, base_url: &str, endpoint: &str) -> Self {
        Self {
            client,
            url: join_url(base_url, endpoint),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Single poke; `true` on a 2xx response.
    pub async fn is_available(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!(url = %self.url, status = %resp.status(), "User API not ready");
                false
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "User API unreachable");
                false
            }
        }
    }

    pub async fn wait_until_available(&self, interval: Duration, max_attempts: u32) -> Result<u32> {
        let max_attempts = max_attempts.max(1);
        for attempt in 1..=max_attempts {
            if self.is_available().await {
                tracing::info!(url = %self.url, attempt, "User API is available");
                return Ok(attempt);
            }
            if attempt < max_attempts {
                tracing::debug!(attempt, ?interval, "Waiting before next poke");
                tokio::time::sleep(interval).await;
            }
        }
        Err(Error::ApiUnavailable {
            url: self.url.clone(),
            attempts: max_attempts,
        })
    }

    pub async fn fetch_user(&self) -> Result<JsonValue> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let body = resp.text().await?;
        tracing::debug!(url = %self.url, body = %body, "User API response");
        let value: JsonValue =
            serde_json::from_str(&body).context("user API returned a non-JSON body")?;
        Ok(value)
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
