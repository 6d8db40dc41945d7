// HTTP client for the server's cycle controls
use anyhow::{Context, Result};
use std::time::Duration;

const CONFIG_SAVE_PATH: &str = "/config?save";
const START_PATH: &str = "/start";
const STOP_PATH: &str = "/stop";

/// Forwards operator actions to the server at a given `host:port`.
#[derive(Debug, Clone)]
pub struct ControlClient {
    client: reqwest::Client,
}

impl ControlClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub async fn start(&self, address: &str) -> Result<()> {
        self.post(address, START_PATH, &serde_json::json!({})).await?;
        Ok(())
    }

    pub async fn stop(&self, address: &str) -> Result<()> {
        self.post(address, STOP_PATH, &serde_json::json!({})).await?;
        Ok(())
    }

    /// Store a new cycle configuration; the server answers with the
    /// configuration it actually saved.
    pub async fn save_config(
        &self,
        address: &str,
        config: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let response = self.post(address, CONFIG_SAVE_PATH, config).await?;
        response
            .json::<serde_json::Value>()
            .await
            .context("Failed to parse saved configuration")
    }

    async fn post(
        &self,
        address: &str,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        let url = format!("http://{}{}", address.trim_end_matches('/'), path);
        tracing::info!(%url, "forwarding control request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("POST {} failed with status {}: {}", url, status, body);
        }
        Ok(response)
    }
}
