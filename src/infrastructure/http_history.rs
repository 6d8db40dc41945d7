// HTTP repository for recorded cycles and the live log
use crate::application::history_repository::HistoryRepository;
use crate::domain::history::{MeasureLog, SessionLog};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

const LIVE_DATA_PATH: &str = "/data";
const SESSION_PATH: &str = "/chart/";

#[derive(Debug, Clone)]
pub struct HttpHistoryRepository {
    client: reqwest::Client,
    last_session_path: String,
}

impl HttpHistoryRepository {
    pub fn new(last_session_path: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            last_session_path,
        })
    }

    fn build_url(address: &str, path: &str) -> String {
        format!("http://{}{}", address.trim_end_matches('/'), path)
    }

    fn session_url(address: &str, name: &str) -> String {
        Self::build_url(
            address,
            &format!("{}{}", SESSION_PATH, urlencoding::encode(name)),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(%url, "fetching recorded data");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GET {} failed with status {}: {}", url, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl HistoryRepository for HttpHistoryRepository {
    async fn fetch_last_session(&self, address: &str) -> Result<SessionLog> {
        let url = Self::build_url(address, &self.last_session_path);
        self.get_json(&url).await
    }

    async fn fetch_session(&self, address: &str, name: &str) -> Result<SessionLog> {
        let url = Self::session_url(address, name);
        self.get_json(&url).await
    }

    async fn fetch_live_data(&self, address: &str) -> Result<MeasureLog> {
        let url = Self::build_url(address, LIVE_DATA_PATH);
        self.get_json(&url).await
    }
}
