// Repository trait for historical measurements
use crate::domain::history::{MeasureLog, SessionLog};
use async_trait::async_trait;

/// Recorded measurements served by the server at `address` (`host:port`).
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// The most recently recorded cycle
    async fn fetch_last_session(&self, address: &str) -> anyhow::Result<SessionLog>;

    /// A recorded cycle by its log name
    async fn fetch_session(&self, address: &str, name: &str) -> anyhow::Result<SessionLog>;

    /// The server's rolling live log, used to pre-fill the live window
    async fn fetch_live_data(&self, address: &str) -> anyhow::Result<MeasureLog>;
}
