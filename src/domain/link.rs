// Connection state as seen by the dashboard
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

/// Text shown in place of the connection status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum LinkIndicator {
    Blank,
    Connecting,
    Ok,
    Failed(String),
    /// The manual "Reconnect" trigger.
    ReconnectPrompt,
}

impl LinkIndicator {
    pub fn text(&self) -> &str {
        match self {
            LinkIndicator::Blank => "",
            LinkIndicator::Connecting => "connecting...",
            LinkIndicator::Ok => "Ok",
            LinkIndicator::Failed(message) => message,
            LinkIndicator::ReconnectPrompt => "Reconnect",
        }
    }
}
