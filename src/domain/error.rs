// Error taxonomy of the live-telemetry core
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryError {
    #[error("no connection opened within the connect timeout")]
    ConnectionTimeout,
    #[error("channel closed by the server")]
    ChannelClosed,
    #[error("unrecognized event kind: {0}")]
    UnrecognizedEvent(String),
    #[error("no reading available")]
    NoData,
    #[error("window capacity must be greater than zero")]
    InvalidCapacity,
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("no sample window initialized for the current view")]
    WindowUninitialized,
    #[error("a channel is already connecting or connected")]
    ChannelBusy,
    #[error("malformed payload: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for TelemetryError {
    fn from(value: serde_json::Error) -> Self {
        TelemetryError::Decode(value.to_string())
    }
}
