// Duplex channel abstraction towards the device-facing server
use async_trait::async_trait;

/// Opens duplex channels to the server.
#[async_trait]
pub trait FrameTransport: Send + Sync {
    /// Open a channel to `address` (`host:port`).
    async fn connect(&self, address: &str) -> anyhow::Result<Box<dyn FrameStream>>;
}

/// Inbound side of an open channel.
#[async_trait]
pub trait FrameStream: Send {
    /// Next text frame; `None` once the channel is closed.
    /// Errors are channel-level and do not by themselves close the stream.
    async fn next_frame(&mut self) -> Option<anyhow::Result<String>>;
}
