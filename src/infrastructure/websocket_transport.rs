// WebSocket transport for the telemetry channel
use crate::application::transport::{FrameStream, FrameTransport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    path: String,
}

impl WebSocketTransport {
    pub fn new(path: String) -> Self {
        Self { path }
    }

    fn url(&self, address: &str) -> String {
        let address = address.trim_end_matches('/');
        if self.path.starts_with('/') {
            format!("ws://{}{}", address, self.path)
        } else {
            format!("ws://{}/{}", address, self.path)
        }
    }
}

#[async_trait]
impl FrameTransport for WebSocketTransport {
    async fn connect(&self, address: &str) -> Result<Box<dyn FrameStream>> {
        let url = self.url(address);
        tracing::debug!(%url, "connecting websocket");
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .with_context(|| format!("Failed to open websocket at {}", url))?;
        Ok(Box::new(WebSocketFrames { socket }))
    }
}

struct WebSocketFrames {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FrameStream for WebSocketFrames {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        loop {
            let message = match self.socket.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(e.into())),
            };
            match message {
                Message::Close(_) => return None,
                Message::Text(_) => {
                    return Some(
                        message
                            .to_text()
                            .map(str::to_string)
                            .context("Websocket text frame is not UTF-8"),
                    );
                }
                _ => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let transport = WebSocketTransport::new("/websocket".to_string());
        assert_eq!(transport.url("localhost:3636"), "ws://localhost:3636/websocket");
        assert_eq!(transport.url("10.0.0.2:3636/"), "ws://10.0.0.2:3636/websocket");

        let transport = WebSocketTransport::new("ws".to_string());
        assert_eq!(transport.url("host:1"), "ws://host:1/ws");
    }

    #[tokio::test]
    async fn test_refused_connection_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let transport = WebSocketTransport::new("/websocket".to_string());
        assert!(transport.connect(&address).await.is_err());
    }
}
