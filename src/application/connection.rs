// Connection controller - Lifecycle of the duplex channel to the server
use crate::application::transport::{FrameStream, FrameTransport};
use crate::domain::error::TelemetryError;
use crate::domain::link::{ConnectionState, LinkIndicator};
use crate::infrastructure::config::ConnectionSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sequence number of an `open` call. Events carry the attempt that
/// produced them so anything from an earlier attempt can be discarded.
pub type Attempt = u64;

/// Signals posted by the connect, timer and reader tasks.
pub enum ChannelEvent {
    Opened {
        attempt: Attempt,
        stream: Box<dyn FrameStream>,
    },
    OpenFailed {
        attempt: Attempt,
        error: String,
    },
    ConnectTimeout {
        attempt: Attempt,
    },
    PromptDelayElapsed {
        attempt: Attempt,
    },
    Frame {
        attempt: Attempt,
        text: String,
    },
    ChannelError {
        attempt: Attempt,
        error: String,
    },
    Closed {
        attempt: Attempt,
    },
}

impl ChannelEvent {
    pub fn attempt(&self) -> Attempt {
        match self {
            ChannelEvent::Opened { attempt, .. }
            | ChannelEvent::OpenFailed { attempt, .. }
            | ChannelEvent::ConnectTimeout { attempt }
            | ChannelEvent::PromptDelayElapsed { attempt }
            | ChannelEvent::Frame { attempt, .. }
            | ChannelEvent::ChannelError { attempt, .. }
            | ChannelEvent::Closed { attempt } => *attempt,
        }
    }
}

/// Result of handling one `ChannelEvent`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionUpdate {
    Connected,
    Frame(String),
    Disconnected(TelemetryError),
    ReconnectPrompt,
    Ignored,
}

/// Tasks bound to the current attempt. Every exit transition aborts them.
#[derive(Default)]
struct AttemptTasks {
    connect: Option<JoinHandle<()>>,
    timeout: Option<JoinHandle<()>>,
    prompt: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
}

impl AttemptTasks {
    fn abort_all(&mut self) {
        let handles = [
            self.connect.take(),
            self.timeout.take(),
            self.prompt.take(),
            self.reader.take(),
        ];
        for handle in handles.into_iter().flatten() {
            handle.abort();
        }
    }
}

pub struct ConnectionController {
    transport: Arc<dyn FrameTransport>,
    settings: ConnectionSettings,
    address: String,
    state: ConnectionState,
    indicator: LinkIndicator,
    attempt: Attempt,
    tasks: AttemptTasks,
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
    events_rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl ConnectionController {
    pub fn new(
        transport: Arc<dyn FrameTransport>,
        settings: ConnectionSettings,
        address: String,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            settings,
            address,
            state: ConnectionState::Idle,
            indicator: LinkIndicator::Blank,
            attempt: 0,
            tasks: AttemptTasks::default(),
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn indicator(&self) -> &LinkIndicator {
        &self.indicator
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Start connecting, optionally to a new address.
    ///
    /// Only allowed from `Idle` or `Disconnected`; the controller never
    /// calls this on its own.
    pub fn open(&mut self, address: Option<String>) -> Result<Attempt, TelemetryError> {
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            return Err(TelemetryError::ChannelBusy);
        }

        self.tasks.abort_all();
        if let Some(address) = address {
            self.address = address;
        }
        self.attempt += 1;
        self.state = ConnectionState::Connecting;
        self.indicator = LinkIndicator::Connecting;

        let attempt = self.attempt;
        tracing::info!(address = %self.address, attempt, "opening channel");

        let transport = self.transport.clone();
        let address = self.address.clone();
        let tx = self.events_tx.clone();
        self.tasks.connect = Some(tokio::spawn(async move {
            let event = match transport.connect(&address).await {
                Ok(stream) => ChannelEvent::Opened { attempt, stream },
                Err(e) => ChannelEvent::OpenFailed {
                    attempt,
                    error: format!("{:#}", e),
                },
            };
            let _ = tx.send(event);
        }));
        self.tasks.timeout = Some(self.schedule(
            self.settings.connect_timeout(),
            ChannelEvent::ConnectTimeout { attempt },
        ));

        Ok(attempt)
    }

    /// Drop the channel and every pending task, back to `Idle`.
    pub fn close(&mut self) {
        self.tasks.abort_all();
        self.attempt += 1;
        self.state = ConnectionState::Idle;
        self.indicator = LinkIndicator::Blank;
        tracing::info!(address = %self.address, "channel closed locally");
    }

    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events_rx.recv().await
    }

    pub fn handle(&mut self, event: ChannelEvent) -> ConnectionUpdate {
        if event.attempt() != self.attempt {
            tracing::debug!(
                event_attempt = event.attempt(),
                attempt = self.attempt,
                "dropping event from a previous attempt"
            );
            return ConnectionUpdate::Ignored;
        }

        match event {
            ChannelEvent::Opened { stream, .. } => {
                if self.state != ConnectionState::Connecting {
                    tracing::debug!(state = ?self.state, "ignoring late channel open");
                    return ConnectionUpdate::Ignored;
                }
                if let Some(timeout) = self.tasks.timeout.take() {
                    timeout.abort();
                }
                self.tasks.connect = None;
                self.tasks.reader = Some(self.spawn_reader(stream));
                self.state = ConnectionState::Connected;
                self.indicator = LinkIndicator::Ok;
                tracing::info!(address = %self.address, "channel open");
                ConnectionUpdate::Connected
            }
            ChannelEvent::OpenFailed { error, .. } => {
                tracing::warn!(address = %self.address, %error, "channel open failed");
                ConnectionUpdate::Ignored
            }
            ChannelEvent::ConnectTimeout { attempt } => {
                if self.state != ConnectionState::Connecting {
                    return ConnectionUpdate::Ignored;
                }
                self.tasks.timeout = None;
                if let Some(connect) = self.tasks.connect.take() {
                    connect.abort();
                }
                self.state = ConnectionState::Disconnected;
                self.indicator = LinkIndicator::Failed(format!(
                    "couldn't connect to server at {}, is it running?",
                    self.address
                ));
                tracing::warn!(address = %self.address, "no channel within connect timeout");
                self.tasks.prompt = Some(self.schedule(
                    self.settings.reconnect_prompt_delay(),
                    ChannelEvent::PromptDelayElapsed { attempt },
                ));
                ConnectionUpdate::Disconnected(TelemetryError::ConnectionTimeout)
            }
            ChannelEvent::PromptDelayElapsed { .. } => {
                if self.state != ConnectionState::Disconnected {
                    return ConnectionUpdate::Ignored;
                }
                self.tasks.prompt = None;
                self.indicator = LinkIndicator::ReconnectPrompt;
                ConnectionUpdate::ReconnectPrompt
            }
            ChannelEvent::Frame { text, .. } => {
                if self.state != ConnectionState::Connected {
                    return ConnectionUpdate::Ignored;
                }
                ConnectionUpdate::Frame(text)
            }
            ChannelEvent::ChannelError { error, .. } => {
                tracing::warn!(address = %self.address, %error, "channel error");
                ConnectionUpdate::Ignored
            }
            ChannelEvent::Closed { .. } => {
                if self.state != ConnectionState::Connected {
                    return ConnectionUpdate::Ignored;
                }
                self.tasks.abort_all();
                self.state = ConnectionState::Disconnected;
                self.indicator = LinkIndicator::ReconnectPrompt;
                tracing::info!(address = %self.address, "channel closed by server");
                ConnectionUpdate::Disconnected(TelemetryError::ChannelClosed)
            }
        }
    }

    fn schedule(&self, delay: Duration, event: ChannelEvent) -> JoinHandle<()> {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        })
    }

    fn spawn_reader(&self, mut stream: Box<dyn FrameStream>) -> JoinHandle<()> {
        let tx = self.events_tx.clone();
        let attempt = self.attempt;
        tokio::spawn(async move {
            while let Some(frame) = stream.next_frame().await {
                let event = match frame {
                    Ok(text) => ChannelEvent::Frame { attempt, text },
                    Err(e) => ChannelEvent::ChannelError {
                        attempt,
                        error: format!("{:#}", e),
                    },
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
            let _ = tx.send(ChannelEvent::Closed { attempt });
        })
    }
}

impl Drop for ConnectionController {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}
