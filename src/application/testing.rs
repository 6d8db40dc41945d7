// Test doubles for the application seams
use crate::application::history_repository::HistoryRepository;
use crate::application::notifier::CompletionNotifier;
use crate::application::transport::{FrameStream, FrameTransport};
use crate::domain::cycle::CycleProgress;
use crate::domain::history::{MeasureLog, SessionLog};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Transport that opens after a delay and replays canned frames.
pub struct ScriptedTransport {
    frames: Vec<String>,
    open_after: Duration,
    frame_gap: Duration,
    hold_open: bool,
}

impl ScriptedTransport {
    pub fn new(frames: Vec<&str>) -> Self {
        Self {
            frames: frames.into_iter().map(String::from).collect(),
            open_after: Duration::ZERO,
            frame_gap: Duration::ZERO,
            hold_open: true,
        }
    }

    pub fn open_after(mut self, delay: Duration) -> Self {
        self.open_after = delay;
        self
    }

    /// Wait `gap` before delivering each frame.
    pub fn frame_gap(mut self, gap: Duration) -> Self {
        self.frame_gap = gap;
        self
    }

    /// Close the channel once every frame was delivered.
    pub fn close_when_drained(mut self) -> Self {
        self.hold_open = false;
        self
    }

    pub fn stream(frames: Vec<String>, hold_open: bool) -> Box<dyn FrameStream> {
        Box::new(ScriptedStream {
            frames: frames.into(),
            frame_gap: Duration::ZERO,
            hold_open,
        })
    }
}

#[async_trait]
impl FrameTransport for ScriptedTransport {
    async fn connect(&self, _address: &str) -> anyhow::Result<Box<dyn FrameStream>> {
        tokio::time::sleep(self.open_after).await;
        Ok(Box::new(ScriptedStream {
            frames: self.frames.clone().into(),
            frame_gap: self.frame_gap,
            hold_open: self.hold_open,
        }))
    }
}

struct ScriptedStream {
    frames: VecDeque<String>,
    frame_gap: Duration,
    hold_open: bool,
}

#[async_trait]
impl FrameStream for ScriptedStream {
    async fn next_frame(&mut self) -> Option<anyhow::Result<String>> {
        if let Some(frame) = self.frames.pop_front() {
            tokio::time::sleep(self.frame_gap).await;
            return Some(Ok(frame));
        }
        if self.hold_open {
            std::future::pending::<()>().await;
        }
        None
    }
}

/// Repository serving fixed data after `delay`; `None` fields fail.
#[derive(Default)]
pub struct FakeHistory {
    pub live: Option<Vec<f64>>,
    pub session: Option<SessionLog>,
    pub delay: Duration,
}

#[async_trait]
impl HistoryRepository for FakeHistory {
    async fn fetch_last_session(&self, _address: &str) -> anyhow::Result<SessionLog> {
        tokio::time::sleep(self.delay).await;
        self.session
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no recorded session"))
    }

    async fn fetch_session(&self, _address: &str, name: &str) -> anyhow::Result<SessionLog> {
        tokio::time::sleep(self.delay).await;
        self.session
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no session named {}", name))
    }

    async fn fetch_live_data(&self, _address: &str) -> anyhow::Result<MeasureLog> {
        tokio::time::sleep(self.delay).await;
        let data = self
            .live
            .clone()
            .ok_or_else(|| anyhow::anyhow!("live log unavailable"))?;
        Ok(MeasureLog {
            start: "2018-03-01T10:00:00Z".to_string(),
            end: "2018-03-01T11:00:00Z".to_string(),
            data: Some(data),
        })
    }
}

/// Remembers the status of every finished cycle it was told about.
#[derive(Default)]
pub struct RecordingNotifier {
    pub finished: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.finished.lock().map(|f| f.len()).unwrap_or(0)
    }
}

impl CompletionNotifier for RecordingNotifier {
    fn cycle_finished(&self, progress: &CycleProgress) {
        if let Ok(mut finished) = self.finished.lock() {
            finished.push(progress.status.clone().unwrap_or_default());
        }
    }
}

/// A session log with `len` readings on one channel spread over `len` minutes.
pub fn session_log(len: usize) -> SessionLog {
    let data: Vec<f64> = (0..len).map(|i| i as f64).collect();
    let end = chrono::DateTime::parse_from_rfc3339("2018-03-01T00:00:00Z")
        .map(|start| start + chrono::Duration::minutes(len as i64))
        .map(|end| end.to_rfc3339())
        .unwrap_or_default();
    serde_json::from_value(serde_json::json!({
        "Measures": {"Start": "2018-03-01T00:00:00Z", "End": end, "Data": data},
        "CycleType": "Discharge",
        "Reason": "Target voltage reached",
        "TotalDuration": "50h0m0s",
        "TargetReached": true
    }))
    .unwrap()
}
