// Cycle progress as reported by `cycle` events
use crate::domain::time_axis::format_duration;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Wire payload of a `cycle` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CyclePayload {
    #[serde(rename = "Type")]
    pub kind: String,
    pub status: String,
    #[serde(default)]
    pub target: f64,
    #[serde(rename = "Final", default)]
    pub is_final: bool,
    #[serde(rename = "Erronous", default)]
    pub erroneous: bool,
}

/// Wall-clock runtime of the current cycle. At most one run is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeCounter {
    started_at: Option<Instant>,
    frozen: Option<Duration>,
}

impl RuntimeCounter {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.frozen.is_none()
    }

    /// Start a new run unless one is already active.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.started_at = Some(now);
        self.frozen = None;
        true
    }

    /// Freeze the active run. Returns whether a run was stopped.
    pub fn stop(&mut self, now: Instant) -> bool {
        match (self.started_at, self.frozen) {
            (Some(started), None) => {
                self.frozen = Some(now.saturating_duration_since(started));
                true
            }
            _ => false,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match (self.started_at, self.frozen) {
            (_, Some(frozen)) => Some(frozen),
            (Some(started), None) => Some(now.saturating_duration_since(started)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CycleProgress {
    pub kind: Option<String>,
    pub status: Option<String>,
    pub target: Option<f64>,
    pub is_final: bool,
    pub erroneous: bool,
    pub runtime: RuntimeCounter,
}

/// What applying a progress event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressChange {
    pub runtime_started: bool,
    pub runtime_stopped: bool,
}

impl CycleProgress {
    pub fn apply(&mut self, payload: CyclePayload, now: Instant) -> ProgressChange {
        self.kind = Some(payload.kind);
        self.status = Some(payload.status);
        self.target = Some(payload.target);
        self.is_final = payload.is_final;
        self.erroneous = payload.erroneous;

        if payload.is_final {
            ProgressChange {
                runtime_started: false,
                runtime_stopped: self.runtime.stop(now),
            }
        } else {
            ProgressChange {
                runtime_started: self.runtime.start(now),
                runtime_stopped: false,
            }
        }
    }

    /// Forget the displayed fields. The runtime counter keeps going.
    pub fn clear_display(&mut self) {
        let runtime = self.runtime;
        *self = Self {
            runtime,
            ..Self::default()
        };
    }

    pub fn view(&self, now: Instant) -> CycleView {
        let elapsed = self.runtime.elapsed(now);
        CycleView {
            kind: self.kind.clone(),
            status: self.status.clone(),
            target: self.target,
            is_final: self.is_final,
            erroneous: self.erroneous,
            running: self.runtime.is_running(),
            runtime_seconds: elapsed.map(|d| d.as_secs()),
            runtime_label: elapsed.map(format_duration),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleView {
    pub kind: Option<String>,
    pub status: Option<String>,
    pub target: Option<f64>,
    pub is_final: bool,
    pub erroneous: bool,
    pub running: bool,
    pub runtime_seconds: Option<u64>,
    pub runtime_label: Option<String>,
}
