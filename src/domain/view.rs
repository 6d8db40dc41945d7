// Dashboard view state shared with the renderer
use crate::domain::cycle::{CycleProgress, CycleView};
use crate::domain::device::{ControlState, DeviceStatus};
use crate::domain::history::SessionSummary;
use crate::domain::link::{ConnectionState, LinkIndicator};
use crate::domain::sample::Reading;
use crate::domain::time_axis::{AxisMode, AxisTick};
use serde::Serialize;

/// Device and cycle fields written by the event router.
#[derive(Debug, Clone, Default)]
pub struct LiveState {
    pub device: DeviceStatus,
    pub controls: ControlState,
    pub cycle: CycleProgress,
}

impl LiveState {
    /// Reset every live display field to unknown and lock the controls.
    pub fn clear(&mut self) {
        self.device = DeviceStatus::unknown();
        self.controls = ControlState::disabled();
        self.cycle.clear_display();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    pub state: ConnectionState,
    pub indicator: LinkIndicator,
    /// `indicator` as displayed text.
    pub label: String,
    pub address: String,
}

impl ConnectionView {
    pub fn new(state: ConnectionState, indicator: LinkIndicator, address: String) -> Self {
        Self {
            state,
            label: indicator.text().to_string(),
            indicator,
            address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub mode: AxisMode,
    pub channels: usize,
    pub capacity: usize,
    pub interval_seconds: f64,
    pub samples: Vec<Reading>,
    /// Newest reading, the one shown as current.
    pub latest: Option<Reading>,
    pub ticks: Vec<AxisTick>,
}

/// Everything the renderer needs for one redraw.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub connection: ConnectionView,
    pub controls: ControlState,
    pub device: DeviceStatus,
    pub cycle: CycleView,
    pub chart: Option<ChartView>,
    pub session: Option<SessionSummary>,
}

impl DashboardView {
    pub fn new(address: String) -> Self {
        Self {
            connection: ConnectionView::new(ConnectionState::Idle, LinkIndicator::Blank, address),
            controls: ControlState::disabled(),
            device: DeviceStatus::unknown(),
            cycle: CycleView::default(),
            chart: None,
            session: None,
        }
    }
}
