// Device status as reported by `state` events
use crate::domain::sample::SampleInput;
use serde::{Deserialize, Serialize};

pub const CONNECTED_STATE: &str = "Connected";
pub const IDLE_CHARGE_STATE: &str = "Idle";

/// Wire payload of a `state` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusPayload {
    pub state: String,
    #[serde(default)]
    pub charge_state: Option<String>,
    #[serde(default)]
    pub voltage: Option<SampleInput>,
    #[serde(default)]
    pub firmware: Option<String>,
}

/// Last known device status. `None` fields render as unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub state: Option<String>,
    pub charge_state: Option<String>,
    pub voltage: Vec<f64>,
    pub firmware_version: Option<String>,
}

impl DeviceStatus {
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Status of a box that is reachable through the server but not usable.
    pub fn offline(state: String) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn from_payload(payload: StatusPayload) -> Self {
        Self {
            state: Some(payload.state),
            charge_state: payload.charge_state,
            voltage: payload.voltage.map(|v| v.values()).unwrap_or_default(),
            firmware_version: payload.firmware,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.as_deref() == Some(CONNECTED_STATE)
    }

    pub fn is_idle(&self) -> bool {
        self.charge_state.as_deref() == Some(IDLE_CHARGE_STATE)
    }
}

/// Enablement of the operator controls: `start` covers every mode that
/// launches a cycle, `stop` the one that ends it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

impl ControlState {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn for_device(device: &DeviceStatus) -> Self {
        if !device.is_connected() {
            return Self::disabled();
        }
        let idle = device.is_idle();
        Self {
            start_enabled: idle,
            stop_enabled: !idle,
        }
    }
}
