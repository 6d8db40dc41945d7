// Inbound wire events
use crate::domain::cycle::CyclePayload;
use crate::domain::device::StatusPayload;
use crate::domain::error::TelemetryError;
use crate::domain::sample::SampleInput;
use serde::Deserialize;

/// Envelope of every frame sent by the server: `{"Type": .., "Data": ..}`.
#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Data", default)]
    data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// `ticker`: a new reading, absent when the box had none to give.
    Sample(Option<SampleInput>),
    /// `state`
    Status(StatusPayload),
    /// `cycle`
    Progress(CyclePayload),
}

impl TelemetryEvent {
    pub fn decode(frame: &str) -> Result<Self, TelemetryError> {
        let wire: WireFrame = serde_json::from_str(frame)?;
        match wire.kind.as_str() {
            "ticker" => Ok(Self::Sample(serde_json::from_value(wire.data)?)),
            "state" => Ok(Self::Status(serde_json::from_value(wire.data)?)),
            "cycle" => Ok(Self::Progress(serde_json::from_value(wire.data)?)),
            _ => Err(TelemetryError::UnrecognizedEvent(wire.kind)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sample(_) => "ticker",
            Self::Status(_) => "state",
            Self::Progress(_) => "cycle",
        }
    }
}
