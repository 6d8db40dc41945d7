// Historical session logs returned by the server
use crate::domain::error::TelemetryError;
use crate::domain::sample::Reading;
use serde::{Deserialize, Serialize};

/// One recorded channel: evenly spaced values between `start` and `end`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MeasureLog {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub data: Option<Vec<f64>>,
}

impl MeasureLog {
    pub fn values(&self) -> &[f64] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Seconds between consecutive values: `(end - start) / len`.
    pub fn interval_seconds(&self) -> Result<f64, TelemetryError> {
        let len = self.values().len();
        if len == 0 {
            return Err(TelemetryError::NoData);
        }
        let start = parse_time(&self.start)?;
        let end = parse_time(&self.end)?;
        let span_ms = end.timestamp_millis() - start.timestamp_millis();
        Ok(span_ms as f64 / 1000.0 / len as f64)
    }
}

fn parse_time(value: &str) -> Result<chrono::DateTime<chrono::FixedOffset>, TelemetryError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map_err(|e| TelemetryError::Decode(format!("timestamp {:?}: {}", value, e)))
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(default)]
    pub beta_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Battery {
    #[serde(default)]
    pub beta_ref: String,
    #[serde(default, rename = "Type")]
    pub kind: String,
    #[serde(default)]
    pub voltage: Option<f64>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
}

/// Full record of a finished cycle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionLog {
    pub measures: MeasureLog,
    #[serde(default)]
    pub measures1: Option<MeasureLog>,
    #[serde(default)]
    pub measures2: Option<MeasureLog>,
    #[serde(default)]
    pub measures3: Option<MeasureLog>,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub battery: Battery,
    #[serde(default)]
    pub resistor: Option<f64>,
    #[serde(default)]
    pub cycle_type: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub total_duration: serde_json::Value,
    #[serde(default)]
    pub target_reached: bool,
}

impl SessionLog {
    /// Primary channel followed by every extra channel that carries data.
    fn channels(&self) -> Vec<&[f64]> {
        std::iter::once(&self.measures)
            .chain(
                [&self.measures1, &self.measures2, &self.measures3]
                    .into_iter()
                    .flatten(),
            )
            .map(MeasureLog::values)
            .filter(|values| !values.is_empty())
            .collect()
    }

    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    /// Readings zipped across channels, truncated to the shortest one.
    pub fn series(&self) -> Vec<Reading> {
        let channels = self.channels();
        let len = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        (0..len)
            .map(|i| channels.iter().map(|c| c[i]).collect())
            .collect()
    }

    pub fn interval_seconds(&self) -> Result<f64, TelemetryError> {
        self.measures.interval_seconds()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            cycle_type: self.cycle_type.clone(),
            reason: self.reason.clone(),
            target_reached: self.target_reached,
            total_duration: self.total_duration.clone(),
            start: self.measures.start.clone(),
            end: self.measures.end.clone(),
            config: self.config.clone(),
            user: self.user.clone(),
            battery: self.battery.clone(),
            resistor: self.resistor,
        }
    }
}

/// Session metadata published next to a historical chart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub cycle_type: String,
    pub reason: String,
    pub target_reached: bool,
    pub total_duration: serde_json::Value,
    pub start: String,
    pub end: String,
    pub config: serde_json::Value,
    pub user: User,
    pub battery: Battery,
    pub resistor: Option<f64>,
}
