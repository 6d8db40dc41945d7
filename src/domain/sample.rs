// Sample domain model
use serde::{Deserialize, Serialize};

/// One time step across all channels, `reading[k]` being channel `k`.
pub type Reading = Vec<f64>;

/// A streamed reading as it arrives on the wire: either one value for
/// every channel or an explicit per-channel tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleInput {
    Scalar(f64),
    Channels(Vec<f64>),
}

impl SampleInput {
    /// Number of channels carried, `None` for a scalar.
    pub fn arity(&self) -> Option<usize> {
        match self {
            SampleInput::Scalar(_) => None,
            SampleInput::Channels(values) => Some(values.len()),
        }
    }

    /// Expand into a reading of `channels` values. Scalars are broadcast.
    pub fn into_reading(self, channels: usize) -> Option<Reading> {
        match self {
            SampleInput::Scalar(value) => Some(vec![value; channels]),
            SampleInput::Channels(values) if values.len() == channels => Some(values),
            SampleInput::Channels(_) => None,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match self {
            SampleInput::Scalar(value) => vec![*value],
            SampleInput::Channels(values) => values.clone(),
        }
    }
}
