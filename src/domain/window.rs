// Fixed-capacity sliding window of multi-channel samples
use crate::domain::error::TelemetryError;
use crate::domain::sample::{Reading, SampleInput};
use std::collections::VecDeque;

/// Initial contents of a window.
#[derive(Debug, Clone)]
pub enum WindowSeed {
    /// Fill the whole capacity with this value on every channel.
    Value(f64),
    /// Adopt these readings as-is; capacity becomes their count.
    Series(Vec<Reading>),
}

/// Ring buffer of readings, oldest at the front.
///
/// `len() <= capacity()` holds after every mutation, and the reading at
/// `len() - 1 - i` is the one pushed `i` ticks ago.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    channels: usize,
    capacity: usize,
    interval_seconds: f64,
    samples: VecDeque<Reading>,
}

impl SampleWindow {
    pub fn initialize(
        channels: usize,
        capacity: usize,
        seed: WindowSeed,
        interval_seconds: f64,
    ) -> Result<Self, TelemetryError> {
        match seed {
            WindowSeed::Value(value) => {
                Self::with_seed(channels, capacity, value, interval_seconds)
            }
            WindowSeed::Series(series) => {
                let window = Self::from_series(series, interval_seconds)?;
                if window.channels != channels {
                    return Err(TelemetryError::ChannelMismatch {
                        expected: channels,
                        actual: window.channels,
                    });
                }
                Ok(window)
            }
        }
    }

    pub fn with_seed(
        channels: usize,
        capacity: usize,
        seed_value: f64,
        interval_seconds: f64,
    ) -> Result<Self, TelemetryError> {
        if capacity == 0 {
            return Err(TelemetryError::InvalidCapacity);
        }
        if channels == 0 {
            return Err(TelemetryError::ChannelMismatch {
                expected: 1,
                actual: 0,
            });
        }

        let samples = std::iter::repeat_with(|| vec![seed_value; channels])
            .take(capacity)
            .collect();

        Ok(Self {
            channels,
            capacity,
            interval_seconds,
            samples,
        })
    }

    pub fn from_series(
        series: Vec<Reading>,
        interval_seconds: f64,
    ) -> Result<Self, TelemetryError> {
        let channels = check_series(&series)?;
        Ok(Self {
            channels,
            capacity: series.len(),
            interval_seconds,
            samples: series.into(),
        })
    }

    /// Append one reading, evicting the oldest when over capacity.
    ///
    /// An absent reading leaves the window untouched and reports `NoData`.
    pub fn tick(&mut self, input: Option<SampleInput>) -> Result<(), TelemetryError> {
        let input = input.ok_or(TelemetryError::NoData)?;
        let actual = input.arity().unwrap_or(self.channels);
        let reading = input
            .into_reading(self.channels)
            .ok_or(TelemetryError::ChannelMismatch {
                expected: self.channels,
                actual,
            })?;

        self.samples.push_back(reading);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        Ok(())
    }

    /// Current readings, oldest first.
    pub fn snapshot(&self) -> &VecDeque<Reading> {
        &self.samples
    }

    /// Replace the contents wholesale, typically with a historical batch.
    /// The capacity follows the new series length.
    pub fn load(
        &mut self,
        series: Vec<Reading>,
        interval_seconds: f64,
    ) -> Result<(), TelemetryError> {
        let channels = check_series(&series)?;
        self.channels = channels;
        self.capacity = series.len();
        self.interval_seconds = interval_seconds;
        self.samples = series.into();
        Ok(())
    }

    /// Values of a single channel, oldest first.
    #[cfg(test)]
    pub fn channel(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.samples
            .iter()
            .filter_map(move |reading| reading.get(index).copied())
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }
}

/// Validate a series and return its channel count.
fn check_series(series: &[Reading]) -> Result<usize, TelemetryError> {
    let first = series.first().ok_or(TelemetryError::InvalidCapacity)?;
    let channels = first.len();
    if channels == 0 {
        return Err(TelemetryError::ChannelMismatch {
            expected: 1,
            actual: 0,
        });
    }
    if let Some(bad) = series.iter().find(|r| r.len() != channels) {
        return Err(TelemetryError::ChannelMismatch {
            expected: channels,
            actual: bad.len(),
        });
    }
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalars(window: &SampleWindow) -> Vec<f64> {
        window.channel(0).collect()
    }

    #[test]
    fn test_seeded_window_fifo() {
        let mut window = SampleWindow::with_seed(1, 5, 0.0, 15.0).unwrap();
        assert_eq!(scalars(&window), vec![0.0; 5]);

        for v in [1.0, 2.0, 3.0] {
            window.tick(Some(SampleInput::Scalar(v))).unwrap();
        }

        assert_eq!(window.len(), 5);
        assert_eq!(scalars(&window), vec![0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_overflow_keeps_last_capacity_readings() {
        let mut window = SampleWindow::with_seed(1, 4, -1.0, 1.0).unwrap();
        for v in 0..100 {
            window.tick(Some(SampleInput::Scalar(v as f64))).unwrap();
            assert_eq!(window.len(), 4);
        }
        assert_eq!(scalars(&window), vec![96.0, 97.0, 98.0, 99.0]);
        assert_eq!(window.latest(), Some(&vec![99.0]));
    }

    #[test]
    fn test_absent_reading_is_no_data() {
        let mut window = SampleWindow::with_seed(1, 3, 7.0, 1.0).unwrap();
        let before = window.snapshot().clone();

        assert_eq!(window.tick(None), Err(TelemetryError::NoData));
        assert_eq!(window.snapshot(), &before);
    }

    #[test]
    fn test_zero_is_a_valid_reading() {
        let mut window = SampleWindow::with_seed(1, 2, 5.0, 1.0).unwrap();
        window.tick(Some(SampleInput::Scalar(0.0))).unwrap();
        assert_eq!(scalars(&window), vec![5.0, 0.0]);
    }

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(
            SampleWindow::with_seed(1, 0, 0.0, 1.0).unwrap_err(),
            TelemetryError::InvalidCapacity
        );
        assert_eq!(
            SampleWindow::from_series(Vec::new(), 1.0).unwrap_err(),
            TelemetryError::InvalidCapacity
        );
    }

    #[test]
    fn test_quad_channel_ticks() {
        let mut window = SampleWindow::with_seed(4, 3, 0.0, 1.0).unwrap();
        window
            .tick(Some(SampleInput::Channels(vec![1.0, 2.0, 3.0, 4.0])))
            .unwrap();
        window.tick(Some(SampleInput::Scalar(9.0))).unwrap();

        assert_eq!(window.channel(2).collect::<Vec<_>>(), vec![0.0, 3.0, 9.0]);

        let err = window
            .tick(Some(SampleInput::Channels(vec![1.0, 2.0])))
            .unwrap_err();
        assert_eq!(
            err,
            TelemetryError::ChannelMismatch {
                expected: 4,
                actual: 2
            }
        );
        assert_eq!(window.latest(), Some(&vec![9.0; 4]));
    }

    #[test]
    fn test_load_replaces_contents_and_capacity() {
        let mut window = SampleWindow::with_seed(1, 5, 0.0, 15.0).unwrap();
        window
            .load(vec![vec![1.0, 1.5], vec![2.0, 2.5]], 45.0)
            .unwrap();

        assert_eq!(window.len(), 2);
        assert_eq!(window.capacity(), 2);
        assert_eq!(window.channels(), 2);
        assert_eq!(window.interval_seconds(), 45.0);

        window
            .tick(Some(SampleInput::Channels(vec![3.0, 3.5])))
            .unwrap();
        assert_eq!(window.channel(1).collect::<Vec<_>>(), vec![2.5, 3.5]);
    }

    #[test]
    fn test_initialize_from_series() {
        let window = SampleWindow::initialize(
            1,
            2400,
            WindowSeed::Series(vec![vec![1.0], vec![2.0], vec![3.0]]),
            15.0,
        )
        .unwrap();
        assert_eq!(window.capacity(), 3);

        let err = SampleWindow::initialize(4, 10, WindowSeed::Series(vec![vec![1.0]]), 1.0)
            .unwrap_err();
        assert_eq!(
            err,
            TelemetryError::ChannelMismatch {
                expected: 4,
                actual: 1
            }
        );
    }
}
