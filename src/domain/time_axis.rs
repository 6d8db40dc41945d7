// Time-axis labels for sample positions
use serde::Serialize;
use std::time::Duration;

/// How sample positions map to labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisMode {
    /// Counting back from the newest sample ("now", "1.5h ago").
    Reverse,
    /// Counting forward from the first sample ("1h 1m 1s").
    Elapsed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub index: usize,
    pub label: String,
}

/// Label for position `index` of a window holding `len` samples.
pub fn label(mode: AxisMode, index: usize, len: usize, interval_seconds: f64) -> String {
    match mode {
        AxisMode::Reverse => reverse_label(index, len, interval_seconds),
        AxisMode::Elapsed => elapsed_label(index, interval_seconds),
    }
}

pub fn reverse_label(index: usize, len: usize, interval_seconds: f64) -> String {
    if index == len {
        return "now".to_string();
    }
    let hours = (len as f64 - index as f64) * interval_seconds / 3600.0;
    format!("{:.1}h ago", hours)
}

pub fn elapsed_label(index: usize, interval_seconds: f64) -> String {
    format_seconds(index as f64 * interval_seconds)
}

/// Compact duration: hours only when non-zero, minutes when hours or
/// minutes are non-zero, seconds always.
pub fn format_seconds(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);

    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

pub fn format_duration(duration: Duration) -> String {
    format_seconds(duration.as_secs_f64())
}

/// `count` evenly spaced labelled ticks over `0..=len`.
pub fn ticks(mode: AxisMode, len: usize, interval_seconds: f64, count: usize) -> Vec<AxisTick> {
    if count == 0 || len == 0 {
        return Vec::new();
    }
    let step = (len as f64 / count as f64).max(1.0);
    let mut indices: Vec<usize> = (0..=count)
        .map(|i| ((i as f64 * step).round() as usize).min(len))
        .collect();
    indices.dedup();

    indices
        .into_iter()
        .map(|index| AxisTick {
            index,
            label: label(mode, index, len, interval_seconds),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_labels() {
        assert_eq!(reverse_label(2400, 2400, 15.0), "now");
        assert_eq!(reverse_label(0, 2400, 15.0), "10.0h ago");
        assert_eq!(reverse_label(2280, 2400, 15.0), "0.5h ago");
    }

    #[test]
    fn test_elapsed_labels() {
        assert_eq!(elapsed_label(3661, 1.0), "1h 1m 1s");
        assert_eq!(elapsed_label(0, 15.0), "0s");
        assert_eq!(elapsed_label(4, 15.0), "1m 0s");
        assert_eq!(elapsed_label(240, 15.0), "1h 0m 0s");
        assert_eq!(elapsed_label(3, 2.5), "8s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(59)), "59s");
        assert_eq!(format_duration(Duration::from_secs(7325)), "2h 2m 5s");
    }

    #[test]
    fn test_ticks_span_the_window() {
        let ticks = ticks(AxisMode::Reverse, 2400, 15.0, 4);
        let indices: Vec<usize> = ticks.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 600, 1200, 1800, 2400]);
        assert_eq!(ticks.last().unwrap().label, "now");
        assert_eq!(ticks[2].label, "5.0h ago");
    }

    #[test]
    fn test_ticks_on_short_window() {
        let ticks = ticks(AxisMode::Elapsed, 2, 10.0, 10);
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0s", "10s", "20s"]);
    }
}
