//! Summary statistics for a window of readings.

use serde::Serialize;

use crate::db::Reading;

/// Min / max / mean of one metric over the readings that carry it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl MetricSummary {
    fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
            count,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStats {
    pub count: usize,
    pub latest: Option<Reading>,
    pub temperature: Option<MetricSummary>,
    pub humidity: Option<MetricSummary>,
}

impl WindowStats {
    /// `window` is expected in ascending time order; `latest` is its last element.
    pub fn from_window(window: &[Reading]) -> Self {
        Self {
            count: window.len(),
            latest: window.last().cloned(),
            temperature: MetricSummary::from_values(window.iter().filter_map(|r| r.temperature)),
            humidity: MetricSummary::from_values(window.iter().filter_map(|r| r.humidity)),
        }
    }
}
