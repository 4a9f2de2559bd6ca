//! Linear trend forecasting of humidity.
//!
//! Fits `humidity = slope * elapsed_secs + intercept` by ordinary least
//! squares over a window of readings and extrapolates past the latest one.
//! The fit is recomputed from scratch on every call; nothing is carried over.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::config::MIN_FIT_READINGS;
use crate::db::Reading;
use crate::error::InsufficientData;

/// Humidity extrapolated to a future horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Rounded to 2 decimals, not clamped to 0..=100.
    pub predicted_humidity: f64,
    pub horizon_secs: f64,
    /// Percent per second.
    pub slope: f64,
    /// Fitted humidity at the earliest reading used.
    pub intercept: f64,
    pub r_squared: f64,
    pub samples: usize,
}

struct TrendLine {
    slope: f64,
    intercept: f64,
    r_squared: f64,
}

/// Forecast humidity `horizon` after the latest reading in `window`.
///
/// Only readings that carry a humidity value take part in the fit.
pub fn forecast(window: &[Reading], horizon: Duration) -> Result<Forecast, InsufficientData> {
    let usable: Vec<(DateTime<Utc>, f64)> = window
        .iter()
        .filter_map(|r| r.humidity.filter(|h| h.is_finite()).map(|h| (r.timestamp, h)))
        .collect();

    if usable.len() < MIN_FIT_READINGS {
        return Err(InsufficientData::TooFewReadings {
            required: MIN_FIT_READINGS,
            actual: usable.len(),
        });
    }

    let Some(t0) = usable.iter().map(|(ts, _)| *ts).min() else {
        return Err(InsufficientData::TooFewReadings {
            required: MIN_FIT_READINGS,
            actual: 0,
        });
    };

    let points: Vec<(f64, f64)> = usable
        .iter()
        .map(|(ts, h)| (elapsed_secs(t0, *ts), *h))
        .collect();

    let x_max = points.iter().map(|(x, _)| *x).fold(0.0_f64, f64::max);
    if x_max <= 0.0 {
        return Err(InsufficientData::ZeroTimeSpread);
    }

    let line = fit_line(&points).ok_or(InsufficientData::ZeroTimeSpread)?;

    let horizon_secs = horizon.num_milliseconds() as f64 / 1000.0;
    let predicted = line.slope * (x_max + horizon_secs) + line.intercept;

    Ok(Forecast {
        predicted_humidity: round2(predicted),
        horizon_secs,
        slope: line.slope,
        intercept: line.intercept,
        r_squared: line.r_squared,
        samples: points.len(),
    })
}

fn elapsed_secs(t0: DateTime<Utc>, ts: DateTime<Utc>) -> f64 {
    let delta = ts - t0;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

/// Centered OLS. `None` when x has no variance.
fn fit_line(points: &[(f64, f64)]) -> Option<TrendLine> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy > 0.0 {
        (sxy * sxy) / (sxx * syy)
    } else {
        1.0
    };

    Some(TrendLine {
        slope,
        intercept,
        r_squared,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
