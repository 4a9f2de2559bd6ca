/// Forecasted humidity (%) below which watering is recommended.
pub const WATERING_THRESHOLD_PCT: f64 = 40.0;

/// Trailing window the dashboard fits over when the caller gives none.
pub const DEFAULT_WINDOW_HOURS: u32 = 6;

/// How far past the latest reading the trend is extrapolated.
pub const DEFAULT_HORIZON_SECS: i64 = 3600;

/// Upper bound on any requested horizon: one week.
pub const MAX_HORIZON_SECS: i64 = 7 * 24 * 3600;

/// A line needs two distinct points.
pub const MIN_FIT_READINGS: usize = 2;
