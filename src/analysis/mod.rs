pub mod config;
pub mod forecast;
pub mod recommendation;
pub mod stats;
pub mod window;

pub use forecast::{forecast, Forecast};
pub use recommendation::{recommend, Decision, Recommendation};
pub use stats::{MetricSummary, WindowStats};
pub use window::{window, window_at};
