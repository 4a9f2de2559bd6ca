use serde::Serialize;

use super::config::WATERING_THRESHOLD_PCT;
use super::forecast::Forecast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    WaterNow,
    NoAction,
}

impl Decision {
    /// Advice line shown on the dashboard.
    pub fn advice(&self) -> &'static str {
        match self {
            Decision::WaterNow => "Siram tanaman dalam 1 jam ke depan!",
            Decision::NoAction => "Tidak perlu disiram",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub decision: Decision,
    pub advice: &'static str,
    pub forecast: Forecast,
}

/// Water when the forecast drops strictly below [`WATERING_THRESHOLD_PCT`].
///
/// No hysteresis: a single forecast decides. NaN compares false and yields
/// `NoAction`.
pub fn recommend(forecast: Forecast) -> Recommendation {
    let decision = if forecast.predicted_humidity < WATERING_THRESHOLD_PCT {
        Decision::WaterNow
    } else {
        Decision::NoAction
    };

    Recommendation {
        decision,
        advice: decision.advice(),
        forecast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast_of(predicted_humidity: f64) -> Forecast {
        Forecast {
            predicted_humidity,
            horizon_secs: 3600.0,
            slope: 0.0,
            intercept: predicted_humidity,
            r_squared: 1.0,
            samples: 2,
        }
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(recommend(forecast_of(39.99)).decision, Decision::WaterNow);
        assert_eq!(recommend(forecast_of(40.00)).decision, Decision::NoAction);
        assert_eq!(recommend(forecast_of(40.01)).decision, Decision::NoAction);
    }

    #[test]
    fn test_extreme_values() {
        assert_eq!(recommend(forecast_of(-250.0)).decision, Decision::WaterNow);
        assert_eq!(recommend(forecast_of(180.0)).decision, Decision::NoAction);
        assert_eq!(
            recommend(forecast_of(f64::NEG_INFINITY)).decision,
            Decision::WaterNow
        );
        assert_eq!(recommend(forecast_of(f64::NAN)).decision, Decision::NoAction);
    }

    #[test]
    fn test_recommendation_carries_forecast_and_advice() {
        let rec = recommend(forecast_of(20.0));
        assert_eq!(rec.forecast.predicted_humidity, 20.0);
        assert_eq!(rec.advice, "Siram tanaman dalam 1 jam ke depan!");
    }

    #[test]
    fn test_decision_serializes_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(Decision::WaterNow).unwrap(),
            serde_json::json!("WATER_NOW")
        );
        assert_eq!(
            serde_json::to_value(Decision::NoAction).unwrap(),
            serde_json::json!("NO_ACTION")
        );
    }
}
