//! Sensor reading data model.
//!
//! A `Reading` is one timestamped temperature/humidity observation. Metrics
//! the producer did not send stay `None`; nothing is defaulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted reading. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

/// Insert request for the record store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// Explicit timestamp for backfills; `None` lets the store stamp it.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewReading {
    pub fn new(temperature: Option<f64>, humidity: Option<f64>) -> Self {
        Self {
            temperature,
            humidity,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
