use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};

use crate::analysis::config::{DEFAULT_HORIZON_SECS, DEFAULT_WINDOW_HOURS, MAX_HORIZON_SECS};

const DEFAULT_DB_PATH: &str = "data/plant-monitor.sqlite3";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DEVICE_LABEL: &str = "sensor_suhu";
const DEFAULT_UBIDOTS_BASE_URL: &str = "https://industrial.api.ubidots.com";

/// Credentials and target for the telemetry side channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardingSettings {
    pub token: String,
    pub device_label: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub store_timeout: Duration,
    pub window_hours: u32,
    pub horizon_secs: i64,
    /// `None` disables forwarding.
    pub forwarding: Option<ForwardingSettings>,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_path = var("PLANT_MONITOR_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(var("PORT"), "PORT", DEFAULT_PORT)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("invalid HOST:PORT configuration '{host}:{port}'"))?;

        let store_timeout_ms =
            parse_or(var("STORE_TIMEOUT_MS"), "STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?;
        let window_hours =
            parse_or(var("FORECAST_WINDOW_HOURS"), "FORECAST_WINDOW_HOURS", DEFAULT_WINDOW_HOURS)?;
        let horizon_secs =
            parse_or(var("FORECAST_HORIZON_SECS"), "FORECAST_HORIZON_SECS", DEFAULT_HORIZON_SECS)?;
        if !(0..=MAX_HORIZON_SECS).contains(&horizon_secs) {
            bail!("FORECAST_HORIZON_SECS must be between 0 and {MAX_HORIZON_SECS}, got {horizon_secs}");
        }

        let forwarding = var("UBIDOTS_TOKEN").map(|token| ForwardingSettings {
            token,
            device_label: var("UBIDOTS_DEVICE_LABEL")
                .unwrap_or_else(|| DEFAULT_DEVICE_LABEL.to_string()),
            base_url: var("UBIDOTS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_UBIDOTS_BASE_URL.to_string()),
        });

        Ok(Self {
            db_path,
            bind_addr,
            store_timeout: Duration::from_millis(store_timeout_ms),
            window_hours,
            horizon_secs,
            forwarding,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}
