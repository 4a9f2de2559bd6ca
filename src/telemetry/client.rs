use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

use crate::db::Reading;
use crate::settings::ForwardingSettings;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct UbidotsClient {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl UbidotsClient {
    pub fn new(settings: &ForwardingSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build telemetry HTTP client")?;

        Ok(Self {
            http,
            url: device_url(&settings.base_url, &settings.device_label),
            token: settings.token.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post one reading. Returns `Ok(false)` when the reading carries no
    /// metric and nothing was sent.
    pub async fn send(&self, reading: &Reading) -> Result<bool> {
        let Some(body) = device_payload(reading) else {
            return Ok(false);
        };

        self.http
            .post(&self.url)
            .header("X-Auth-Token", &self.token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?
            .error_for_status()
            .context("telemetry endpoint rejected reading")?;

        Ok(true)
    }
}

fn device_url(base_url: &str, device_label: &str) -> String {
    format!(
        "{}/api/v1.6/devices/{}",
        base_url.trim_end_matches('/'),
        device_label
    )
}

/// `{"temperature": {"value": ..}, "humidity": {"value": ..}}`, omitting
/// absent metrics.
fn device_payload(reading: &Reading) -> Option<Value> {
    let mut variables = Map::new();
    if let Some(temperature) = reading.temperature {
        variables.insert("temperature".into(), json!({ "value": temperature }));
    }
    if let Some(humidity) = reading.humidity {
        variables.insert("humidity".into(), json!({ "value": humidity }));
    }

    (!variables.is_empty()).then_some(Value::Object(variables))
}
