//! API route handlers

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::analysis::{self, config::MAX_HORIZON_SECS, Forecast, Recommendation, WindowStats};
use crate::db::Reading;
use crate::AppState;

use super::ApiError;

const NO_DATA_MESSAGE: &str = "Tidak ada data yang ditemukan!";
const INSUFFICIENT_MESSAGE: &str = "Data tidak cukup untuk prediksi.";

pub async fn home() -> &'static str {
    "Plant monitor backend is running"
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub id: String,
}

/// The body is taken raw so malformed payloads get our own error shape
/// rather than the extractor's.
pub async fn tambah(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let id = state.ingestor.ingest_bytes(&body).await?;
    Ok(Json(IngestResponse {
        status: "sukses",
        id,
    }))
}

pub async fn data(State(state): State<AppState>) -> Result<Json<Vec<Reading>>, ApiError> {
    Ok(Json(state.db.all_readings().await?))
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub hours: Option<u32>,
    pub horizon_secs: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub window_hours: u32,
    pub horizon_secs: i64,
    pub stats: WindowStats,
    /// `None` when the window cannot support a fit.
    pub forecast: Option<Forecast>,
    pub recommendation: Option<Recommendation>,
    pub message: String,
}

/// Window, forecast and recommendation in one call, for consumers that do
/// not fit the trend themselves.
pub async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let window_hours = query.hours.unwrap_or(state.defaults.window_hours);
    let horizon_secs = query.horizon_secs.unwrap_or(state.defaults.horizon_secs);
    if !(0..=MAX_HORIZON_SECS).contains(&horizon_secs) {
        return Err(ApiError::InvalidQuery(format!(
            "horizon_secs must be between 0 and {MAX_HORIZON_SECS}"
        )));
    }

    let readings = analysis::window(&state.db, Duration::hours(i64::from(window_hours))).await?;
    let stats = WindowStats::from_window(&readings);

    let (forecast, recommendation, message) =
        match analysis::forecast(&readings, Duration::seconds(horizon_secs)) {
            Ok(forecast) => {
                let recommendation = analysis::recommend(forecast.clone());
                let message = recommendation.advice.to_string();
                (Some(forecast), Some(recommendation), message)
            }
            Err(_) if readings.is_empty() => (None, None, NO_DATA_MESSAGE.to_string()),
            Err(_) => (None, None, INSUFFICIENT_MESSAGE.to_string()),
        };

    Ok(Json(ForecastResponse {
        window_hours,
        horizon_secs,
        stats,
        forecast,
        recommendation,
        message,
    }))
}
