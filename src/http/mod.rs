//! HTTP surface consumed by the sensor device and the dashboard.

mod error;
mod routes;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use error::ApiError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/health", get(routes::health))
        .route("/tambah", post(routes::tambah))
        .route("/data", get(routes::data))
        .route("/forecast", get(routes::forecast))
        .with_state(state)
}
