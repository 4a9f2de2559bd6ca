use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use plant_monitor_lib::{
    db::{Database, NewReading},
    http, AppState, ForecastDefaults,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("http.sqlite3")).unwrap();
    (dir, AppState::new(db, None, ForecastDefaults::default()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_tambah(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/tambah")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_tambah_then_data() {
    let (_dir, state) = test_state();

    let (status, body) = send(
        http::router(state.clone()),
        post_tambah(r#"{"temperature": 28.5, "humidity": 70}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "sukses");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(http::router(state), get("/data")).await;
    assert_eq!(status, StatusCode::OK);
    let readings = body.as_array().unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0]["id"], json!(id));
    assert_eq!(readings[0]["temperature"], json!(28.5));
    assert_eq!(readings[0]["humidity"], json!(70.0));
    assert!(readings[0]["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn test_tambah_keeps_missing_fields_absent() {
    let (_dir, state) = test_state();

    let (status, _) = send(http::router(state.clone()), post_tambah(r#"{"humidity": 45}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(http::router(state), get("/data")).await;
    assert!(body[0].get("temperature").is_none());
    assert_eq!(body[0]["humidity"], json!(45.0));
}

#[tokio::test]
async fn test_tambah_rejects_malformed_payloads() {
    let (_dir, state) = test_state();

    for bad in ["not json", "[28, 70]", r#"{"temperature": "panas"}"#] {
        let (status, body) = send(http::router(state.clone()), post_tambah(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {bad:?}");
        assert_eq!(body["status"], "gagal");
        assert!(body["error"].as_str().unwrap().starts_with("malformed payload"));
    }

    let (_, body) = send(http::router(state), get("/data")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_forecast_without_data() {
    let (_dir, state) = test_state();

    let (status, body) = send(http::router(state), get("/forecast")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["window_hours"], 6);
    assert_eq!(body["horizon_secs"], 3600);
    assert_eq!(body["stats"]["count"], 0);
    assert!(body["forecast"].is_null());
    assert!(body["recommendation"].is_null());
    assert_eq!(body["message"], "Tidak ada data yang ditemukan!");
}

#[tokio::test]
async fn test_forecast_recommends_watering_for_falling_humidity() {
    let (_dir, state) = test_state();
    let now = Utc::now();
    for (secs_ago, humidity) in [(3000, 60.0), (1500, 50.0), (0, 40.0)] {
        state
            .db
            .insert_reading(
                &NewReading::new(Some(30.0), Some(humidity)).at(now - Duration::seconds(secs_ago)),
            )
            .await
            .unwrap();
    }

    let (status, body) = send(http::router(state), get("/forecast?hours=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["window_hours"], 1);
    assert_eq!(body["stats"]["count"], 3);
    assert_eq!(body["stats"]["latest"]["humidity"], json!(40.0));

    let recommendation = &body["recommendation"];
    assert_eq!(recommendation["decision"], "WATER_NOW");
    assert_eq!(recommendation["forecast"]["predicted_humidity"], json!(16.0));
    assert_eq!(body["forecast"]["predicted_humidity"], json!(16.0));
    assert_eq!(body["forecast"]["samples"], 3);
    assert_eq!(body["message"], "Siram tanaman dalam 1 jam ke depan!");

    let mut keys: Vec<&str> = body
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "forecast",
            "horizon_secs",
            "message",
            "recommendation",
            "stats",
            "window_hours"
        ]
    );
}

#[tokio::test]
async fn test_forecast_with_single_reading_is_insufficient() {
    let (_dir, state) = test_state();
    state
        .db
        .insert_reading(&NewReading::new(Some(30.0), Some(55.0)))
        .await
        .unwrap();

    let (status, body) = send(http::router(state), get("/forecast")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["recommendation"].is_null());
    assert_eq!(body["message"], "Data tidak cukup untuk prediksi.");
    assert!(body["forecast"].is_null());
    assert_eq!(body["stats"]["count"], 1);
}

#[tokio::test]
async fn test_forecast_rejects_out_of_range_horizon() {
    let (_dir, state) = test_state();

    let (status, body) = send(http::router(state), get("/forecast?horizon_secs=-60")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "gagal");
}

#[tokio::test]
async fn test_health_and_home() {
    let (_dir, state) = test_state();

    let (status, body) = send(http::router(state.clone()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let response = http::router(state).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
