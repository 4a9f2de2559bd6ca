//! Trailing-window selection over the record store.
//!
//! Every call re-reads the store; nothing is cached between calls.

use chrono::{DateTime, Duration, Utc};

use crate::db::{Database, Reading};
use crate::error::StoreError;

/// Readings with `timestamp >= now - duration`, ascending by time.
pub async fn window(db: &Database, duration: Duration) -> Result<Vec<Reading>, StoreError> {
    window_at(db, Utc::now(), duration).await
}

/// Same as [`window`] but evaluated against an explicit instant.
///
/// A zero or negative duration is an empty window and never touches the store.
pub async fn window_at(
    db: &Database,
    now: DateTime<Utc>,
    duration: Duration,
) -> Result<Vec<Reading>, StoreError> {
    if duration <= Duration::zero() {
        return Ok(Vec::new());
    }

    match now.checked_sub_signed(duration) {
        Some(start) => db.query_range(start).await,
        // Window reaches past the representable range: everything qualifies.
        None => db.all_readings().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewReading;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 10, 12, 0, 0).unwrap()
    }

    async fn seeded() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("window.sqlite3")).unwrap();
        // Out of order on purpose: 5h, 30m, 2h, 10m before `now`.
        for minutes_ago in [300, 30, 120, 10] {
            db.insert_reading(
                &NewReading::new(Some(26.0), Some(minutes_ago as f64))
                    .at(now() - Duration::minutes(minutes_ago)),
            )
            .await
            .unwrap();
        }
        (dir, db)
    }

    #[tokio::test]
    async fn test_window_selects_trailing_readings_in_order() {
        let (_dir, db) = seeded().await;

        let readings = window_at(&db, now(), Duration::hours(1)).await.unwrap();
        let humidities: Vec<f64> = readings.iter().filter_map(|r| r.humidity).collect();
        assert_eq!(humidities, vec![30.0, 10.0]);
    }

    #[tokio::test]
    async fn test_window_is_non_decreasing_for_any_duration() {
        let (_dir, db) = seeded().await;

        for hours in [1, 3, 6, 24] {
            let readings = window_at(&db, now(), Duration::hours(hours)).await.unwrap();
            assert!(readings
                .windows(2)
                .all(|pair| pair[0].timestamp <= pair[1].timestamp));
        }
    }

    #[tokio::test]
    async fn test_shorter_window_is_suffix_of_longer_window() {
        let (_dir, db) = seeded().await;

        let short = window_at(&db, now(), Duration::minutes(45)).await.unwrap();
        let long = window_at(&db, now(), Duration::hours(6)).await.unwrap();

        assert!(short.len() <= long.len());
        assert_eq!(short.as_slice(), &long[long.len() - short.len()..]);
    }

    #[tokio::test]
    async fn test_non_positive_duration_is_empty() {
        let (_dir, db) = seeded().await;

        assert!(window_at(&db, now(), Duration::zero()).await.unwrap().is_empty());
        assert!(window_at(&db, now(), Duration::hours(-2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_huge_duration_returns_everything() {
        let (_dir, db) = seeded().await;

        let readings = window_at(&db, now(), Duration::days(365 * 1_000_000)).await.unwrap();
        assert_eq!(readings.len(), 4);
    }

    #[tokio::test]
    async fn test_reading_just_before_window_start_is_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("edge.sqlite3")).unwrap();
        let stamp = Utc.with_ymd_and_hms(2024, 7, 10, 0, 0, 0).unwrap();
        db.insert_reading(&NewReading::new(None, Some(45.0)).at(stamp))
            .await
            .unwrap();

        let now = stamp + Duration::hours(1) + Duration::nanoseconds(500);
        assert!(window_at(&db, now, Duration::hours(1)).await.unwrap().is_empty());

        let now = stamp + Duration::hours(1);
        assert_eq!(window_at(&db, now, Duration::hours(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_window_reflects_inserts_between_calls() {
        let (_dir, db) = seeded().await;
        let before = window_at(&db, now(), Duration::hours(1)).await.unwrap();

        db.insert_reading(&NewReading::new(None, Some(5.0)).at(now() - Duration::minutes(1)))
            .await
            .unwrap();

        let after = window_at(&db, now(), Duration::hours(1)).await.unwrap();
        assert_eq!(after.len(), before.len() + 1);
    }
}
