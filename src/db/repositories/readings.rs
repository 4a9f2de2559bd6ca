use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{ceil_to_stored_precision, format_timestamp, parse_datetime},
    models::{NewReading, Reading},
};
use crate::error::StoreError;

const SELECT_COLUMNS: &str = "SELECT id, recorded_at, temperature, humidity FROM readings";

fn row_to_reading(row: &Row) -> Result<Reading> {
    let recorded_at: String = row.get("recorded_at")?;

    Ok(Reading {
        id: row.get("id")?,
        timestamp: parse_datetime(&recorded_at, "recorded_at")?,
        temperature: row.get("temperature")?,
        humidity: row.get("humidity")?,
    })
}

fn select_readings(conn: &Connection, since: Option<&str>) -> Result<Vec<Reading>> {
    let mut readings = Vec::new();
    match since {
        Some(start) => {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE recorded_at >= ?1 ORDER BY recorded_at ASC, seq ASC"
            ))?;
            let mut rows = stmt.query(params![start])?;
            while let Some(row) = rows.next()? {
                readings.push(row_to_reading(row)?);
            }
        }
        None => {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY recorded_at ASC, seq ASC"))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                readings.push(row_to_reading(row)?);
            }
        }
    }
    Ok(readings)
}

/// Latest server-assigned stamp. Caller-supplied stamps are excluded so a
/// backfill dated in the future cannot pin later server stamps.
fn latest_server_timestamp(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
    let latest: Option<String> = conn
        .query_row(
            "SELECT MAX(recorded_at) FROM readings WHERE server_stamped = 1",
            [],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    latest
        .map(|raw| parse_datetime(&raw, "recorded_at"))
        .transpose()
}

impl Database {
    /// Append a reading and return its generated id.
    pub async fn insert_reading(&self, reading: &NewReading) -> Result<String, StoreError> {
        self.store_reading(reading).await.map(|stored| stored.id)
    }

    /// Append a reading and return it as persisted.
    ///
    /// Stamping, id generation and the write run as one task on the store
    /// worker, so concurrent callers never race on either.
    pub async fn store_reading(&self, reading: &NewReading) -> Result<Reading, StoreError> {
        let record = reading.clone();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open insert transaction")?;

            let server_stamped = record.timestamp.is_none();
            let timestamp = match record.timestamp {
                Some(explicit) => explicit,
                None => {
                    // Never step behind an earlier server stamp if the clock moves back.
                    let now = Utc::now();
                    match latest_server_timestamp(&tx)? {
                        Some(latest) if latest > now => latest,
                        _ => now,
                    }
                }
            };
            // Truncate to the stored precision so the returned value equals a read-back.
            let timestamp = parse_datetime(&format_timestamp(&timestamp), "recorded_at")?;
            let id = Uuid::new_v4().to_string();

            tx.execute(
                "INSERT INTO readings (id, recorded_at, temperature, humidity, server_stamped)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    format_timestamp(&timestamp),
                    record.temperature,
                    record.humidity,
                    server_stamped,
                ],
            )
            .context("failed to insert reading")?;
            tx.commit().context("failed to commit reading")?;

            Ok(Reading {
                id,
                timestamp,
                temperature: record.temperature,
                humidity: record.humidity,
            })
        })
        .await
    }

    /// Every reading with `timestamp >= start`, ascending; ties keep insert order.
    pub async fn query_range(&self, start: DateTime<Utc>) -> Result<Vec<Reading>, StoreError> {
        let start = format_timestamp(&ceil_to_stored_precision(&start));
        self.execute(move |conn| {
            select_readings(conn, Some(&start)).context("failed to query readings by range")
        })
        .await
    }

    pub async fn all_readings(&self) -> Result<Vec<Reading>, StoreError> {
        self.execute(|conn| select_readings(conn, None).context("failed to list readings"))
            .await
    }

    pub async fn count_readings(&self) -> Result<u64, StoreError> {
        self.execute(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))
                .context("failed to count readings")?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
        .await
    }
}
