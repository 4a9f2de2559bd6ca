use crate::db::Database;
use crate::error::IngestError;
use crate::telemetry::ForwarderHandle;

use super::payload::ReadingPayload;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Accepts readings, persists them, and hands them to the forwarder.
#[derive(Clone)]
pub struct Ingestor {
    db: Database,
    forwarder: Option<ForwarderHandle>,
}

impl Ingestor {
    pub fn new(db: Database, forwarder: Option<ForwarderHandle>) -> Self {
        Self { db, forwarder }
    }

    /// Store one reading and return its id.
    ///
    /// Forwarding is queued only after the write commits and its outcome is
    /// never reported back to the caller.
    pub async fn ingest(&self, payload: ReadingPayload) -> Result<String, IngestError> {
        let stored = self.db.store_reading(&payload.into_new_reading()).await?;
        log_debug!("stored reading {} at {}", stored.id, stored.timestamp);

        let id = stored.id.clone();
        if let Some(forwarder) = &self.forwarder {
            forwarder.enqueue(stored);
        }

        Ok(id)
    }

    /// Parse a raw request body and ingest it.
    pub async fn ingest_bytes(&self, body: &[u8]) -> Result<String, IngestError> {
        let payload = ReadingPayload::from_slice(body)?;
        self.ingest(payload).await
    }
}
