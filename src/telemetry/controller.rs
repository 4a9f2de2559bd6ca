use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::db::Reading;
use crate::settings::ForwardingSettings;

use super::client::UbidotsClient;
use super::loop_worker::forwarding_loop;

const QUEUE_CAPACITY: usize = 64;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Producer side of the forwarding queue, held by the ingestion path.
#[derive(Clone)]
pub struct ForwarderHandle {
    sender: mpsc::Sender<Reading>,
}

impl ForwarderHandle {
    /// Queue a reading without waiting. A full or closed queue drops it.
    pub fn enqueue(&self, reading: Reading) -> bool {
        match self.sender.try_send(reading) {
            Ok(()) => true,
            Err(TrySendError::Full(reading)) => {
                log_warn!("telemetry queue full, dropping reading {}", reading.id);
                false
            }
            Err(TrySendError::Closed(reading)) => {
                log_warn!("telemetry forwarder stopped, dropping reading {}", reading.id);
                false
            }
        }
    }
}

pub struct ForwardingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl ForwardingController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start(&mut self, settings: &ForwardingSettings) -> Result<ForwarderHandle> {
        if self.handle.is_some() {
            bail!("telemetry forwarding already active");
        }

        let client = UbidotsClient::new(settings)?;
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let cancel_token = CancellationToken::new();

        let handle = tokio::spawn(forwarding_loop(client, receiver, cancel_token.clone()));
        info!(
            "Telemetry forwarding started for device '{}'",
            settings.device_label
        );

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(ForwarderHandle { sender })
    }

    /// Cancel the loop and wait for it. Readings still queued are discarded.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("telemetry forwarding task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Default for ForwardingController {
    fn default() -> Self {
        Self::new()
    }
}
