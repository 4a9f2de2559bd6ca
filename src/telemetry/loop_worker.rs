use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::db::Reading;

use super::client::UbidotsClient;

// Set to false to silence per-reading forwarding logs
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Drain the queue one reading at a time until cancelled or every sender is
/// gone. Each outcome is logged and dropped; there are no retries.
pub async fn forwarding_loop(
    client: UbidotsClient,
    mut queue: mpsc::Receiver<Reading>,
    cancel_token: CancellationToken,
) {
    log_info!("telemetry forwarding to {}", client.url());

    loop {
        tokio::select! {
            next = queue.recv() => {
                let Some(reading) = next else {
                    log_info!("telemetry queue closed, forwarding loop exiting");
                    break;
                };

                let started = Instant::now();
                match client.send(&reading).await {
                    Ok(true) => log_debug!(
                        "forwarded reading {} in {}ms",
                        reading.id,
                        started.elapsed().as_millis()
                    ),
                    Ok(false) => log_debug!("reading {} has no metrics, not forwarded", reading.id),
                    Err(err) => log_warn!("forwarding reading {} failed: {err:#}", reading.id),
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("telemetry forwarding loop shutting down");
                break;
            }
        }
    }
}
