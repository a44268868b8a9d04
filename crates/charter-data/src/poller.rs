//! Periodic snapshot refresh task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::SnapshotClient;
use crate::{FeedMessage, FeedRequest};

/// Refresh cadence.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub retry_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            retry_interval: Duration::from_secs(5),
        }
    }
}

/// Spawns snapshot refresh loops.
#[derive(Debug, Clone)]
pub struct SnapshotPoller {
    client: Arc<SnapshotClient>,
    config: PollerConfig,
}

impl SnapshotPoller {
    pub fn new(client: Arc<SnapshotClient>, config: PollerConfig) -> Self {
        Self { client, config }
    }

    /// Fetch immediately, then on `poll_interval`; failures retry on
    /// `retry_interval`. The loop ends when the receiver is dropped.
    pub fn spawn(&self, request: FeedRequest, tx: mpsc::Sender<FeedMessage>) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        let config = self.config;
        tokio::spawn(async move {
            loop {
                let result = client.fetch(&request.symbol, request.timeframe).await;
                let (message, wait) = match result {
                    Ok(snapshot) => (
                        FeedMessage::Snapshot {
                            generation: request.generation,
                            snapshot,
                        },
                        config.poll_interval,
                    ),
                    Err(e) => {
                        log::warn!("snapshot refresh for {} failed: {}", request.symbol, e);
                        (
                            FeedMessage::SnapshotFailed {
                                generation: request.generation,
                                error: e.to_string(),
                                retryable: e.is_retryable(),
                            },
                            config.retry_interval,
                        )
                    }
                };

                if tx.send(message).await.is_err() {
                    log::debug!("snapshot receiver dropped, stopping poller");
                    return;
                }
                tokio::time::sleep(wait).await;
            }
        })
    }
}
