//! Ownership of the background feed tasks.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use charter_config::ApiConfig;
use charter_data::{
    expand_template, Endpoints, FeedMessage, FeedRequest, PollerConfig, SnapshotClient, SnapshotPoller,
    TickStream,
};

/// Runs one snapshot poller and one tick stream for the active request.
pub struct FeedSession {
    poller: SnapshotPoller,
    stream: TickStream,
    ws_template: String,
    tx: mpsc::Sender<FeedMessage>,
    tasks: Vec<JoinHandle<()>>,
    active: Option<FeedRequest>,
}

impl FeedSession {
    pub fn new(api: &ApiConfig, tx: mpsc::Sender<FeedMessage>) -> Result<Self> {
        let endpoints = Endpoints {
            traditional: api.snapshot_endpoints.clone(),
            crypto: api.crypto_endpoints.clone(),
        };
        let client = SnapshotClient::new(
            endpoints,
            api.crypto_suffixes.clone(),
            Duration::from_secs(api.request_timeout_secs),
        )
        .context("failed to build snapshot client")?;
        let poller = SnapshotPoller::new(
            Arc::new(client),
            PollerConfig {
                poll_interval: Duration::from_secs(api.poll_interval_secs),
                retry_interval: Duration::from_secs(api.retry_interval_secs),
            },
        );

        Ok(Self {
            poller,
            stream: TickStream::new(Duration::from_secs(api.reconnect_delay_secs)),
            ws_template: api.ws_url.clone(),
            tx,
            tasks: Vec::new(),
            active: None,
        })
    }

    pub fn active(&self) -> Option<&FeedRequest> {
        self.active.as_ref()
    }

    /// Abort the running tasks and start new ones for `request`.
    pub fn switch(&mut self, request: FeedRequest) -> Result<()> {
        self.stop();

        let url = if self.ws_template.is_empty() {
            None
        } else {
            let url = expand_template(&self.ws_template, &request.symbol, request.timeframe)
                .with_context(|| format!("invalid stream url for {}", request.symbol))?;
            Some(url)
        };

        log::info!(
            "starting feed for {} {} (generation {})",
            request.symbol,
            request.timeframe.label(),
            request.generation.0
        );
        self.tasks.push(self.poller.spawn(request.clone(), self.tx.clone()));
        match url {
            Some(url) => self
                .tasks
                .push(self.stream.spawn(url, request.generation, self.tx.clone())),
            None => log::info!("no stream url configured, using snapshots only"),
        }
        self.active = Some(request);
        Ok(())
    }

    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.active = None;
    }
}

impl Drop for FeedSession {
    fn drop(&mut self) {
        self.stop();
    }
}
