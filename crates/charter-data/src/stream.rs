//! Push-price stream with reconnect-on-close.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::validation::parse_tick;
use crate::{FeedMessage, Generation};

/// Spawns tick stream connections.
#[derive(Debug, Clone, Copy)]
pub struct TickStream {
    reconnect_delay: Duration,
}

impl TickStream {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self { reconnect_delay }
    }

    /// Connect to `url` and forward ticks until the receiver is dropped.
    ///
    /// Malformed frames are dropped. After a close or error the stream
    /// reports `StreamDisconnected` and reconnects after the delay.
    pub fn spawn(&self, url: Url, generation: Generation, tx: mpsc::Sender<FeedMessage>) -> JoinHandle<()> {
        let reconnect_delay = self.reconnect_delay;
        tokio::spawn(async move {
            loop {
                match connect_async(url.as_str()).await {
                    Ok((ws, _)) => {
                        log::info!("tick stream connected to {}", url);
                        if tx.send(FeedMessage::StreamConnected { generation }).await.is_err() {
                            return;
                        }
                        let (mut write, mut read) = ws.split();

                        while let Some(msg) = read.next().await {
                            match msg {
                                Ok(Message::Text(text)) => {
                                    let Some(tick) = parse_tick(&text) else {
                                        log::debug!("dropping malformed tick frame");
                                        continue;
                                    };
                                    if tx.send(FeedMessage::Tick { generation, tick }).await.is_err() {
                                        return;
                                    }
                                }
                                Ok(Message::Ping(data)) => {
                                    let _ = write.send(Message::Pong(data)).await;
                                }
                                Ok(Message::Close(_)) => {
                                    log::info!("tick stream closed by server");
                                    break;
                                }
                                Ok(_) => {}
                                Err(e) => {
                                    log::warn!("tick stream error: {}", e);
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!("tick stream connection to {} failed: {}", url, e);
                    }
                }

                if tx.send(FeedMessage::StreamDisconnected { generation }).await.is_err() {
                    return;
                }
                tokio::time::sleep(reconnect_delay).await;
            }
        })
    }
}
