//! Charter - headless live chart runner.
//!
//! Loads the configuration, starts the feed for the default symbol and
//! renders frames into a display list until interrupted.

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;

use charter::{ChartState, FeedSession};
use charter_config::Config;
use charter_core::Timeframe;
use charter_render::DisplayList;

const WIDTH: f64 = 1280.0;
const HEIGHT: f64 = 720.0;

async fn run() -> Result<()> {
    env_logger::init();

    let config = Config::load_default();
    let frame_interval = Duration::from_millis(config.general.frame_interval_ms.max(1));
    let (tx, mut rx) = mpsc::channel(256);
    let mut session = FeedSession::new(&config.api, tx)?;

    let symbol = config.general.default_symbol.clone();
    let timeframe = Timeframe::from_label(&config.general.default_timeframe).unwrap_or_default();
    let mut state = ChartState::new(config, WIDTH, HEIGHT);
    // Picked up by the first frame tick
    state.begin_switch(&symbol, timeframe);

    let mut surface = DisplayList::new();
    let mut ticker = tokio::time::interval(frame_interval);
    let mut last_status = state.status();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("interrupted, shutting down");
                break;
            }
            _ = ticker.tick() => {
                while let Ok(message) = rx.try_recv() {
                    state.apply_feed_message(message);
                }
                if let Some(request) = state.take_feed_request() {
                    session.switch(request)?;
                }
                if let Some(report) = state.frame(Instant::now(), &mut surface) {
                    log::trace!("drew {} candles in {} commands", report.candles_drawn, surface.len());
                }

                let status = state.status();
                if status != last_status {
                    log::info!(
                        "{} {}: {:?} stream {:?} signal {}",
                        status.symbol,
                        status.timeframe.label(),
                        status.feed,
                        status.stream,
                        status.signal.map_or("-", |s| s.label())
                    );
                    last_status = status;
                }
            }
        }
    }

    session.stop();
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
    }
}
