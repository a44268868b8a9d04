//! Market data ingestion for charter.
//!
//! Snapshots arrive from a REST poller and ticks from a push stream. Both
//! are delivered as [`FeedMessage`]s over a channel that the frame loop
//! drains without blocking. [`LiveFeedMerger`] folds ticks into the tail
//! candle.

pub mod client;
pub mod error;
pub mod merger;
pub mod poller;
pub mod snapshot;
pub mod stream;
pub mod validation;

use charter_core::Timeframe;

pub use client::{expand_template, AssetClass, Endpoints, SnapshotClient};
pub use error::{FeedError, Result};
pub use merger::{LiveFeedMerger, LivePrice, MergerConfig, PriceDirection, TickOutcome};
pub use poller::{PollerConfig, SnapshotPoller};
pub use snapshot::{MarketSnapshot, Snapshot, Tick, TickMessage, WireCandle};
pub use stream::TickStream;

/// Request counter. Messages tagged with an older generation than the
/// current one belong to a superseded symbol/timeframe and are discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// What a feed task is asked to load.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub generation: Generation,
}

/// Messages from the feed tasks to the frame loop.
#[derive(Debug, Clone)]
pub enum FeedMessage {
    Snapshot {
        generation: Generation,
        snapshot: Snapshot,
    },
    SnapshotFailed {
        generation: Generation,
        error: String,
        retryable: bool,
    },
    StreamConnected {
        generation: Generation,
    },
    Tick {
        generation: Generation,
        tick: Tick,
    },
    StreamDisconnected {
        generation: Generation,
    },
}

impl FeedMessage {
    pub fn generation(&self) -> Generation {
        match self {
            FeedMessage::Snapshot { generation, .. }
            | FeedMessage::SnapshotFailed { generation, .. }
            | FeedMessage::StreamConnected { generation }
            | FeedMessage::Tick { generation, .. }
            | FeedMessage::StreamDisconnected { generation } => *generation,
        }
    }
}
