//! Wire formats for snapshots and ticks, and their validated forms.

use charter_core::{Candle, CandleSeries};
use serde::{Deserialize, Serialize};

use crate::validation;

/// Timestamps above this are taken to be milliseconds.
const MILLIS_THRESHOLD: f64 = 1e11;

/// Convert a wire timestamp to Unix seconds.
pub fn normalize_timestamp(ts: f64) -> f64 {
    if ts.abs() > MILLIS_THRESHOLD {
        ts / 1000.0
    } else {
        ts
    }
}

/// Candle as delivered by a snapshot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireCandle {
    #[serde(alias = "time", alias = "t")]
    pub timestamp: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl From<&WireCandle> for Candle {
    fn from(w: &WireCandle) -> Self {
        Candle::new(
            normalize_timestamp(w.timestamp),
            w.open,
            w.high,
            w.low,
            w.close,
            w.volume,
        )
    }
}

/// Body of a periodic snapshot response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub price_data: Vec<WireCandle>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub is_market_open: bool,
}

impl MarketSnapshot {
    /// Drop malformed candles and build the canonical series.
    pub fn into_snapshot(self) -> Snapshot {
        let candles: Vec<Candle> = self.price_data.iter().map(Candle::from).collect();
        let series = CandleSeries::from_candles(validation::sanitize_candles(candles));
        Snapshot {
            series,
            current_price: self.current_price.filter(|p| validation::validate_price(*p)),
            previous_close: self.previous_close.filter(|p| validation::validate_price(*p)),
            is_market_open: self.is_market_open,
        }
    }
}

/// A validated snapshot ready to replace the chart's series.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub series: CandleSeries,
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub is_market_open: bool,
}

/// Push-price message on the live stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickMessage {
    pub price: f64,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// A validated live trade price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub price: f64,
    /// Unix seconds. Ticks without a timestamp apply to the tail candle.
    pub timestamp: Option<f64>,
}

impl Tick {
    pub fn new(price: f64, timestamp: Option<f64>) -> Self {
        Self { price, timestamp }
    }
}

impl From<TickMessage> for Tick {
    fn from(msg: TickMessage) -> Self {
        Tick {
            price: msg.price,
            timestamp: msg.timestamp.map(normalize_timestamp),
        }
    }
}
