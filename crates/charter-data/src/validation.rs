//! Validation utilities for incoming market data.
//!
//! Anything rejected here is dropped before it can reach the indicators or
//! the renderer.

use charter_core::Candle;

use crate::snapshot::{Tick, TickMessage};

/// A price is usable when finite and strictly positive.
pub fn validate_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Validate a tick has reasonable values.
pub fn validate_tick(tick: &Tick) -> bool {
    validate_price(tick.price) && tick.timestamp.map_or(true, |ts| ts.is_finite() && ts >= 0.0)
}

/// Parse a raw stream payload, returning `None` for anything malformed.
pub fn parse_tick(payload: &str) -> Option<Tick> {
    let msg: TickMessage = serde_json::from_str(payload).ok()?;
    let tick = Tick::from(msg);
    validate_tick(&tick).then_some(tick)
}

/// Validate a candle has reasonable values.
pub fn validate_candle(candle: &Candle) -> bool {
    candle.timestamp.is_finite()
        && candle.open.is_finite()
        && candle.high.is_finite()
        && candle.low.is_finite()
        && candle.close.is_finite()
        && candle.volume.is_finite()
        && candle.high >= candle.low
        && candle.high >= candle.open.max(candle.close)
        && candle.low <= candle.open.min(candle.close)
        && candle.open > 0.0
        && candle.close > 0.0
        && candle.low > 0.0
        && candle.volume >= 0.0
}

/// Keep only valid candles, logging how many were dropped.
pub fn sanitize_candles(candles: Vec<Candle>) -> Vec<Candle> {
    let total = candles.len();
    let kept: Vec<Candle> = candles.into_iter().filter(validate_candle).collect();
    if kept.len() < total {
        log::debug!("dropped {} malformed candles of {}", total - kept.len(), total);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(0.0, open, high, low, close, 1.0)
    }

    #[test]
    fn test_validate_candle_valid() {
        assert!(validate_candle(&candle(10.0, 12.0, 9.0, 11.0)));
    }

    #[test]
    fn test_validate_candle_inverted_range() {
        assert!(!validate_candle(&candle(10.0, 9.0, 12.0, 11.0)));
    }

    #[test]
    fn test_validate_candle_close_outside_range() {
        assert!(!validate_candle(&candle(10.0, 12.0, 9.0, 13.0)));
    }

    #[test]
    fn test_validate_candle_nan() {
        assert!(!validate_candle(&candle(f64::NAN, 12.0, 9.0, 11.0)));
    }

    #[test]
    fn test_validate_candle_zero_price() {
        assert!(!validate_candle(&candle(0.0, 12.0, 0.0, 11.0)));
    }

    #[test]
    fn test_parse_tick_valid() {
        let tick = parse_tick(r#"{"price": 42.5, "timestamp": 1700000000}"#);
        assert_eq!(tick, Some(Tick::new(42.5, Some(1_700_000_000.0))));
    }

    #[test]
    fn test_parse_tick_without_timestamp() {
        assert_eq!(parse_tick(r#"{"price": 1.5}"#), Some(Tick::new(1.5, None)));
    }

    #[test]
    fn test_parse_tick_malformed() {
        assert_eq!(parse_tick("not json"), None);
        assert_eq!(parse_tick(r#"{"price": "abc"}"#), None);
        assert_eq!(parse_tick(r#"{"price": 0}"#), None);
        assert_eq!(parse_tick(r#"{"price": -3.0}"#), None);
        assert_eq!(parse_tick(r#"{"timestamp": 1}"#), None);
    }

    #[test]
    fn test_sanitize_candles() {
        let kept = sanitize_candles(vec![
            candle(10.0, 12.0, 9.0, 11.0),
            candle(10.0, 9.0, 12.0, 11.0),
            candle(10.0, 10.0, 10.0, 10.0),
        ]);
        assert_eq!(kept.len(), 2);
    }
}
