//! Candle data structures for OHLCV data.

/// OHLCV candle. `timestamp` is the bucket start in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: f64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// A flat candle opened by a single trade.
    pub fn from_price(timestamp: f64, price: f64) -> Self {
        Self::new(timestamp, price, price, price, price, 0.0)
    }

    /// Whether the candle closed at or above its open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Extend the candle with a trade price: widen high/low, move close.
    pub fn absorb_price(&mut self, price: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }
}

/// Trait for types that provide OHLCV data.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// The canonical candle timeline.
///
/// Candles are kept ascending by timestamp with unique timestamps. Historical
/// candles are immutable; only the tail (in-progress) candle may be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from raw candles, sorting by timestamp.
    ///
    /// When two candles share a timestamp the later one in the input wins.
    pub fn from_candles(mut candles: Vec<Candle>) -> Self {
        // Stable sort keeps input order among equal timestamps.
        candles.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }
        Self { candles: deduped }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    /// The most recent (possibly still open) candle.
    pub fn tail(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Closing prices in timeline order.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Index of the candle with exactly this timestamp.
    pub fn index_of(&self, timestamp: f64) -> Option<usize> {
        self.candles
            .binary_search_by(|c| c.timestamp.total_cmp(&timestamp))
            .ok()
    }

    /// Patch the tail candle in place. Returns false when the series is empty.
    pub fn patch_tail(&mut self, patch: impl FnOnce(&mut Candle)) -> bool {
        match self.candles.last_mut() {
            Some(tail) => {
                patch(tail);
                true
            }
            None => false,
        }
    }

    /// Append a new tail candle. Rejected unless it is strictly newer than the
    /// current tail.
    pub fn push_tail(&mut self, candle: Candle) -> bool {
        if let Some(tail) = self.candles.last() {
            if candle.timestamp <= tail.timestamp {
                return false;
            }
        }
        self.candles.push(candle);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_candles(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(ts: f64, close: f64) -> Candle {
        Candle::new(ts, close, close + 1.0, close - 1.0, close, 10.0)
    }

    #[test]
    fn test_from_candles_sorts_and_dedups() {
        let series = CandleSeries::from_candles(vec![
            candle(120.0, 3.0),
            candle(60.0, 1.0),
            candle(120.0, 4.0),
            candle(0.0, 0.5),
        ]);

        let timestamps: Vec<f64> = series.iter().map(|c| c.timestamp).collect();
        assert_eq!(timestamps, vec![0.0, 60.0, 120.0]);
        // Later duplicate wins
        assert_eq!(series.tail().map(|c| c.close), Some(4.0));
    }

    #[test]
    fn test_index_of() {
        let series = CandleSeries::from_candles(vec![candle(0.0, 1.0), candle(60.0, 2.0)]);
        assert_eq!(series.index_of(60.0), Some(1));
        assert_eq!(series.index_of(30.0), None);
    }

    #[test]
    fn test_patch_tail_only_touches_last() {
        let mut series = CandleSeries::from_candles(vec![candle(0.0, 10.0), candle(60.0, 11.0)]);
        let first = *series.get(0).unwrap();

        assert!(series.patch_tail(|c| c.absorb_price(20.0)));

        assert_eq!(*series.get(0).unwrap(), first);
        let tail = series.tail().unwrap();
        assert_eq!(tail.close, 20.0);
        assert_eq!(tail.high, 20.0);
        assert_eq!(tail.low, 10.0);
    }

    #[test]
    fn test_push_tail_rejects_older() {
        let mut series = CandleSeries::from_candles(vec![candle(60.0, 1.0)]);
        assert!(!series.push_tail(candle(60.0, 2.0)));
        assert!(!series.push_tail(candle(0.0, 2.0)));
        assert!(series.push_tail(candle(120.0, 2.0)));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_patch_empty_series() {
        let mut series = CandleSeries::new();
        assert!(!series.patch_tail(|c| c.close = 1.0));
    }
}
