//! ATR-based adaptive trend bands.

use charter_core::{Candle, TimeSeries};

use crate::ema::ema;
use crate::indicator::PriceSource;

/// Adaptive trend configuration.
#[derive(Debug, Clone)]
pub struct TrendConfig {
    /// Centerline EMA period (default: 20).
    pub ema_period: usize,
    /// True range averaging period (default: 14).
    pub atr_period: usize,
    /// Band distance in ATRs (default: 2.0).
    pub multiplier: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            ema_period: 20,
            atr_period: 14,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub center: f64,
    pub upper: f64,
    pub lower: f64,
    pub direction: TrendDirection,
}

/// Adaptive trend indicator.
pub struct AdaptiveTrend {
    config: TrendConfig,
}

impl AdaptiveTrend {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Candles needed before the first band value.
    pub fn min_periods(&self) -> usize {
        self.config.ema_period.max(self.config.atr_period)
    }

    /// Calculate centerline, bands and per-bar direction.
    pub fn calculate_trend(&self, candles: &[Candle]) -> TimeSeries<TrendPoint> {
        let c = &self.config;
        if c.ema_period == 0 || c.atr_period == 0 || candles.len() < self.min_periods() {
            return TimeSeries::new();
        }

        let closes = PriceSource::Close.extract_all(candles);
        let center = ema(&closes, c.ema_period);
        let atr = average_true_range(candles, c.atr_period);

        let center_start = c.ema_period - 1;
        let atr_start = c.atr_period - 1;
        let start = center_start.max(atr_start);

        let mut points = Vec::with_capacity(candles.len() - start);
        let mut direction = TrendDirection::Bullish;
        for i in start..candles.len() {
            let mid = center[i - center_start];
            let band = atr[i - atr_start] * c.multiplier;
            if closes[i] > mid {
                direction = TrendDirection::Bullish;
            } else if closes[i] < mid {
                direction = TrendDirection::Bearish;
            }
            points.push(TrendPoint {
                center: mid,
                upper: mid + band,
                lower: mid - band,
                direction,
            });
        }
        TimeSeries::from_vec(points, start)
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }
}

/// True range per candle; the first candle has no previous close and uses its range.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let range = c.high - c.low;
            match i.checked_sub(1).map(|p| candles[p].close) {
                Some(prev) => range.max((c.high - prev).abs()).max((c.low - prev).abs()),
                None => range,
            }
        })
        .collect()
}

/// Simple mean of the true range over `period`, first value at index `period - 1`.
pub fn average_true_range(candles: &[Candle], period: usize) -> Vec<f64> {
    crate::ema::sma(&true_range(candles), period)
}
