//! Simple and exponential moving averages.

use charter_core::{Candle, TimeSeries};

use crate::indicator::{Indicator, IndicatorConfig, IndicatorOutput, PriceSource};

/// Simple moving average. The first value belongs to index `period - 1`.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut sum: f64 = values[..period].iter().sum();
    out.push(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out.push(sum / period as f64);
    }
    out
}

/// Exponential moving average seeded with the SMA of the first `period` values.
///
/// Output length is `len - period + 1`; the first value belongs to index
/// `period - 1`.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len() - period + 1);

    let mut prev = values[..period].iter().sum::<f64>() / period as f64;
    out.push(prev);
    for &value in &values[period..] {
        prev = value * alpha + prev * (1.0 - alpha);
        out.push(prev);
    }
    out
}

/// EMA indicator configuration.
#[derive(Debug, Clone)]
pub struct EmaConfig {
    /// Smoothing period (default: 9).
    pub period: usize,
    /// Price source for calculation.
    pub price_source: PriceSource,
    /// Line color (RGB).
    pub color: [f32; 3],
}

impl Default for EmaConfig {
    fn default() -> Self {
        Self {
            period: 9,
            price_source: PriceSource::Close,
            color: [0.2, 0.6, 1.0],
        }
    }
}

impl IndicatorConfig for EmaConfig {}

/// Exponential moving average indicator.
pub struct Ema {
    config: EmaConfig,
}

impl Indicator for Ema {
    type Config = EmaConfig;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn calculate(&self, candles: &[Candle]) -> IndicatorOutput {
        IndicatorOutput::Line(self.calculate_ema(candles))
    }

    fn min_periods(&self) -> usize {
        self.config.period
    }

    fn is_overlay(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

impl Ema {
    /// Calculate EMA values aligned to candle indices.
    pub fn calculate_ema(&self, candles: &[Candle]) -> TimeSeries<f64> {
        let prices = self.config.price_source.extract_all(candles);
        let values = ema(&prices, self.config.period);
        if values.is_empty() {
            return TimeSeries::new();
        }
        TimeSeries::from_vec(values, self.config.period - 1)
    }

    /// Get the configuration.
    pub fn config(&self) -> &EmaConfig {
        &self.config
    }
}
