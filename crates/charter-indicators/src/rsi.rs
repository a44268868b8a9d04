//! Relative Strength Index.

use charter_core::{Candle, TimeSeries};

use crate::indicator::{Indicator, IndicatorConfig, IndicatorOutput, PriceSource};

/// RSI over close-to-close deltas.
///
/// For every index `i >= period` the gains and losses of the trailing
/// `period` deltas are averaged with a plain mean. No losses yields exactly
/// 100. The first value belongs to index `period`, so the output length is
/// `len - period`.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let mut out = Vec::with_capacity(closes.len() - period);

    // Window sums are recomputed rather than rolled so a window with no
    // losses sums to exactly zero.
    for end in period..=deltas.len() {
        let window = &deltas[end - period..end];
        let (gains, losses) = window.iter().fold((0.0, 0.0), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });
        let avg_gain = gains / period as f64;
        let avg_loss = losses / period as f64;

        let value = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        out.push(value.clamp(0.0, 100.0));
    }
    out
}

/// RSI of candle closes, aligned to candle indices.
pub fn rsi_series(candles: &[Candle], period: usize) -> TimeSeries<f64> {
    let closes = PriceSource::Close.extract_all(candles);
    let values = rsi(&closes, period);
    if values.is_empty() {
        return TimeSeries::new();
    }
    TimeSeries::from_vec(values, period)
}

/// RSI indicator configuration.
#[derive(Debug, Clone)]
pub struct RsiConfig {
    /// Lookback period (default: 14).
    pub period: usize,
    /// Overbought threshold (default: 70).
    pub overbought: f64,
    /// Oversold threshold (default: 30).
    pub oversold: f64,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl IndicatorConfig for RsiConfig {}

/// RSI indicator.
pub struct Rsi {
    config: RsiConfig,
}

impl Indicator for Rsi {
    type Config = RsiConfig;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn calculate(&self, candles: &[Candle]) -> IndicatorOutput {
        IndicatorOutput::Oscillator {
            values: rsi_series(candles, self.config.period),
            upper_bound: self.config.overbought,
            lower_bound: self.config.oversold,
        }
    }

    fn min_periods(&self) -> usize {
        self.config.period + 1
    }

    fn is_overlay(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "RSI"
    }
}
