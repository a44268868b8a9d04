//! Core indicator traits and types.

use charter_core::{Candle, TimeSeries};

/// Trait for indicator configuration.
pub trait IndicatorConfig: Clone + Default {}

/// Which price to use for indicator calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
    /// (High + Low) / 2
    HL2,
    /// (High + Low + Close) / 3
    HLC3,
    /// (Open + High + Low + Close) / 4
    OHLC4,
}

impl PriceSource {
    /// Extract the price from a candle based on this source.
    pub fn extract(&self, candle: &Candle) -> f64 {
        match self {
            PriceSource::Open => candle.open,
            PriceSource::High => candle.high,
            PriceSource::Low => candle.low,
            PriceSource::Close => candle.close,
            PriceSource::HL2 => (candle.high + candle.low) / 2.0,
            PriceSource::HLC3 => (candle.high + candle.low + candle.close) / 3.0,
            PriceSource::OHLC4 => (candle.open + candle.high + candle.low + candle.close) / 4.0,
        }
    }

    /// Extract this price from every candle.
    pub fn extract_all(&self, candles: &[Candle]) -> Vec<f64> {
        candles.iter().map(|c| self.extract(c)).collect()
    }
}

/// Output from an indicator calculation.
#[derive(Debug, Clone)]
pub enum IndicatorOutput {
    /// Single line output (e.g., SMA, EMA).
    Line(TimeSeries<f64>),
    /// Oscillator with values and bounds (e.g., RSI).
    Oscillator {
        values: TimeSeries<f64>,
        upper_bound: f64,
        lower_bound: f64,
    },
}

impl IndicatorOutput {
    /// True when the indicator produced no values.
    pub fn is_empty(&self) -> bool {
        match self {
            IndicatorOutput::Line(series) => series.is_empty(),
            IndicatorOutput::Oscillator { values, .. } => values.is_empty(),
        }
    }

    /// The computed values, dropping any oscillator bounds.
    pub fn into_values(self) -> TimeSeries<f64> {
        match self {
            IndicatorOutput::Line(series) => series,
            IndicatorOutput::Oscillator { values, .. } => values,
        }
    }
}

/// Trait for technical indicators.
pub trait Indicator {
    /// The configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Create a new indicator with the given configuration.
    fn new(config: Self::Config) -> Self;

    /// Calculate the indicator values for the given candles.
    fn calculate(&self, candles: &[Candle]) -> IndicatorOutput;

    /// Minimum number of periods required before the indicator produces valid output.
    fn min_periods(&self) -> usize;

    /// Whether this indicator should be overlaid on the price chart (true)
    /// or displayed in a separate pane (false).
    fn is_overlay(&self) -> bool;

    /// Human-readable name of the indicator.
    fn name(&self) -> &str;
}
