//! Momentum oscillator: a smoothed stochastic of RSI with a backfilled warm-up.

use charter_core::{Candle, TimeSeries};

use crate::ema::sma;
use crate::indicator::PriceSource;
use crate::rsi::rsi;

/// Neutral oscillator level used for flat windows and the backfill origin.
pub const NEUTRAL: f64 = 50.0;

/// Momentum oscillator configuration.
#[derive(Debug, Clone)]
pub struct MomentumConfig {
    /// RSI lookback (default: 14).
    pub rsi_period: usize,
    /// Stochastic window over RSI values (default: 14).
    pub stoch_period: usize,
    /// SMA smoothing of the raw stochastic, giving K (default: 3).
    pub smooth_k: usize,
    /// SMA smoothing of K, giving D (default: 3).
    pub smooth_d: usize,
    /// Upper guide level.
    pub overbought: f64,
    /// Lower guide level.
    pub oversold: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            stoch_period: 14,
            smooth_k: 3,
            smooth_d: 3,
            overbought: 80.0,
            oversold: 20.0,
        }
    }
}

/// One oscillator sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorPoint {
    pub k: f64,
    pub d: f64,
    pub histogram: f64,
}

/// Oscillator output spanning the full candle series.
#[derive(Debug, Clone, Default)]
pub struct MomentumOutput {
    /// One point per candle. Points before `warmup` are eased in from 50.
    pub points: TimeSeries<OscillatorPoint>,
    /// Index of the first point where both K and D are real values.
    pub warmup: usize,
}

impl MomentumOutput {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the point at `index` is backfilled rather than computed.
    pub fn is_backfilled(&self, index: usize) -> bool {
        index < self.warmup
    }
}

/// Momentum oscillator indicator.
pub struct MomentumOscillator {
    config: MomentumConfig,
}

impl MomentumOscillator {
    pub fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Candle index of the first real K value.
    pub fn first_k_index(&self) -> usize {
        let c = &self.config;
        c.rsi_period + c.stoch_period.saturating_sub(1) + c.smooth_k.saturating_sub(1)
    }

    /// Candle index of the first real D value.
    pub fn first_d_index(&self) -> usize {
        self.first_k_index() + self.config.smooth_d.saturating_sub(1)
    }

    /// Calculate the oscillator.
    ///
    /// Returns an empty output when the series is too short to produce a
    /// single real D value.
    pub fn calculate_momentum(&self, candles: &[Candle]) -> MomentumOutput {
        let c = &self.config;
        if c.rsi_period == 0 || c.stoch_period == 0 || c.smooth_k == 0 || c.smooth_d == 0 {
            return MomentumOutput::default();
        }

        let closes = PriceSource::Close.extract_all(candles);
        let rsi_values = rsi(&closes, c.rsi_period);
        let stoch = stochastic(&rsi_values, c.stoch_period);
        let k = sma(&stoch, c.smooth_k);
        let d = sma(&k, c.smooth_d);
        let (Some(&first_k), Some(&first_d)) = (k.first(), d.first()) else {
            return MomentumOutput::default();
        };

        let k_start = self.first_k_index();
        let d_start = self.first_d_index();
        let len = closes.len();

        let points = (0..len)
            .map(|i| {
                let k_val = if i < k_start {
                    ease_in(first_k, i, k_start)
                } else {
                    k[i - k_start]
                };
                let d_val = if i < d_start {
                    ease_in(first_d, i, d_start)
                } else {
                    d[i - d_start]
                };
                let k_val = k_val.clamp(0.0, 100.0);
                let d_val = d_val.clamp(0.0, 100.0);
                OscillatorPoint {
                    k: k_val,
                    d: d_val,
                    histogram: k_val - d_val,
                }
            })
            .collect();

        MomentumOutput {
            points: TimeSeries::from_vec(points, 0),
            warmup: d_start,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MomentumConfig {
        &self.config
    }
}

/// Min-max normalization of each trailing window to 0..=100.
fn stochastic(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|window| {
            let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let current = window[period - 1];
            if hi - lo == 0.0 {
                NEUTRAL
            } else {
                (current - lo) / (hi - lo) * 100.0
            }
        })
        .collect()
}

/// Quadratic ease-in from neutral toward `target` across `gap` points.
fn ease_in(target: f64, index: usize, gap: usize) -> f64 {
    if gap == 0 {
        return target;
    }
    let t = index as f64 / gap as f64;
    NEUTRAL + (target - NEUTRAL) * t * t
}
