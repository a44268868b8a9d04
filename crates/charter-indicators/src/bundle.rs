//! The full set of derived series for one candle snapshot.

use charter_core::{Candle, CandleSeries, TimeSeries};

use crate::ema::{Ema, EmaConfig};
use crate::fibonacci::{fibonacci_levels, FibonacciLevels};
use crate::indicator::Indicator;
use crate::momentum::{MomentumConfig, MomentumOscillator, MomentumOutput};
use crate::pivots::{PivotConfig, PivotSr, SrLevel};
use crate::rsi::{Rsi, RsiConfig};
use crate::signals::{classify_signals, Signal};
use crate::trend::{AdaptiveTrend, TrendConfig, TrendPoint};

/// Parameters for every indicator in the bundle.
#[derive(Debug, Clone)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub momentum: MomentumConfig,
    pub pivots: PivotConfig,
    pub trend: TrendConfig,
    pub fib_lookback: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            rsi_period: 14,
            momentum: MomentumConfig::default(),
            pivots: PivotConfig::default(),
            trend: TrendConfig::default(),
            fib_lookback: 100,
        }
    }
}

/// Derived series computed together from one candle series.
///
/// A bundle is replaced wholesale whenever its source series changes.
#[derive(Debug, Clone, Default)]
pub struct IndicatorBundle {
    pub ema_fast: TimeSeries<f64>,
    pub ema_slow: TimeSeries<f64>,
    pub rsi: TimeSeries<f64>,
    pub momentum: MomentumOutput,
    pub levels: Vec<SrLevel>,
    pub trend: TimeSeries<TrendPoint>,
    pub fibonacci: Option<FibonacciLevels>,
    pub signals: TimeSeries<Signal>,
    /// Length of the candle series this bundle was computed from.
    pub candle_count: usize,
}

impl IndicatorBundle {
    pub fn compute(series: &CandleSeries, params: &IndicatorParams) -> Self {
        let candles = series.as_slice();

        let ema = |period| EmaConfig {
            period,
            ..EmaConfig::default()
        };
        let ema_fast = values_of::<Ema>(ema(params.ema_fast), candles);
        let ema_slow = values_of::<Ema>(ema(params.ema_slow), candles);
        let rsi = values_of::<Rsi>(
            RsiConfig {
                period: params.rsi_period,
                ..RsiConfig::default()
            },
            candles,
        );
        let signals = classify_signals(candles, &rsi, &ema_fast, &ema_slow);

        Self {
            momentum: MomentumOscillator::new(params.momentum.clone()).calculate_momentum(candles),
            levels: PivotSr::new(params.pivots.clone()).calculate(candles),
            trend: AdaptiveTrend::new(params.trend.clone()).calculate_trend(candles),
            fibonacci: fibonacci_levels(candles, params.fib_lookback),
            ema_fast,
            ema_slow,
            rsi,
            signals,
            candle_count: candles.len(),
        }
    }

    /// Signal at the most recent classified candle.
    pub fn latest_signal(&self) -> Option<(usize, Signal)> {
        self.signals.iter().last().map(|(i, s)| (i, *s))
    }

    /// Whether this bundle was computed from a series of `len` candles.
    pub fn is_current_for(&self, len: usize) -> bool {
        self.candle_count == len
    }
}

fn values_of<I: Indicator>(config: I::Config, candles: &[Candle]) -> TimeSeries<f64> {
    let indicator = I::new(config);
    if candles.len() < indicator.min_periods() {
        return TimeSeries::new();
    }
    indicator.calculate(candles).into_values()
}
