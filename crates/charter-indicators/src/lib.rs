//! Indicator framework for technical analysis.
//!
//! Every calculation here is pure. Given fewer candles than an indicator's
//! warm-up window, the result is empty rather than an error.

pub mod bundle;
pub mod ema;
pub mod fibonacci;
pub mod indicator;
pub mod momentum;
pub mod pivots;
pub mod rsi;
pub mod signals;
pub mod trend;

pub use bundle::{IndicatorBundle, IndicatorParams};
pub use ema::{ema, sma, Ema, EmaConfig};
pub use fibonacci::{fibonacci_levels, FibLevel, FibonacciLevels, SwingDirection, FIB_RATIOS};
pub use indicator::{Indicator, IndicatorConfig, IndicatorOutput, PriceSource};
pub use momentum::{MomentumConfig, MomentumOscillator, MomentumOutput, OscillatorPoint};
pub use pivots::{cluster_pivots, find_pivots, LevelKind, Pivot, PivotConfig, PivotSr, SrLevel};
pub use rsi::{rsi, rsi_series, Rsi, RsiConfig};
pub use signals::{classify, classify_signals, Signal};
pub use trend::{average_true_range, true_range, AdaptiveTrend, TrendConfig, TrendDirection, TrendPoint};
