//! Fibonacci retracement levels over a trailing lookback.

use charter_core::Candle;

/// Standard retracement ratios.
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Which extreme came last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingDirection {
    /// Low then high: levels measured down from the high.
    Up,
    /// High then low: levels measured up from the low.
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FibonacciLevels {
    pub direction: SwingDirection,
    pub high: f64,
    pub low: f64,
    pub high_index: usize,
    pub low_index: usize,
    pub levels: Vec<FibLevel>,
}

/// Retracement levels across the trailing `min(lookback, len)` candles.
///
/// Needs at least two candles and a non-zero range. When an extreme repeats,
/// its latest occurrence counts.
pub fn fibonacci_levels(candles: &[Candle], lookback: usize) -> Option<FibonacciLevels> {
    let window = lookback.min(candles.len());
    if window < 2 {
        return None;
    }
    let offset = candles.len() - window;

    let mut high_index = offset;
    let mut low_index = offset;
    for (i, c) in candles.iter().enumerate().skip(offset) {
        if c.high >= candles[high_index].high {
            high_index = i;
        }
        if c.low <= candles[low_index].low {
            low_index = i;
        }
    }

    let high = candles[high_index].high;
    let low = candles[low_index].low;
    let range = high - low;
    if !range.is_finite() || range <= 0.0 {
        return None;
    }

    let direction = if high_index > low_index {
        SwingDirection::Up
    } else {
        SwingDirection::Down
    };

    let levels = FIB_RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: match direction {
                SwingDirection::Up => high - range * ratio,
                SwingDirection::Down => low + range * ratio,
            },
        })
        .collect();

    Some(FibonacciLevels {
        direction,
        high,
        low,
        high_index,
        low_index,
        levels,
    })
}
