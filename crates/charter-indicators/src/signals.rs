//! Rule-based buy/sell classification from RSI and EMA ordering.

use charter_core::{Candle, TimeSeries};

/// Classified signal for one candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Signal {
    /// Fixed confidence score shown next to the badge.
    pub fn strength(&self) -> u8 {
        match self {
            Signal::StrongBuy | Signal::StrongSell => 90,
            Signal::Buy | Signal::Sell => 70,
            Signal::Hold => 50,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "strong_buy",
            Signal::Buy => "buy",
            Signal::Hold => "hold",
            Signal::Sell => "sell",
            Signal::StrongSell => "strong_sell",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Signal::StrongSell | Signal::Sell)
    }
}

/// Apply the rule table to one set of inputs.
///
/// Oversold RSI with the fast EMA above the slow one is a buy, overbought
/// RSI with the fast EMA below is a sell. Equal EMAs and everything else hold.
pub fn classify(rsi: f64, ema_fast: f64, ema_slow: f64) -> Signal {
    let rising = ema_fast > ema_slow;
    let falling = ema_fast < ema_slow;

    if rsi < 30.0 && rising {
        Signal::StrongBuy
    } else if rsi < 40.0 && rising {
        Signal::Buy
    } else if rsi > 70.0 && falling {
        Signal::StrongSell
    } else if rsi > 60.0 && falling {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Classify every candle index where RSI and both EMAs are defined.
pub fn classify_signals(
    candles: &[Candle],
    rsi: &TimeSeries<f64>,
    ema_fast: &TimeSeries<f64>,
    ema_slow: &TimeSeries<f64>,
) -> TimeSeries<Signal> {
    let start = rsi
        .start_index()
        .max(ema_fast.start_index())
        .max(ema_slow.start_index());
    let end = candles
        .len()
        .min(rsi.end_index())
        .min(ema_fast.end_index())
        .min(ema_slow.end_index());
    if rsi.is_empty() || ema_fast.is_empty() || ema_slow.is_empty() || start >= end {
        return TimeSeries::new();
    }

    let values = (start..end)
        .map(|i| match (rsi.get(i), ema_fast.get(i), ema_slow.get(i)) {
            (Some(&r), Some(&f), Some(&s)) => Some(classify(r, f, s)),
            _ => None,
        })
        .collect();
    TimeSeries::with_offset(values, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::make_candles;

    #[test]
    fn test_rule_table() {
        assert_eq!(classify(25.0, 2.0, 1.0), Signal::StrongBuy);
        assert_eq!(classify(35.0, 2.0, 1.0), Signal::Buy);
        assert_eq!(classify(75.0, 1.0, 2.0), Signal::StrongSell);
        assert_eq!(classify(65.0, 1.0, 2.0), Signal::Sell);
        assert_eq!(classify(50.0, 2.0, 1.0), Signal::Hold);
        // Oversold but falling EMAs is not a buy
        assert_eq!(classify(20.0, 1.0, 2.0), Signal::Hold);
        // Equal EMAs always hold
        assert_eq!(classify(10.0, 1.0, 1.0), Signal::Hold);
        assert_eq!(classify(90.0, 1.0, 1.0), Signal::Hold);
    }

    #[test]
    fn test_strengths() {
        assert_eq!(Signal::StrongBuy.strength(), 90);
        assert_eq!(Signal::Sell.strength(), 70);
        assert_eq!(Signal::Hold.strength(), 50);
        assert_eq!(Signal::StrongSell.label(), "strong_sell");
    }

    #[test]
    fn test_classify_signals_alignment() {
        let candles = make_candles(&[1.0; 10]);
        let rsi = TimeSeries::from_vec(vec![25.0; 6], 4);
        let fast = TimeSeries::from_vec(vec![2.0; 8], 2);
        let slow = TimeSeries::from_vec(vec![1.0; 5], 5);

        let signals = classify_signals(&candles, &rsi, &fast, &slow);
        assert_eq!(signals.start_index(), 5);
        assert_eq!(signals.len(), 5);
        assert!(signals.iter().all(|(_, s)| *s == Signal::StrongBuy));
    }

    #[test]
    fn test_classify_signals_empty_input() {
        let candles = make_candles(&[1.0; 3]);
        let empty = TimeSeries::new();
        let full = TimeSeries::from_vec(vec![1.0; 3], 0);
        assert!(classify_signals(&candles, &empty, &full, &full).is_empty());
    }
}
