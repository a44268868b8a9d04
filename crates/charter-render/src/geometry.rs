//! Candle and volume bar geometry.

use std::ops::Range;

use charter_core::Candle;

use crate::scale::{XScale, YScale};
use crate::surface::Rect;

/// Body width as a fraction of the candle slot.
pub const BODY_RATIO: f64 = 0.7;
/// Minimum body height so doji candles stay visible.
pub const MIN_BODY_HEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleGeometry {
    pub index: usize,
    pub center_x: f64,
    pub body: Rect,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub bullish: bool,
}

/// Geometry for the candles at `range`.
pub fn candle_geometry(candles: &[Candle], range: Range<usize>, x: &XScale, y: &YScale) -> Vec<CandleGeometry> {
    let end = range.end.min(candles.len());
    let start = range.start.min(end);
    let body_width = (x.candle_width * BODY_RATIO).max(1.0);

    candles[start..end]
        .iter()
        .enumerate()
        .map(|(offset, c)| {
            let index = start + offset;
            let center_x = x.center_x(index);
            let open_y = y.price_to_y(c.open);
            let close_y = y.price_to_y(c.close);
            let top = open_y.min(close_y);
            let height = (open_y - close_y).abs().max(MIN_BODY_HEIGHT);
            CandleGeometry {
                index,
                center_x,
                body: Rect::new(center_x - body_width / 2.0, top, body_width, height),
                wick_top: y.price_to_y(c.high),
                wick_bottom: y.price_to_y(c.low),
                bullish: c.is_bullish(),
            }
        })
        .collect()
}

/// Volume bars scaled to the largest visible volume, anchored to the bottom of `rect`.
pub fn volume_bars(candles: &[Candle], range: Range<usize>, x: &XScale, rect: &Rect) -> Vec<(Rect, bool)> {
    let end = range.end.min(candles.len());
    let start = range.start.min(end);
    let visible = &candles[start..end];
    let max_volume = visible.iter().map(|c| c.volume).fold(0.0f64, f64::max).max(1.0);
    let bar_width = (x.candle_width * BODY_RATIO).max(1.0);

    visible
        .iter()
        .enumerate()
        .map(|(offset, c)| {
            let h = (c.volume / max_volume) * rect.height;
            let cx = x.center_x(start + offset);
            (
                Rect::new(cx - bar_width / 2.0, rect.bottom() - h, bar_width, h),
                c.is_bullish(),
            )
        })
        .collect()
}

/// Lowest low and highest high over `range`.
pub fn price_extent(candles: &[Candle], range: Range<usize>) -> Option<(f64, f64)> {
    let end = range.end.min(candles.len());
    let start = range.start.min(end);
    candles[start..end].iter().fold(None, |acc, c| match acc {
        None => Some((c.low, c.high)),
        Some((lo, hi)) => Some((lo.min(c.low), hi.max(c.high))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_core::Viewport;

    fn setup() -> (Vec<Candle>, XScale, YScale, Rect) {
        let candles = vec![
            Candle::new(0.0, 10.0, 12.0, 8.0, 11.0, 100.0),
            Candle::new(60.0, 11.0, 11.5, 9.0, 9.5, 50.0),
            Candle::new(120.0, 9.5, 9.5, 9.5, 9.5, 0.0),
        ];
        let rect = Rect::new(0.0, 0.0, 300.0, 100.0);
        let vp = Viewport::new(0.0, 3.0, 100.0, 2.0, 100.0);
        let x = XScale::new(&vp, &rect);
        let y = YScale::fit(8.0, 12.0, &rect, 0.0);
        (candles, x, y, rect)
    }

    #[test]
    fn test_candle_geometry() {
        let (candles, x, y, _) = setup();
        let geo = candle_geometry(&candles, 0..3, &x, &y);

        assert_eq!(geo.len(), 3);
        assert_eq!(geo[0].center_x, 50.0);
        assert_eq!(geo[0].body.width, 70.0);
        assert!(geo[0].bullish);
        assert!(!geo[1].bullish);
        assert_eq!(geo[0].wick_top, 0.0);
        assert_eq!(geo[0].wick_bottom, 100.0);
        // Doji keeps a visible body
        assert_eq!(geo[2].body.height, MIN_BODY_HEIGHT);
    }

    #[test]
    fn test_range_clamped_to_series() {
        let (candles, x, y, _) = setup();
        assert_eq!(candle_geometry(&candles, 1..10, &x, &y).len(), 2);
        assert!(candle_geometry(&candles, 5..10, &x, &y).is_empty());
    }

    #[test]
    fn test_volume_bars_scale_to_max() {
        let (candles, x, _, rect) = setup();
        let bars = volume_bars(&candles, 0..3, &x, &rect);
        assert_eq!(bars[0].0.height, 100.0);
        assert_eq!(bars[1].0.height, 50.0);
        assert_eq!(bars[0].0.bottom(), rect.bottom());
    }

    #[test]
    fn test_price_extent() {
        let (candles, ..) = setup();
        assert_eq!(price_extent(&candles, 0..3), Some((8.0, 12.0)));
        assert_eq!(price_extent(&candles, 1..2), Some((9.0, 11.5)));
        assert_eq!(price_extent(&candles, 3..3), None);
    }
}
