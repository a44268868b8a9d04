//! Panel layout for the chart surface.

use crate::surface::{Point, Rect};
use crate::{
    DIVIDER_GAP, DIVIDER_HIT_SLOP, MAX_DIVIDER_RATIO, MIN_DIVIDER_RATIO, PRICE_AXIS_WIDTH,
    TIME_AXIS_HEIGHT, VOLUME_HEIGHT_RATIO,
};

/// Vertical section a pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Price,
    Oscillator,
    Divider,
    TimeAxis,
    Outside,
}

/// Rectangles for every panel, recomputed whenever size or divider changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    /// Candles and price overlays.
    pub price: Rect,
    /// Volume strip at the bottom of the price panel.
    pub volume: Rect,
    /// Oscillator panel below the divider.
    pub oscillator: Option<Rect>,
    pub price_axis: Rect,
    pub oscillator_axis: Option<Rect>,
    pub time_axis: Rect,
    /// Y of the divider line, when the oscillator is shown.
    pub divider_y: Option<f64>,
}

impl ChartLayout {
    pub fn compute(width: f64, height: f64, divider_ratio: f64, show_oscillator: bool) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let plot_width = (width - PRICE_AXIS_WIDTH).max(1.0);
        let chart_height = (height - TIME_AXIS_HEIGHT).max(1.0);

        let (price_panel_height, oscillator, divider_y) = if show_oscillator {
            let ratio = divider_ratio.clamp(MIN_DIVIDER_RATIO, MAX_DIVIDER_RATIO);
            let split = (chart_height * ratio).floor();
            let osc_top = split + DIVIDER_GAP;
            let osc = Rect::new(0.0, osc_top, plot_width, (chart_height - osc_top).max(1.0));
            (split, Some(osc), Some(split + DIVIDER_GAP / 2.0))
        } else {
            (chart_height, None, None)
        };

        let volume_height = (price_panel_height * VOLUME_HEIGHT_RATIO).floor();
        let price = Rect::new(0.0, 0.0, plot_width, (price_panel_height - volume_height).max(1.0));
        let volume = Rect::new(0.0, price.bottom(), plot_width, volume_height);

        Self {
            width,
            height,
            price,
            volume,
            oscillator,
            price_axis: Rect::new(plot_width, 0.0, PRICE_AXIS_WIDTH, price_panel_height),
            oscillator_axis: oscillator
                .map(|o| Rect::new(plot_width, o.y, PRICE_AXIS_WIDTH, o.height)),
            time_axis: Rect::new(0.0, chart_height, plot_width, TIME_AXIS_HEIGHT),
            divider_y,
        }
    }

    /// Width available to candles.
    pub fn plot_width(&self) -> f64 {
        self.price.width
    }

    /// Total height shared by the price and oscillator panels.
    pub fn chart_height(&self) -> f64 {
        self.time_axis.y
    }

    /// Classify a vertical position.
    pub fn region_at(&self, y: f64) -> Region {
        if y < 0.0 || y >= self.height {
            return Region::Outside;
        }
        if let Some(div) = self.divider_y {
            if (y - div).abs() <= DIVIDER_HIT_SLOP {
                return Region::Divider;
            }
        }
        if y >= self.time_axis.y {
            return Region::TimeAxis;
        }
        match (self.divider_y, self.oscillator) {
            (Some(div), Some(_)) if y > div => Region::Oscillator,
            _ => Region::Price,
        }
    }

    /// Whether `p` is over a data panel (not an axis).
    pub fn in_plot(&self, p: Point) -> bool {
        p.x >= 0.0
            && p.x < self.plot_width()
            && matches!(self.region_at(p.y), Region::Price | Region::Oscillator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_with_oscillator() {
        let layout = ChartLayout::compute(1064.0, 622.0, 0.7, true);
        assert_eq!(layout.plot_width(), 1000.0);
        assert_eq!(layout.chart_height(), 600.0);

        let osc = layout.oscillator.unwrap();
        assert_eq!(layout.price.y, 0.0);
        // Price + volume take 70% of the chart height
        assert_eq!(layout.volume.bottom(), 420.0);
        assert!(osc.y > layout.volume.bottom());
        assert!((osc.bottom() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_without_oscillator() {
        let layout = ChartLayout::compute(800.0, 400.0, 0.7, false);
        assert!(layout.oscillator.is_none());
        assert_eq!(layout.volume.bottom(), layout.chart_height());
        assert_eq!(layout.region_at(390.0), Region::Price);
    }

    #[test]
    fn test_divider_ratio_clamped() {
        let low = ChartLayout::compute(800.0, 622.0, 0.05, true);
        assert_eq!(low.volume.bottom(), 150.0);
        let high = ChartLayout::compute(800.0, 622.0, 0.99, true);
        assert_eq!(high.volume.bottom(), 510.0);
    }

    #[test]
    fn test_region_at() {
        let layout = ChartLayout::compute(1064.0, 622.0, 0.7, true);
        let div = layout.divider_y.unwrap();
        assert_eq!(layout.region_at(10.0), Region::Price);
        assert_eq!(layout.region_at(div), Region::Divider);
        assert_eq!(layout.region_at(div + 3.0), Region::Divider);
        assert_eq!(layout.region_at(div + 20.0), Region::Oscillator);
        assert_eq!(layout.region_at(610.0), Region::TimeAxis);
        assert_eq!(layout.region_at(-1.0), Region::Outside);
        assert_eq!(layout.region_at(700.0), Region::Outside);
    }

    #[test]
    fn test_zero_size_is_safe() {
        let layout = ChartLayout::compute(0.0, 0.0, 0.7, true);
        assert!(layout.plot_width() >= 1.0);
        assert!(layout.price.height >= 1.0);
    }
}
