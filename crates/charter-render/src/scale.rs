//! Linear maps between data space and pixels.
//!
//! Scales are cheap and rebuilt from the live viewport every frame.

use charter_core::Viewport;

use crate::surface::Rect;

/// Maps fractional candle index to x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XScale {
    pub start: f64,
    pub candle_width: f64,
    pub left: f64,
}

impl XScale {
    pub fn new(viewport: &Viewport, rect: &Rect) -> Self {
        Self {
            start: viewport.start,
            candle_width: viewport.candle_width.max(f64::EPSILON),
            left: rect.x,
        }
    }

    /// Left edge of candle slot `index`.
    pub fn index_to_x(&self, index: f64) -> f64 {
        self.left + (index - self.start) * self.candle_width
    }

    /// Horizontal center of candle `index`.
    pub fn center_x(&self, index: usize) -> f64 {
        self.index_to_x(index as f64 + 0.5)
    }

    /// Fractional index under `x`.
    pub fn x_to_index(&self, x: f64) -> f64 {
        self.start + (x - self.left) / self.candle_width
    }
}

/// Maps price to y over a panel, top = high.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YScale {
    pub min: f64,
    pub max: f64,
    pub top: f64,
    pub bottom: f64,
}

impl YScale {
    /// Fit `[min, max]` into `rect` with `padding` (fraction of range) on each side.
    pub fn fit(min: f64, max: f64, rect: &Rect, padding: f64) -> Self {
        let (mut min, mut max) = (min, max);
        if !(max - min).is_finite() || max - min <= f64::EPSILON * max.abs().max(1.0) {
            // Flat or degenerate range: open a band around the value
            let center = if min.is_finite() { min } else { 0.0 };
            let half = (center.abs() * 0.01).max(1.0);
            min = center - half;
            max = center + half;
        }
        let pad = (max - min) * padding;
        Self {
            min: min - pad,
            max: max + pad,
            top: rect.y,
            bottom: rect.bottom(),
        }
    }

    /// Fixed range without padding, e.g. 0..100 for oscillators.
    pub fn fixed(min: f64, max: f64, rect: &Rect) -> Self {
        Self {
            min,
            max,
            top: rect.y,
            bottom: rect.bottom(),
        }
    }

    pub fn price_to_y(&self, price: f64) -> f64 {
        let t = (price - self.min) / (self.max - self.min);
        self.bottom - t * (self.bottom - self.top)
    }

    pub fn y_to_price(&self, y: f64) -> f64 {
        let t = (self.bottom - y) / (self.bottom - self.top);
        self.min + t * (self.max - self.min)
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Round step for roughly `target` gridlines across `range`.
pub fn nice_step(range: f64, target: f64) -> f64 {
    if !(range.is_finite() && range > 0.0 && target > 0.0) {
        return 1.0;
    }
    let raw_step = range / target;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    if normalized < 1.5 {
        magnitude
    } else if normalized < 3.5 {
        2.0 * magnitude
    } else if normalized < 7.5 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    }
}

/// Gridline values inside `[min, max)`.
pub fn nice_ticks(min: f64, max: f64, target: f64) -> Vec<f64> {
    let step = nice_step(max - min, target);
    let first = (min / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut i = 0.0;
    loop {
        let y = first + i * step;
        if y >= max || ticks.len() >= 64 {
            break;
        }
        ticks.push(y);
        i += 1.0;
    }
    ticks
}

/// Decimal places for price labels on a grid of `step`.
pub fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step >= 1.0 || step <= 0.0 {
        return 2;
    }
    ((-step.log10()).ceil() as usize).clamp(2, 8)
}
