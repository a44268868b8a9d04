//! Visible index window and pixel scale.

/// A half-open fractional index window `[start, end)` into a candle series
/// plus the pixel width of one candle.
///
/// With candles present the window satisfies `0 <= start < end <= len` and
/// `min_width <= candle_width <= max_width`. With no candles it is `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub start: f64,
    pub end: f64,
    pub candle_width: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl Viewport {
    pub fn new(start: f64, end: f64, candle_width: f64, min_width: f64, max_width: f64) -> Self {
        Self {
            start,
            end,
            candle_width,
            min_width,
            max_width,
        }
    }

    /// The empty window used when there are no candles.
    pub fn empty(candle_width: f64, min_width: f64, max_width: f64) -> Self {
        Self::new(0.0, 0.0, candle_width, min_width, max_width)
    }

    /// Number of candles spanned by the window.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.span() <= 0.0
    }

    /// Distance from the end of the window to the end of the series.
    pub fn offset_from_right(&self, len: usize) -> f64 {
        (len as f64 - self.end).max(0.0)
    }

    /// Whether the right edge sits at the most recent candle.
    pub fn is_anchored_right(&self, len: usize) -> bool {
        self.offset_from_right(len) < 1e-9
    }

    /// Integer candle indices touched by the window, clamped to `len`.
    pub fn index_range(&self, len: usize) -> std::ops::Range<usize> {
        let first = self.start.max(0.0).floor() as usize;
        let last = (self.end.max(0.0).ceil() as usize).min(len);
        first.min(last)..last
    }

    pub fn clamp_width(&self, width: f64) -> f64 {
        width.clamp(self.min_width, self.max_width)
    }

    /// Checks the window invariant against a series length.
    pub fn is_valid_for(&self, len: usize) -> bool {
        let width_ok = self.candle_width >= self.min_width && self.candle_width <= self.max_width;
        if len == 0 {
            return self.start == 0.0 && self.end == 0.0 && width_ok;
        }
        self.start >= 0.0 && self.start < self.end && self.end <= len as f64 && width_ok
    }

    /// Whether two viewports differ by less than `eps` in every field.
    pub fn approx_eq(&self, other: &Viewport, eps: f64) -> bool {
        (self.start - other.start).abs() < eps
            && (self.end - other.end).abs() < eps
            && (self.candle_width - other.candle_width).abs() < eps
    }
}
