//! 2D chart rendering for charter.
//!
//! Everything draws through the [`Surface`] trait so the same frame can go to
//! a canvas backend or into a [`DisplayList`] for headless use.

pub mod geometry;
pub mod layout;
pub mod renderer;
pub mod scale;
pub mod smoothing;
pub mod surface;
pub mod theme;

pub use geometry::{candle_geometry, price_extent, volume_bars, CandleGeometry};
pub use layout::{ChartLayout, Region};
pub use renderer::{ChartFrame, ChartRenderer, FrameReport, OverlayToggles, PriceFlash};
pub use scale::{decimals_for_step, nice_step, nice_ticks, XScale, YScale};
pub use smoothing::{band_path, smooth_path};
pub use surface::{
    Color, DisplayList, DrawCommand, Path, PathCmd, Point, Recorded, Rect, Surface, TextAlign,
};
pub use theme::Theme;

/// Layout constants.
pub const PRICE_AXIS_WIDTH: f64 = 64.0;
pub const TIME_AXIS_HEIGHT: f64 = 22.0;
pub const VOLUME_HEIGHT_RATIO: f64 = 0.2; // Volume strip takes 20% of the price panel
pub const DIVIDER_GAP: f64 = 6.0;
pub const DIVIDER_HIT_SLOP: f64 = 4.0;
pub const MIN_DIVIDER_RATIO: f64 = 0.25;
pub const MAX_DIVIDER_RATIO: f64 = 0.85;

/// Candles kept off-screen at the right so the newest one is never clipped.
pub const SAFETY_MARGIN_CANDLES: usize = 1;

/// Number of whole candles that fit across `plot_width` at `candle_width`,
/// minus the safety margin. Never less than one.
pub fn visible_candle_count(plot_width: f64, candle_width: f64) -> usize {
    if !plot_width.is_finite() || !candle_width.is_finite() || plot_width <= 0.0 || candle_width <= 0.0 {
        return 1;
    }
    let fit = (plot_width / candle_width).floor() as usize;
    fit.saturating_sub(SAFETY_MARGIN_CANDLES).max(1)
}
