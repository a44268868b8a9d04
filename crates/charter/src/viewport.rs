//! Zoom, pan and inertia for the shared chart viewport.
//!
//! The price and oscillator panels read the same [`Viewport`], so their
//! candles always line up. Wheel zoom animates toward an [`AnimationTarget`];
//! pinch and pan write the live window directly.

use charter_config::ViewportConfig;
use charter_core::Viewport;
use charter_render::visible_candle_count;

/// Remaining distance below which an animation snaps to its target.
const SNAP_EPSILON: f64 = 1e-3;
/// Candle width used before any data has arrived.
const FALLBACK_WIDTH: f64 = 8.0;

/// Tunables for [`ViewportController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSettings {
    pub default_visible: usize,
    pub min_width: f64,
    pub max_width: f64,
    pub zoom_sensitivity: f64,
    pub smoothing: f64,
    pub inertia_decay: f64,
    pub inertia_start: f64,
    pub inertia_stop: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self::from(&ViewportConfig::default())
    }
}

impl From<&ViewportConfig> for ViewportSettings {
    fn from(config: &ViewportConfig) -> Self {
        let min_width = config.min_candle_width.max(0.1);
        Self {
            default_visible: config.default_visible.max(1),
            min_width,
            max_width: config.max_candle_width.max(min_width),
            zoom_sensitivity: config.zoom_sensitivity,
            smoothing: config.animation_smoothing.clamp(0.01, 1.0),
            inertia_decay: config.inertia_decay.clamp(0.0, 0.999),
            inertia_start: config.inertia_start_threshold,
            inertia_stop: config.inertia_stop_threshold,
        }
    }
}

/// Where an animated zoom is heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTarget {
    pub viewport: Viewport,
    pub in_progress: bool,
}

/// Price/oscillator height split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividerState {
    ratio: f64,
}

impl DividerState {
    pub const MIN_RATIO: f64 = charter_render::MIN_DIVIDER_RATIO;
    pub const MAX_RATIO: f64 = charter_render::MAX_DIVIDER_RATIO;

    pub fn new(ratio: f64) -> Self {
        let mut state = Self { ratio: 0.7 };
        state.set_ratio(ratio);
        state
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        if ratio.is_finite() {
            self.ratio = ratio.clamp(Self::MIN_RATIO, Self::MAX_RATIO);
        }
    }

    /// Move the divider by `dy` pixels of a chart `total_height` pixels tall.
    pub fn drag(&mut self, dy: f64, total_height: f64) {
        if total_height > 0.0 {
            self.set_ratio(self.ratio + dy / total_height);
        }
    }
}

/// Owns the visible window and every gesture that changes it.
#[derive(Debug, Clone)]
pub struct ViewportController {
    settings: ViewportSettings,
    live: Viewport,
    target: AnimationTarget,
    /// Pan velocity in px/frame while coasting.
    inertia: Option<f64>,
    plot_width: f64,
    candle_count: usize,
    divider: DividerState,
}

impl ViewportController {
    pub fn new(settings: ViewportSettings, plot_width: f64, divider_ratio: f64) -> Self {
        let width = FALLBACK_WIDTH.clamp(settings.min_width, settings.max_width);
        let live = Viewport::empty(width, settings.min_width, settings.max_width);
        Self {
            settings,
            live,
            target: AnimationTarget {
                viewport: live,
                in_progress: false,
            },
            inertia: None,
            plot_width: plot_width.max(1.0),
            candle_count: 0,
            divider: DividerState::new(divider_ratio),
        }
    }

    /// The window both panels draw this frame.
    pub fn viewport(&self) -> &Viewport {
        &self.live
    }

    /// The oscillator shares the price panel's window.
    pub fn oscillator_viewport(&self) -> &Viewport {
        &self.live
    }

    pub fn target(&self) -> &AnimationTarget {
        &self.target
    }

    pub fn is_animating(&self) -> bool {
        self.target.in_progress
    }

    pub fn has_inertia(&self) -> bool {
        self.inertia.is_some()
    }

    pub fn candle_count(&self) -> usize {
        self.candle_count
    }

    pub fn plot_width(&self) -> f64 {
        self.plot_width
    }

    pub fn settings(&self) -> &ViewportSettings {
        &self.settings
    }

    pub fn divider(&self) -> &DividerState {
        &self.divider
    }

    pub fn divider_mut(&mut self) -> &mut DividerState {
        &mut self.divider
    }

    /// Show the most recent `min(default_visible, len)` candles at a width
    /// where exactly that many fit.
    pub fn reset(&mut self, len: usize) {
        self.candle_count = len;
        self.inertia = None;

        let shown = self.settings.default_visible.min(len);
        let width = if shown == 0 {
            self.live.candle_width
        } else {
            let slots = shown as f64 + charter_render::SAFETY_MARGIN_CANDLES as f64 + 0.5;
            self.plot_width / slots
        };
        self.live = self.window_for(self.clamp_width(width), 0.0);
        self.settle();
        log::debug!("viewport reset to {:?} for {} candles", self.live, len);
    }

    /// Recompute the window after the plot area changed width.
    pub fn resize(&mut self, plot_width: f64) {
        if !plot_width.is_finite() {
            return;
        }
        self.plot_width = plot_width.max(1.0);
        let len = self.candle_count;
        self.live = self.window_for(self.live.candle_width, self.live.offset_from_right(len));
        if self.target.in_progress {
            let t = self.target.viewport;
            self.target.viewport = self.window_for(t.candle_width, t.offset_from_right(len));
        } else {
            self.settle();
        }
    }

    /// Follow a series that grew or shrank. Views anchored to the latest
    /// candle stay anchored; scrolled views keep their absolute window.
    pub fn set_candle_count(&mut self, len: usize) {
        let old = self.candle_count;
        if old == len {
            return;
        }
        if old == 0 {
            self.reset(len);
            return;
        }
        self.candle_count = len;
        self.live = self.refit(self.live, old);
        if self.target.in_progress {
            self.target.viewport = self.refit(self.target.viewport, old);
        } else {
            self.settle();
        }
    }

    /// Wheel zoom. Positive `delta_y` narrows candles. Accumulates on the
    /// pending target and animates toward it.
    pub fn apply_zoom(&mut self, delta_y: f64) {
        if !delta_y.is_finite() {
            return;
        }
        self.inertia = None;
        let base = if self.target.in_progress {
            self.target.viewport
        } else {
            self.live
        };
        let width = self.clamp_width(base.candle_width * (-delta_y * self.settings.zoom_sensitivity).exp());
        let offset = base.offset_from_right(self.candle_count);
        self.target = AnimationTarget {
            viewport: self.window_for(width, offset),
            in_progress: true,
        };
    }

    /// Pinch zoom by `scale`, applied immediately to both live and target.
    pub fn apply_pinch(&mut self, scale: f64) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        self.inertia = None;
        let width = self.clamp_width(self.live.candle_width * scale);
        let offset = self.live.offset_from_right(self.candle_count);
        self.live = self.window_for(width, offset);
        self.settle();
    }

    /// Drag pan by `delta_px`. Dragging right reveals older candles.
    pub fn apply_pan(&mut self, delta_px: f64) {
        if self.target.in_progress {
            // Jump to where the zoom was heading so the gesture acts on it
            self.live = self.target.viewport;
        }
        self.settle();
        self.shift(delta_px);
    }

    /// A new gesture started: stop animation and coasting.
    pub fn begin_gesture(&mut self) {
        self.inertia = None;
        if self.target.in_progress {
            self.live = self.target.viewport;
            self.settle();
        }
    }

    /// Drag released with `velocity` px/frame.
    pub fn release(&mut self, velocity: f64) {
        self.inertia = (velocity.is_finite() && velocity.abs() > self.settings.inertia_start).then_some(velocity);
    }

    /// Advance one frame. Returns whether the live window moved.
    pub fn tick(&mut self) -> bool {
        if let Some(velocity) = self.inertia {
            let moved = self.shift(velocity);
            let next = velocity * self.settings.inertia_decay;
            self.inertia = (moved && next.abs() >= self.settings.inertia_stop).then_some(next);
            return moved;
        }

        if !self.target.in_progress {
            return false;
        }

        let s = self.settings.smoothing;
        let t = self.target.viewport;
        let len = self.candle_count;
        let lerp = |from: f64, to: f64| from + (to - from) * s;
        // Blend width and anchor only; the window is rebuilt so it always fits
        let width = lerp(self.live.candle_width, t.candle_width);
        let offset = lerp(self.live.offset_from_right(len), t.offset_from_right(len));

        let done = (width - t.candle_width).abs() < SNAP_EPSILON
            && (offset - t.offset_from_right(len)).abs() < SNAP_EPSILON;
        if done {
            self.live = t;
            self.target.in_progress = false;
        } else {
            self.live = self.window_for(self.clamp_width(width), offset);
        }
        true
    }

    /// Fractional index under `x` pixels from the plot's left edge.
    pub fn index_at(&self, x: f64) -> f64 {
        self.live.start + x / self.live.candle_width
    }

    fn clamp_width(&self, width: f64) -> f64 {
        if width.is_finite() {
            width.clamp(self.settings.min_width, self.settings.max_width)
        } else {
            self.live.candle_width
        }
    }

    fn span_for(&self, width: f64) -> f64 {
        visible_candle_count(self.plot_width, width).min(self.candle_count) as f64
    }

    /// A window at `width` whose right edge sits `offset` candles before the end.
    fn window_for(&self, width: f64, offset: f64) -> Viewport {
        let (min, max) = (self.settings.min_width, self.settings.max_width);
        let len = self.candle_count as f64;
        if self.candle_count == 0 {
            return Viewport::empty(width, min, max);
        }
        let span = self.span_for(width);
        let end = (len - offset.max(0.0)).clamp(span, len);
        Viewport::new(end - span, end, width, min, max)
    }

    fn refit(&self, vp: Viewport, old_len: usize) -> Viewport {
        if vp.is_anchored_right(old_len) {
            return self.window_for(vp.candle_width, 0.0);
        }
        let len = self.candle_count as f64;
        let span = self.span_for(vp.candle_width);
        let start = vp.start.clamp(0.0, (len - span).max(0.0));
        Viewport::new(start, start + span, vp.candle_width, vp.min_width, vp.max_width)
    }

    /// Pan the live window, clamped to the series. Returns whether it moved.
    fn shift(&mut self, delta_px: f64) -> bool {
        if self.candle_count == 0 || !delta_px.is_finite() {
            return false;
        }
        let len = self.candle_count as f64;
        let span = self.live.span();
        let delta = -delta_px / self.live.candle_width;
        let start = (self.live.start + delta).clamp(0.0, (len - span).max(0.0));
        let moved = (start - self.live.start).abs() > f64::EPSILON;
        self.live.start = start;
        self.live.end = start + span;
        self.settle();
        moved
    }

    fn settle(&mut self) {
        self.target = AnimationTarget {
            viewport: self.live,
            in_progress: false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(len: usize) -> ViewportController {
        let mut c = ViewportController::new(ViewportSettings::default(), 1000.0, 0.7);
        c.reset(len);
        c
    }

    fn settle_animation(c: &mut ViewportController) {
        for _ in 0..500 {
            if !c.tick() {
                break;
            }
        }
    }

    #[test]
    fn test_reset_shows_default_count() {
        let c = controller(500);
        let vp = c.viewport();
        assert_eq!(vp.end, 500.0);
        assert_eq!(vp.span(), 100.0);
        assert_eq!(visible_candle_count(1000.0, vp.candle_width), 100);
    }

    #[test]
    fn test_reset_with_few_candles() {
        let c = controller(30);
        let vp = c.viewport();
        assert_eq!(vp.start, 0.0);
        assert_eq!(vp.end, 30.0);
        assert!((vp.candle_width - 1000.0 / 31.5).abs() < 1e-9);

        // 1000 / 11.5 exceeds the max width
        let c = controller(10);
        assert_eq!(c.viewport().candle_width, 40.0);
        assert_eq!(c.viewport().span(), 10.0);
    }

    #[test]
    fn test_reset_empty() {
        let c = controller(0);
        assert!(c.viewport().is_empty());
        assert_eq!(c.viewport().start, 0.0);
    }

    #[test]
    fn test_zoom_animates_and_pins_right_edge() {
        let mut c = controller(500);
        let before = c.viewport().candle_width;
        c.apply_zoom(-200.0);
        assert!(c.is_animating());
        assert_eq!(c.viewport().candle_width, before);

        settle_animation(&mut c);
        assert!(!c.is_animating());
        let vp = c.viewport();
        assert!(vp.candle_width > before);
        assert_eq!(vp.end, 500.0);
    }

    #[test]
    fn test_zoom_animation_fits_plot_every_frame() {
        for delta in [-300.0, 300.0] {
            let mut c = controller(500);
            c.apply_zoom(delta);
            let mut frames = 0;
            while c.tick() {
                let vp = c.viewport();
                assert!(
                    vp.span() * vp.candle_width <= c.plot_width() + 1e-9,
                    "frame {frames}: {vp:?} overflows the plot"
                );
                assert_eq!(vp.end, 500.0);
                frames += 1;
            }
            assert!(frames > 1);
        }
    }

    #[test]
    fn test_zoom_accumulates_on_target() {
        let mut c = controller(500);
        c.apply_zoom(-100.0);
        let first = c.target().viewport.candle_width;
        c.apply_zoom(-100.0);
        assert!(c.target().viewport.candle_width > first);
    }

    #[test]
    fn test_zoom_keeps_offset_from_right() {
        let mut c = controller(500);
        c.apply_pan(400.0);
        let offset = c.viewport().offset_from_right(500);
        assert!(offset > 0.0);

        c.apply_zoom(150.0);
        settle_animation(&mut c);
        assert!((c.viewport().offset_from_right(500) - offset).abs() < 1e-6);
    }

    #[test]
    fn test_pan_clamps_to_series() {
        let mut c = controller(500);
        c.apply_pan(-1000.0);
        assert_eq!(c.viewport().end, 500.0);

        c.apply_pan(1_000_000.0);
        assert_eq!(c.viewport().start, 0.0);
        assert_eq!(c.viewport().span(), 100.0);
    }

    #[test]
    fn test_pan_cancels_animation() {
        let mut c = controller(500);
        c.apply_zoom(-300.0);
        c.apply_pan(50.0);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_inertia_decays_and_stops() {
        let mut c = controller(2000);
        c.apply_pan(5000.0);
        c.release(-30.0);
        assert!(c.has_inertia());

        let mut frames = 0;
        while c.tick() && frames < 1000 {
            frames += 1;
        }
        assert!(!c.has_inertia());
        assert!(frames > 10);
    }

    #[test]
    fn test_slow_release_has_no_inertia() {
        let mut c = controller(500);
        c.release(1.0);
        assert!(!c.has_inertia());
    }

    #[test]
    fn test_gesture_cancels_inertia() {
        let mut c = controller(2000);
        c.apply_pan(5000.0);
        c.release(40.0);
        c.begin_gesture();
        assert!(!c.has_inertia());
        assert!(!c.tick());
    }

    #[test]
    fn test_pinch_is_immediate() {
        let mut c = controller(500);
        let before = c.viewport().candle_width;
        c.apply_pinch(1.5);
        assert!(!c.is_animating());
        assert!((c.viewport().candle_width - before * 1.5).abs() < 1e-9);
        assert_eq!(c.viewport().end, 500.0);
    }

    #[test]
    fn test_set_candle_count_follows_anchor() {
        let mut c = controller(500);
        c.set_candle_count(501);
        assert_eq!(c.viewport().end, 501.0);

        c.apply_pan(200.0);
        let start = c.viewport().start;
        c.set_candle_count(502);
        assert_eq!(c.viewport().start, start);
    }

    #[test]
    fn test_resize_keeps_anchor() {
        let mut c = controller(500);
        c.resize(500.0);
        assert_eq!(c.viewport().end, 500.0);
        assert_eq!(c.plot_width(), 500.0);
        assert!(c.viewport().span() < 100.0);
    }

    #[test]
    fn test_divider_clamped() {
        let mut d = DividerState::new(0.7);
        d.drag(-1000.0, 600.0);
        assert_eq!(d.ratio(), DividerState::MIN_RATIO);
        d.drag(6000.0, 600.0);
        assert_eq!(d.ratio(), DividerState::MAX_RATIO);
        d.set_ratio(f64::NAN);
        assert_eq!(d.ratio(), DividerState::MAX_RATIO);
    }
}
