//! Chart frame composition.

use chrono::DateTime;

use charter_core::{Candle, CandleSeries, Viewport};
use charter_indicators::{IndicatorBundle, LevelKind, Signal, TrendDirection};

use crate::geometry::{candle_geometry, price_extent, volume_bars};
use crate::layout::ChartLayout;
use crate::scale::{decimals_for_step, nice_step, nice_ticks, XScale, YScale};
use crate::smoothing::{band_path, smooth_path};
use crate::surface::{Color, Path, Point, Rect, Surface, TextAlign};
use crate::theme::Theme;

const PRICE_PADDING: f64 = 0.08;
const PRICE_GRID_TARGET: f64 = 8.0;
const TIME_LABEL_SPACING: f64 = 100.0;
const LINE_HEIGHT: f64 = 14.0;
const TOOLTIP_PADDING: f64 = 6.0;
const TOOLTIP_OFFSET: f64 = 12.0;
const MARKER_SIZE: f64 = 6.0;
const OSC_GUIDES: [f64; 3] = [20.0, 50.0, 80.0];

/// Which overlays are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayToggles {
    pub ema: bool,
    pub trend: bool,
    pub fibonacci: bool,
    pub levels: bool,
    pub signals: bool,
    pub volume: bool,
    pub oscillator: bool,
}

impl Default for OverlayToggles {
    fn default() -> Self {
        Self {
            ema: true,
            trend: true,
            fibonacci: false,
            levels: true,
            signals: true,
            volume: true,
            oscillator: true,
        }
    }
}

/// Transient color of the current-price label after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFlash {
    Up,
    Down,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct ChartFrame<'a> {
    pub candles: &'a CandleSeries,
    pub indicators: &'a IndicatorBundle,
    pub viewport: &'a Viewport,
    pub divider_ratio: f64,
    pub toggles: OverlayToggles,
    /// Throttled display price; the last close is used when absent.
    pub live_price: Option<f64>,
    pub flash: Option<PriceFlash>,
    pub pointer: Option<Point>,
    pub dragging: bool,
}

/// What a frame ended up drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub layout: ChartLayout,
    pub candles_drawn: usize,
    pub hovered_index: Option<usize>,
    pub tooltip: Option<Rect>,
}

/// Draws chart frames onto any [`Surface`].
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    pub theme: Theme,
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
}

impl ChartRenderer {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            theme: Theme::default(),
            width,
            height,
            device_pixel_ratio: device_pixel_ratio.max(0.1),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        log::debug!("chart surface resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn layout(&self, divider_ratio: f64, show_oscillator: bool) -> ChartLayout {
        ChartLayout::compute(self.width, self.height, divider_ratio, show_oscillator)
    }

    /// Draw a complete frame. Repeated calls with the same frame produce the
    /// same output.
    pub fn draw_chart(&self, surface: &mut impl Surface, frame: &ChartFrame<'_>) -> FrameReport {
        let layout = self.layout(frame.divider_ratio, frame.toggles.oscillator);
        surface.begin_frame(layout.width, layout.height, self.device_pixel_ratio);
        surface.fill_rect(Rect::new(0.0, 0.0, layout.width, layout.height), self.theme.background);

        let candles = frame.candles.as_slice();
        let range = frame.viewport.index_range(candles.len());
        let x = XScale::new(frame.viewport, &layout.price);

        let Some((lo, hi)) = price_extent(candles, range.clone()) else {
            self.draw_panel_borders(surface, &layout);
            return FrameReport {
                layout,
                candles_drawn: 0,
                hovered_index: None,
                tooltip: None,
            };
        };
        let y = YScale::fit(lo, hi, &layout.price, PRICE_PADDING);

        self.draw_price_panel(surface, frame, &layout, &x, &y, range.clone());
        if frame.toggles.volume && layout.volume.height > 0.0 {
            surface.save();
            surface.clip_rect(layout.volume);
            for (bar, bullish) in volume_bars(candles, range.clone(), &x, &layout.volume) {
                let color = if bullish { self.theme.bullish } else { self.theme.bearish };
                surface.fill_rect(bar, color.with_alpha(0.5));
            }
            surface.restore();
        }
        if let Some(osc_rect) = layout.oscillator {
            self.draw_oscillator(surface, frame, &layout, osc_rect, &x, range.clone());
        }
        self.draw_time_axis(surface, candles, &layout, &x, range.clone());
        self.draw_current_price(surface, frame, &layout, &y);
        self.draw_panel_borders(surface, &layout);

        let (hovered_index, tooltip) = self.draw_crosshair(surface, frame, &layout, &x);

        FrameReport {
            layout,
            candles_drawn: range.len(),
            hovered_index,
            tooltip,
        }
    }

    fn draw_price_panel(
        &self,
        surface: &mut impl Surface,
        frame: &ChartFrame<'_>,
        layout: &ChartLayout,
        x: &XScale,
        y: &YScale,
        range: std::ops::Range<usize>,
    ) {
        let candles = frame.candles.as_slice();
        let bundle = frame.indicators;
        let plot = layout.price;

        // Grid and price labels
        let ticks = nice_ticks(y.min, y.max, PRICE_GRID_TARGET);
        let decimals = decimals_for_step(nice_step(y.max - y.min, PRICE_GRID_TARGET));
        surface.save();
        surface.clip_rect(plot);
        for &price in &ticks {
            let py = y.price_to_y(price);
            surface.stroke_line(Point::new(plot.x, py), Point::new(plot.right(), py), self.theme.grid, 1.0);
        }
        surface.restore();

        surface.save();
        surface.clip_rect(layout.price_axis);
        for &price in &ticks {
            let at = Point::new(layout.price_axis.x + 4.0, y.price_to_y(price));
            surface.fill_text(&format!("{price:.decimals$}"), at, self.theme.axis_text, TextAlign::Left);
        }
        surface.restore();

        surface.save();
        surface.clip_rect(plot);

        if frame.toggles.trend {
            self.draw_trend(surface, frame, x, y, range.clone());
        }

        if frame.toggles.fibonacci {
            if let Some(fib) = &bundle.fibonacci {
                for level in &fib.levels {
                    let py = y.price_to_y(level.price);
                    surface.stroke_line(
                        Point::new(plot.x, py),
                        Point::new(plot.right(), py),
                        self.theme.fibonacci.with_alpha(0.6),
                        1.0,
                    );
                    surface.fill_text(
                        &format!("{:.1}%", level.ratio * 100.0),
                        Point::new(plot.x + 4.0, py - 2.0),
                        self.theme.fibonacci,
                        TextAlign::Left,
                    );
                }
            }
        }

        if frame.toggles.levels {
            for level in &bundle.levels {
                if !y.contains(level.price) {
                    continue;
                }
                let color = match level.kind {
                    LevelKind::Support => self.theme.support,
                    LevelKind::Resistance => self.theme.resistance,
                };
                let py = y.price_to_y(level.price);
                let width = (1.0 + level.strength as f64 * 0.25).min(3.0);
                surface.stroke_line(Point::new(plot.x, py), Point::new(plot.right(), py), color.with_alpha(0.7), width);
            }
        }

        for geo in candle_geometry(candles, range.clone(), x, y) {
            let color = if geo.bullish { self.theme.bullish } else { self.theme.bearish };
            surface.stroke_line(
                Point::new(geo.center_x, geo.wick_top),
                Point::new(geo.center_x, geo.wick_bottom),
                color,
                1.0,
            );
            surface.fill_rect(geo.body, color);
        }

        if frame.toggles.ema {
            for (series, color) in [
                (&bundle.ema_fast, self.theme.ema_fast),
                (&bundle.ema_slow, self.theme.ema_slow),
            ] {
                let points: Vec<Point> = series
                    .iter_range(range.start, range.end)
                    .map(|(i, &v)| Point::new(x.center_x(i), y.price_to_y(v)))
                    .collect();
                if points.len() >= 2 {
                    surface.stroke_path(&smooth_path(&points), color, 1.5);
                }
            }
        }

        if frame.toggles.signals {
            self.draw_signal_markers(surface, frame, x, y, range);
        }

        surface.restore();
    }

    fn draw_trend(
        &self,
        surface: &mut impl Surface,
        frame: &ChartFrame<'_>,
        x: &XScale,
        y: &YScale,
        range: std::ops::Range<usize>,
    ) {
        let visible: Vec<(Point, Point, TrendDirection)> = frame
            .indicators
            .trend
            .iter_range(range.start, range.end)
            .map(|(i, p)| {
                let cx = x.center_x(i);
                (
                    Point::new(cx, y.price_to_y(p.upper)),
                    Point::new(cx, y.price_to_y(p.lower)),
                    p.direction,
                )
            })
            .collect();

        // One cloud segment per run of equal direction. Neighbouring runs meet
        // halfway between their boundary bars, so lone bars still get a segment.
        let mut from = 0;
        for run in visible.chunk_by(|a, b| a.2 == b.2) {
            let to = from + run.len();
            let mut upper = Vec::with_capacity(run.len() + 2);
            let mut lower = Vec::with_capacity(run.len() + 2);
            if from > 0 {
                let prev = &visible[from - 1];
                upper.push(prev.0.midpoint(run[0].0));
                lower.push(prev.1.midpoint(run[0].1));
            }
            upper.extend(run.iter().map(|p| p.0));
            lower.extend(run.iter().map(|p| p.1));
            if let Some(next) = visible.get(to) {
                let last = &run[run.len() - 1];
                upper.push(last.0.midpoint(next.0));
                lower.push(last.1.midpoint(next.1));
            }

            let color = match run[0].2 {
                TrendDirection::Bullish => self.theme.trend_bullish,
                TrendDirection::Bearish => self.theme.trend_bearish,
            };
            let cloud = band_path(&upper, &lower);
            if !cloud.is_empty() {
                surface.fill_path(&cloud, color.with_alpha(0.12));
            }
            if upper.len() >= 2 {
                surface.stroke_path(&smooth_path(&upper), color.with_alpha(0.6), 1.0);
                surface.stroke_path(&smooth_path(&lower), color.with_alpha(0.6), 1.0);
            }
            from = to;
        }
    }

    /// Markers are placed where the classification changes to buy or sell.
    fn draw_signal_markers(
        &self,
        surface: &mut impl Surface,
        frame: &ChartFrame<'_>,
        x: &XScale,
        y: &YScale,
        range: std::ops::Range<usize>,
    ) {
        let candles = frame.candles.as_slice();
        let signals = &frame.indicators.signals;
        for (i, &signal) in signals.iter_range(range.start, range.end) {
            if signal == Signal::Hold {
                continue;
            }
            let previous = i.checked_sub(1).and_then(|p| signals.get(p)).copied();
            if previous == Some(signal) {
                continue;
            }
            let Some(candle) = candles.get(i) else {
                continue;
            };
            let cx = x.center_x(i);
            let mut marker = Path::new();
            let color = if signal.is_buy() {
                let tip = y.price_to_y(candle.low) + MARKER_SIZE;
                marker
                    .move_to(Point::new(cx, tip))
                    .line_to(Point::new(cx - MARKER_SIZE, tip + MARKER_SIZE * 1.5))
                    .line_to(Point::new(cx + MARKER_SIZE, tip + MARKER_SIZE * 1.5));
                self.theme.buy_marker
            } else {
                let tip = y.price_to_y(candle.high) - MARKER_SIZE;
                marker
                    .move_to(Point::new(cx, tip))
                    .line_to(Point::new(cx - MARKER_SIZE, tip - MARKER_SIZE * 1.5))
                    .line_to(Point::new(cx + MARKER_SIZE, tip - MARKER_SIZE * 1.5));
                self.theme.sell_marker
            };
            marker.close();
            surface.fill_path(&marker, color);
        }
    }

    fn draw_oscillator(
        &self,
        surface: &mut impl Surface,
        frame: &ChartFrame<'_>,
        layout: &ChartLayout,
        rect: Rect,
        x: &XScale,
        range: std::ops::Range<usize>,
    ) {
        let y = YScale::fixed(0.0, 100.0, &rect);
        let momentum = &frame.indicators.momentum;

        surface.save();
        surface.clip_rect(rect);
        for guide in OSC_GUIDES {
            let py = y.price_to_y(guide);
            surface.stroke_line(Point::new(rect.x, py), Point::new(rect.right(), py), self.theme.osc_guide, 1.0);
        }

        let visible: Vec<_> = momentum.points.iter_range(range.start, range.end).collect();
        let mid = y.price_to_y(50.0);
        let bar_width = (x.candle_width * 0.6).max(1.0);
        for &(i, p) in &visible {
            // Histogram bars grow from the neutral line
            let top = y.price_to_y(50.0 + p.histogram);
            let color = if p.histogram >= 0.0 { self.theme.bullish } else { self.theme.bearish };
            surface.fill_rect(
                Rect::new(x.center_x(i) - bar_width / 2.0, top.min(mid), bar_width, (top - mid).abs()),
                color.with_alpha(0.4),
            );
        }

        let k: Vec<Point> = visible.iter().map(|&(i, p)| Point::new(x.center_x(i), y.price_to_y(p.k))).collect();
        let d: Vec<Point> = visible.iter().map(|&(i, p)| Point::new(x.center_x(i), y.price_to_y(p.d))).collect();
        if k.len() >= 2 {
            surface.stroke_path(&smooth_path(&k), self.theme.osc_k, 1.5);
            surface.stroke_path(&smooth_path(&d), self.theme.osc_d, 1.5);
        }
        surface.restore();

        if let Some(axis) = layout.oscillator_axis {
            surface.save();
            surface.clip_rect(axis);
            for guide in OSC_GUIDES {
                surface.fill_text(
                    &format!("{guide:.0}"),
                    Point::new(axis.x + 4.0, y.price_to_y(guide)),
                    self.theme.axis_text,
                    TextAlign::Left,
                );
            }
            surface.restore();
        }
    }

    fn draw_time_axis(
        &self,
        surface: &mut impl Surface,
        candles: &[Candle],
        layout: &ChartLayout,
        x: &XScale,
        range: std::ops::Range<usize>,
    ) {
        let every = (TIME_LABEL_SPACING / x.candle_width).ceil().max(1.0) as usize;
        let spacing = match (candles.first(), candles.get(1)) {
            (Some(a), Some(b)) => (b.timestamp - a.timestamp) * every as f64,
            _ => 0.0,
        };
        let pattern = if spacing >= 86_400.0 { "%m-%d" } else { "%H:%M" };

        surface.save();
        surface.clip_rect(layout.time_axis);
        for i in range.filter(|i| i % every == 0) {
            let Some(label) = candles.get(i).and_then(|c| format_timestamp(c.timestamp, pattern)) else {
                continue;
            };
            let at = Point::new(x.center_x(i), layout.time_axis.y + LINE_HEIGHT);
            surface.fill_text(&label, at, self.theme.axis_text, TextAlign::Center);
        }
        surface.restore();
    }

    fn draw_current_price(&self, surface: &mut impl Surface, frame: &ChartFrame<'_>, layout: &ChartLayout, y: &YScale) {
        let Some(price) = frame.live_price.or_else(|| frame.candles.tail().map(|c| c.close)) else {
            return;
        };
        let color = match frame.flash {
            Some(PriceFlash::Up) => self.theme.bullish,
            Some(PriceFlash::Down) => self.theme.bearish,
            None => self.theme.price_neutral,
        };
        let py = y.price_to_y(price);
        let plot = layout.price;

        surface.save();
        surface.clip_rect(plot);
        surface.stroke_line(Point::new(plot.x, py), Point::new(plot.right(), py), color.with_alpha(0.8), 1.0);
        surface.restore();

        let decimals = decimals_for_step(nice_step(y.max - y.min, PRICE_GRID_TARGET));
        let label_rect = Rect::new(layout.price_axis.x, py - LINE_HEIGHT / 2.0, layout.price_axis.width, LINE_HEIGHT)
            .clamped_within(&layout.price_axis);
        surface.save();
        surface.clip_rect(layout.price_axis);
        surface.fill_rect(label_rect, color);
        surface.fill_text(
            &format!("{price:.decimals$}"),
            Point::new(label_rect.x + 4.0, label_rect.y + LINE_HEIGHT - 3.0),
            self.theme.background,
            TextAlign::Left,
        );
        surface.restore();
    }

    fn draw_panel_borders(&self, surface: &mut impl Surface, layout: &ChartLayout) {
        let right = layout.plot_width();
        surface.stroke_line(Point::new(right, 0.0), Point::new(right, layout.chart_height()), self.theme.panel_border, 1.0);
        let bottom = layout.chart_height();
        surface.stroke_line(Point::new(0.0, bottom), Point::new(layout.width, bottom), self.theme.panel_border, 1.0);
        if let Some(div) = layout.divider_y {
            surface.stroke_line(Point::new(0.0, div), Point::new(layout.width, div), self.theme.panel_border, 2.0);
        }
    }

    fn draw_crosshair(
        &self,
        surface: &mut impl Surface,
        frame: &ChartFrame<'_>,
        layout: &ChartLayout,
        x: &XScale,
    ) -> (Option<usize>, Option<Rect>) {
        let Some(pointer) = frame.pointer else {
            return (None, None);
        };
        if frame.dragging || !layout.in_plot(pointer) {
            return (None, None);
        }

        let index = x.x_to_index(pointer.x).floor();
        if index < 0.0 {
            return (None, None);
        }
        let index = index as usize;
        let Some(candle) = frame.candles.get(index) else {
            return (None, None);
        };

        let panel = match layout.oscillator {
            Some(osc) if pointer.y >= osc.y => osc,
            _ => layout.price,
        };

        let cx = x.center_x(index);
        surface.save();
        surface.clip_rect(Rect::new(0.0, 0.0, layout.plot_width(), layout.chart_height()));
        surface.stroke_line(Point::new(cx, 0.0), Point::new(cx, layout.chart_height()), self.theme.crosshair, 1.0);
        surface.stroke_line(
            Point::new(panel.x, pointer.y),
            Point::new(panel.right(), pointer.y),
            self.theme.crosshair,
            1.0,
        );
        surface.restore();

        let lines = tooltip_lines(candle);
        let text_width = lines.iter().map(|l| surface.text_width(l)).fold(0.0, f64::max);
        let tooltip = Rect::new(
            pointer.x + TOOLTIP_OFFSET,
            pointer.y + TOOLTIP_OFFSET,
            text_width + TOOLTIP_PADDING * 2.0,
            lines.len() as f64 * LINE_HEIGHT + TOOLTIP_PADDING * 2.0,
        )
        .clamped_within(&panel);

        surface.save();
        surface.clip_rect(panel);
        surface.fill_rect(tooltip, self.theme.tooltip_background);
        for (row, line) in lines.iter().enumerate() {
            let at = Point::new(
                tooltip.x + TOOLTIP_PADDING,
                tooltip.y + TOOLTIP_PADDING + (row as f64 + 1.0) * LINE_HEIGHT - 3.0,
            );
            surface.fill_text(line, at, self.theme.tooltip_text, TextAlign::Left);
        }
        surface.restore();

        (Some(index), Some(tooltip))
    }
}

fn tooltip_lines(candle: &Candle) -> Vec<String> {
    let time = format_timestamp(candle.timestamp, "%Y-%m-%d %H:%M").unwrap_or_default();
    vec![
        time,
        format!("O {:.2}", candle.open),
        format!("H {:.2}", candle.high),
        format!("L {:.2}", candle.low),
        format!("C {:.2}", candle.close),
    ]
}

/// Format a unix timestamp in seconds (UTC).
pub fn format_timestamp(timestamp: f64, pattern: &str) -> Option<String> {
    if !timestamp.is_finite() {
        return None;
    }
    DateTime::from_timestamp(timestamp.floor() as i64, 0).map(|dt| dt.format(pattern).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DisplayList, DrawCommand};
    use charter_core::TimeSeries;
    use charter_indicators::{IndicatorParams, TrendPoint};

    fn series(n: usize) -> CandleSeries {
        let candles = (0..n)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1;
                Candle::new(i as f64 * 3600.0, base, base + 1.5, base - 1.5, base + 0.5, 100.0 + i as f64)
            })
            .collect();
        CandleSeries::from_candles(candles)
    }

    fn frame<'a>(
        candles: &'a CandleSeries,
        bundle: &'a IndicatorBundle,
        viewport: &'a Viewport,
        pointer: Option<Point>,
    ) -> ChartFrame<'a> {
        ChartFrame {
            candles,
            indicators: bundle,
            viewport,
            divider_ratio: 0.7,
            toggles: OverlayToggles::default(),
            live_price: None,
            flash: None,
            pointer,
            dragging: false,
        }
    }

    #[test]
    fn test_draws_visible_candles_balanced() {
        let candles = series(200);
        let bundle = IndicatorBundle::compute(&candles, &IndicatorParams::default());
        let viewport = Viewport::new(150.0, 200.0, 10.0, 2.0, 40.0);
        let renderer = ChartRenderer::new(1064.0, 622.0, 2.0);
        let mut list = DisplayList::new();

        let report = renderer.draw_chart(&mut list, &frame(&candles, &bundle, &viewport, None));

        assert_eq!(report.candles_drawn, 50);
        assert!(list.is_balanced());
        assert!(matches!(
            list.commands().next(),
            Some(DrawCommand::BeginFrame { device_pixel_ratio, .. }) if *device_pixel_ratio == 2.0
        ));
        assert!(report.hovered_index.is_none());
    }

    #[test]
    fn test_draw_is_idempotent() {
        let candles = series(120);
        let bundle = IndicatorBundle::compute(&candles, &IndicatorParams::default());
        let viewport = Viewport::new(20.0, 120.0, 10.0, 2.0, 40.0);
        let renderer = ChartRenderer::new(1064.0, 622.0, 1.0);
        let f = frame(&candles, &bundle, &viewport, Some(Point::new(500.0, 100.0)));

        let mut a = DisplayList::new();
        let mut b = DisplayList::new();
        renderer.draw_chart(&mut a, &f);
        renderer.draw_chart(&mut b, &f);
        // Drawing twice into the same list also starts fresh
        renderer.draw_chart(&mut b, &f);
        assert_eq!(a.recorded(), b.recorded());
    }

    #[test]
    fn test_trend_cloud_covers_alternating_bars() {
        let candles = series(40);
        let points: Vec<TrendPoint> = candles
            .iter()
            .enumerate()
            .map(|(i, c)| TrendPoint {
                center: c.close,
                upper: c.close + 1.0,
                lower: c.close - 1.0,
                direction: if i % 2 == 0 { TrendDirection::Bullish } else { TrendDirection::Bearish },
            })
            .collect();
        let bundle = IndicatorBundle {
            trend: TimeSeries::from_values(&points, 0),
            candle_count: candles.len(),
            ..IndicatorBundle::default()
        };
        let viewport = Viewport::new(0.0, 40.0, 20.0, 2.0, 40.0);
        let renderer = ChartRenderer::new(1064.0, 622.0, 1.0);
        let toggles = OverlayToggles {
            ema: false,
            trend: true,
            fibonacci: false,
            levels: false,
            signals: false,
            volume: false,
            oscillator: false,
        };
        let mut list = DisplayList::new();
        renderer.draw_chart(
            &mut list,
            &ChartFrame {
                toggles,
                ..frame(&candles, &bundle, &viewport, None)
            },
        );

        let layout = renderer.layout(0.7, false);
        let x = XScale::new(&viewport, &layout.price);
        let clouds: Vec<(f64, f64, Color)> = list
            .commands()
            .filter_map(|cmd| match cmd {
                DrawCommand::FillPath { path, color } => {
                    let xs: Vec<f64> = path.points().map(|p| p.x).collect();
                    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
                    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    Some((lo, hi, *color))
                }
                _ => None,
            })
            .collect();
        assert_eq!(clouds.len(), 40);

        for (i, point) in points.iter().enumerate() {
            let cx = x.center_x(i);
            let expected = match point.direction {
                TrendDirection::Bullish => renderer.theme.trend_bullish,
                TrendDirection::Bearish => renderer.theme.trend_bearish,
            }
            .with_alpha(0.12);
            assert!(
                clouds.iter().any(|&(lo, hi, color)| lo <= cx && cx <= hi && color == expected),
                "bar {i} has no cloud in its own color"
            );
        }
        // Adjacent segments meet without a gap
        for pair in clouds.windows(2) {
            assert!((pair[0].1 - pair[1].0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_window_is_safe() {
        let candles = CandleSeries::new();
        let bundle = IndicatorBundle::default();
        let viewport = Viewport::empty(8.0, 2.0, 40.0);
        let renderer = ChartRenderer::new(800.0, 600.0, 1.0);
        let mut list = DisplayList::new();

        let report = renderer.draw_chart(&mut list, &frame(&candles, &bundle, &viewport, Some(Point::new(10.0, 10.0))));
        assert_eq!(report.candles_drawn, 0);
        assert_eq!(report.hovered_index, None);
        assert!(list.is_balanced());
    }

    #[test]
    fn test_hover_index_and_tooltip_clamped() {
        let candles = series(200);
        let bundle = IndicatorBundle::compute(&candles, &IndicatorParams::default());
        let viewport = Viewport::new(100.0, 200.0, 10.0, 2.0, 40.0);
        let renderer = ChartRenderer::new(1064.0, 622.0, 1.0);
        let mut list = DisplayList::new();

        // Pointer near the bottom-right corner of the price panel
        let layout = renderer.layout(0.7, true);
        let pointer = Point::new(995.0, layout.price.bottom() - 2.0);
        let report = renderer.draw_chart(&mut list, &frame(&candles, &bundle, &viewport, Some(pointer)));

        assert_eq!(report.hovered_index, Some(199));
        let tooltip = report.tooltip.expect("tooltip drawn");
        assert!(layout.price.contains_rect(&tooltip));
        assert!(list.texts().iter().any(|t| t.starts_with("C ")));
    }

    #[test]
    fn test_no_hover_while_dragging() {
        let candles = series(200);
        let bundle = IndicatorBundle::compute(&candles, &IndicatorParams::default());
        let viewport = Viewport::new(100.0, 200.0, 10.0, 2.0, 40.0);
        let renderer = ChartRenderer::new(1064.0, 622.0, 1.0);
        let mut list = DisplayList::new();
        let mut f = frame(&candles, &bundle, &viewport, Some(Point::new(400.0, 100.0)));
        f.dragging = true;

        let report = renderer.draw_chart(&mut list, &f);
        assert_eq!(report.hovered_index, None);
        assert_eq!(report.tooltip, None);
    }

    #[test]
    fn test_current_price_falls_back_to_last_close() {
        let candles = series(60);
        let last_close = candles.tail().map(|c| c.close).unwrap_or_default();
        let bundle = IndicatorBundle::default();
        let viewport = Viewport::new(0.0, 60.0, 10.0, 2.0, 40.0);
        let renderer = ChartRenderer::new(1064.0, 622.0, 1.0);
        let mut list = DisplayList::new();

        let mut f = frame(&candles, &bundle, &viewport, None);
        f.toggles.oscillator = false;
        renderer.draw_chart(&mut list, &f);

        let y = YScale::fit(
            candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min),
            candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max),
            &renderer.layout(0.7, false).price,
            PRICE_PADDING,
        );
        let decimals = decimals_for_step(nice_step(y.max - y.min, PRICE_GRID_TARGET));
        let expected = format!("{last_close:.decimals$}");
        assert!(list.texts().contains(&expected.as_str()));
    }

    #[test]
    fn test_overlays_clipped_to_panels() {
        let candles = series(200);
        let bundle = IndicatorBundle::compute(&candles, &IndicatorParams::default());
        let viewport = Viewport::new(100.0, 200.0, 10.0, 2.0, 40.0);
        let renderer = ChartRenderer::new(1064.0, 622.0, 1.0);
        let mut list = DisplayList::new();
        renderer.draw_chart(&mut list, &frame(&candles, &bundle, &viewport, None));

        let layout = renderer.layout(0.7, true);
        let paths: Vec<_> = list
            .recorded()
            .iter()
            .filter(|r| matches!(r.command, DrawCommand::StrokePath { .. }))
            .collect();
        assert!(!paths.is_empty());
        for r in paths {
            let clip = r.clip.expect("paths are always clipped");
            assert!(clip == layout.price || Some(clip) == layout.oscillator);
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0, "%Y-%m-%d %H:%M").as_deref(), Some("1970-01-01 00:00"));
        assert_eq!(format_timestamp(f64::NAN, "%H:%M"), None);
    }
}
