//! Chart state and the per-frame update loop.
//!
//! [`ChartState`] owns the candle series, derived indicators, live price
//! merger, viewport and input router. Everything runs on the frame thread;
//! feed tasks only talk to it through [`FeedMessage`]s.

use std::time::{Duration, Instant};

use charter_config::{Config, IndicatorSettings};
use charter_core::{CandleSeries, Timeframe};
use charter_data::{FeedMessage, FeedRequest, Generation, LiveFeedMerger, MergerConfig, PriceDirection, TickOutcome};
use charter_indicators::{
    IndicatorBundle, IndicatorParams, MomentumConfig, PivotConfig, Signal, TrendConfig,
};
use charter_render::{
    ChartFrame, ChartLayout, ChartRenderer, FrameReport, OverlayToggles, Point, PriceFlash, Surface,
};

use crate::events::{Command, EventBus, Overlay};
use crate::input::{InputAction, InputEvent, InputRouter};
use crate::scheduler::RedrawScheduler;
use crate::viewport::{ViewportController, ViewportSettings};

/// Snapshot feed state shown by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    Ready,
    Retrying { error: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Connected,
    Disconnected,
}

/// Summary for the surrounding UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStatus {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub signal: Option<Signal>,
    pub strength: Option<u8>,
    pub feed: FeedStatus,
    pub stream: StreamStatus,
    pub market_open: Option<bool>,
    pub fullscreen: bool,
}

/// Indicator parameters for one timeframe's settings.
pub fn indicator_params(settings: &IndicatorSettings) -> IndicatorParams {
    IndicatorParams {
        ema_fast: settings.ema_fast,
        ema_slow: settings.ema_slow,
        rsi_period: settings.rsi_period,
        momentum: MomentumConfig {
            rsi_period: settings.rsi_period,
            stoch_period: settings.stoch_period,
            smooth_k: settings.smooth_k,
            smooth_d: settings.smooth_d,
            ..MomentumConfig::default()
        },
        pivots: PivotConfig {
            left_bars: settings.pivot_left_bars,
            right_bars: settings.pivot_right_bars,
            cluster_tolerance_pct: settings.cluster_tolerance_pct,
            max_levels: settings.max_levels,
        },
        trend: TrendConfig {
            ema_period: settings.trend_ema_period,
            atr_period: settings.trend_atr_period,
            multiplier: settings.trend_multiplier,
        },
        fib_lookback: settings.fib_lookback,
    }
}

fn toggles_from(config: &Config) -> OverlayToggles {
    let d = &config.display;
    OverlayToggles {
        ema: d.show_ema,
        trend: d.show_trend,
        fibonacci: d.show_fibonacci,
        levels: d.show_levels,
        signals: d.show_signals,
        volume: d.show_volume,
        oscillator: d.show_oscillator,
    }
}

pub struct ChartState {
    config: Config,
    symbol: String,
    timeframe: Timeframe,
    generation: Generation,
    candles: CandleSeries,
    indicators: IndicatorBundle,
    /// Tail patched since the bundle was last computed.
    indicators_stale: bool,
    params: IndicatorParams,
    merger: LiveFeedMerger,
    viewport: ViewportController,
    router: InputRouter,
    bus: EventBus,
    scheduler: RedrawScheduler,
    renderer: ChartRenderer,
    toggles: OverlayToggles,
    pointer: Option<Point>,
    fullscreen: bool,
    feed: FeedStatus,
    stream: StreamStatus,
    market_open: Option<bool>,
    pending_request: Option<FeedRequest>,
}

impl ChartState {
    pub fn new(config: Config, width: f64, height: f64) -> Self {
        let timeframe = Timeframe::from_label(&config.general.default_timeframe).unwrap_or_default();
        let symbol = config.general.default_symbol.clone();
        let renderer = ChartRenderer::new(width, height, config.display.device_pixel_ratio);
        let toggles = toggles_from(&config);
        let divider_ratio = config.viewport.divider_ratio;
        let plot_width = renderer.layout(divider_ratio, toggles.oscillator).plot_width();
        let merger_config = MergerConfig {
            display_interval: Duration::from_millis(config.display.price_update_ms),
            flash_duration: Duration::from_millis(config.display.price_flash_ms),
        };

        Self {
            params: indicator_params(&config.indicators_for_timeframe(timeframe.label())),
            merger: LiveFeedMerger::new(timeframe, merger_config),
            viewport: ViewportController::new(ViewportSettings::from(&config.viewport), plot_width, divider_ratio),
            router: InputRouter::new(),
            bus: EventBus::with_capacity(32, 8),
            scheduler: RedrawScheduler::new(Duration::from_millis(config.general.frame_interval_ms)),
            renderer,
            toggles,
            symbol,
            timeframe,
            generation: Generation::default(),
            candles: CandleSeries::new(),
            indicators: IndicatorBundle::default(),
            indicators_stale: false,
            pointer: None,
            fullscreen: false,
            feed: FeedStatus::Loading,
            stream: StreamStatus::Disconnected,
            market_open: None,
            pending_request: None,
            config,
        }
    }

    pub fn candles(&self) -> &CandleSeries {
        &self.candles
    }

    pub fn indicators(&self) -> &IndicatorBundle {
        &self.indicators
    }

    /// Whether ticks changed the series since the last indicator pass.
    pub fn indicators_stale(&self) -> bool {
        self.indicators_stale
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn merger(&self) -> &LiveFeedMerger {
        &self.merger
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn toggles(&self) -> OverlayToggles {
        self.toggles
    }

    pub fn layout(&self) -> ChartLayout {
        self.renderer.layout(self.viewport.divider().ratio(), self.toggles.oscillator)
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.bus.push_input(event);
    }

    pub fn dispatch(&mut self, command: Command) {
        self.bus.dispatch(command);
    }

    /// Feed request produced by the last switch, for the session to start.
    pub fn take_feed_request(&mut self) -> Option<FeedRequest> {
        self.pending_request.take()
    }

    /// Move to another symbol or timeframe. All data from the previous
    /// generation is dropped and the viewport starts over.
    pub fn begin_switch(&mut self, symbol: &str, timeframe: Timeframe) -> FeedRequest {
        self.generation = self.generation.next();
        self.symbol = symbol.to_uppercase();
        self.timeframe = timeframe;
        self.params = indicator_params(&self.config.indicators_for_timeframe(timeframe.label()));
        self.candles = CandleSeries::new();
        self.indicators = IndicatorBundle::default();
        self.indicators_stale = false;
        self.merger.reset(timeframe);
        self.viewport.reset(0);
        self.pointer = None;
        self.feed = FeedStatus::Loading;
        self.stream = StreamStatus::Disconnected;
        self.market_open = None;
        self.scheduler.request();

        log::info!(
            "switching to {} {} (generation {})",
            self.symbol,
            timeframe.label(),
            self.generation.0
        );

        let request = FeedRequest {
            symbol: self.symbol.clone(),
            timeframe,
            generation: self.generation,
        };
        self.pending_request = Some(request.clone());
        request
    }

    /// Apply one message from the feed tasks. Returns `false` when the
    /// message belongs to a superseded generation.
    pub fn apply_feed_message(&mut self, message: FeedMessage) -> bool {
        if message.generation() != self.generation {
            log::debug!(
                "dropping message from generation {} (current {})",
                message.generation().0,
                self.generation.0
            );
            return false;
        }

        match message {
            FeedMessage::Snapshot { snapshot, .. } => {
                let first = self.viewport.candle_count() == 0;
                self.candles = snapshot.series;
                self.merger.on_snapshot(&mut self.candles, snapshot.current_price);
                self.market_open = Some(snapshot.is_market_open);
                self.refresh_indicators();
                let len = self.candles.len();
                if first {
                    self.viewport.reset(len);
                } else {
                    self.viewport.set_candle_count(len);
                }
                self.feed = FeedStatus::Ready;
                log::info!("loaded {} candles for {} {}", len, self.symbol, self.timeframe.label());
            }
            FeedMessage::SnapshotFailed { error, retryable, .. } => {
                log::warn!("snapshot for {} failed: {}", self.symbol, error);
                self.feed = if retryable {
                    FeedStatus::Retrying { error }
                } else {
                    FeedStatus::Failed { error }
                };
            }
            FeedMessage::StreamConnected { .. } => {
                self.merger.on_connected();
                self.stream = StreamStatus::Connected;
            }
            FeedMessage::StreamDisconnected { .. } => {
                self.merger.on_disconnected();
                self.stream = StreamStatus::Disconnected;
            }
            FeedMessage::Tick { tick, .. } => match self.merger.on_tick(&mut self.candles, tick) {
                TickOutcome::Opened => {
                    self.indicators_stale = true;
                    self.viewport.set_candle_count(self.candles.len());
                }
                TickOutcome::Patched => self.indicators_stale = true,
                TickOutcome::Stored => {}
                outcome @ (TickOutcome::Malformed | TickOutcome::Stale) => {
                    log::debug!("ignored tick {:?}: {:?}", tick, outcome);
                    return true;
                }
            },
        }

        self.scheduler.request();
        true
    }

    /// Run one frame: input, commands, animation, price cadence, then draw
    /// if anything changed.
    pub fn frame(&mut self, now: Instant, surface: &mut impl Surface) -> Option<FrameReport> {
        for event in self.bus.take_inputs() {
            let layout = self.layout();
            for action in self.router.route(&event, &layout) {
                self.apply_action(action, &layout);
            }
        }
        self.router.sample_velocity();
        if let Some((width, height)) = self.scheduler.take_resize() {
            self.renderer.resize(width, height);
            self.viewport.resize(self.layout().plot_width());
        }
        for command in self.bus.take_commands() {
            self.execute(command);
        }

        if self.viewport.tick() {
            self.scheduler.request();
        }
        if self.merger.tick_display(now) {
            self.scheduler.request();
        }

        if !self.scheduler.should_draw(now) {
            return None;
        }
        if self.indicators_stale {
            self.refresh_indicators();
        }
        let report = self.renderer.draw_chart(surface, &self.chart_frame());
        self.scheduler.mark_drawn(now);
        Some(report)
    }

    pub fn status(&self) -> ChartStatus {
        let signal = self.indicators.latest_signal().map(|(_, s)| s);
        ChartStatus {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            signal,
            strength: signal.map(|s| s.strength()),
            feed: self.feed.clone(),
            stream: self.stream,
            market_open: self.market_open,
            fullscreen: self.fullscreen,
        }
    }

    fn chart_frame(&self) -> ChartFrame<'_> {
        let live = self.merger.live();
        ChartFrame {
            candles: &self.candles,
            indicators: &self.indicators,
            viewport: self.viewport.viewport(),
            divider_ratio: self.viewport.divider().ratio(),
            toggles: self.toggles,
            live_price: live.display,
            flash: live.direction.map(|d| match d {
                PriceDirection::Up => PriceFlash::Up,
                PriceDirection::Down => PriceFlash::Down,
            }),
            pointer: self.pointer,
            dragging: self.router.is_dragging(),
        }
    }

    fn refresh_indicators(&mut self) {
        self.indicators = IndicatorBundle::compute(&self.candles, &self.params);
        self.indicators_stale = false;
    }

    fn apply_action(&mut self, action: InputAction, layout: &ChartLayout) {
        match action {
            InputAction::GestureStart => self.viewport.begin_gesture(),
            InputAction::Hover { pos, .. } | InputAction::Tap { pos, .. } => self.pointer = Some(pos),
            InputAction::HoverEnd => self.pointer = None,
            InputAction::Pan { dx, .. } => self.viewport.apply_pan(dx),
            InputAction::EndDrag { velocity } => self.viewport.release(velocity),
            InputAction::Zoom { delta_y, .. } => self.viewport.apply_zoom(delta_y),
            InputAction::Pinch { scale } => self.viewport.apply_pinch(scale),
            InputAction::DividerDrag { dy } => self.viewport.divider_mut().drag(dy, layout.chart_height()),
            InputAction::Resize { width, height } => self.scheduler.request_resize(width, height),
        }
        self.scheduler.request();
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::ToggleOverlay(overlay) => {
                let t = &mut self.toggles;
                let flag = match overlay {
                    Overlay::Ema => &mut t.ema,
                    Overlay::Trend => &mut t.trend,
                    Overlay::Fibonacci => &mut t.fibonacci,
                    Overlay::Levels => &mut t.levels,
                    Overlay::Signals => &mut t.signals,
                    Overlay::Volume => &mut t.volume,
                    Overlay::Oscillator => &mut t.oscillator,
                };
                *flag = !*flag;
            }
            Command::ToggleFullscreen => self.fullscreen = !self.fullscreen,
            Command::SwitchFeed { symbol, timeframe } => {
                self.begin_switch(&symbol, timeframe);
            }
            Command::ResetViewport => self.viewport.reset(self.candles.len()),
            Command::RequestRedraw => {}
        }
        self.scheduler.request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_core::Candle;
    use charter_data::{Snapshot, Tick};
    use charter_render::DisplayList;

    fn snapshot(n: usize) -> Snapshot {
        let candles = (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.2).sin() * 3.0;
                Candle::new(i as f64 * 3600.0, c, c + 1.0, c - 1.0, c + 0.2, 10.0)
            })
            .collect();
        Snapshot {
            series: CandleSeries::from_candles(candles),
            current_price: None,
            previous_close: None,
            is_market_open: true,
        }
    }

    fn state_with_data(n: usize) -> ChartState {
        let mut state = ChartState::new(Config::default(), 1064.0, 622.0);
        let request = state.begin_switch("btcusdt", Timeframe::Hour1);
        state.apply_feed_message(FeedMessage::Snapshot {
            generation: request.generation,
            snapshot: snapshot(n),
        });
        state
    }

    #[test]
    fn test_switch_bumps_generation() {
        let mut state = ChartState::new(Config::default(), 800.0, 600.0);
        let first = state.begin_switch("BTCUSDT", Timeframe::Hour1);
        let second = state.begin_switch("ETHUSDT", Timeframe::Min5);
        assert!(second.generation > first.generation);
        assert_eq!(state.take_feed_request(), Some(second));
        assert_eq!(state.take_feed_request(), None);
    }

    #[test]
    fn test_stale_generation_dropped() {
        let mut state = ChartState::new(Config::default(), 800.0, 600.0);
        let old = state.begin_switch("BTCUSDT", Timeframe::Hour1);
        state.begin_switch("ETHUSDT", Timeframe::Hour1);

        let accepted = state.apply_feed_message(FeedMessage::Snapshot {
            generation: old.generation,
            snapshot: snapshot(50),
        });
        assert!(!accepted);
        assert!(state.candles().is_empty());
    }

    #[test]
    fn test_snapshot_resets_viewport_and_computes_indicators() {
        let state = state_with_data(300);
        assert_eq!(state.candles().len(), 300);
        assert!(state.indicators().is_current_for(300));
        assert_eq!(state.viewport().viewport().end, 300.0);
        assert_eq!(state.viewport().viewport().span(), 100.0);
        assert_eq!(state.status().feed, FeedStatus::Ready);
    }

    #[test]
    fn test_tick_opening_candle_follows_right_edge() {
        let mut state = state_with_data(300);
        let generation = state.generation();
        let next = 300.0 * 3600.0 + 10.0;
        state.apply_feed_message(FeedMessage::Tick {
            generation,
            tick: Tick::new(101.0, Some(next)),
        });
        assert_eq!(state.candles().len(), 301);
        assert_eq!(state.viewport().viewport().end, 301.0);

        // Indicators catch up on the next drawn frame
        assert!(state.indicators_stale());
        assert!(state.indicators().is_current_for(300));
        let mut list = DisplayList::new();
        assert!(state.frame(Instant::now(), &mut list).is_some());
        assert!(!state.indicators_stale());
        assert!(state.indicators().is_current_for(301));
    }

    #[test]
    fn test_tick_burst_recomputes_once_per_frame() {
        let mut state = state_with_data(300);
        let generation = state.generation();
        let tail = *state.candles().tail().expect("tail");
        let before = state.indicators().ema_fast.last().copied();

        for i in 0..50 {
            state.apply_feed_message(FeedMessage::Tick {
                generation,
                tick: Tick::new(tail.close + 10.0 + i as f64 * 0.1, Some(tail.timestamp + 1.0 + i as f64)),
            });
        }
        // Bundle untouched until a frame draws
        assert!(state.indicators_stale());
        assert_eq!(state.indicators().ema_fast.last().copied(), before);

        let mut list = DisplayList::new();
        state.frame(Instant::now(), &mut list);
        assert!(!state.indicators_stale());
        assert_ne!(state.indicators().ema_fast.last().copied(), before);
    }

    #[test]
    fn test_failed_snapshot_status() {
        let mut state = ChartState::new(Config::default(), 800.0, 600.0);
        let req = state.begin_switch("BTCUSDT", Timeframe::Hour1);
        state.apply_feed_message(FeedMessage::SnapshotFailed {
            generation: req.generation,
            error: "boom".into(),
            retryable: true,
        });
        assert_eq!(
            state.status().feed,
            FeedStatus::Retrying {
                error: "boom".into()
            }
        );
    }

    #[test]
    fn test_frame_routes_input_and_draws() {
        let mut state = state_with_data(300);
        let mut list = DisplayList::new();
        let start = Instant::now();

        assert!(state.frame(start, &mut list).is_some());
        // Nothing changed and too soon: no redraw
        assert!(state.frame(start, &mut list).is_none());

        state.push_input(InputEvent::PointerMove {
            id: 1,
            kind: crate::input::PointerKind::Mouse,
            pos: Point::new(500.0, 100.0),
        });
        let report = state
            .frame(start + Duration::from_millis(20), &mut list)
            .expect("hover redraws");
        assert!(report.hovered_index.is_some());
    }

    #[test]
    fn test_commands_toggle_state() {
        let mut state = state_with_data(50);
        let mut list = DisplayList::new();
        state.dispatch(Command::ToggleOverlay(Overlay::Oscillator));
        state.dispatch(Command::ToggleFullscreen);
        let report = state.frame(Instant::now(), &mut list).expect("drawn");
        assert!(report.layout.oscillator.is_none());
        assert!(state.status().fullscreen);
    }

    #[test]
    fn test_resize_bursts_coalesce() {
        let mut state = state_with_data(300);
        let mut list = DisplayList::new();
        for w in [700.0, 800.0, 900.0] {
            state.push_input(InputEvent::Resize { width: w, height: 500.0 });
        }
        let report = state.frame(Instant::now(), &mut list).expect("drawn");
        assert_eq!(report.layout.width, 900.0);
        assert_eq!(state.viewport().plot_width(), 900.0 - charter_render::PRICE_AXIS_WIDTH);
    }

    #[test]
    fn test_indicator_params_from_settings() {
        let config = Config::default();
        let params = indicator_params(&config.indicators_for_timeframe("1m"));
        assert_eq!(params.pivots.left_bars, 8);
        assert_eq!(params.momentum.rsi_period, params.rsi_period);
    }
}
