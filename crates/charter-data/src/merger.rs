//! Merges periodic snapshots with the push-price stream.
//!
//! The merger owns the live price. Ticks patch the tail candle immediately,
//! while the displayed price only catches up on a fixed cadence so the label
//! does not thrash.

use std::time::{Duration, Instant};

use charter_core::{Candle, CandleSeries, Timeframe};

use crate::snapshot::Tick;
use crate::validation;

/// Direction of the last displayed price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    Up,
    Down,
}

/// Current live price state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LivePrice {
    /// Last price received from the stream.
    pub raw: Option<f64>,
    /// Price shown in the UI, updated on the display cadence.
    pub display: Option<f64>,
    /// Set when the display price changes, cleared after the flash duration.
    pub direction: Option<PriceDirection>,
    /// Timestamp of the last tick, if it carried one.
    pub last_tick_at: Option<f64>,
}

/// Timing for the displayed price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergerConfig {
    pub display_interval: Duration,
    pub flash_duration: Duration,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            display_interval: Duration::from_millis(500),
            flash_duration: Duration::from_millis(800),
        }
    }
}

/// What happened to a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick was malformed and ignored.
    Malformed,
    /// The tick belongs to a period before the tail candle.
    Stale,
    /// No candles yet; only the live price was stored.
    Stored,
    /// The tail candle was extended.
    Patched,
    /// The tick opened a new tail candle.
    Opened,
}

impl TickOutcome {
    /// Whether the candle series changed.
    pub fn changed_series(&self) -> bool {
        matches!(self, TickOutcome::Patched | TickOutcome::Opened)
    }
}

pub struct LiveFeedMerger {
    config: MergerConfig,
    timeframe: Timeframe,
    live: LivePrice,
    connected: bool,
    last_display_update: Option<Instant>,
    flash_until: Option<Instant>,
}

impl LiveFeedMerger {
    pub fn new(timeframe: Timeframe, config: MergerConfig) -> Self {
        Self {
            config,
            timeframe,
            live: LivePrice::default(),
            connected: false,
            last_display_update: None,
            flash_until: None,
        }
    }

    /// Forget all live state, e.g. after a symbol or timeframe switch.
    pub fn reset(&mut self, timeframe: Timeframe) {
        *self = Self::new(timeframe, self.config);
    }

    pub fn live(&self) -> &LivePrice {
        &self.live
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The displayed price, or `fallback` (usually the last close) when no
    /// price is known.
    pub fn display_price_or(&self, fallback: f64) -> f64 {
        self.live.display.unwrap_or(fallback)
    }

    /// Apply a push tick.
    ///
    /// Only the tail candle is ever modified. A tick in a later period than
    /// the tail opens a new candle at that period's bucket start.
    pub fn on_tick(&mut self, series: &mut CandleSeries, tick: Tick) -> TickOutcome {
        if !validation::validate_tick(&tick) {
            log::debug!("dropping malformed tick {:?}", tick);
            return TickOutcome::Malformed;
        }

        let Some(tail) = series.tail().copied() else {
            self.store(tick);
            return TickOutcome::Stored;
        };

        let period = self.timeframe.seconds();
        match tick.timestamp {
            Some(ts) if ts < tail.timestamp => {
                log::debug!("dropping stale tick at {} (tail {})", ts, tail.timestamp);
                TickOutcome::Stale
            }
            Some(ts) if ts >= tail.timestamp + period => {
                let bucket = self.timeframe.bucket_start(ts).max(tail.timestamp + period);
                self.store(tick);
                if series.push_tail(Candle::from_price(bucket, tick.price)) {
                    TickOutcome::Opened
                } else {
                    TickOutcome::Stale
                }
            }
            _ => {
                self.store(tick);
                series.patch_tail(|c| c.absorb_price(tick.price));
                TickOutcome::Patched
            }
        }
    }

    fn store(&mut self, tick: Tick) {
        self.live.raw = Some(tick.price);
        if tick.timestamp.is_some() {
            self.live.last_tick_at = tick.timestamp;
        }
    }

    /// Advance the display cadence. Returns true when anything visible changed.
    pub fn tick_display(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let Some(until) = self.flash_until {
            if now >= until {
                self.flash_until = None;
                self.live.direction = None;
                changed = true;
            }
        }

        let due = self
            .last_display_update
            .map_or(true, |last| now.duration_since(last) >= self.config.display_interval);
        if !due {
            return changed;
        }
        self.last_display_update = Some(now);

        let Some(raw) = self.live.raw else {
            return changed;
        };
        if self.live.display == Some(raw) {
            return changed;
        }

        if let Some(prev) = self.live.display {
            self.live.direction = Some(if raw > prev {
                PriceDirection::Up
            } else {
                PriceDirection::Down
            });
            self.flash_until = Some(now + self.config.flash_duration);
        }
        self.live.display = Some(raw);
        true
    }

    /// Take over a freshly fetched series.
    ///
    /// A known live price stays authoritative: it keeps being displayed and
    /// is re-applied to the new tail when it belongs to the tail period.
    /// Without one, the display seeds from `current_price` or the last close.
    pub fn on_snapshot(&mut self, series: &mut CandleSeries, current_price: Option<f64>) {
        match self.live.raw {
            Some(price) => {
                let period = self.timeframe.seconds();
                let last_tick_at = self.live.last_tick_at;
                if let Some(tail) = series.tail().copied() {
                    let in_tail = last_tick_at
                        .map_or(true, |ts| ts >= tail.timestamp && ts < tail.timestamp + period);
                    if in_tail {
                        series.patch_tail(|c| c.absorb_price(price));
                    }
                }
            }
            None => {
                let seed = current_price
                    .filter(|p| validation::validate_price(*p))
                    .or_else(|| series.tail().map(|c| c.close));
                if seed.is_some() {
                    self.live.display = seed;
                }
            }
        }
    }

    pub fn on_connected(&mut self) {
        self.connected = true;
    }

    /// The last price stays displayed while disconnected.
    pub fn on_disconnected(&mut self) {
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> CandleSeries {
        CandleSeries::from_candles(vec![
            Candle::new(0.0, 100.0, 105.0, 95.0, 102.0, 10.0),
            Candle::new(60.0, 102.0, 106.0, 101.0, 104.0, 12.0),
            Candle::new(120.0, 104.0, 108.0, 103.0, 107.0, 8.0),
        ])
    }

    fn merger() -> LiveFeedMerger {
        LiveFeedMerger::new(Timeframe::Min1, MergerConfig::default())
    }

    #[test]
    fn test_tick_patches_only_tail() {
        let mut s = series();
        let before = s.clone();
        let mut m = merger();

        let outcome = m.on_tick(&mut s, Tick::new(110.0, Some(150.0)));
        assert_eq!(outcome, TickOutcome::Patched);

        assert_eq!(s.get(0), before.get(0));
        assert_eq!(s.get(1), before.get(1));
        let tail = s.tail().unwrap();
        assert_eq!(tail.close, 110.0);
        assert_eq!(tail.high, 110.0);
        assert_eq!(tail.low, 103.0);
        assert_eq!(tail.open, 104.0);
        assert_eq!(m.live().raw, Some(110.0));
    }

    #[test]
    fn test_tick_extends_low() {
        let mut s = series();
        let mut m = merger();
        m.on_tick(&mut s, Tick::new(101.0, None));
        let tail = s.tail().unwrap();
        assert_eq!(tail.low, 101.0);
        assert_eq!(tail.high, 108.0);
    }

    #[test]
    fn test_malformed_and_stale_ticks_dropped() {
        let mut s = series();
        let before = s.clone();
        let mut m = merger();

        assert_eq!(m.on_tick(&mut s, Tick::new(f64::NAN, None)), TickOutcome::Malformed);
        assert_eq!(m.on_tick(&mut s, Tick::new(-1.0, None)), TickOutcome::Malformed);
        assert_eq!(m.on_tick(&mut s, Tick::new(99.0, Some(30.0))), TickOutcome::Stale);
        assert_eq!(s, before);
        assert_eq!(m.live().raw, None);
    }

    #[test]
    fn test_tick_in_next_period_opens_candle() {
        let mut s = series();
        let mut m = merger();
        let outcome = m.on_tick(&mut s, Tick::new(111.0, Some(200.0)));

        assert_eq!(outcome, TickOutcome::Opened);
        assert_eq!(s.len(), 4);
        let tail = s.tail().unwrap();
        assert_eq!(tail.timestamp, 180.0);
        assert_eq!((tail.open, tail.high, tail.low, tail.close), (111.0, 111.0, 111.0, 111.0));
        assert_eq!(s.get(2).unwrap().close, 107.0);
    }

    #[test]
    fn test_display_cadence_and_flash() {
        let mut s = series();
        let mut m = merger();
        let t0 = Instant::now();

        m.on_snapshot(&mut s, Some(107.0));
        assert_eq!(m.live().display, Some(107.0));

        m.on_tick(&mut s, Tick::new(108.0, None));
        assert!(m.tick_display(t0));
        assert_eq!(m.live().display, Some(108.0));
        assert_eq!(m.live().direction, Some(PriceDirection::Up));

        // Not due yet: raw moves, display holds
        m.on_tick(&mut s, Tick::new(106.0, None));
        m.tick_display(t0 + Duration::from_millis(100));
        assert_eq!(m.live().display, Some(108.0));

        m.tick_display(t0 + Duration::from_millis(500));
        assert_eq!(m.live().display, Some(106.0));
        assert_eq!(m.live().direction, Some(PriceDirection::Down));

        // Flash clears after its duration
        m.tick_display(t0 + Duration::from_millis(1400));
        assert_eq!(m.live().direction, None);
    }

    #[test]
    fn test_snapshot_keeps_live_price_authoritative() {
        let mut s = series();
        let mut m = merger();
        let now = Instant::now();
        m.on_tick(&mut s, Tick::new(109.0, Some(170.0)));
        m.tick_display(now);

        // The refreshed snapshot still has the stale close
        let mut fresh = series();
        m.on_snapshot(&mut fresh, Some(107.0));

        assert_eq!(m.live().display, Some(109.0));
        assert_eq!(fresh.tail().unwrap().close, 109.0);
        assert_eq!(fresh.tail().unwrap().high, 109.0);
    }

    #[test]
    fn test_snapshot_without_price_uses_last_close() {
        let mut s = series();
        let mut m = merger();
        m.on_snapshot(&mut s, None);
        assert_eq!(m.display_price_or(0.0), 107.0);
    }

    #[test]
    fn test_disconnect_keeps_price() {
        let mut s = series();
        let mut m = merger();
        let now = Instant::now();
        m.on_connected();
        m.on_tick(&mut s, Tick::new(108.5, None));
        m.tick_display(now);
        m.on_disconnected();

        assert!(!m.is_connected());
        assert_eq!(m.display_price_or(0.0), 108.5);
    }

    #[test]
    fn test_tick_before_any_candles() {
        let mut s = CandleSeries::new();
        let mut m = merger();
        assert_eq!(m.on_tick(&mut s, Tick::new(5.0, None)), TickOutcome::Stored);
        assert!(s.is_empty());
        assert_eq!(m.live().raw, Some(5.0));
    }
}
