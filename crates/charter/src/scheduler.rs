//! Redraw coalescing.

use std::time::{Duration, Instant};

/// Collapses any number of redraw requests and resizes between frames into
/// a single draw, paced to the frame interval.
#[derive(Debug, Clone)]
pub struct RedrawScheduler {
    frame_interval: Duration,
    pending: bool,
    pending_resize: Option<(f64, f64)>,
    last_frame: Option<Instant>,
}

impl RedrawScheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            pending: true,
            pending_resize: None,
            last_frame: None,
        }
    }

    pub fn request(&mut self) {
        self.pending = true;
    }

    /// Record a resize; only the latest size is applied.
    pub fn request_resize(&mut self, width: f64, height: f64) {
        self.pending_resize = Some((width, height));
        self.pending = true;
    }

    pub fn take_resize(&mut self) -> Option<(f64, f64)> {
        self.pending_resize.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether a frame should be drawn at `now`.
    pub fn should_draw(&self, now: Instant) -> bool {
        self.pending
            && self
                .last_frame
                .map_or(true, |last| now.saturating_duration_since(last) >= self.frame_interval)
    }

    pub fn mark_drawn(&mut self, now: Instant) {
        self.pending = false;
        self.last_frame = Some(now);
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_draws() {
        let s = RedrawScheduler::new(Duration::from_millis(16));
        assert!(s.should_draw(Instant::now()));
    }

    #[test]
    fn test_bursts_coalesce() {
        let start = Instant::now();
        let mut s = RedrawScheduler::new(Duration::from_millis(16));
        s.mark_drawn(start);
        assert!(!s.should_draw(start));

        s.request_resize(800.0, 600.0);
        s.request_resize(900.0, 600.0);
        s.request();
        // Too soon after the last frame
        assert!(!s.should_draw(start + Duration::from_millis(5)));
        assert!(s.should_draw(start + Duration::from_millis(16)));
        assert_eq!(s.take_resize(), Some((900.0, 600.0)));
        assert_eq!(s.take_resize(), None);

        s.mark_drawn(start + Duration::from_millis(16));
        assert!(!s.is_pending());
    }
}
