//! Pointer and wheel routing for the chart surface.
//!
//! The [`InputRouter`] turns raw [`InputEvent`]s into semantic
//! [`InputAction`]s. Every action is attributed to the panel under the
//! pointer so price and oscillator gestures stay distinct even though both
//! panels share one viewport.

use charter_render::{ChartLayout, Point, Region};

/// Source of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

impl PointerKind {
    /// Movement required before a press becomes a drag.
    pub fn drag_threshold(&self) -> f64 {
        match self {
            PointerKind::Mouse => 3.0,
            PointerKind::Touch => 8.0,
        }
    }
}

/// Panel a gesture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Price,
    Oscillator,
}

impl Section {
    fn from_region(region: Region) -> Option<Self> {
        match region {
            Region::Price => Some(Section::Price),
            Region::Oscillator => Some(Section::Oscillator),
            _ => None,
        }
    }
}

/// Raw input from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { id: u64, kind: PointerKind, pos: Point },
    PointerMove { id: u64, kind: PointerKind, pos: Point },
    PointerUp { id: u64, kind: PointerKind, pos: Point },
    PointerCancel { id: u64 },
    /// Wheel or trackpad scroll in pixels.
    Wheel { delta_y: f64, pos: Point },
    PointerLeave,
    Resize { width: f64, height: f64 },
}

/// Semantic actions produced by the router.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    /// A new press; stops animation and inertia.
    GestureStart,
    Hover { pos: Point, section: Section },
    HoverEnd,
    Pan { dx: f64, section: Section },
    /// Drag released with the smoothed velocity in px/frame.
    EndDrag { velocity: f64 },
    Tap { pos: Point, section: Section },
    Zoom { delta_y: f64, section: Section },
    /// Incremental pinch scale since the previous pinch action. Zoom is
    /// anchored to the right edge, like the wheel, not to the fingers.
    Pinch { scale: f64 },
    DividerDrag { dy: f64 },
    Resize { width: f64, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Pressed {
        id: u64,
        kind: PointerKind,
        origin: Point,
        section: Section,
    },
    Dragging {
        id: u64,
        last: Point,
        section: Section,
        /// Smoothed px/frame, updated by [`InputRouter::sample_velocity`].
        velocity: f64,
        /// Movement since the last frame sample.
        frame_dx: f64,
    },
    Pinching {
        last_distance: f64,
    },
    /// A pinch ended with a finger still down; nothing pans until it lifts.
    PinchReleased,
    Divider {
        id: u64,
        last_y: f64,
    },
}

/// Tracks pointer state between events.
#[derive(Debug, Clone)]
pub struct InputRouter {
    gesture: Gesture,
    touches: Vec<(u64, Point)>,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl InputRouter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            touches: Vec::with_capacity(2),
        }
    }

    /// Whether a drag, pinch or divider drag is underway.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(
            self.gesture,
            Gesture::Dragging { .. } | Gesture::Pinching { .. } | Gesture::Divider { .. }
        )
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        matches!(self.gesture, Gesture::Pinching { .. })
    }

    /// Fold this frame's drag movement into the release velocity. Call once
    /// per frame after routing, so the velocity does not depend on how often
    /// the device reports motion.
    pub fn sample_velocity(&mut self) {
        if let Gesture::Dragging {
            velocity, frame_dx, ..
        } = &mut self.gesture
        {
            *velocity = blend_velocity(*velocity, *frame_dx);
            *frame_dx = 0.0;
        }
    }

    /// Route one event using the current panel layout.
    pub fn route(&mut self, event: &InputEvent, layout: &ChartLayout) -> Vec<InputAction> {
        match *event {
            InputEvent::PointerDown { id, kind, pos } => self.pointer_down(id, kind, pos, layout),
            InputEvent::PointerMove { id, kind, pos } => self.pointer_move(id, kind, pos, layout),
            InputEvent::PointerUp { id, kind, .. } => self.pointer_up(id, kind),
            InputEvent::PointerCancel { id } => self.pointer_cancel(id),
            InputEvent::Wheel { delta_y, pos } => wheel_section(pos, layout)
                .map(|section| InputAction::Zoom { delta_y, section })
                .into_iter()
                .collect(),
            InputEvent::PointerLeave => vec![InputAction::HoverEnd],
            InputEvent::Resize { width, height } => vec![InputAction::Resize { width, height }],
        }
    }

    fn pointer_down(&mut self, id: u64, kind: PointerKind, pos: Point, layout: &ChartLayout) -> Vec<InputAction> {
        if kind == PointerKind::Touch {
            if self.touches.len() >= 2 {
                return Vec::new();
            }
            self.touches.push((id, pos));
            if self.touches.len() == 2 {
                // Second finger: pinch wins over any pan in progress
                let last_distance = self.touches[0].1.distance_to(self.touches[1].1);
                self.gesture = Gesture::Pinching { last_distance };
                return vec![InputAction::GestureStart];
            }
        }

        if self.gesture != Gesture::Idle {
            return Vec::new();
        }

        let region = layout.region_at(pos.y);
        if region == Region::Divider {
            self.gesture = Gesture::Divider { id, last_y: pos.y };
            return vec![InputAction::GestureStart];
        }
        match Section::from_region(region) {
            Some(section) if pos.x >= 0.0 && pos.x < layout.plot_width() => {
                self.gesture = Gesture::Pressed {
                    id,
                    kind,
                    origin: pos,
                    section,
                };
                vec![InputAction::GestureStart]
            }
            _ => Vec::new(),
        }
    }

    fn pointer_move(&mut self, id: u64, kind: PointerKind, pos: Point, layout: &ChartLayout) -> Vec<InputAction> {
        if let Some(touch) = self.touches.iter_mut().find(|(t, _)| *t == id) {
            touch.1 = pos;
        }

        match self.gesture {
            Gesture::Pinching { last_distance } => {
                if self.touches.len() < 2 || !self.touches.iter().any(|(t, _)| *t == id) {
                    return Vec::new();
                }
                let distance = self.touches[0].1.distance_to(self.touches[1].1);
                if last_distance <= f64::EPSILON || distance <= f64::EPSILON {
                    return Vec::new();
                }
                self.gesture = Gesture::Pinching {
                    last_distance: distance,
                };
                vec![InputAction::Pinch {
                    scale: distance / last_distance,
                }]
            }
            Gesture::Pressed {
                id: pressed,
                kind,
                origin,
                section,
            } if pressed == id => {
                if origin.distance_to(pos) < kind.drag_threshold() {
                    return Vec::new();
                }
                let dx = pos.x - origin.x;
                self.gesture = Gesture::Dragging {
                    id,
                    last: pos,
                    section,
                    velocity: 0.0,
                    frame_dx: dx,
                };
                vec![InputAction::Pan { dx, section }]
            }
            Gesture::Dragging {
                id: dragging,
                last,
                section,
                velocity,
                frame_dx,
            } if dragging == id => {
                let dx = pos.x - last.x;
                self.gesture = Gesture::Dragging {
                    id,
                    last: pos,
                    section,
                    velocity,
                    frame_dx: frame_dx + dx,
                };
                if dx == 0.0 {
                    Vec::new()
                } else {
                    vec![InputAction::Pan { dx, section }]
                }
            }
            Gesture::Divider { id: dragging, last_y } if dragging == id => {
                self.gesture = Gesture::Divider { id, last_y: pos.y };
                vec![InputAction::DividerDrag { dy: pos.y - last_y }]
            }
            Gesture::Idle if kind == PointerKind::Mouse => {
                if layout.in_plot(pos) {
                    match Section::from_region(layout.region_at(pos.y)) {
                        Some(section) => vec![InputAction::Hover { pos, section }],
                        None => vec![InputAction::HoverEnd],
                    }
                } else {
                    vec![InputAction::HoverEnd]
                }
            }
            _ => Vec::new(),
        }
    }

    fn pointer_up(&mut self, id: u64, kind: PointerKind) -> Vec<InputAction> {
        if kind == PointerKind::Touch {
            self.touches.retain(|(t, _)| *t != id);
        }

        match self.gesture {
            Gesture::Pinching { .. } | Gesture::PinchReleased => {
                self.gesture = if self.touches.is_empty() {
                    Gesture::Idle
                } else {
                    Gesture::PinchReleased
                };
                Vec::new()
            }
            Gesture::Pressed {
                id: pressed,
                origin,
                section,
                ..
            } if pressed == id => {
                self.gesture = Gesture::Idle;
                vec![InputAction::Tap { pos: origin, section }]
            }
            Gesture::Dragging {
                id: dragging,
                velocity,
                frame_dx,
                ..
            } if dragging == id => {
                self.gesture = Gesture::Idle;
                // Movement in the release frame has not been sampled yet
                let velocity = if frame_dx == 0.0 {
                    velocity
                } else {
                    blend_velocity(velocity, frame_dx)
                };
                vec![InputAction::EndDrag { velocity }]
            }
            Gesture::Divider { id: dragging, .. } if dragging == id => {
                self.gesture = Gesture::Idle;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn pointer_cancel(&mut self, id: u64) -> Vec<InputAction> {
        self.touches.retain(|(t, _)| *t != id);
        let ended = matches!(self.gesture, Gesture::Dragging { id: d, .. } if d == id);
        self.gesture = if self.touches.is_empty() {
            Gesture::Idle
        } else {
            Gesture::PinchReleased
        };
        if ended {
            vec![InputAction::EndDrag { velocity: 0.0 }]
        } else {
            Vec::new()
        }
    }
}

/// Wheel zoom works across the full chart width, price gutter included. The
/// divider band belongs to the price panel above it.
fn wheel_section(pos: Point, layout: &ChartLayout) -> Option<Section> {
    if pos.x < 0.0 || pos.x >= layout.width {
        return None;
    }
    match layout.region_at(pos.y) {
        Region::Divider => Some(Section::Price),
        region => Section::from_region(region),
    }
}

fn blend_velocity(velocity: f64, frame_dx: f64) -> f64 {
    velocity * 0.2 + frame_dx * 0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ChartLayout {
        ChartLayout::compute(1064.0, 622.0, 0.7, true)
    }

    fn down(id: u64, kind: PointerKind, x: f64, y: f64) -> InputEvent {
        InputEvent::PointerDown {
            id,
            kind,
            pos: Point::new(x, y),
        }
    }

    fn moved(id: u64, kind: PointerKind, x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMove {
            id,
            kind,
            pos: Point::new(x, y),
        }
    }

    fn up(id: u64, kind: PointerKind, x: f64, y: f64) -> InputEvent {
        InputEvent::PointerUp {
            id,
            kind,
            pos: Point::new(x, y),
        }
    }

    #[test]
    fn test_small_touch_movement_is_tap() {
        let mut router = InputRouter::new();
        let l = layout();
        assert_eq!(router.route(&down(1, PointerKind::Touch, 100.0, 100.0), &l), vec![InputAction::GestureStart]);
        assert!(router.route(&moved(1, PointerKind::Touch, 105.0, 102.0), &l).is_empty());
        assert_eq!(
            router.route(&up(1, PointerKind::Touch, 105.0, 102.0), &l),
            vec![InputAction::Tap {
                pos: Point::new(100.0, 100.0),
                section: Section::Price
            }]
        );
    }

    #[test]
    fn test_mouse_commits_drag_sooner() {
        let mut router = InputRouter::new();
        let l = layout();
        router.route(&down(1, PointerKind::Mouse, 100.0, 100.0), &l);
        let actions = router.route(&moved(1, PointerKind::Mouse, 104.0, 100.0), &l);
        assert_eq!(
            actions,
            vec![InputAction::Pan {
                dx: 4.0,
                section: Section::Price
            }]
        );
        assert!(router.is_dragging());

        router.sample_velocity();

        let actions = router.route(&moved(1, PointerKind::Mouse, 114.0, 100.0), &l);
        assert_eq!(
            actions,
            vec![InputAction::Pan {
                dx: 10.0,
                section: Section::Price
            }]
        );
        // 4 px sampled in the first frame, 10 px still pending at release
        match router.route(&up(1, PointerKind::Mouse, 114.0, 100.0), &l).as_slice() {
            [InputAction::EndDrag { velocity }] => assert!((velocity - 8.64).abs() < 1e-9),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!router.is_dragging());
    }

    #[test]
    fn test_velocity_independent_of_event_rate() {
        let l = layout();
        let release_velocity = |moves_per_frame: usize| {
            let mut router = InputRouter::new();
            router.route(&down(1, PointerKind::Mouse, 100.0, 100.0), &l);
            let step = 24.0 / moves_per_frame as f64;
            let mut x = 100.0;
            for _ in 0..5 {
                for _ in 0..moves_per_frame {
                    x += step;
                    router.route(&moved(1, PointerKind::Mouse, x, 100.0), &l);
                }
                router.sample_velocity();
            }
            match router.route(&up(1, PointerKind::Mouse, x, 100.0), &l).as_slice() {
                [InputAction::EndDrag { velocity }] => *velocity,
                other => panic!("unexpected {other:?}"),
            }
        };

        // 24 px/frame whether reported as 1 or 24 events per frame
        let coarse = release_velocity(1);
        let fine = release_velocity(24);
        assert!((coarse - fine).abs() < 1e-6, "{coarse} vs {fine}");
        assert!(fine > 20.0);
    }

    #[test]
    fn test_held_still_before_release_loses_velocity() {
        let mut router = InputRouter::new();
        let l = layout();
        router.route(&down(1, PointerKind::Mouse, 100.0, 100.0), &l);
        router.route(&moved(1, PointerKind::Mouse, 140.0, 100.0), &l);
        router.sample_velocity();
        for _ in 0..3 {
            router.sample_velocity();
        }
        match router.route(&up(1, PointerKind::Mouse, 140.0, 100.0), &l).as_slice() {
            [InputAction::EndDrag { velocity }] => assert!(*velocity < 1.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_gesture_attributed_to_oscillator() {
        let mut router = InputRouter::new();
        let l = layout();
        let osc = l.oscillator.expect("oscillator shown");
        let y = osc.y + 20.0;
        router.route(&down(1, PointerKind::Mouse, 300.0, y), &l);
        let actions = router.route(&moved(1, PointerKind::Mouse, 320.0, y), &l);
        assert_eq!(
            actions,
            vec![InputAction::Pan {
                dx: 20.0,
                section: Section::Oscillator
            }]
        );
    }

    #[test]
    fn test_second_touch_switches_to_pinch() {
        let mut router = InputRouter::new();
        let l = layout();
        router.route(&down(1, PointerKind::Touch, 400.0, 100.0), &l);
        router.route(&moved(1, PointerKind::Touch, 420.0, 100.0), &l);
        assert!(router.is_dragging());

        router.route(&down(2, PointerKind::Touch, 520.0, 100.0), &l);
        assert!(router.is_pinching());

        // Fingers move apart from 100 px to 250 px
        let actions = router.route(&moved(2, PointerKind::Touch, 670.0, 100.0), &l);
        match actions.as_slice() {
            [InputAction::Pinch { scale }] => assert!((scale - 2.5).abs() < 1e-9),
            other => panic!("unexpected {other:?}"),
        }

        // Lifting one finger does not resume panning
        router.route(&up(2, PointerKind::Touch, 670.0, 100.0), &l);
        assert!(router.route(&moved(1, PointerKind::Touch, 300.0, 100.0), &l).is_empty());
        router.route(&up(1, PointerKind::Touch, 300.0, 100.0), &l);

        // Fresh gesture works again
        assert_eq!(router.route(&down(3, PointerKind::Touch, 100.0, 100.0), &l), vec![InputAction::GestureStart]);
    }

    #[test]
    fn test_divider_drag() {
        let mut router = InputRouter::new();
        let l = layout();
        let div = l.divider_y.expect("divider");
        router.route(&down(1, PointerKind::Mouse, 300.0, div), &l);
        assert_eq!(
            router.route(&moved(1, PointerKind::Mouse, 300.0, div - 30.0), &l),
            vec![InputAction::DividerDrag { dy: -30.0 }]
        );
    }

    #[test]
    fn test_hover_and_leave() {
        let mut router = InputRouter::new();
        let l = layout();
        assert_eq!(
            router.route(&moved(1, PointerKind::Mouse, 200.0, 50.0), &l),
            vec![InputAction::Hover {
                pos: Point::new(200.0, 50.0),
                section: Section::Price
            }]
        );
        // Over the price axis gutter
        assert_eq!(router.route(&moved(1, PointerKind::Mouse, 1030.0, 50.0), &l), vec![InputAction::HoverEnd]);
        assert_eq!(router.route(&InputEvent::PointerLeave, &l), vec![InputAction::HoverEnd]);
    }

    #[test]
    fn test_wheel_over_panels_only() {
        let mut router = InputRouter::new();
        let l = layout();
        assert_eq!(
            router.route(
                &InputEvent::Wheel {
                    delta_y: -120.0,
                    pos: Point::new(200.0, 50.0)
                },
                &l
            ),
            vec![InputAction::Zoom {
                delta_y: -120.0,
                section: Section::Price
            }]
        );
        assert!(router
            .route(
                &InputEvent::Wheel {
                    delta_y: -120.0,
                    pos: Point::new(200.0, 610.0)
                },
                &l
            )
            .is_empty());
    }

    #[test]
    fn test_wheel_over_divider_and_gutter_zooms_price() {
        let mut router = InputRouter::new();
        let l = layout();
        let div = l.divider_y.expect("divider");
        for pos in [Point::new(200.0, div), Point::new(1030.0, 50.0)] {
            assert_eq!(
                router.route(&InputEvent::Wheel { delta_y: 60.0, pos }, &l),
                vec![InputAction::Zoom {
                    delta_y: 60.0,
                    section: Section::Price
                }],
                "wheel at {pos:?}"
            );
        }
        assert!(router
            .route(
                &InputEvent::Wheel {
                    delta_y: 60.0,
                    pos: Point::new(1100.0, 50.0)
                },
                &l
            )
            .is_empty());
    }

    #[test]
    fn test_cancel_ends_drag() {
        let mut router = InputRouter::new();
        let l = layout();
        router.route(&down(1, PointerKind::Touch, 100.0, 100.0), &l);
        router.route(&moved(1, PointerKind::Touch, 150.0, 100.0), &l);
        assert_eq!(
            router.route(&InputEvent::PointerCancel { id: 1 }, &l),
            vec![InputAction::EndDrag { velocity: 0.0 }]
        );
        assert!(!router.is_dragging());
    }
}
