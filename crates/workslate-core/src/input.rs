//! Pointer events and cursor feedback.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer event type for unified mouse/touch handling. Touch input is
/// reduced to its first contact point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Move { position: Point },
    Up { position: Point, button: MouseButton },
    DoubleClick { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. }
            | PointerEvent::DoubleClick { position } => position,
        }
    }

    fn with_position(self, position: Point) -> Self {
        match self {
            PointerEvent::Down { button, .. } => PointerEvent::Down { position, button },
            PointerEvent::Move { .. } => PointerEvent::Move { position },
            PointerEvent::Up { button, .. } => PointerEvent::Up { position, button },
            PointerEvent::DoubleClick { .. } => PointerEvent::DoubleClick { position },
        }
    }

    /// Same event with its position rounded to the nearest grid intersection.
    pub fn snapped(self, grid_size: f64) -> Self {
        if grid_size <= 0.0 {
            return self;
        }
        let p = self.position();
        self.with_position(Point::new(
            (p.x / grid_size).round() * grid_size,
            (p.y / grid_size).round() * grid_size,
        ))
    }
}

/// Cursor shown over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum CursorIcon {
    #[default]
    Default,
    Grab,
    EwResize,
    NwseResize,
    Move,
    Crosshair,
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Turns a stream of presses into double-click notifications.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press at `position`; returns true when it completes a
    /// double click.
    pub fn press(&mut self, position: Point) -> bool {
        self.press_at(position, Instant::now())
    }

    fn press_at(&mut self, position: Point, now: Instant) -> bool {
        let is_double = match (self.last_click_time, self.last_click_position) {
            (Some(time), Some(last)) => {
                now.duration_since(time).as_millis() < DOUBLE_CLICK_TIME_MS
                    && last.distance(position) < DOUBLE_CLICK_DISTANCE
            }
            _ => false,
        };
        if is_double {
            self.last_click_time = None;
            self.last_click_position = None;
        } else {
            self.last_click_time = Some(now);
            self.last_click_position = Some(position);
        }
        is_double
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_snapped() {
        let e = PointerEvent::Move { position: Point::new(74.0, 26.0) }.snapped(50.0);
        assert_eq!(e.position(), Point::new(50.0, 50.0));
        let e = PointerEvent::Move { position: Point::new(74.0, 26.0) }.snapped(0.0);
        assert_eq!(e.position(), Point::new(74.0, 26.0));
    }

    #[test]
    fn test_double_click() {
        let mut tracker = ClickTracker::new();
        let t0 = Instant::now();
        assert!(!tracker.press_at(Point::new(10.0, 10.0), t0));
        assert!(tracker.press_at(Point::new(11.0, 10.0), t0 + Duration::from_millis(200)));
        // A third click starts a new sequence.
        assert!(!tracker.press_at(Point::new(11.0, 10.0), t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_slow_or_distant_clicks() {
        let mut tracker = ClickTracker::new();
        let t0 = Instant::now();
        tracker.press_at(Point::ZERO, t0);
        assert!(!tracker.press_at(Point::ZERO, t0 + Duration::from_millis(800)));
        assert!(!tracker.press_at(Point::new(50.0, 0.0), t0 + Duration::from_millis(900)));
    }
}
