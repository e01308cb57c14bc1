//! Decoded mouse events handed to listeners.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which button (or the wheel) produced an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// First extended button (`XBUTTON1`, usually "back").
    ExtendedButton1,
    /// Second extended button (`XBUTTON2`, usually "forward").
    ExtendedButton2,
    Wheel,
    /// An extended button event whose data word named neither `XBUTTON1` nor `XBUTTON2`.
    #[default]
    Unknown,
}

impl MouseButton {
    /// Human-readable button name.
    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "LeftButton",
            MouseButton::Right => "RightButton",
            MouseButton::Middle => "MiddleButton",
            MouseButton::ExtendedButton1 => "XButton1",
            MouseButton::ExtendedButton2 => "XButton2",
            MouseButton::Wheel => "Wheel",
            MouseButton::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The listener slot an event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Button pressed.
    Down,
    /// Button released.
    Up,
    /// Vertical wheel rotated.
    Wheel,
}

/// A single decoded mouse event.
///
/// Built fresh for every raw event and passed by value to exactly one listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub button: MouseButton,
    /// Cursor position in screen coordinates.
    pub x: i32,
    pub y: i32,
    /// Wheel rotation in multiples of `WHEEL_DELTA` (120). Positive is away from
    /// the user. Always zero unless `button` is [`MouseButton::Wheel`].
    pub delta: i16,
}

impl MouseEvent {
    /// Event at a position with no button assigned yet.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_names() {
        assert_eq!(MouseButton::Left.to_string(), "LeftButton");
        assert_eq!(MouseButton::Right.to_string(), "RightButton");
        assert_eq!(MouseButton::Middle.to_string(), "MiddleButton");
        assert_eq!(MouseButton::ExtendedButton1.to_string(), "XButton1");
        assert_eq!(MouseButton::ExtendedButton2.to_string(), "XButton2");
        assert_eq!(MouseButton::Wheel.to_string(), "Wheel");
    }

    #[test]
    fn test_event_defaults() {
        let event = MouseEvent::at(7, -3);
        assert_eq!(event.button, MouseButton::Unknown);
        assert_eq!((event.x, event.y, event.delta), (7, -3, 0));
    }

    #[test]
    fn test_event_serializes_flat() {
        let event = MouseEvent {
            button: MouseButton::Wheel,
            x: 5,
            y: 5,
            delta: -120,
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "button": "Wheel", "x": 5, "y": 5, "delta": -120 })
        );
    }
}
