//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and wheel events from the host UI into a unified
//! `InputEvent` enum consumed by the drag controller. All coordinates are in
//! view space (pixels relative to the board's surface).

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed (mouse down, touch start).
    PointerDown { x: f64, y: f64 },

    /// Pointer moved.
    PointerMove { x: f64, y: f64 },

    /// Primary button released.
    PointerUp { x: f64, y: f64 },

    /// Mouse wheel. Positive notches zoom in.
    Wheel { x: f64, y: f64, notches: f64 },

    /// Pinch-zoom or explicit zoom gesture (1.0 = no change; >1 = zoom in).
    Zoom { x: f64, y: f64, factor: f64 },

    /// Secondary click / long press that opens a context menu.
    ContextMenu { x: f64, y: f64 },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }
}
