//! Drag controller for board interactions.
//!
//! Translates input events into `BoardMutation` commands that are applied by
//! the [`Board`](crate::board::Board).
//!
//! ## States
//!
//! | State | PointerDown | PointerMove | PointerUp |
//! |-------|-------------|-------------|-----------|
//! | **Idle** | capture target → Dragging | ignored | ignored |
//! | **Dragging** | ignored (capture held) | pan or move note by delta | → Idle |
//!
//! Zoom and context-menu events are handled in either state.

use crate::board::BoardMutation;
use crate::config::BoardConfig;
use crate::input::InputEvent;
use nb_core::{EntryId, Point};
use smallvec::{SmallVec, smallvec};

/// Mutations emitted for a single event. Almost always zero or one.
pub type Mutations = SmallVec<[BoardMutation; 1]>;

/// What a gesture acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// The whole canvas: dragging pans.
    Canvas,
    /// One note: dragging moves it.
    Note(EntryId),
}

impl DragTarget {
    fn from_hit(hit: Option<EntryId>) -> Self {
        hit.map_or(Self::Canvas, Self::Note)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { target: DragTarget, last: Point },
}

/// Where the last context menu was opened and what it was opened on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextTarget {
    pub target: DragTarget,
    /// View-space pointer position at the time of the event.
    pub position: Point,
}

#[derive(Debug)]
pub struct DragTool {
    state: DragState,
    context: Option<ContextTarget>,
    wheel_zoom_step: f64,
}

impl Default for DragTool {
    fn default() -> Self {
        Self::new(BoardConfig::default().wheel_zoom_step)
    }
}

impl DragTool {
    pub fn new(wheel_zoom_step: f64) -> Self {
        Self {
            state: DragState::Idle,
            context: None,
            wheel_zoom_step,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn context(&self) -> Option<ContextTarget> {
        self.context
    }

    pub fn clear_context(&mut self) {
        self.context = None;
    }

    /// Drop any capture, e.g. when the host loses pointer capture or the
    /// note being dragged is deleted.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Handle an input event. `hit` is the note under the pointer, if any,
    /// as determined by the caller's hit test.
    pub fn handle(&mut self, event: &InputEvent, hit: Option<EntryId>) -> Mutations {
        match *event {
            InputEvent::PointerDown { x, y } => {
                // Capture: a second press never preempts the active drag.
                if let DragState::Idle = self.state {
                    self.state = DragState::Dragging {
                        target: DragTarget::from_hit(hit),
                        last: Point::new(x, y),
                    };
                }
                smallvec![]
            }
            InputEvent::PointerMove { x, y } => {
                let DragState::Dragging { target, last } = self.state else {
                    return smallvec![];
                };
                let pos = Point::new(x, y);
                let delta = pos - last;
                self.state = DragState::Dragging { target, last: pos };

                let mutation = match target {
                    DragTarget::Canvas => BoardMutation::Pan {
                        dx: delta.x,
                        dy: delta.y,
                    },
                    DragTarget::Note(id) => BoardMutation::MoveNote {
                        id,
                        dx: delta.x,
                        dy: delta.y,
                    },
                };
                smallvec![mutation]
            }
            InputEvent::PointerUp { .. } => {
                self.state = DragState::Idle;
                smallvec![]
            }
            InputEvent::Wheel { x, y, notches } => smallvec![BoardMutation::Zoom {
                origin: Point::new(x, y),
                factor: self.wheel_zoom_step.powf(notches),
            }],
            InputEvent::Zoom { x, y, factor } => smallvec![BoardMutation::Zoom {
                origin: Point::new(x, y),
                factor,
            }],
            InputEvent::ContextMenu { x, y } => {
                self.context = Some(ContextTarget {
                    target: DragTarget::from_hit(hit),
                    position: Point::new(x, y),
                });
                smallvec![]
            }
        }
    }
}
