//! Pointer input abstraction and the gesture state machine.
//!
//! Gesture math consumes normalized `(x, y)` samples plus a hit-target
//! discriminant, decoupled from any UI toolkit's event objects. At most one
//! gesture exists at a time; the transitions live on the session, this
//! module defines the states and their anchors.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::element::ElementId;

/// A normalized pointer position in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    /// Build a sample from raw coordinates.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What part of an element a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The element body; starts a drag.
    Body,
    /// The resize handle; starts a resize.
    ResizeHandle,
    /// An interactive child control (input, textarea, button); the control
    /// keeps the event and no gesture starts.
    Control,
}

/// The single active gesture, if any.
///
/// Anchors capture the pointer position and the target's geometry at
/// gesture start; every later move is interpreted relative to them, so
/// gesture math never accumulates rounding across moves.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving an element.
    Dragging {
        id: ElementId,
        anchor: PointerSample,
        origin_x: f64,
        origin_y: f64,
    },
    /// Resizing an element from its handle.
    Resizing {
        id: ElementId,
        anchor: PointerSample,
        origin_width: f64,
        origin_height: f64,
    },
}

impl GestureState {
    /// Returns `true` when no gesture is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The element under manipulation, if a gesture is active.
    #[must_use]
    pub fn target(&self) -> Option<&ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(id),
        }
    }
}
