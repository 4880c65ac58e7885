//! Drag session state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Dragging      (pointer down on a top-level item)
//! Dragging -> Dragging  (pointer down again: last pointer-down wins)
//! Any -> Idle           (pointer up, or the dragged item disappears)
//! ```
//!
//! The session is ephemeral: it is never persisted and always starts Idle.

use crate::types::{ItemId, Position};

/// At most one in-progress pointer-driven move.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragSession {
    /// No active drag
    #[default]
    Idle,

    /// Dragging a top-level item
    Dragging {
        /// Item under the pointer when the drag began
        item_id: ItemId,
        /// Pointer position relative to the item's origin
        pointer_offset: Position,
    },
}

impl DragSession {
    /// Start a drag, replacing any drag already in progress.
    pub fn begin(&mut self, item_id: ItemId, pointer_local: Position, item_origin: Position) {
        *self = Self::Dragging {
            item_id,
            pointer_offset: pointer_local - item_origin,
        };
    }

    /// New origin for the dragged item given the current pointer position,
    /// or `None` when no drag is active.
    pub fn update(&self, pointer_local: Position) -> Option<Position> {
        match self {
            Self::Dragging { pointer_offset, .. } => Some(pointer_local - *pointer_offset),
            Self::Idle => None,
        }
    }

    /// Clear the session. Calling this while idle is a no-op.
    pub fn end(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// The item being dragged, if any
    pub fn dragged_item(&self) -> Option<ItemId> {
        match self {
            Self::Dragging { item_id, .. } => Some(*item_id),
            Self::Idle => None,
        }
    }

    pub fn pointer_offset(&self) -> Option<Position> {
        match self {
            Self::Dragging { pointer_offset, .. } => Some(*pointer_offset),
            Self::Idle => None,
        }
    }
}
