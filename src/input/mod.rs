//! Pointer and drop input for the canvas.
//!
//! ## Architecture
//!
//! A pointer-driven move is tracked by an explicit state machine
//! ([`DragSession`]). Handlers are split by event the same way the events
//! arrive:
//!
//! - `state` - drag session enum and its transitions
//! - `coords` - client to canvas-local coordinate conversion
//! - `mouse_down` - pointer down (drag start)
//! - `drag` - pointer move (position updates while dragging)
//! - `mouse_up` - pointer up, drop-target resolution and drops

pub mod coords;
mod drag;
mod mouse_down;
mod mouse_up;
mod state;

pub use coords::{CanvasBounds, CoordinateConverter};
pub use state::DragSession;
