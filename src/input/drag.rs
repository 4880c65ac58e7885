//! Pointer move handling - repositioning the dragged item.
//!
//! ## Performance Notes
//!
//! Pointer move fires many times per second while dragging. Idle moves exit
//! before touching the store, and a move only updates the dragged tile in
//! the index instead of rebuilding it.
//!
//! Enable profiling with `cargo build --features profiling` to see timing.

use crate::board::Board;
use crate::constants::POINTER_MOVE_BUDGET_MS;
use crate::input::coords::{CanvasBounds, CoordinateConverter};
use crate::profile_scope;
use crate::types::Position;
use tracing::debug;

impl Board {
    /// Pointer moved to `(client_x, client_y)`.
    ///
    /// While dragging, moves the dragged item so the grab point stays under
    /// the pointer and returns its new position. If the item has gone (or
    /// is no longer on the canvas) the drag ends silently, as it does when
    /// the pointer or bounds do not resolve to a finite canvas point.
    pub fn pointer_move(&mut self, bounds: &CanvasBounds, client_x: f64, client_y: f64) -> Option<Position> {
        profile_scope!("pointer_move", POINTER_MOVE_BUDGET_MS);

        let item_id = self.drag.dragged_item()?;
        let pointer = CoordinateConverter::to_local(bounds, client_x, client_y);
        let at = self.drag.update(pointer)?;
        if !at.is_finite() {
            debug!("Non-finite drag position {:?} for {}, ending drag", at, item_id);
            self.drag.end();
            return None;
        }

        match self.store.position_of(item_id) {
            None => {
                debug!("Dragged item {} is gone, ending drag", item_id);
                self.drag.end();
                None
            }
            Some(current) if current == at => Some(at),
            Some(_) => {
                self.store.set_position(item_id, at);
                self.index.insert(item_id, at);
                self.persist();
                Some(at)
            }
        }
    }
}
