//! Pointer down handling - drag initiation.

use crate::board::Board;
use crate::constants::POINTER_MOVE_BUDGET_MS;
use crate::input::coords::{CanvasBounds, CoordinateConverter};
use crate::profile_scope;
use crate::types::ItemId;
use tracing::debug;

impl Board {
    /// Pointer pressed on `item_id`'s tile at client position `(client_x, client_y)`.
    ///
    /// Starts a drag for top-level items and returns whether one began. A new
    /// press replaces any drag already in progress. Presses that do not map to
    /// a finite canvas point are ignored.
    pub fn pointer_down(
        &mut self,
        bounds: &CanvasBounds,
        client_x: f64,
        client_y: f64,
        item_id: ItemId,
    ) -> bool {
        profile_scope!("pointer_down", POINTER_MOVE_BUDGET_MS);

        let Some(origin) = self.store.position_of(item_id) else {
            debug!("Ignoring pointer down on {}: not on the canvas", item_id);
            return false;
        };

        let pointer = CoordinateConverter::to_local(bounds, client_x, client_y);
        if !pointer.is_finite() {
            debug!("Ignoring pointer down on {}: non-finite pointer {:?}", item_id, pointer);
            return false;
        }
        self.drag.begin(item_id, pointer, origin);
        true
    }
}
