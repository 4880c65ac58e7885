//! Pointer up handling, drop-target resolution and drops.

use crate::board::Board;
use crate::input::coords::{CanvasBounds, CoordinateConverter};
use crate::transfer::TransferOutcome;
use crate::types::{DragPayload, DropTarget, ItemId, RawFile};
use crate::upload::{UploadReport, Uploader};
use tracing::debug;

impl Board {
    /// Pointer released. Ends the drag and returns the item that was being
    /// dragged, if any. Positions were already committed while moving.
    pub fn pointer_up(&mut self) -> Option<ItemId> {
        let dragged = self.drag.dragged_item();
        self.drag.end();
        dragged
    }

    /// What lies under client position `(client_x, client_y)`.
    ///
    /// Only folder tiles are drop targets; `dragged` is never its own target.
    /// Where tiles overlap, the one drawn last (latest in display order) wins.
    pub fn drop_target_at(
        &self,
        bounds: &CanvasBounds,
        client_x: f64,
        client_y: f64,
        dragged: Option<ItemId>,
    ) -> DropTarget {
        let local = CoordinateConverter::to_local(bounds, client_x, client_y);
        let hits = self.index.query_point(local.x, local.y);

        let topmost = self
            .store
            .top_level_ids()
            .iter()
            .rev()
            .find(|id| {
                Some(**id) != dragged
                    && hits.contains(id)
                    && self.store.kind_of(**id).is_some_and(|k| k.is_folder())
            })
            .copied();

        match topmost {
            Some(folder) => DropTarget::Folder(folder),
            None => DropTarget::Canvas(local),
        }
    }

    /// Apply a drop carrying a serialized [`DragPayload`].
    ///
    /// Payloads that did not come from this board are ignored (`None`).
    pub fn handle_drop(&mut self, raw_payload: &str, target: DropTarget) -> Option<TransferOutcome> {
        let Some(payload) = DragPayload::decode(raw_payload) else {
            debug!("Ignoring drop with foreign payload");
            return None;
        };
        Some(self.apply_drop(payload, target))
    }

    /// Files dropped from outside the board land where they were released.
    pub async fn drop_files(
        &mut self,
        uploader: &dyn Uploader,
        files: Vec<RawFile>,
        bounds: &CanvasBounds,
        client_x: f64,
        client_y: f64,
    ) -> UploadReport {
        let at = CoordinateConverter::to_local(bounds, client_x, client_y);
        self.add_files(uploader, files, at).await
    }
}
