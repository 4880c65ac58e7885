//! The board: one collection of items plus everything that acts on it.
//!
//! `Board` owns the item store, the drag session, the persistence bridge and
//! the drop-target index. Every committed change is saved as one snapshot
//! and the index is refreshed from the same state. Pointer and drop handling
//! lives in [`crate::input`] as further `impl Board` blocks.

use crate::constants::{DEFAULT_DROP_ORIGIN, DEFAULT_FOLDER_NAME, UPLOAD_STAGGER_STEP};
use crate::error::UploadResult;
use crate::input::DragSession;
use crate::persistence::{FileBlobStore, PersistenceBridge};
use crate::settings::Settings;
use crate::spatial_index::SpatialIndex;
use crate::store::ItemStore;
use crate::transfer::TransferOutcome;
use crate::types::{
    Collection, DragPayload, DropTarget, Item, ItemId, Position, RawFile, UploadedFile,
};
use crate::upload::{PendingUpload, UploadCoordinator, UploadReport, Uploader};
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub struct Board {
    pub(crate) store: ItemStore,
    pub(crate) drag: DragSession,
    pub(crate) index: SpatialIndex,
    bridge: PersistenceBridge,
    pending_uploads: HashSet<ItemId>,
    drop_origin: Position,
    stagger_step: f64,
    revision: u64,
}

impl Board {
    /// Open the board saved behind `bridge`, or an empty one.
    pub fn open(bridge: PersistenceBridge) -> Self {
        let mut store = ItemStore::new();
        let dropped = store.load(bridge.load());
        if !dropped.is_empty() {
            info!("Discarded {} invalid entries from '{}'", dropped.len(), bridge.key());
        }

        let mut board = Self {
            store,
            drag: DragSession::default(),
            index: SpatialIndex::new(),
            bridge,
            pending_uploads: HashSet::new(),
            drop_origin: DEFAULT_DROP_ORIGIN.into(),
            stagger_step: UPLOAD_STAGGER_STEP,
            revision: 0,
        };
        board.rebuild_index();
        board
    }

    /// Open the file-backed board described by `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let store = FileBlobStore::new(settings.data_dir());
        Self::open(PersistenceBridge::new(store, settings.storage_key.clone()))
            .with_upload_layout(settings.drop_origin(), settings.stagger_step)
    }

    /// Where file-picker uploads land and how far apart co-dropped files sit.
    /// Non-finite values keep the defaults.
    pub fn with_upload_layout(mut self, drop_origin: Position, stagger_step: f64) -> Self {
        if drop_origin.is_finite() {
            self.drop_origin = drop_origin;
        } else {
            warn!("Ignoring non-finite drop origin {:?}", drop_origin);
        }
        if stagger_step.is_finite() {
            self.stagger_step = stagger_step;
        } else {
            warn!("Ignoring non-finite stagger step {}", stagger_step);
        }
        self
    }

    // ==================== Queries ====================

    /// Current snapshot of the whole collection.
    pub fn collection(&self) -> Collection {
        self.store.get_all()
    }

    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.store.get(id)
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    pub fn drop_origin(&self) -> Position {
        self.drop_origin
    }

    /// Number of committed changes since the board was opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ids reserved by uploads that have not completed yet.
    pub fn pending_uploads(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.pending_uploads.iter().copied()
    }

    // ==================== Item lifecycle ====================

    /// Create an empty folder. Blank names fall back to "New Folder".
    pub fn create_folder(&mut self, name: &str, at: Position) -> ItemId {
        let name = match name.trim() {
            "" => DEFAULT_FOLDER_NAME,
            trimmed => trimmed,
        };
        let id = self.store.create_folder(name, at);
        info!("Created folder '{}' ({})", name, id);
        self.commit();
        id
    }

    /// Insert or replace a top-level item.
    pub fn upsert_item(&mut self, item: Item) -> bool {
        let changed = self.store.upsert_top_level(item);
        if changed {
            self.after_structure_change();
        }
        changed
    }

    /// Remove an item (and a folder's children). Removing an id reserved by an
    /// in-flight upload cancels that entry instead.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        if self.pending_uploads.remove(&id) {
            info!("Cancelled pending upload {}", id);
            return true;
        }
        if !self.store.remove_by_id(id) {
            return false;
        }
        self.after_structure_change();
        true
    }

    // ==================== Transfers ====================

    pub fn move_to_canvas(&mut self, item_id: ItemId, at: Position) -> TransferOutcome {
        let outcome = self.store.move_to_canvas(item_id, at);
        self.after_transfer(&outcome);
        outcome
    }

    pub fn move_into_folder(&mut self, item_id: ItemId, folder_id: ItemId) -> TransferOutcome {
        let outcome = self.store.move_into_folder(item_id, folder_id);
        self.after_transfer(&outcome);
        outcome
    }

    pub fn take_child_out(&mut self, folder_id: ItemId, child_id: ItemId, at: Position) -> TransferOutcome {
        let outcome = self.store.take_child_out(folder_id, child_id, at);
        self.after_transfer(&outcome);
        outcome
    }

    pub fn reparent_child(&mut self, from_folder: ItemId, child_id: ItemId, to_folder: ItemId) -> TransferOutcome {
        let outcome = self.store.reparent_child(from_folder, child_id, to_folder);
        self.after_transfer(&outcome);
        outcome
    }

    pub fn apply_drop(&mut self, payload: DragPayload, target: DropTarget) -> TransferOutcome {
        let outcome = self.store.apply_drop(payload, target);
        self.after_transfer(&outcome);
        outcome
    }

    // ==================== Uploads ====================

    /// Upload `files` and append the results at `origin`, staggered.
    ///
    /// Holds the board for the whole batch. Callers that need the board
    /// while uploads are in flight use [`begin_upload`](Self::begin_upload)
    /// and [`finish_upload`](Self::finish_upload) around
    /// [`UploadCoordinator::upload_all`].
    pub async fn add_files(
        &mut self,
        uploader: &dyn Uploader,
        files: Vec<RawFile>,
        origin: Position,
    ) -> UploadReport {
        let pending = self.begin_upload(&files, origin);
        let results = UploadCoordinator::upload_all(uploader, &files).await;
        self.finish_upload(pending, results)
    }

    /// [`add_files`](Self::add_files) at the configured drop origin.
    pub async fn add_files_at_default(&mut self, uploader: &dyn Uploader, files: Vec<RawFile>) -> UploadReport {
        let origin = self.drop_origin;
        self.add_files(uploader, files, origin).await
    }

    /// Reserve ids and positions for a batch. A non-finite `origin` falls
    /// back to the drop origin.
    pub fn begin_upload(&mut self, files: &[RawFile], origin: Position) -> PendingUpload {
        let origin = if origin.is_finite() {
            origin
        } else {
            warn!("Non-finite upload origin {:?}, using {:?}", origin, self.drop_origin);
            self.drop_origin
        };
        let pending = PendingUpload::reserve(files, origin, self.stagger_step);
        self.pending_uploads.extend(pending.ids());
        pending
    }

    /// Append the successful uploads of a batch as one change.
    ///
    /// Entries removed while their upload was in flight are skipped.
    pub fn finish_upload(
        &mut self,
        pending: PendingUpload,
        results: Vec<UploadResult<UploadedFile>>,
    ) -> UploadReport {
        let reserved: Vec<ItemId> = pending.ids().collect();
        let live = &self.pending_uploads;
        let batch = pending.resolve(results, |id| !live.contains(&id));
        for id in &reserved {
            self.pending_uploads.remove(id);
        }

        let mut added = Vec::with_capacity(batch.items.len());
        for item in batch.items {
            let id = item.id;
            if self.store.upsert_top_level(item) {
                added.push(id);
            }
        }
        if !added.is_empty() {
            info!("Added {} uploaded items", added.len());
            self.commit();
        }

        UploadReport {
            added,
            failed: batch.failed,
            cancelled: batch.cancelled,
        }
    }

    // ==================== Commit ====================

    fn after_transfer(&mut self, outcome: &TransferOutcome) {
        if outcome.changed() {
            self.after_structure_change();
        }
    }

    fn after_structure_change(&mut self) {
        self.end_drag_if_stale();
        self.commit();
    }

    /// A drag only makes sense while its item is still on the canvas.
    pub(crate) fn end_drag_if_stale(&mut self) {
        if let Some(id) = self.drag.dragged_item() {
            if self.store.position_of(id).is_none() {
                debug!("Ending drag of {}: no longer on the canvas", id);
                self.drag.end();
            }
        }
    }

    /// Persist the current state and refresh the drop-target index.
    pub(crate) fn commit(&mut self) {
        self.persist();
        self.rebuild_index();
    }

    pub(crate) fn persist(&mut self) {
        debug_assert!(self.store.validate().is_ok());
        self.bridge.save(&self.store.get_all());
        self.revision += 1;
    }

    fn rebuild_index(&mut self) {
        let store = &self.store;
        self.index.rebuild(
            store
                .top_level_ids()
                .iter()
                .filter_map(|id| store.position_of(*id).map(|at| (*id, at))),
        );
    }
}
