//! Cross-container moves between the canvas and folders.
//!
//! Every operation validates all of its preconditions before touching the
//! store and then applies its change under a single `&mut` borrow, so no
//! caller can observe an item that is in zero containers or in two. A failed
//! precondition leaves the store untouched and is reported as
//! [`TransferOutcome::Rejected`].

use crate::constants::TRANSFER_BUDGET_MS;
use crate::profile_scope;
use crate::store::ItemStore;
use crate::types::{Container, DragPayload, DropTarget, ItemId, Position};
use std::fmt;
use tracing::debug;

/// Why a transfer was not applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferRejection {
    /// No item with this id exists
    NotFound(ItemId),
    /// An item was dropped onto itself
    SelfDrop(ItemId),
    /// The drop target exists but is not a folder
    TargetNotFolder(ItemId),
    /// Folders cannot be put inside folders
    FolderIntoFolder(ItemId),
    /// The item is inside a folder; use a child transfer instead
    SourceNotTopLevel(ItemId),
    /// The drag source is stale: `child` is not inside `folder`
    NotAChild { folder: ItemId, child: ItemId },
    /// The requested canvas position for this item is NaN or infinite
    NonFinitePosition(ItemId),
}

impl fmt::Display for TransferRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "item {} not found", id),
            Self::SelfDrop(id) => write!(f, "item {} dropped onto itself", id),
            Self::TargetNotFolder(id) => write!(f, "target {} is not a folder", id),
            Self::FolderIntoFolder(id) => write!(f, "folder {} cannot be nested", id),
            Self::SourceNotTopLevel(id) => write!(f, "item {} is not on the canvas", id),
            Self::NotAChild { folder, child } => {
                write!(f, "item {} is not inside folder {}", child, folder)
            }
            Self::NonFinitePosition(id) => write!(f, "item {} cannot be placed at a non-finite position", id),
        }
    }
}

/// Result of a transfer request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The store changed
    Moved,
    /// Valid request that required no change
    Unchanged,
    /// A precondition failed; the store is untouched
    Rejected(TransferRejection),
}

impl TransferOutcome {
    /// Returns true if the store was modified
    pub fn changed(&self) -> bool {
        matches!(self, TransferOutcome::Moved)
    }

    pub fn rejection(&self) -> Option<TransferRejection> {
        match self {
            TransferOutcome::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl ItemStore {
    /// Place an item on the canvas at `at`, taking it out of its folder if needed.
    ///
    /// For an item that is already top-level this is a plain position update.
    pub fn move_to_canvas(&mut self, item_id: ItemId, at: Position) -> TransferOutcome {
        profile_scope!("move_to_canvas", TRANSFER_BUDGET_MS);

        let Some(container) = self.find_container_of(item_id) else {
            return reject(TransferRejection::NotFound(item_id));
        };
        if !at.is_finite() {
            return reject(TransferRejection::NonFinitePosition(item_id));
        }

        match container {
            Container::TopLevel => {
                if self.position_of(item_id) == Some(at) {
                    return TransferOutcome::Unchanged;
                }
                self.set_position(item_id, at);
                TransferOutcome::Moved
            }
            Container::Folder(folder_id) => self.take_child_out(folder_id, item_id, at),
        }
    }

    /// Put a top-level, non-folder item into a folder.
    ///
    /// Dropping an item onto itself is a no-op, as is dropping a child back
    /// onto the folder that already holds it.
    pub fn move_into_folder(&mut self, item_id: ItemId, folder_id: ItemId) -> TransferOutcome {
        profile_scope!("move_into_folder", TRANSFER_BUDGET_MS);

        if item_id == folder_id {
            return reject(TransferRejection::SelfDrop(item_id));
        }
        let Some(item) = self.records.get(&item_id) else {
            return reject(TransferRejection::NotFound(item_id));
        };
        let Some(target) = self.records.get(&folder_id) else {
            return reject(TransferRejection::NotFound(folder_id));
        };
        if !target.kind.is_folder() {
            return reject(TransferRejection::TargetNotFolder(folder_id));
        }
        if item.kind.is_folder() {
            return reject(TransferRejection::FolderIntoFolder(item_id));
        }
        match item.parent {
            None => {}
            Some(parent) if parent == folder_id => return TransferOutcome::Unchanged,
            Some(_) => return reject(TransferRejection::SourceNotTopLevel(item_id)),
        }

        self.top_level.retain(|id| *id != item_id);
        self.adopt(folder_id, item_id);
        debug!("Moved {} into folder {}", item_id, folder_id);
        TransferOutcome::Moved
    }

    /// Take a child out of `folder_id` and place it on the canvas at `at`.
    ///
    /// A stale drag source (child no longer in that folder) is rejected.
    pub fn take_child_out(&mut self, folder_id: ItemId, child_id: ItemId, at: Position) -> TransferOutcome {
        profile_scope!("take_child_out", TRANSFER_BUDGET_MS);

        let is_child = self
            .records
            .get(&child_id)
            .is_some_and(|r| r.parent == Some(folder_id));
        if !is_child {
            return reject(TransferRejection::NotAChild {
                folder: folder_id,
                child: child_id,
            });
        }
        if !at.is_finite() {
            return reject(TransferRejection::NonFinitePosition(child_id));
        }

        self.detach(child_id);
        if let Some(record) = self.records.get_mut(&child_id) {
            record.parent = None;
            record.position = Some(at);
        }
        self.top_level.push(child_id);
        debug!("Took {} out of folder {}", child_id, folder_id);
        TransferOutcome::Moved
    }

    /// Move a child from one folder directly into another.
    ///
    /// Equivalent to [`take_child_out`](Self::take_child_out) followed by
    /// [`move_into_folder`](Self::move_into_folder), applied as one step with
    /// no intermediate top-level state. Dropping back onto the same folder is
    /// a no-op.
    pub fn reparent_child(&mut self, from_folder: ItemId, child_id: ItemId, to_folder: ItemId) -> TransferOutcome {
        profile_scope!("reparent_child", TRANSFER_BUDGET_MS);

        let is_child = self
            .records
            .get(&child_id)
            .is_some_and(|r| r.parent == Some(from_folder));
        if !is_child {
            return reject(TransferRejection::NotAChild {
                folder: from_folder,
                child: child_id,
            });
        }
        if from_folder == to_folder {
            return TransferOutcome::Unchanged;
        }
        if child_id == to_folder {
            return reject(TransferRejection::SelfDrop(child_id));
        }
        match self.records.get(&to_folder) {
            None => return reject(TransferRejection::NotFound(to_folder)),
            Some(target) if !target.kind.is_folder() => {
                return reject(TransferRejection::TargetNotFolder(to_folder));
            }
            Some(_) => {}
        }

        self.detach(child_id);
        self.adopt(to_folder, child_id);
        debug!("Moved {} from folder {} to folder {}", child_id, from_folder, to_folder);
        TransferOutcome::Moved
    }

    /// Resolve a drag-and-drop gesture into the matching transfer.
    pub fn apply_drop(&mut self, payload: DragPayload, target: DropTarget) -> TransferOutcome {
        match (payload, target) {
            (DragPayload::TopLevelItem { id }, DropTarget::Canvas(at)) => self.move_to_canvas(id, at),
            (DragPayload::TopLevelItem { id }, DropTarget::Folder(folder_id)) => {
                self.move_into_folder(id, folder_id)
            }
            (DragPayload::FolderChild { folder_id, child_id }, DropTarget::Canvas(at)) => {
                self.take_child_out(folder_id, child_id, at)
            }
            (DragPayload::FolderChild { folder_id, child_id }, DropTarget::Folder(to_folder)) => {
                self.reparent_child(folder_id, child_id, to_folder)
            }
        }
    }

    /// Append `child_id` to a folder's children. The caller has already
    /// removed it from its previous container.
    fn adopt(&mut self, folder_id: ItemId, child_id: ItemId) {
        if let Some(record) = self.records.get_mut(&child_id) {
            record.parent = Some(folder_id);
            record.position = None;
        }
        if let Some(folder) = self.records.get_mut(&folder_id) {
            folder.children.push(child_id);
        }
    }
}

fn reject(reason: TransferRejection) -> TransferOutcome {
    debug!("Transfer rejected: {}", reason);
    TransferOutcome::Rejected(reason)
}
