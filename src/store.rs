//! Canonical item storage.
//!
//! Items live in an arena keyed by [`ItemId`], with an ordered list of
//! top-level ids and, per folder, an ordered list of child ids. Container
//! membership changes are list edits on this index instead of tree rebuilds;
//! observers only ever receive owned [`Collection`] snapshots built from it.
//!
//! ## Invariants
//!
//! - every id is held by exactly one container (the top-level list or one
//!   folder's child list)
//! - only folders own children, and children are never folders
//! - top-level items carry a position, folder children do not

use crate::error::InvariantViolation;
use crate::types::{Collection, Container, Item, ItemId, ItemKind, Position, ResourceRef};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Arena record for a single item.
#[derive(Clone, Debug)]
pub(crate) struct ItemRecord {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) kind: ItemKind,
    pub(crate) resource: Option<ResourceRef>,
    pub(crate) position: Option<Position>,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: Vec<ItemId>,
}

impl ItemRecord {
    fn top_level(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            kind: item.kind,
            resource: item.resource.clone(),
            position: Some(item.position.filter(Position::is_finite).unwrap_or_default()),
            parent: None,
            children: item.children.iter().map(|c| c.id).collect(),
        }
    }

    fn child_of(folder: ItemId, item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            kind: item.kind,
            resource: item.resource.clone(),
            position: None,
            parent: Some(folder),
            children: Vec::new(),
        }
    }
}

/// Owner of the canonical id → item mapping.
#[derive(Clone, Debug, Default)]
pub struct ItemStore {
    pub(crate) records: HashMap<ItemId, ItemRecord>,
    pub(crate) top_level: Vec<ItemId>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a collection, sanitizing anything that breaks the invariants.
    pub fn from_collection(collection: Collection) -> Self {
        let mut store = Self::new();
        store.load(collection);
        store
    }

    /// Replace the whole contents with `collection`.
    ///
    /// Entries that would break the invariants are dropped (first occurrence of
    /// an id wins, nested folders and children of non-folders are discarded).
    /// The dropped entries are returned so callers can report them.
    pub fn load(&mut self, collection: Collection) -> Vec<InvariantViolation> {
        self.records.clear();
        self.top_level.clear();

        let mut dropped = Vec::new();
        for item in collection.items {
            if self.records.contains_key(&item.id) {
                dropped.push(InvariantViolation::DuplicateId(item.id));
                continue;
            }

            let mut record = ItemRecord::top_level(&item);
            record.children.clear();

            if !item.is_folder() && !item.children.is_empty() {
                dropped.push(InvariantViolation::ChildrenOnNonFolder(item.id));
            }

            let mut child_records = Vec::new();
            if item.is_folder() {
                let mut seen = HashSet::new();
                for child in &item.children {
                    if child.is_folder() {
                        dropped.push(InvariantViolation::NestedFolder {
                            folder: item.id,
                            child: child.id,
                        });
                        continue;
                    }
                    if child.id == item.id
                        || self.records.contains_key(&child.id)
                        || !seen.insert(child.id)
                    {
                        dropped.push(InvariantViolation::DuplicateId(child.id));
                        continue;
                    }
                    if !child.children.is_empty() {
                        dropped.push(InvariantViolation::ChildrenOnNonFolder(child.id));
                    }
                    record.children.push(child.id);
                    child_records.push(ItemRecord::child_of(item.id, child));
                }
            }

            self.top_level.push(item.id);
            self.records.insert(item.id, record);
            for child in child_records {
                self.records.insert(child.id, child);
            }
        }

        for violation in &dropped {
            warn!("Dropped invalid entry while loading: {}", violation);
        }
        dropped
    }

    // ==================== Queries ====================

    /// Snapshot of the whole collection, in display order.
    pub fn get_all(&self) -> Collection {
        Collection::new(
            self.top_level
                .iter()
                .filter_map(|id| self.snapshot_item(*id))
                .collect(),
        )
    }

    /// Snapshot of a single item (folders include their children).
    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.snapshot_item(id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of items, including folder children.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn top_level_ids(&self) -> &[ItemId] {
        &self.top_level
    }

    /// Ordered child ids of a folder, or `None` if `id` is not a folder.
    pub fn children_of(&self, id: ItemId) -> Option<&[ItemId]> {
        self.records
            .get(&id)
            .filter(|r| r.kind.is_folder())
            .map(|r| r.children.as_slice())
    }

    pub fn kind_of(&self, id: ItemId) -> Option<ItemKind> {
        self.records.get(&id).map(|r| r.kind)
    }

    /// Canvas position of a top-level item. Folder children have none.
    pub fn position_of(&self, id: ItemId) -> Option<Position> {
        self.records.get(&id).and_then(|r| r.position)
    }

    /// Which container holds `id`, if it exists.
    pub fn find_container_of(&self, id: ItemId) -> Option<Container> {
        self.records.get(&id).map(|r| match r.parent {
            Some(folder) => Container::Folder(folder),
            None => Container::TopLevel,
        })
    }

    fn snapshot_item(&self, id: ItemId) -> Option<Item> {
        let record = self.records.get(&id)?;
        Some(Item {
            id: record.id,
            name: record.name.clone(),
            kind: record.kind,
            resource: record.resource.clone(),
            position: record.position,
            parent_folder_id: record.parent,
            children: record
                .children
                .iter()
                .filter_map(|child| self.snapshot_item(*child))
                .collect(),
        })
    }

    // ==================== Mutations ====================

    /// Insert or replace a top-level item.
    ///
    /// A replaced item keeps its slot in the top-level order; an item that
    /// was inside a folder is moved to the end of the top level. Kinds are
    /// immutable, so replacing an item with one of a different kind is
    /// refused, as is any folder content that would duplicate an id held
    /// elsewhere, and so is a position that is not a real number. Returns
    /// `false` when nothing was changed.
    pub fn upsert_top_level(&mut self, item: Item) -> bool {
        if item.position.is_some_and(|at| !at.is_finite()) {
            warn!("Refusing {}: non-finite position {:?}", item.id, item.position);
            return false;
        }

        if let Some(existing) = self.records.get(&item.id) {
            if existing.kind != item.kind {
                warn!(
                    "Refusing to change kind of {} from {} to {}",
                    item.id,
                    existing.kind.label(),
                    item.kind.label()
                );
                return false;
            }
        }

        if !item.children.is_empty() {
            if !item.is_folder() {
                warn!("Refusing {}: {}", item.id, InvariantViolation::ChildrenOnNonFolder(item.id));
                return false;
            }
            let mut seen = HashSet::new();
            for child in &item.children {
                let held_elsewhere = self
                    .records
                    .get(&child.id)
                    .is_some_and(|r| r.parent != Some(item.id));
                if child.is_folder()
                    || child.id == item.id
                    || held_elsewhere
                    || !seen.insert(child.id)
                {
                    warn!("Refusing folder {}: child {} is not insertable", item.id, child.id);
                    return false;
                }
            }
        }

        let slot = self.top_level.iter().position(|id| *id == item.id);
        if let Some(previous) = self.records.get(&item.id).cloned() {
            self.detach(item.id);
            let keep: HashSet<ItemId> = item.children.iter().map(|c| c.id).collect();
            for child in previous.children.iter().filter(|c| !keep.contains(c)) {
                self.records.remove(child);
            }
        }

        for child in &item.children {
            self.records.insert(child.id, ItemRecord::child_of(item.id, child));
        }
        self.records.insert(item.id, ItemRecord::top_level(&item));
        match slot {
            Some(index) => self.top_level.insert(index, item.id),
            None => self.top_level.push(item.id),
        }
        debug!("Upserted top-level {} {}", item.kind.label(), item.id);
        true
    }

    /// Create an empty folder on the canvas. A non-finite `at` places it at the origin.
    pub fn create_folder(&mut self, name: impl Into<String>, at: Position) -> ItemId {
        let id = ItemId::new();
        let at = if at.is_finite() {
            at
        } else {
            warn!("Non-finite folder position {:?}, using the origin", at);
            Position::ORIGIN
        };
        self.upsert_top_level(Item::folder(id, name, at));
        id
    }

    /// Remove an item from whichever container holds it.
    ///
    /// Removing a folder removes its children with it.
    pub fn remove_by_id(&mut self, id: ItemId) -> bool {
        if self.detach(id).is_none() {
            return false;
        }
        if let Some(record) = self.records.remove(&id) {
            for child in record.children {
                self.records.remove(&child);
            }
        }
        debug!("Removed {}", id);
        true
    }

    /// Move a top-level item on the canvas. Folder children have no position,
    /// and non-finite positions are ignored.
    pub fn set_position(&mut self, id: ItemId, at: Position) -> bool {
        if !at.is_finite() {
            debug!("Ignoring non-finite position {:?} for {}", at, id);
            return false;
        }
        match self.records.get_mut(&id) {
            Some(record) if record.parent.is_none() => {
                record.position = Some(at);
                true
            }
            _ => false,
        }
    }

    /// Take `id` out of its container's ordering without touching its record.
    pub(crate) fn detach(&mut self, id: ItemId) -> Option<Container> {
        let parent = self.records.get(&id)?.parent;
        match parent {
            None => {
                self.top_level.retain(|other| *other != id);
                Some(Container::TopLevel)
            }
            Some(folder) => {
                if let Some(record) = self.records.get_mut(&folder) {
                    record.children.retain(|other| *other != id);
                }
                Some(Container::Folder(folder))
            }
        }
    }

    // ==================== Validation ====================

    /// Check every structural invariant. Used by tests and debug assertions.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::new();

        for id in &self.top_level {
            let record = self
                .records
                .get(id)
                .ok_or(InvariantViolation::DanglingReference(*id))?;
            if !seen.insert(*id) {
                return Err(InvariantViolation::DuplicateId(*id));
            }
            if record.parent.is_some() {
                return Err(InvariantViolation::ParentMismatch(*id));
            }
            if record.position.is_none() {
                return Err(InvariantViolation::PositionMismatch(*id));
            }
            if !record.kind.is_folder() && !record.children.is_empty() {
                return Err(InvariantViolation::ChildrenOnNonFolder(*id));
            }

            for child_id in &record.children {
                let child = self
                    .records
                    .get(child_id)
                    .ok_or(InvariantViolation::DanglingReference(*child_id))?;
                if !seen.insert(*child_id) {
                    return Err(InvariantViolation::DuplicateId(*child_id));
                }
                if child.kind.is_folder() {
                    return Err(InvariantViolation::NestedFolder {
                        folder: *id,
                        child: *child_id,
                    });
                }
                if child.parent != Some(*id) {
                    return Err(InvariantViolation::ParentMismatch(*child_id));
                }
                if child.position.is_some() {
                    return Err(InvariantViolation::PositionMismatch(*child_id));
                }
                if !child.children.is_empty() {
                    return Err(InvariantViolation::ChildrenOnNonFolder(*child_id));
                }
            }
        }

        if let Some(orphan) = self.records.keys().find(|id| !seen.contains(*id)) {
            return Err(InvariantViolation::Orphaned(*orphan));
        }
        Ok(())
    }
}
