//! Spatial Index Module
//!
//! R-tree over the tiles of top-level items, used to resolve which folder (if
//! any) sits under the pointer when something is dropped on the canvas.

use crate::constants::ITEM_TILE_SIZE;
use crate::types::{ItemId, Position};
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;
use tracing::warn;

/// Bounding box of one tile on the canvas.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub item_id: ItemId,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl SpatialEntry {
    pub fn new(item_id: ItemId, position: Position, size: (f64, f64)) -> Self {
        Self {
            item_id,
            min_x: position.x,
            min_y: position.y,
            max_x: position.x + size.0,
            max_y: position.y + size.1,
        }
    }

    /// A standard-size tile with its top-left corner at `position`.
    pub fn tile(item_id: ItemId, position: Position) -> Self {
        Self::new(item_id, position, ITEM_TILE_SIZE)
    }

    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.item_id == other.item_id
    }
}

/// Spatial index over item tiles.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    entries: HashMap<ItemId, SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or move the tile for `item_id`. A non-finite position only
    /// removes the old tile; the R-tree cannot hold NaN envelopes.
    pub fn insert(&mut self, item_id: ItemId, position: Position) {
        if let Some(old_entry) = self.entries.remove(&item_id) {
            self.tree.remove(&old_entry);
        }
        if !position.is_finite() {
            warn!("Not indexing {} at non-finite {:?}", item_id, position);
            return;
        }

        let entry = SpatialEntry::tile(item_id, position);
        self.tree.insert(entry);
        self.entries.insert(item_id, entry);
    }

    pub fn remove(&mut self, item_id: ItemId) -> bool {
        if let Some(entry) = self.entries.remove(&item_id) {
            self.tree.remove(&entry);
            true
        } else {
            false
        }
    }

    /// All tiles containing the given canvas point.
    pub fn query_point(&self, x: f64, y: f64) -> Vec<ItemId> {
        let point_envelope = AABB::from_point([x, y]);

        self.tree
            .locate_in_envelope_intersecting(&point_envelope)
            .filter(|entry| entry.contains_point(x, y))
            .map(|entry| entry.item_id)
            .collect()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.entries.contains_key(&item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the whole index from `(id, position)` pairs. Tiles at
    /// non-finite positions are skipped.
    pub fn rebuild<I>(&mut self, tiles: I)
    where
        I: Iterator<Item = (ItemId, Position)>,
    {
        let entries: Vec<SpatialEntry> = tiles
            .filter(|(id, position)| {
                let finite = position.is_finite();
                if !finite {
                    warn!("Not indexing {} at non-finite {:?}", id, position);
                }
                finite
            })
            .map(|(id, position)| SpatialEntry::tile(id, position))
            .collect();

        self.entries = entries.iter().map(|e| (e.item_id, *e)).collect();
        self.tree = RTree::bulk_load(entries);
    }
}
