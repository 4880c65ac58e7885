//! Saving and loading the collection through a key-value blob store.
//!
//! The in-memory store is authoritative for the session. Persistence is
//! best-effort: read failures start an empty board, write failures (quota,
//! missing medium, ...) are logged and otherwise ignored.
//!
//! ## Wire format
//!
//! An ordered JSON array of items with camelCase keys:
//! `{id, name, type, url, mime?, x, y, parentFolderId, children?}`.
//! Folders always carry `children`; children are written with `x = y = 0`
//! and `parentFolderId` set to their folder. Collections saved before folders
//! existed (no `parentFolderId`/`children`) load as plain top-level items.

use crate::constants::APP_DIR_NAME;
use crate::error::{PersistenceError, PersistenceResult};
use crate::types::{Collection, Item, ItemId, ItemKind, Position, ResourceRef};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ============================================================================
// Wire format
// ============================================================================

/// One item as written to the blob store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub parent_folder_id: Option<ItemId>,
    #[serde(
        default,
        deserialize_with = "lenient_children",
        skip_serializing_if = "Option::is_none"
    )]
    pub children: Option<Vec<StoredItem>>,
}

impl StoredItem {
    pub fn from_item(item: &Item) -> Self {
        let position = item.position.unwrap_or_default();
        Self {
            id: item.id,
            name: item.name.clone(),
            kind: item.kind,
            url: item.resource.as_ref().map(|r| r.url.clone()),
            mime: item.resource.as_ref().and_then(|r| r.mime.clone()),
            x: Some(finite_or_zero(Some(position.x))),
            y: Some(finite_or_zero(Some(position.y))),
            parent_folder_id: item.parent_folder_id,
            children: item
                .is_folder()
                .then(|| item.children.iter().map(StoredItem::from_item).collect()),
        }
    }

    /// Convert back to a domain item. The containing folder, not the stored
    /// `parentFolderId`, decides the parent link and whether `x`/`y` count.
    pub fn into_item(self, parent: Option<ItemId>) -> Item {
        let id = self.id;
        Item {
            id,
            name: self.name,
            kind: self.kind,
            resource: self.url.map(|url| ResourceRef { url, mime: self.mime }),
            position: parent
                .is_none()
                .then(|| Position::new(finite_or_zero(self.x), finite_or_zero(self.y))),
            parent_folder_id: parent,
            children: self
                .children
                .unwrap_or_default()
                .into_iter()
                .map(|child| child.into_item(Some(id)))
                .collect(),
        }
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse each entry on its own, dropping (and logging) the ones that fail.
fn decode_lenient(values: Vec<serde_json::Value>) -> Vec<StoredItem> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping unreadable saved entry {}: {}", i, e);
                None
            }
        })
        .collect()
}

fn lenient_children<'de, D>(deserializer: D) -> Result<Option<Vec<StoredItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(values.map(decode_lenient))
}

/// Serialize a collection to its JSON wire form.
pub fn encode_collection(collection: &Collection) -> serde_json::Result<String> {
    let stored: Vec<StoredItem> = collection.items.iter().map(StoredItem::from_item).collect();
    serde_json::to_string(&stored)
}

/// Parse a collection from its JSON wire form.
///
/// Fails only when the blob is not a JSON array; unreadable entries inside
/// it are skipped.
pub fn decode_collection(json: &str) -> serde_json::Result<Collection> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    Ok(Collection::new(
        decode_lenient(values)
            .into_iter()
            .map(|item| item.into_item(None))
            .collect(),
    ))
}

// ============================================================================
// Blob stores
// ============================================================================

/// Key-value storage for serialized collections.
pub trait BlobStore: Send + Sync {
    /// Read the blob under `key`, `None` if nothing was ever saved.
    fn load(&self, key: &str) -> PersistenceResult<Option<String>>;

    /// Replace the blob under `key`.
    fn save(&self, key: &str, json: &str) -> PersistenceResult<()>;
}

/// Stores each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_dir>/gridboard`, if the platform has a data directory.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(APP_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self, key: &str) -> PersistenceResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn save(&self, key: &str, json: &str) -> PersistenceResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        // Write to a sibling temp file and rename so a crash never leaves half a blob
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key))?;
        Ok(())
    }
}

/// In-memory blob store, optionally with a byte quota.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse writes whose blob would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, json: impl Into<String>) {
        self.blobs.lock().insert(key.to_string(), json.into());
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, json: &str) -> PersistenceResult<()> {
        if let Some(quota) = self.quota {
            if json.len() > quota {
                return Err(PersistenceError::Unavailable(format!(
                    "quota of {} bytes exceeded ({} bytes)",
                    quota,
                    json.len()
                )));
            }
        }
        self.insert(key, json);
        Ok(())
    }
}

impl<T: BlobStore + ?Sized> BlobStore for std::sync::Arc<T> {
    fn load(&self, key: &str) -> PersistenceResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, json: &str) -> PersistenceResult<()> {
        (**self).save(key, json)
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// Saves the collection after every change and restores it on startup.
pub struct PersistenceBridge {
    store: Box<dyn BlobStore>,
    key: String,
}

impl PersistenceBridge {
    pub fn new(store: impl BlobStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The saved collection, or an empty one if nothing usable is stored.
    pub fn load(&self) -> Collection {
        match self.try_load() {
            Ok(Some(collection)) => {
                info!("Loaded {} top-level items from '{}'", collection.len(), self.key);
                collection
            }
            Ok(None) => {
                debug!("Nothing stored under '{}', starting empty", self.key);
                Collection::default()
            }
            Err(e) => {
                warn!("Failed to load '{}', starting empty: {}", self.key, e);
                Collection::default()
            }
        }
    }

    fn try_load(&self) -> PersistenceResult<Option<Collection>> {
        match self.store.load(&self.key)? {
            Some(json) => Ok(Some(decode_collection(&json)?)),
            None => Ok(None),
        }
    }

    /// Save `collection`. Failures are logged and swallowed; returns whether
    /// the write went through.
    pub fn save(&self, collection: &Collection) -> bool {
        let result = encode_collection(collection)
            .map_err(PersistenceError::from)
            .and_then(|json| self.store.save(&self.key, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save '{}': {}", self.key, e);
                false
            }
        }
    }
}
