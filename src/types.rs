//! Core types for the board item model.
//!
//! This module defines the data structures shared by the store, the transfer
//! engine and the interaction layer: item identities, item kinds, positions,
//! upload references and the drag payload exchanged during drag-and-drop.

use crate::constants::FALLBACK_MIME;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::path::Path;
use uuid::Uuid;

// ============================================================================
// Identity
// ============================================================================

/// Opaque, immutable identity of an item. Assigned once at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::str::FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A point in canvas-local coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are real numbers (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ============================================================================
// Items
// ============================================================================

/// What an item is. Fixed for the item's lifetime.
///
/// Images render as thumbnails, plain files as icons and folders as
/// containers for other items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Image,
    File,
    Folder,
}

impl ItemKind {
    /// Classify an uploaded artifact by its reported content type.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            ItemKind::Image
        } else {
            ItemKind::File
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, ItemKind::Folder)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Image => "IMAGE",
            ItemKind::File => "FILE",
            ItemKind::Folder => "FOLDER",
        }
    }
}

/// Reference to an uploaded artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub url: String,
    pub mime: Option<String>,
}

impl ResourceRef {
    pub fn new(url: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime: Some(mime.into()),
        }
    }
}

/// An item placed on the board, either directly on the canvas or inside a folder.
///
/// This is the snapshot form handed out by the store: folders carry their
/// children inline. `position` is `Some` exactly when the item is top-level.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Absent for folders
    pub resource: Option<ResourceRef>,
    pub position: Option<Position>,
    pub parent_folder_id: Option<ItemId>,
    /// Only ever non-empty for folders
    pub children: Vec<Item>,
}

impl Item {
    /// A new top-level item backed by an uploaded artifact.
    pub fn uploaded(id: ItemId, name: impl Into<String>, resource: ResourceRef, at: Position) -> Self {
        let kind = ItemKind::from_mime(resource.mime.as_deref().unwrap_or_default());
        Self {
            id,
            name: name.into(),
            kind,
            resource: Some(resource),
            position: Some(at),
            parent_folder_id: None,
            children: Vec::new(),
        }
    }

    /// A new, empty top-level folder.
    pub fn folder(id: ItemId, name: impl Into<String>, at: Position) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ItemKind::Folder,
            resource: None,
            position: Some(at),
            parent_folder_id: None,
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_folder_id.is_none()
    }

    pub fn url(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| r.url.as_str())
    }
}

/// The full ordered sequence of top-level items (folders carry their children).
///
/// This is the unit of persistence and the immutable snapshot handed to
/// observers after every mutation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collection {
    pub items: Vec<Item>,
}

impl Collection {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find an item anywhere in the collection, including folder children.
    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find_map(|item| {
            if item.id == id {
                Some(item)
            } else {
                item.children.iter().find(|child| child.id == id)
            }
        })
    }

    /// Iterate every item, depth-first, top-level items before their children.
    pub fn iter_all(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .flat_map(|item| std::iter::once(item).chain(item.children.iter()))
    }

    /// Total number of items including folder children.
    pub fn total_count(&self) -> usize {
        self.iter_all().count()
    }
}

/// Which container currently owns an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    TopLevel,
    Folder(ItemId),
}

// ============================================================================
// Drag and drop
// ============================================================================

/// What is being dragged, as carried in a drag-and-drop transfer buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragPayload {
    #[serde(rename_all = "camelCase")]
    TopLevelItem { id: ItemId },
    #[serde(rename_all = "camelCase")]
    FolderChild { folder_id: ItemId, child_id: ItemId },
}

impl DragPayload {
    /// Encode for a string-typed transfer buffer.
    pub fn encode(&self) -> String {
        // Serializing a plain enum of ids cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode a transfer buffer. Foreign or malformed payloads yield `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// The id of the item being moved.
    pub fn item_id(&self) -> ItemId {
        match self {
            DragPayload::TopLevelItem { id } => *id,
            DragPayload::FolderChild { child_id, .. } => *child_id,
        }
    }
}

/// Where a dragged item was released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DropTarget {
    /// Empty canvas at the given canvas-local point
    Canvas(Position),
    /// On top of a folder tile
    Folder(ItemId),
}

// ============================================================================
// Uploads
// ============================================================================

/// A file selected or dropped by the user, not yet uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its content type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string());
        let mime = path
            .extension()
            .and_then(|s| s.to_str())
            .and_then(mime_from_extension)
            .unwrap_or(FALLBACK_MIME);
        Ok(Self::new(name, mime, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// What the upload service reports back for a stored file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    pub original_name: String,
    pub mime: String,
    #[serde(default)]
    pub size: u64,
}

/// Get a content type from a file extension
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "ico" => Some("image/x-icon"),
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "csv" => Some("text/csv"),
        "html" | "htm" => Some("text/html"),
        "css" => Some("text/css"),
        "js" => Some("text/javascript"),
        "json" => Some("application/json"),
        "xml" => Some("application/xml"),
        "zip" => Some("application/zip"),
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        "py" => Some("text/x-python"),
        "rs" => Some("text/x-rust"),
        _ => None,
    }
}
