//! Error types for board operations
//!
//! Uploads and persistence are best-effort: their errors are reported to the
//! caller or logged, never allowed to corrupt the in-memory collection.
//! Invariant violations are prevented by construction and only surface from
//! [`crate::store::ItemStore::validate`] and while sanitizing loaded data.

use crate::types::ItemId;
use thiserror::Error;

/// Errors from the external upload collaborator
#[derive(Error, Debug)]
pub enum UploadError {
    /// IO error reading or copying the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upload service answered with a non-success status
    #[error("Upload of {name} failed with status {status}")]
    Status { name: String, status: u16 },

    /// Upload service answered with something we could not understand
    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors from the blob store backing persistence
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Atomic replace of the stored blob failed
    #[error("Failed to persist blob: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Backend refused the operation (quota, unavailable medium, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A structural rule of the item collection that does not hold
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// An identity appears in more than one place
    #[error("Item {0} appears more than once")]
    DuplicateId(ItemId),

    /// A folder was found inside another folder
    #[error("Folder {child} is nested inside folder {folder}")]
    NestedFolder { folder: ItemId, child: ItemId },

    /// A non-folder item owns children
    #[error("Item {0} is not a folder but has children")]
    ChildrenOnNonFolder(ItemId),

    /// An item's parent link disagrees with the container holding it
    #[error("Item {0} has a parent link that does not match its container")]
    ParentMismatch(ItemId),

    /// A container references an id with no record
    #[error("Container references missing item {0}")]
    DanglingReference(ItemId),

    /// A record is not held by any container
    #[error("Item {0} is not held by any container")]
    Orphaned(ItemId),

    /// Top-level items must carry a position, children must not
    #[error("Item {0} has a position inconsistent with its container")]
    PositionMismatch(ItemId),
}
