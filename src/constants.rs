//! Application-wide constants.
//!
//! Centralizes magic numbers and defaults so the store, the interaction
//! layer and the upload path agree on them.

// ============================================================================
// Persistence
// ============================================================================

/// Blob-store key the collection is saved under
pub const DEFAULT_STORAGE_KEY: &str = "grid-items-v1";

/// Directory name used under the platform config/data directories
pub const APP_DIR_NAME: &str = "gridboard";

/// Settings file name inside the config directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

// ============================================================================
// Uploads
// ============================================================================

/// Where a batch lands when no explicit drop point is given (e.g. file picker)
pub const DEFAULT_DROP_ORIGIN: (f64, f64) = (40.0, 40.0);

/// Diagonal offset between co-dropped files so they don't fully overlap
pub const UPLOAD_STAGGER_STEP: f64 = 24.0;

/// Upload endpoint path appended to the configured API base
pub const UPLOAD_ENDPOINT: &str = "/api/upload";

/// Multipart field name the upload service expects
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Subdirectory of the data directory used by the local uploader
pub const LOCAL_UPLOADS_DIR: &str = "uploads";

/// Content type used when nothing better is known
pub const FALLBACK_MIME: &str = "application/octet-stream";

// ============================================================================
// Items
// ============================================================================

/// Name given to folders created without one
pub const DEFAULT_FOLDER_NAME: &str = "New Folder";

/// Hit area of a top-level tile in canvas units, used for drop targeting
pub const ITEM_TILE_SIZE: (f64, f64) = (120.0, 120.0);

// ============================================================================
// Profiling
// ============================================================================

/// Pointer-move handling slower than this is reported when profiling
pub const POINTER_MOVE_BUDGET_MS: f64 = 4.0;

/// Transfers slower than this are reported when profiling
pub const TRANSFER_BUDGET_MS: f64 = 2.0;
