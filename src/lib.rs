//! Gridboard - a spatial board of uploaded files and one-level folders.
//!
//! Items sit at free positions on a canvas. Folders hold other items, but
//! never other folders. Items move between the canvas and folders by
//! dragging; the whole collection is saved after every change.

pub mod board;
pub mod constants;
pub mod error;
pub mod input;
pub mod logging;
pub mod perf;
pub mod persistence;
pub mod settings;
pub mod spatial_index;
pub mod store;
pub mod transfer;
pub mod types;
pub mod upload;

pub use board::Board;
pub use error::{InvariantViolation, PersistenceError, UploadError};
pub use store::ItemStore;
pub use transfer::{TransferOutcome, TransferRejection};
pub use types::{Collection, DragPayload, DropTarget, Item, ItemId, ItemKind, Position};
