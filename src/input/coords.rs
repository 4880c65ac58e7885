//! Coordinate conversion between client (window) space and canvas space.

use crate::types::Position;

/// The canvas element's current bounding box in client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

pub struct CoordinateConverter;

impl CoordinateConverter {
    /// Convert a client position to canvas-local coordinates.
    ///
    /// Malformed bounds (NaN) propagate into the result.
    #[inline]
    pub fn to_local(bounds: &CanvasBounds, client_x: f64, client_y: f64) -> Position {
        Position::new(client_x - bounds.left, client_y - bounds.top)
    }

    /// Convert a canvas-local position back to client coordinates
    #[inline]
    pub fn to_client(bounds: &CanvasBounds, local: Position) -> (f64, f64) {
        (local.x + bounds.left, local.y + bounds.top)
    }
}
