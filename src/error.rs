use thiserror::Error;

use crate::codec::CodecError;
use crate::map::Layer;

/// Errors raised while building sheets, editing documents, or moving maps
/// to and from disk.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to decode embedded tile sheet: {0}")]
    Codec(#[from] CodecError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid map file: {0}")]
    Format(String),

    #[error("{layer} id {id} is out of range (catalogue has {available} entries)")]
    InvalidLayerId {
        layer: Layer,
        id: i64,
        available: usize,
    },

    #[error("Cell ({x}, {y}) is outside the {width}x{height} map")]
    CellOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Cell index {index} is outside the map ({len} cells)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error(
        "Layer data length mismatch: expected {expected} cells, got {tiles} tiles, {objects} objects, {collision} collision flags"
    )]
    LayerLength {
        expected: usize,
        tiles: usize,
        objects: usize,
        collision: usize,
    },

    #[error("Tile size must be at least 1x1, got {width}x{height}")]
    InvalidTileSize { width: u32, height: u32 },

    #[error("Map dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Map of {width}x{height} cells is too large (limit is {limit} cells)")]
    TooLarge { width: u32, height: u32, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MapError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        MapError::Format(message.into())
    }
}
