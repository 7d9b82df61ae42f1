//! Core of a 2D tile map editor.
//!
//! A sprite sheet is cut into a grid of cells and classified into a tile
//! catalogue (opaque terrain) and an object catalogue (cells carrying the
//! transparent key color). A [`MapDocument`] paints catalogue indices onto a
//! grid with a tile layer, an object layer and a collision layer, and
//! [`map::persistence`] moves documents to and from self-contained `.tmf`
//! XML files with the sheet embedded as base64 PNG.

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod map;
pub mod paths;
pub mod sheet;

pub use codec::CodecError;
pub use error::MapError;
pub use map::{
    Cell, Layer, LayerStats, MapDocument, load_document, load_from_str, save_document,
    save_to_string,
};
pub use sheet::{RgbColor, Tile, TileSheet};
