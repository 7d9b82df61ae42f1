pub(crate) mod cell;
mod document;
mod layer;
mod map_data;
pub mod persistence;

pub use cell::Cell;
pub use document::{LayerStats, MapDocument};
pub use layer::Layer;
pub use map_data::{SavedCell, SavedColor, SavedMap};
pub use persistence::{load_document, load_from_str, save_document, save_to_string};
