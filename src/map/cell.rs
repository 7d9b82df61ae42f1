use serde::{Deserialize, Serialize};

use super::Layer;
use crate::constants::EMPTY_LAYER_ID;

/// One map grid position.
///
/// `None` means the layer is empty. Files store that as `-1` on both layers,
/// so object id `0` always refers to the first object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub tile: Option<u32>,
    pub object: Option<u32>,
    pub collidable: bool,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        tile: None,
        object: None,
        collidable: false,
    };

    pub fn new(tile: Option<u32>, object: Option<u32>, collidable: bool) -> Self {
        Self {
            tile,
            object,
            collidable,
        }
    }

    pub fn layer(&self, layer: Layer) -> Option<u32> {
        match layer {
            Layer::Tile => self.tile,
            Layer::Object => self.object,
        }
    }

    pub fn set_layer(&mut self, layer: Layer, id: Option<u32>) {
        match layer {
            Layer::Tile => self.tile = id,
            Layer::Object => self.object = id,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Cell::EMPTY
    }
}

/// Converts an in-memory layer reference to its on-disk id.
pub fn to_layer_id(id: Option<u32>) -> i64 {
    id.map_or(EMPTY_LAYER_ID, i64::from)
}

/// Converts an on-disk id back to a layer reference.
///
/// Returns `Err(raw)` for negative ids other than the empty sentinel and for
/// ids too large to index a catalogue.
pub fn from_layer_id(raw: i64) -> Result<Option<u32>, i64> {
    if raw == EMPTY_LAYER_ID {
        return Ok(None);
    }
    u32::try_from(raw).map(Some).map_err(|_| raw)
}
