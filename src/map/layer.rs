use std::fmt;

use serde::{Deserialize, Serialize};

/// The two catalogue-backed layers of a map cell.
///
/// Collision is a per-cell flag rather than a catalogue reference, so it has
/// no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Layer {
    /// Background tiles (floors, walls). Drawn first.
    #[default]
    Tile,
    /// Overlay sprites cut from cells containing transparency. Drawn on top.
    Object,
}

impl Layer {
    pub fn display_name(&self) -> &'static str {
        match self {
            Layer::Tile => "Tile",
            Layer::Object => "Object",
        }
    }

    /// Element name used for this layer's id inside a `<tile>` record.
    pub fn record_field(&self) -> &'static str {
        match self {
            Layer::Tile => "tile_layer_id",
            Layer::Object => "object_layer_id",
        }
    }

    /// File name prefix used when exporting catalogue entries.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Layer::Tile => "tile",
            Layer::Object => "object",
        }
    }

    /// Both layers, in draw order.
    pub fn all() -> &'static [Layer] {
        &[Layer::Tile, Layer::Object]
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
