//! Map loading.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::codec;
use crate::error::MapError;
use crate::map::cell::from_layer_id;
use crate::map::{Layer, MapDocument, SavedCell, SavedMap};
use crate::sheet::TileSheet;

use super::helpers::map_name;

/// Parsed per-cell layers, ready for [`MapDocument::set_layers`].
struct LayerData {
    tiles: Vec<Option<u32>>,
    objects: Vec<Option<u32>>,
    collision: Vec<bool>,
}

impl SavedMap {
    /// Rebuilds the sheet and document described by this file.
    ///
    /// The record count is checked before the embedded image is decoded; ids
    /// are checked against the freshly segmented catalogue.
    pub fn into_document(self) -> Result<MapDocument, MapError> {
        let expected = (self.map_width as usize)
            .checked_mul(self.map_height as usize)
            .ok_or_else(|| {
                MapError::format(format!(
                    "map dimensions {}x{} are too large",
                    self.map_width, self.map_height
                ))
            })?;

        if self.tiles.len() != expected {
            warn!(
                "Map declares {}x{} cells but has {} tile records",
                self.map_width,
                self.map_height,
                self.tiles.len()
            );
            return Err(MapError::format(format!(
                "expected {} tile records for a {}x{} map, found {}",
                expected,
                self.map_width,
                self.map_height,
                self.tiles.len()
            )));
        }

        let png = codec::decode(&self.tilesheet_image)?;
        let sheet = TileSheet::from_bytes(
            &png,
            self.tile_width,
            self.tile_height,
            self.transparent_color.into(),
        )?;
        debug!(
            "Rebuilt sheet: {} tiles, {} objects",
            sheet.tile_count(),
            sheet.object_count()
        );

        let layers = parse_records(&self.tiles, &sheet)?;

        let mut document = MapDocument::new(self.map_width, self.map_height, Arc::new(sheet))?;
        document.set_layers(layers.tiles, layers.objects, layers.collision)?;
        Ok(document)
    }
}

fn parse_records(records: &[SavedCell], sheet: &TileSheet) -> Result<LayerData, MapError> {
    let mut layers = LayerData {
        tiles: Vec::with_capacity(records.len()),
        objects: Vec::with_capacity(records.len()),
        collision: Vec::with_capacity(records.len()),
    };

    for (index, record) in records.iter().enumerate() {
        layers
            .tiles
            .push(parse_layer_id(sheet, index, Layer::Tile, record.tile_layer_id)?);
        layers
            .objects
            .push(parse_layer_id(sheet, index, Layer::Object, record.object_layer_id)?);

        let collidable = match record.collision_layer_id {
            0 => false,
            1 => true,
            other => {
                return Err(MapError::format(format!(
                    "tile record {} has collision_layer_id {}, expected 0 or 1",
                    index, other
                )));
            }
        };
        layers.collision.push(collidable);
    }

    Ok(layers)
}

fn parse_layer_id(
    sheet: &TileSheet,
    index: usize,
    layer: Layer,
    raw: i64,
) -> Result<Option<u32>, MapError> {
    from_layer_id(raw).map_err(|id| {
        warn!(
            "Tile record {} has invalid {} {}",
            index,
            layer.record_field(),
            id
        );
        MapError::InvalidLayerId {
            layer,
            id,
            available: sheet.catalogue_len(layer),
        }
    })
}

/// Parses map XML into a document. Nothing is returned unless every check
/// passes.
pub fn load_from_str(xml: &str) -> Result<MapDocument, MapError> {
    let saved_map: SavedMap = quick_xml::de::from_str(xml)
        .map_err(|e| MapError::format(format!("Failed to parse map file: {}", e)))?;
    saved_map.into_document()
}

/// Reads and parses the map file at `path`.
pub fn load_document(path: impl AsRef<Path>) -> Result<MapDocument, MapError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)?;
    let document = load_from_str(&xml)?;

    info!(
        "Map '{}' loaded from {:?} ({}x{})",
        map_name(path),
        path,
        document.width(),
        document.height()
    );
    Ok(document)
}
