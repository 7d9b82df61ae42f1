//! Map saving.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::codec;
use crate::error::MapError;
use crate::map::cell::to_layer_id;
use crate::map::{MapDocument, SavedCell, SavedMap};

use super::helpers::{ensure_parent_directory, map_name, with_map_extension, write_replacing};

impl SavedMap {
    /// Captures `document` and its sheet in file form.
    pub fn from_document(document: &MapDocument) -> Result<Self, MapError> {
        let sheet = document.sheet();
        let png = sheet.encode_png()?;

        let tiles = document
            .cells()
            .map(|(_, _, cell)| SavedCell {
                tile_layer_id: to_layer_id(cell.tile),
                object_layer_id: to_layer_id(cell.object),
                collision_layer_id: u8::from(cell.collidable),
            })
            .collect();

        Ok(SavedMap {
            tilesheet_image: codec::encode(&png),
            map_width: document.width(),
            map_height: document.height(),
            tile_width: sheet.tile_width(),
            tile_height: sheet.tile_height(),
            transparent_color: sheet.transparent_color().into(),
            tiles,
        })
    }
}

/// Serializes `document` as indented map XML.
pub fn save_to_string(document: &MapDocument) -> Result<String, MapError> {
    let saved_map = SavedMap::from_document(document)?;

    let mut xml = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut xml);
    serializer.indent(' ', 2);
    saved_map
        .serialize(serializer)
        .map_err(|e| MapError::format(format!("Failed to serialize map: {}", e)))?;

    debug!(
        "Serialized {}x{} map ({} bytes)",
        document.width(),
        document.height(),
        xml.len()
    );
    Ok(xml)
}

/// Writes `document` to `path`, adding the `.tmf` extension when missing.
///
/// An existing file is only replaced once the new contents are fully
/// written. Returns the path actually written.
pub fn save_document(document: &MapDocument, path: impl AsRef<Path>) -> Result<PathBuf, MapError> {
    let path = with_map_extension(path.as_ref());
    let xml = save_to_string(document)?;

    ensure_parent_directory(&path)?;
    write_replacing(&path, xml.as_bytes())?;

    info!("Map '{}' saved to {:?}", map_name(&path), path);
    Ok(path)
}
