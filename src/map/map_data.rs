use serde::{Deserialize, Serialize};

use crate::sheet::RgbColor;

/// On-disk shape of a `.tmf` map file.
///
/// Serialized as an XML document with `<map>` as its root. Every field is
/// required on load; the `tile` records may appear in any position relative
/// to the scalar fields but must be in row-major order among themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "map")]
pub struct SavedMap {
    /// Base64 of the raw sheet, PNG encoded.
    pub tilesheet_image: String,
    pub map_width: u32,
    pub map_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub transparent_color: SavedColor,
    #[serde(rename = "tile", default)]
    pub tiles: Vec<SavedCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl From<RgbColor> for SavedColor {
    fn from(color: RgbColor) -> Self {
        Self {
            red: color.red,
            green: color.green,
            blue: color.blue,
        }
    }
}

impl From<SavedColor> for RgbColor {
    fn from(saved: SavedColor) -> Self {
        RgbColor::new(saved.red, saved.green, saved.blue)
    }
}

/// One grid cell. Ids of `-1` mean the layer is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCell {
    pub tile_layer_id: i64,
    pub object_layer_id: i64,
    /// `0` or `1`.
    pub collision_layer_id: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_map() -> SavedMap {
        SavedMap {
            tilesheet_image: "iVBORw0KGgo=".to_string(),
            map_width: 2,
            map_height: 1,
            tile_width: 32,
            tile_height: 32,
            transparent_color: SavedColor {
                red: 255,
                green: 0,
                blue: 255,
            },
            tiles: vec![
                SavedCell {
                    tile_layer_id: 0,
                    object_layer_id: -1,
                    collision_layer_id: 0,
                },
                SavedCell {
                    tile_layer_id: -1,
                    object_layer_id: 0,
                    collision_layer_id: 1,
                },
            ],
        }
    }

    #[test]
    fn test_saved_color_conversion() {
        let color = RgbColor::new(1, 2, 3);
        let saved = SavedColor::from(color);
        assert_eq!((saved.red, saved.green, saved.blue), (1, 2, 3));
        assert_eq!(RgbColor::from(saved), color);
    }

    #[test]
    fn test_saved_map_serializes_with_map_root() {
        let xml = quick_xml::se::to_string(&saved_map()).unwrap();
        assert!(xml.starts_with("<map>"));
        assert!(xml.ends_with("</map>"));
        assert!(xml.contains("<map_width>2</map_width>"));
        assert!(xml.contains(
            "<transparent_color><red>255</red><green>0</green><blue>255</blue></transparent_color>"
        ));
        assert!(xml.contains(
            "<tile><tile_layer_id>-1</tile_layer_id><object_layer_id>0</object_layer_id><collision_layer_id>1</collision_layer_id></tile>"
        ));
    }

    #[test]
    fn test_saved_map_xml_roundtrip() {
        let original = saved_map();
        let xml = quick_xml::se::to_string(&original).unwrap();
        let parsed: SavedMap = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_saved_map_fields_are_order_insensitive() {
        let xml = r#"<map>
            <tile><tile_layer_id>3</tile_layer_id><object_layer_id>-1</object_layer_id><collision_layer_id>0</collision_layer_id></tile>
            <transparent_color><blue>7</blue><green>8</green><red>9</red></transparent_color>
            <tile_height>16</tile_height>
            <tile_width>16</tile_width>
            <map_height>1</map_height>
            <map_width>1</map_width>
            <tilesheet_image>QUJD</tilesheet_image>
        </map>"#;

        let parsed: SavedMap = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.map_width, 1);
        assert_eq!(parsed.tile_width, 16);
        assert_eq!(parsed.tilesheet_image, "QUJD");
        assert_eq!(RgbColor::from(parsed.transparent_color), RgbColor::new(9, 8, 7));
        assert_eq!(parsed.tiles.len(), 1);
        assert_eq!(parsed.tiles[0].tile_layer_id, 3);
    }

    #[test]
    fn test_saved_map_missing_field_fails() {
        let xml = "<map><map_width>1</map_width></map>";
        assert!(quick_xml::de::from_str::<SavedMap>(xml).is_err());
    }
}
