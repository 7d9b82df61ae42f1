//! Sprite sheet segmentation.
//!
//! A [`TileSheet`] owns the raw sheet image and the catalogue derived from it.
//! The sheet is cut into a grid of `tile_width x tile_height` cells scanned
//! row by row. Each cell containing the transparent key color or a fully
//! transparent pixel becomes an object; every other cell becomes a tile.
//! Segmentation runs once, inside the constructor, and is deterministic, so
//! map files can refer to catalogue entries by index alone.

mod color;


pub use color::RgbColor;

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use tracing::debug;

use crate::error::MapError;
use crate::map::Layer;

/// One catalogue entry and the sheet cell it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub image: RgbaImage,
    pub column: u32,
    pub row: u32,
}

#[derive(Debug, Clone)]
pub struct TileSheet {
    raw: RgbaImage,
    tile_width: u32,
    tile_height: u32,
    transparent_color: RgbColor,
    tiles: Vec<Tile>,
    objects: Vec<Tile>,
}

impl TileSheet {
    /// Segments `image` into the tile and object catalogues.
    pub fn new(
        image: RgbaImage,
        tile_width: u32,
        tile_height: u32,
        transparent_color: RgbColor,
    ) -> Result<Self, MapError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(MapError::InvalidTileSize {
                width: tile_width,
                height: tile_height,
            });
        }

        let mut sheet = Self {
            raw: image,
            tile_width,
            tile_height,
            transparent_color,
            tiles: Vec::new(),
            objects: Vec::new(),
        };
        sheet.split();

        debug!(
            "Segmented {}x{} sheet into {} tiles and {} objects ({}x{} cells)",
            sheet.raw.width(),
            sheet.raw.height(),
            sheet.tiles.len(),
            sheet.objects.len(),
            tile_width,
            tile_height
        );

        Ok(sheet)
    }

    /// Converts any decoded image to RGBA before segmenting it.
    pub fn from_image(
        image: DynamicImage,
        tile_width: u32,
        tile_height: u32,
        transparent_color: RgbColor,
    ) -> Result<Self, MapError> {
        Self::new(image.to_rgba8(), tile_width, tile_height, transparent_color)
    }

    /// Decodes an encoded image (PNG, JPEG, ...) held in memory.
    pub fn from_bytes(
        bytes: &[u8],
        tile_width: u32,
        tile_height: u32,
        transparent_color: RgbColor,
    ) -> Result<Self, MapError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(image, tile_width, tile_height, transparent_color)
    }

    /// Reads and decodes a sheet image file.
    pub fn open(
        path: impl AsRef<Path>,
        tile_width: u32,
        tile_height: u32,
        transparent_color: RgbColor,
    ) -> Result<Self, MapError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let sheet = Self::from_bytes(&bytes, tile_width, tile_height, transparent_color)?;
        debug!("Opened tile sheet {:?}", path);
        Ok(sheet)
    }

    fn split(&mut self) {
        let columns = self.columns();
        let rows = self.rows();

        for row in 0..rows {
            for column in 0..columns {
                let mut image = imageops::crop_imm(
                    &self.raw,
                    column * self.tile_width,
                    row * self.tile_height,
                    self.tile_width,
                    self.tile_height,
                )
                .to_image();

                if is_object_tile(&image, self.transparent_color) {
                    make_transparent(&mut image, self.transparent_color);
                    self.objects.push(Tile { image, column, row });
                } else {
                    self.tiles.push(Tile { image, column, row });
                }
            }
        }
    }

    /// The sheet as it was loaded, before segmentation.
    pub fn raw_image(&self) -> &RgbaImage {
        &self.raw
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn transparent_color(&self) -> RgbColor {
        self.transparent_color
    }

    /// Whole cells per sheet row; a narrower trailing strip is ignored.
    pub fn columns(&self) -> u32 {
        self.raw.width() / self.tile_width
    }

    /// Whole cells per sheet column; a shorter trailing strip is ignored.
    pub fn rows(&self) -> u32 {
        self.raw.height() / self.tile_height
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn objects(&self) -> &[Tile] {
        &self.objects
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn catalogue(&self, layer: Layer) -> &[Tile] {
        match layer {
            Layer::Tile => &self.tiles,
            Layer::Object => &self.objects,
        }
    }

    pub fn catalogue_len(&self, layer: Layer) -> usize {
        self.catalogue(layer).len()
    }

    /// Checks that `id` names an entry of `layer`'s catalogue.
    pub fn validate_id(&self, layer: Layer, id: u32) -> Result<(), MapError> {
        let available = self.catalogue_len(layer);
        if (id as usize) < available {
            Ok(())
        } else {
            Err(MapError::InvalidLayerId {
                layer,
                id: i64::from(id),
                available,
            })
        }
    }

    /// Image of catalogue entry `id` on `layer`.
    pub fn tile_image(&self, layer: Layer, id: u32) -> Result<&RgbaImage, MapError> {
        self.validate_id(layer, id)?;
        Ok(&self.catalogue(layer)[id as usize].image)
    }

    /// Lossless PNG encoding of the raw sheet, used when saving maps.
    pub fn encode_png(&self) -> Result<Vec<u8>, MapError> {
        let mut bytes = Vec::new();
        self.raw
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// An object tile has at least one key-colored or fully transparent pixel.
fn is_object_tile(image: &RgbaImage, key: RgbColor) -> bool {
    image
        .pixels()
        .any(|pixel| key.matches(pixel) || pixel.0[3] == 0)
}

/// Replaces every key-colored pixel with transparent white.
fn make_transparent(image: &mut RgbaImage, key: RgbColor) {
    let clear = RgbColor::WHITE.with_alpha(0);
    for pixel in image.pixels_mut() {
        if key.matches(pixel) {
            *pixel = clear;
        }
    }
}
