use std::sync::Arc;

use super::{Cell, Layer};
use crate::constants::MAX_MAP_CELLS;
use crate::error::MapError;
use crate::sheet::TileSheet;

/// A rectangular map grid bound to the sheet its ids refer to.
///
/// Cells are stored as three parallel row-major layers
/// (`index = y * width + x`). Every write validates ids against the sheet's
/// catalogue, so a document never holds an id its sheet cannot resolve.
#[derive(Debug, Clone)]
pub struct MapDocument {
    width: u32,
    height: u32,
    sheet: Arc<TileSheet>,
    tile_layer: Vec<Option<u32>>,
    object_layer: Vec<Option<u32>>,
    collision_layer: Vec<bool>,
}

/// Per-layer occupancy counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerStats {
    pub tiles: usize,
    pub objects: usize,
    pub collidable: usize,
}

impl MapDocument {
    /// Creates a map with every cell empty and passable.
    ///
    /// Grids above [`MAX_MAP_CELLS`] cells, or ones the allocator refuses,
    /// are rejected with [`MapError::TooLarge`].
    pub fn new(width: u32, height: u32, sheet: Arc<TileSheet>) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidDimensions { width, height });
        }
        let len = match (width as usize).checked_mul(height as usize) {
            Some(len) if len <= MAX_MAP_CELLS => len,
            _ => return Err(too_large_error(width, height)),
        };

        Ok(Self {
            width,
            height,
            sheet,
            tile_layer: filled_layer(len, None).ok_or_else(|| too_large_error(width, height))?,
            object_layer: filled_layer(len, None).ok_or_else(|| too_large_error(width, height))?,
            collision_layer: filled_layer(len, false)
                .ok_or_else(|| too_large_error(width, height))?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells (`width * height`).
    pub fn len(&self) -> usize {
        self.tile_layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sheet(&self) -> &Arc<TileSheet> {
        &self.sheet
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn position_of(&self, index: usize) -> Option<(u32, u32)> {
        (index < self.len()).then(|| {
            let width = self.width as usize;
            ((index % width) as u32, (index / width) as u32)
        })
    }

    fn checked_index(&self, x: u32, y: u32) -> Result<usize, MapError> {
        self.index_of(x, y).ok_or(MapError::CellOutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    fn checked_linear(&self, index: usize) -> Result<usize, MapError> {
        if index < self.len() {
            Ok(index)
        } else {
            Err(MapError::IndexOutOfBounds {
                index,
                len: self.len(),
            })
        }
    }

    fn validate_cell(&self, cell: &Cell) -> Result<(), MapError> {
        for &layer in Layer::all() {
            if let Some(id) = cell.layer(layer) {
                self.sheet.validate_id(layer, id)?;
            }
        }
        Ok(())
    }

    pub fn cell(&self, x: u32, y: u32) -> Result<Cell, MapError> {
        let index = self.checked_index(x, y)?;
        Ok(self.cell_unchecked(index))
    }

    pub fn cell_at(&self, index: usize) -> Result<Cell, MapError> {
        let index = self.checked_linear(index)?;
        Ok(self.cell_unchecked(index))
    }

    fn cell_unchecked(&self, index: usize) -> Cell {
        Cell {
            tile: self.tile_layer[index],
            object: self.object_layer[index],
            collidable: self.collision_layer[index],
        }
    }

    pub fn set_cell(&mut self, x: u32, y: u32, cell: Cell) -> Result<(), MapError> {
        let index = self.checked_index(x, y)?;
        self.validate_cell(&cell)?;
        self.write_unchecked(index, cell);
        Ok(())
    }

    pub fn set_cell_at(&mut self, index: usize, cell: Cell) -> Result<(), MapError> {
        let index = self.checked_linear(index)?;
        self.validate_cell(&cell)?;
        self.write_unchecked(index, cell);
        Ok(())
    }

    fn write_unchecked(&mut self, index: usize, cell: Cell) {
        self.tile_layer[index] = cell.tile;
        self.object_layer[index] = cell.object;
        self.collision_layer[index] = cell.collidable;
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Option<u32>> {
        match layer {
            Layer::Tile => &mut self.tile_layer,
            Layer::Object => &mut self.object_layer,
        }
    }

    /// Writes one layer of one cell, leaving the other layers untouched.
    pub fn set_layer_id(
        &mut self,
        x: u32,
        y: u32,
        layer: Layer,
        id: Option<u32>,
    ) -> Result<(), MapError> {
        let index = self.checked_index(x, y)?;
        if let Some(id) = id {
            self.sheet.validate_id(layer, id)?;
        }
        self.layer_mut(layer)[index] = id;
        Ok(())
    }

    pub fn set_tile(&mut self, x: u32, y: u32, id: Option<u32>) -> Result<(), MapError> {
        self.set_layer_id(x, y, Layer::Tile, id)
    }

    pub fn set_object(&mut self, x: u32, y: u32, id: Option<u32>) -> Result<(), MapError> {
        self.set_layer_id(x, y, Layer::Object, id)
    }

    pub fn set_collidable(&mut self, x: u32, y: u32, collidable: bool) -> Result<(), MapError> {
        let index = self.checked_index(x, y)?;
        self.collision_layer[index] = collidable;
        Ok(())
    }

    /// Paints `id` over a `size x size` square anchored at `(x, y)`, clipped
    /// to the grid. Returns the number of cells written.
    pub fn stamp(
        &mut self,
        x: u32,
        y: u32,
        size: u32,
        layer: Layer,
        id: Option<u32>,
    ) -> Result<usize, MapError> {
        self.checked_index(x, y)?;
        if let Some(id) = id {
            self.sheet.validate_id(layer, id)?;
        }

        let x_end = x.saturating_add(size).min(self.width);
        let y_end = y.saturating_add(size).min(self.height);
        let width = self.width as usize;
        let cells = self.layer_mut(layer);

        let mut written = 0;
        for row in y..y_end {
            for column in x..x_end {
                cells[row as usize * width + column as usize] = id;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Resets every cell to empty and passable.
    pub fn clear(&mut self) {
        self.tile_layer.fill(None);
        self.object_layer.fill(None);
        self.collision_layer.fill(false);
    }

    /// Row-major tile layer.
    pub fn tile_layer(&self) -> &[Option<u32>] {
        &self.tile_layer
    }

    /// Row-major object layer.
    pub fn object_layer(&self) -> &[Option<u32>] {
        &self.object_layer
    }

    /// Row-major collision flags.
    pub fn collision_layer(&self) -> &[bool] {
        &self.collision_layer
    }

    /// Replaces all three layers at once.
    ///
    /// Nothing is installed unless every array has `width * height` entries
    /// and every id resolves against the sheet.
    pub fn set_layers(
        &mut self,
        tiles: Vec<Option<u32>>,
        objects: Vec<Option<u32>>,
        collision: Vec<bool>,
    ) -> Result<(), MapError> {
        let expected = self.len();
        if tiles.len() != expected || objects.len() != expected || collision.len() != expected {
            return Err(MapError::LayerLength {
                expected,
                tiles: tiles.len(),
                objects: objects.len(),
                collision: collision.len(),
            });
        }

        for (layer, ids) in [(Layer::Tile, &tiles), (Layer::Object, &objects)] {
            for id in ids.iter().flatten() {
                self.sheet.validate_id(layer, *id)?;
            }
        }

        self.tile_layer = tiles;
        self.object_layer = objects;
        self.collision_layer = collision;
        Ok(())
    }

    /// Iterates `(x, y, cell)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, Cell)> + '_ {
        (0..self.len()).map(move |index| {
            let width = self.width as usize;
            (
                (index % width) as u32,
                (index / width) as u32,
                self.cell_unchecked(index),
            )
        })
    }

    pub fn stats(&self) -> LayerStats {
        LayerStats {
            tiles: self.tile_layer.iter().flatten().count(),
            objects: self.object_layer.iter().flatten().count(),
            collidable: self.collision_layer.iter().filter(|&&c| c).count(),
        }
    }
}

fn too_large_error(width: u32, height: u32) -> MapError {
    MapError::TooLarge {
        width,
        height,
        limit: MAX_MAP_CELLS,
    }
}

/// A layer of `len` copies of `value`, or `None` if the allocation fails.
fn filled_layer<T: Clone>(len: usize, value: T) -> Option<Vec<T>> {
    let mut layer = Vec::new();
    layer.try_reserve_exact(len).ok()?;
    layer.resize(len, value);
    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::RgbColor;
    use image::{Rgba, RgbaImage};

    /// Sheet with 2 tiles and 1 object (8x8 cells on a 24x8 image).
    fn sheet() -> Arc<TileSheet> {
        let key = RgbColor::new(255, 0, 255);
        let image = RgbaImage::from_fn(24, 8, |x, _| {
            if x >= 16 {
                key.with_alpha(255)
            } else {
                Rgba([x as u8, 0, 0, 255])
            }
        });
        Arc::new(TileSheet::new(image, 8, 8, key).unwrap())
    }

    fn document(width: u32, height: u32) -> MapDocument {
        MapDocument::new(width, height, sheet()).unwrap()
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = document(3, 2);
        assert_eq!(doc.len(), 6);
        assert!(!doc.is_empty());
        assert!(doc.cells().all(|(_, _, cell)| cell.is_empty()));
        assert_eq!(doc.stats(), LayerStats::default());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            MapDocument::new(0, 4, sheet()),
            Err(MapError::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_huge_dimensions_rejected() {
        assert!(matches!(
            MapDocument::new(u32::MAX, u32::MAX, sheet()),
            Err(MapError::TooLarge {
                width: u32::MAX,
                height: u32::MAX,
                ..
            })
        ));
        assert!(matches!(
            MapDocument::new(100_000, 100_000, sheet()),
            Err(MapError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_just_over_cell_limit_rejected() {
        assert_eq!(8192 * 8192, MAX_MAP_CELLS);
        assert!(matches!(
            MapDocument::new(8192, 8193, sheet()),
            Err(MapError::TooLarge { limit: MAX_MAP_CELLS, .. })
        ));
    }

    #[test]
    fn test_index_and_position_are_row_major() {
        let doc = document(4, 3);
        assert_eq!(doc.index_of(0, 0), Some(0));
        assert_eq!(doc.index_of(3, 0), Some(3));
        assert_eq!(doc.index_of(1, 2), Some(9));
        assert_eq!(doc.index_of(4, 0), None);
        assert_eq!(doc.position_of(9), Some((1, 2)));
        assert_eq!(doc.position_of(12), None);
    }

    #[test]
    fn test_set_and_get_cell() {
        let mut doc = document(3, 2);
        let cell = Cell::new(Some(1), Some(0), true);
        doc.set_cell(2, 1, cell).unwrap();

        assert_eq!(doc.cell(2, 1).unwrap(), cell);
        assert_eq!(doc.cell_at(5).unwrap(), cell);
        assert_eq!(doc.tile_layer()[5], Some(1));
        assert_eq!(doc.object_layer()[5], Some(0));
        assert!(doc.collision_layer()[5]);
    }

    #[test]
    fn test_set_cell_at_linear_index() {
        let mut doc = document(3, 2);
        doc.set_cell_at(4, Cell::new(Some(0), None, false)).unwrap();
        assert_eq!(doc.cell(1, 1).unwrap().tile, Some(0));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut doc = document(3, 2);
        assert!(matches!(
            doc.cell(3, 0),
            Err(MapError::CellOutOfBounds { x: 3, y: 0, width: 3, height: 2 })
        ));
        assert!(matches!(
            doc.cell_at(6),
            Err(MapError::IndexOutOfBounds { index: 6, len: 6 })
        ));
        assert!(doc.set_cell(0, 2, Cell::EMPTY).is_err());
        assert!(doc.set_cell_at(100, Cell::EMPTY).is_err());
    }

    #[test]
    fn test_set_cell_rejects_ids_outside_catalogue() {
        let mut doc = document(2, 2);
        let err = doc.set_cell(0, 0, Cell::new(None, Some(1), false)).unwrap_err();
        assert!(matches!(
            err,
            MapError::InvalidLayerId { layer: Layer::Object, id: 1, available: 1 }
        ));
        assert!(doc.cell(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_single_layer_writes() {
        let mut doc = document(2, 2);
        doc.set_tile(1, 0, Some(1)).unwrap();
        doc.set_object(1, 0, Some(0)).unwrap();
        doc.set_collidable(1, 0, true).unwrap();
        assert_eq!(doc.cell(1, 0).unwrap(), Cell::new(Some(1), Some(0), true));

        doc.set_object(1, 0, None).unwrap();
        assert_eq!(doc.cell(1, 0).unwrap(), Cell::new(Some(1), None, true));
        assert!(doc.set_tile(0, 0, Some(2)).is_err());
    }

    #[test]
    fn test_stamp_clips_to_grid() {
        let mut doc = document(4, 3);
        let written = doc.stamp(2, 1, 3, Layer::Tile, Some(0)).unwrap();
        assert_eq!(written, 4);

        let painted: Vec<_> = doc
            .cells()
            .filter(|(_, _, c)| c.tile.is_some())
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(painted, vec![(2, 1), (3, 1), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_stamp_single_cell_and_erase() {
        let mut doc = document(4, 3);
        assert_eq!(doc.stamp(0, 0, 2, Layer::Object, Some(0)).unwrap(), 4);
        assert_eq!(doc.stamp(0, 0, 1, Layer::Object, None).unwrap(), 1);
        assert_eq!(doc.stats().objects, 3);
        assert_eq!(doc.stamp(0, 0, 0, Layer::Object, None).unwrap(), 0);
    }

    #[test]
    fn test_stamp_validates_anchor_and_id() {
        let mut doc = document(4, 3);
        assert!(doc.stamp(4, 0, 2, Layer::Tile, Some(0)).is_err());
        assert!(doc.stamp(0, 0, 2, Layer::Tile, Some(9)).is_err());
        assert_eq!(doc.stats(), LayerStats::default());
    }

    #[test]
    fn test_set_layers_replaces_all_arrays() {
        let mut doc = document(2, 1);
        doc.set_layers(vec![Some(0), None], vec![None, Some(0)], vec![false, true])
            .unwrap();
        assert_eq!(doc.cell(0, 0).unwrap(), Cell::new(Some(0), None, false));
        assert_eq!(doc.cell(1, 0).unwrap(), Cell::new(None, Some(0), true));
    }

    #[test]
    fn test_set_layers_rejects_length_mismatch_without_changes() {
        let mut doc = document(2, 1);
        doc.set_tile(0, 0, Some(1)).unwrap();

        let err = doc
            .set_layers(vec![None], vec![None, None], vec![false, false])
            .unwrap_err();
        assert!(matches!(
            err,
            MapError::LayerLength { expected: 2, tiles: 1, objects: 2, collision: 2 }
        ));
        assert_eq!(doc.tile_layer(), &[Some(1), None]);
    }

    #[test]
    fn test_set_layers_rejects_bad_id_without_changes() {
        let mut doc = document(2, 1);
        let err = doc
            .set_layers(vec![Some(5), None], vec![None, None], vec![false, false])
            .unwrap_err();
        assert!(matches!(err, MapError::InvalidLayerId { layer: Layer::Tile, .. }));
        assert_eq!(doc.tile_layer(), &[None, None]);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut doc = document(2, 2);
        doc.set_cell(1, 1, Cell::new(Some(0), Some(0), true)).unwrap();
        doc.clear();
        assert!(doc.cells().all(|(_, _, c)| c.is_empty()));
    }

    #[test]
    fn test_stats_counts_each_layer() {
        let mut doc = document(3, 1);
        doc.set_cell(0, 0, Cell::new(Some(0), None, true)).unwrap();
        doc.set_cell(1, 0, Cell::new(Some(1), Some(0), false)).unwrap();
        doc.set_collidable(2, 0, true).unwrap();
        assert_eq!(
            doc.stats(),
            LayerStats {
                tiles: 2,
                objects: 1,
                collidable: 2
            }
        );
    }

    #[test]
    fn test_clones_share_the_sheet() {
        let doc = document(2, 2);
        let copy = doc.clone();
        assert!(Arc::ptr_eq(doc.sheet(), copy.sheet()));
    }
}
