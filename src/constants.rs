//! Centralized constants used across the crate.
//!
//! This module contains defaults and format values that are used in multiple
//! places or would benefit from being named constants.

use crate::sheet::RgbColor;

/// Default tile width in pixels for new sheets
pub const DEFAULT_TILE_WIDTH: u32 = 32;

/// Default tile height in pixels for new sheets
pub const DEFAULT_TILE_HEIGHT: u32 = 32;

/// Default transparent key color (magenta)
pub const DEFAULT_TRANSPARENT_COLOR: RgbColor = RgbColor::new(255, 0, 255);

/// On-disk layer id meaning "no tile" / "no object"
pub const EMPTY_LAYER_ID: i64 = -1;

/// Extension for saved map files
pub const MAP_FILE_EXTENSION: &str = "tmf";

/// Largest grid a document may hold (cells), 8192x8192
pub const MAX_MAP_CELLS: usize = 1 << 26;

/// Maximum number of recent maps to remember in config
pub const MAX_RECENT_MAPS: usize = 5;

/// Stamp sizes offered by the editor (side length of the square, in cells)
pub const STAMP_SIZES: [u32; 5] = [1, 2, 3, 5, 10];
