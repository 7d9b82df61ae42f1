use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TRANSPARENT_COLOR;

/// An opaque RGB triple, used as the sheet's transparent key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// True when the pixel's RGB channels equal this color, ignoring alpha.
    pub fn matches(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, _] = pixel.0;
        r == self.red && g == self.green && b == self.blue
    }

    /// This color with the given alpha.
    pub fn with_alpha(&self, alpha: u8) -> Rgba<u8> {
        Rgba([self.red, self.green, self.blue, alpha])
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        DEFAULT_TRANSPARENT_COLOR
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.red, self.green, self.blue)
    }
}

/// Parses `R,G,B` with decimal channels, e.g. `255,0,255`.
impl FromStr for RgbColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("Invalid color channel in {:?}: {}", s, e))?;

        match channels.as_slice() {
            [red, green, blue] => Ok(RgbColor::new(*red, *green, *blue)),
            _ => Err(format!(
                "Expected three channels as R,G,B, got {:?}",
                s
            )),
        }
    }
}
