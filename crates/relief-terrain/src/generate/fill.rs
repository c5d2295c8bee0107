//! Uniform random fill and 8-bit luminance import/export.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::check_range;
use crate::{HeightGrid, TerrainError};

/// Add `uniform(min, max)` to every cell.
///
/// # Errors
///
/// Returns [`TerrainError::InvalidParameter`] if `min > max`.
pub fn random_fill(
    grid: &mut HeightGrid,
    rng: &mut impl Rng,
    min: f32,
    max: f32,
) -> Result<(), TerrainError> {
    check_range("random_height", min, max)?;
    for h in grid.as_mut_slice() {
        *h += rng.random_range(min..=max);
    }
    Ok(())
}

/// An 8-bit grayscale image held in memory, row-major.
///
/// Decoding from files is the caller's job; this type only carries pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LuminanceImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl LuminanceImage {
    /// Wrap a row-major pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidDimensions`] if the image is empty or the
    /// buffer length does not match.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, TerrainError> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(TerrainError::InvalidDimensions {
                width,
                height,
                reason: "pixel buffer does not match image dimensions",
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Luminance in `[0, 1]` at `(x, y)`, clamped onto the image.
    pub fn sample(&self, x: usize, y: usize) -> f32 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[y * self.width + x] as f32 / 255.0
    }
}

/// Scale applied when importing heights from an image.
///
/// `x` and `y` scale grid coordinates into image coordinates; `z` scales the
/// luminance before it is added.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportScale {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for ImportScale {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

/// Add `luminance(x * scale.x, y * scale.y) * scale.z` to every cell.
///
/// # Errors
///
/// Returns [`TerrainError::InvalidParameter`] if a coordinate scale is negative.
pub fn add_luminance(
    grid: &mut HeightGrid,
    image: &LuminanceImage,
    scale: ImportScale,
) -> Result<(), TerrainError> {
    if scale.x < 0.0 || scale.y < 0.0 {
        return Err(TerrainError::invalid_parameter(
            "import_scale",
            "coordinate scales must not be negative",
        ));
    }
    let (width, height) = grid.dimensions();
    for y in 0..height {
        for x in 0..width {
            let ix = (x as f32 * scale.x) as usize;
            let iy = (y as f32 * scale.y) as usize;
            grid.add(x, y, image.sample(ix, iy) * scale.z);
        }
    }
    Ok(())
}

/// Export the grid as 8-bit luminance, clamping heights to `[0, 1]`.
pub fn to_luminance8(grid: &HeightGrid) -> LuminanceImage {
    let pixels = grid
        .as_slice()
        .iter()
        .map(|&h| (h.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    LuminanceImage {
        width: grid.width(),
        height: grid.height(),
        pixels,
    }
}
