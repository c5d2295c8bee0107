//! PNG encoding and decoding for grids, weights, density maps and textures.

use std::path::Path;

use image::{GrayImage, RgbaImage};
use relief_terrain::{DensityMap, LuminanceImage, NoiseTexture, SplatWeights};

use crate::DemoError;

/// Decode any supported image into 8-bit luminance.
pub fn load_luminance(path: &Path) -> Result<LuminanceImage, DemoError> {
    let gray = image::open(path)?.to_luma8();
    let (width, height) = gray.dimensions();
    Ok(LuminanceImage::new(
        width as usize,
        height as usize,
        gray.into_raw(),
    )?)
}

pub fn save_luminance(image: &LuminanceImage, path: &Path) -> Result<(), DemoError> {
    let (width, height) = image.dimensions();
    save_gray(width, height, image.pixels().to_vec(), path)
}

/// One grayscale image for a single splat channel.
pub fn save_splat_layer(weights: &SplatWeights, layer: usize, path: &Path) -> Result<(), DemoError> {
    let (width, height) = weights.dimensions();
    let pixels = weights.layer(layer).map(unit_to_u8).collect();
    save_gray(width, height, pixels, path)
}

/// Occupied cells white, everything else black.
pub fn save_density_map(map: &DensityMap, path: &Path) -> Result<(), DemoError> {
    let (width, height) = map.dimensions();
    let pixels = map
        .as_slice()
        .iter()
        .map(|&occupied| if occupied { u8::MAX } else { 0 })
        .collect();
    save_gray(width, height, pixels, path)
}

pub fn save_noise_texture(texture: &NoiseTexture, path: &Path) -> Result<(), DemoError> {
    let (width, height) = texture.dimensions();
    let image = RgbaImage::from_raw(width as u32, height as u32, texture.to_rgba8())
        .ok_or(DemoError::BufferSize { width, height })?;
    image.save(path)?;
    Ok(())
}

fn save_gray(width: usize, height: usize, pixels: Vec<u8>, path: &Path) -> Result<(), DemoError> {
    let image = GrayImage::from_raw(width as u32, height as u32, pixels)
        .ok_or(DemoError::BufferSize { width, height })?;
    image.save(path)?;
    tracing::debug!(path = %path.display(), width, height, "image written");
    Ok(())
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_terrain::{HeightGrid, to_luminance8};

    #[test]
    fn test_unit_to_u8_clamps() {
        assert_eq!(unit_to_u8(-1.0), 0);
        assert_eq!(unit_to_u8(0.5), 128);
        assert_eq!(unit_to_u8(2.0), 255);
    }

    #[test]
    fn test_heightmap_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("height.png");
        let grid = HeightGrid::from_fn(8, 4, |x, _| x as f32 / 7.0).unwrap();
        let image = to_luminance8(&grid);

        save_luminance(&image, &path).unwrap();
        let loaded = load_luminance(&path).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_luminance(&dir.path().join("absent.png"));
        assert!(matches!(result, Err(DemoError::Image(_))), "got {result:?}");
    }
}
