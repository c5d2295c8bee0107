//! Grayscale fBm noise textures, for use as heightmap sources or masks.

use serde::{Deserialize, Serialize};

use crate::{CancelToken, FbmLayer, NoiseSource, TerrainError};

/// Parameters for [`generate_noise_texture`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseTextureParams {
    pub width: usize,
    pub height: usize,
    pub layer: FbmLayer,
    /// Added as `0.5 * brightness` after contrast.
    pub brightness: f32,
    /// Scales the distance of each value from `0.5`.
    pub contrast: f32,
    /// Write each pixel's value into its alpha channel instead of opaque.
    pub alpha: bool,
    /// Stretch the produced value range to `[0, 1]` (alpha is left as is).
    pub remap: bool,
    /// Blend four offset samples so the texture tiles without seams.
    pub seamless: bool,
}

impl Default for NoiseTextureParams {
    fn default() -> Self {
        Self {
            width: 513,
            height: 513,
            layer: FbmLayer {
                height_scale: 1.0,
                ..Default::default()
            },
            brightness: 1.0,
            contrast: 1.0,
            alpha: false,
            remap: false,
            seamless: false,
        }
    }
}

/// A generated texture with one value and one alpha per pixel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseTexture {
    width: usize,
    height: usize,
    values: Vec<f32>,
    alpha: Vec<f32>,
}

impl NoiseTexture {
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn value(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    pub fn alpha(&self, x: usize, y: usize) -> f32 {
        self.alpha[y * self.width + x]
    }

    /// Pack into RGBA8 (gray in RGB), clamping to `[0, 1]` first.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut pixels = Vec::with_capacity(self.values.len() * 4);
        for (&v, &a) in self.values.iter().zip(&self.alpha) {
            let g = quantize(v);
            pixels.extend_from_slice(&[g, g, g, quantize(a)]);
        }
        pixels
    }
}

/// Render a noise texture.
///
/// # Errors
///
/// [`TerrainError::InvalidDimensions`] for an empty texture,
/// [`TerrainError::InvalidParameter`] for zero octaves and
/// [`TerrainError::Cancelled`] between rows.
pub fn generate_noise_texture(
    params: &NoiseTextureParams,
    noise: &(impl NoiseSource + ?Sized),
    cancel: &CancelToken,
) -> Result<NoiseTexture, TerrainError> {
    let (width, height) = (params.width, params.height);
    if width == 0 || height == 0 {
        return Err(TerrainError::InvalidDimensions {
            width,
            height,
            reason: "texture must be non-empty",
        });
    }

    let mut values = Vec::with_capacity(width * height);
    let mut alpha = Vec::with_capacity(width * height);
    let (mut lo, mut hi) = (f32::INFINITY, f32::NEG_INFINITY);

    for y in 0..height {
        cancel.check()?;
        for x in 0..width {
            let raw = if params.seamless {
                seamless_sample(&params.layer, noise, x, y, width, height)?
            } else {
                params.layer.sample(noise, x, y)?
            };
            let v = params.contrast * (raw - 0.5) + 0.5 * params.brightness;
            lo = lo.min(v);
            hi = hi.max(v);
            values.push(v);
            alpha.push(if params.alpha { v } else { 1.0 });
        }
    }

    if params.remap {
        let span = hi - lo;
        for v in &mut values {
            *v = if span > 0.0 { (*v - lo) / span } else { 0.0 };
        }
    }

    tracing::debug!(width, height, seamless = params.seamless, "noise texture generated");
    Ok(NoiseTexture {
        width,
        height,
        values,
        alpha,
    })
}

/// Bilinear blend of the sample at `(x, y)` with copies shifted by one
/// texture width and/or height.
fn seamless_sample(
    layer: &FbmLayer,
    noise: &(impl NoiseSource + ?Sized),
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Result<f32, TerrainError> {
    let u = x as f32 / width as f32;
    let v = y as f32 / height as f32;
    let n00 = layer.sample(noise, x, y)?;
    let n01 = layer.sample(noise, x, y + height)?;
    let n10 = layer.sample(noise, x + width, y)?;
    let n11 = layer.sample(noise, x + width, y + height)?;
    Ok(u * v * n00 + u * (1.0 - v) * n01 + (1.0 - u) * v * n10 + (1.0 - u) * (1.0 - v) * n11)
}
