//! Multi-octave fractal Brownian motion (fBm) over a [`NoiseSource`].
//!
//! Unlike the usual decaying fBm, `persistence` here multiplies the amplitude
//! each octave and is typically greater than one, so finer octaves dominate.
//! The result is divided by the running amplitude sum, which keeps it near
//! `[0, 1]` for any persistence.

use serde::{Deserialize, Serialize};

use crate::{CancelToken, HeightGrid, NoiseSource, TerrainError};

/// Sample fBm at `(x, y)`.
///
/// Each octave doubles the frequency and multiplies the amplitude by
/// `persistence`. Returns `total / amplitude_sum`, or `0.0` if the
/// amplitudes cancel out.
///
/// # Errors
///
/// Returns [`TerrainError::InvalidParameter`] if `octaves` is zero.
pub fn fbm(
    noise: &(impl NoiseSource + ?Sized),
    x: f32,
    y: f32,
    octaves: u32,
    persistence: f32,
) -> Result<f32, TerrainError> {
    if octaves == 0 {
        return Err(TerrainError::invalid_parameter(
            "octaves",
            "at least one octave is required",
        ));
    }

    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += noise.noise2d(x * frequency, y * frequency) * amplitude;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= 2.0;
    }

    if max_value == 0.0 {
        return Ok(0.0);
    }
    Ok(total / max_value)
}

/// One fBm layer added on top of a height grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FbmLayer {
    /// Horizontal sample scale. Smaller values stretch features.
    pub x_scale: f32,
    /// Vertical sample scale.
    pub y_scale: f32,
    /// Number of octaves. Must be at least 1.
    pub octaves: u32,
    /// Per-octave amplitude multiplier (typically > 1).
    pub persistence: f32,
    /// Multiplier applied to the fBm sample before it is added to the grid.
    pub height_scale: f32,
    /// Cell offset added to `x` before scaling. Shifts the pattern.
    pub offset_x: i32,
    /// Cell offset added to `y` before scaling.
    pub offset_y: i32,
}

impl Default for FbmLayer {
    fn default() -> Self {
        Self {
            x_scale: 0.01,
            y_scale: 0.01,
            octaves: 3,
            persistence: 8.0,
            height_scale: 0.09,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

impl FbmLayer {
    /// The contribution of this layer at cell `(x, y)`.
    pub fn sample(
        &self,
        noise: &(impl NoiseSource + ?Sized),
        x: usize,
        y: usize,
    ) -> Result<f32, TerrainError> {
        let sx = (x as f32 + self.offset_x as f32) * self.x_scale;
        let sy = (y as f32 + self.offset_y as f32) * self.y_scale;
        Ok(fbm(noise, sx, sy, self.octaves, self.persistence)? * self.height_scale)
    }

    fn validate(&self) -> Result<(), TerrainError> {
        if self.octaves == 0 {
            return Err(TerrainError::invalid_parameter(
                "octaves",
                "at least one octave is required",
            ));
        }
        Ok(())
    }
}

/// Add one fBm layer to every cell.
pub fn apply_fbm(
    grid: &mut HeightGrid,
    noise: &(impl NoiseSource + ?Sized),
    layer: &FbmLayer,
    cancel: &CancelToken,
) -> Result<(), TerrainError> {
    apply_fbm_layers(grid, noise, std::slice::from_ref(layer), cancel)
}

/// Add every layer in `layers` to every cell.
///
/// The grid is only written once all layers validated; cancellation is
/// checked before the pass starts.
pub fn apply_fbm_layers(
    grid: &mut HeightGrid,
    noise: &(impl NoiseSource + ?Sized),
    layers: &[FbmLayer],
    cancel: &CancelToken,
) -> Result<(), TerrainError> {
    for layer in layers {
        layer.validate()?;
    }
    cancel.check()?;

    let (width, height) = grid.dimensions();
    for y in 0..height {
        for x in 0..width {
            let mut delta = 0.0;
            for layer in layers {
                delta += layer.sample(noise, x, y)?;
            }
            grid.add(x, y, delta);
        }
    }

    tracing::debug!(layers = layers.len(), width, height, "applied fbm layers");
    Ok(())
}
