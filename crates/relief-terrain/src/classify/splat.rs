//! Texture splat weights.

use serde::{Deserialize, Serialize};

use crate::error::check_range;
use crate::{CancelToken, HeightGrid, NoiseSource, SlopeMetric, TerrainError};

/// A texture-blend rule: the layer is active where the height lies in a
/// noise-widened band and the slope lies in `[min_slope, max_slope]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplatLayer {
    pub min_height: f32,
    pub max_height: f32,
    pub min_slope: f32,
    pub max_slope: f32,
    pub noise_scale_x: f32,
    pub noise_scale_y: f32,
    /// Base widening of the height band on both sides.
    pub offset: f32,
    /// Multiplier on the noise added to `offset`.
    pub noise_multiplier: f32,
}

impl Default for SplatLayer {
    fn default() -> Self {
        Self {
            min_height: 0.1,
            max_height: 0.2,
            min_slope: 0.0,
            max_slope: 45.0,
            noise_scale_x: 0.01,
            noise_scale_y: 0.01,
            offset: 0.01,
            noise_multiplier: 0.5,
        }
    }
}

impl SplatLayer {
    fn validate(&self) -> Result<(), TerrainError> {
        check_range("splat_height", self.min_height, self.max_height)?;
        check_range("splat_slope", self.min_slope, self.max_slope)
    }

    /// Raw (unnormalized) weight: 1 if the layer applies at this cell.
    fn score(
        &self,
        noise: &(impl NoiseSource + ?Sized),
        x: usize,
        y: usize,
        h: f32,
        slope: f32,
    ) -> f32 {
        let n = noise.noise2d(x as f32 * self.noise_scale_x, y as f32 * self.noise_scale_y)
            * self.noise_multiplier;
        let offset = self.offset + n;
        let in_band = h >= self.min_height - offset && h <= self.max_height + offset;
        let in_slope = slope >= self.min_slope && slope <= self.max_slope;
        if in_band && in_slope { 1.0 } else { 0.0 }
    }
}

/// Normalized weights keyed by `(x, y, layer)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatWeights {
    width: usize,
    height: usize,
    layers: usize,
    data: Vec<f32>,
}

impl SplatWeights {
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn layer_count(&self) -> usize {
        self.layers
    }

    /// Weight of `layer` at `(x, y)`.
    pub fn get(&self, x: usize, y: usize, layer: usize) -> f32 {
        debug_assert!(layer < self.layers, "layer {layer} out of range");
        self.data[(y * self.width + x) * self.layers + layer]
    }

    /// All layer weights at `(x, y)`.
    pub fn cell(&self, x: usize, y: usize) -> &[f32] {
        let start = (y * self.width + x) * self.layers;
        &self.data[start..start + self.layers]
    }

    /// One layer's weights in row-major order.
    pub fn layer(&self, layer: usize) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().skip(layer).step_by(self.layers.max(1)).copied()
    }
}

/// Scale `weights` so they sum to one. An all-zero vector stays all-zero.
pub fn normalize_weights(weights: &mut [f32]) {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return;
    }
    for w in weights {
        *w /= total;
    }
}

/// Score every layer at every cell and normalize per cell.
///
/// # Errors
///
/// [`TerrainError::InvalidParameter`] for inverted layer bounds or a bad
/// slope metric; [`TerrainError::Cancelled`] between rows.
pub fn compute_splat_weights(
    grid: &HeightGrid,
    layers: &[SplatLayer],
    metric: SlopeMetric,
    noise: &(impl NoiseSource + ?Sized),
    cancel: &CancelToken,
) -> Result<SplatWeights, TerrainError> {
    metric.validate()?;
    for layer in layers {
        layer.validate()?;
    }

    let (width, height) = grid.dimensions();
    let mut data = vec![0.0; width * height * layers.len()];
    if !layers.is_empty() {
        for (y, row) in data.chunks_mut(width * layers.len()).enumerate() {
            cancel.check()?;
            for (x, cell) in row.chunks_mut(layers.len()).enumerate() {
                let h = grid.get(x, y);
                let slope = metric.measure(grid, x, y);
                for (w, layer) in cell.iter_mut().zip(layers) {
                    *w = layer.score(noise, x, y, h, slope);
                }
                normalize_weights(cell);
            }
        }
    }

    tracing::debug!(layers = layers.len(), width, height, "splat weights computed");
    Ok(SplatWeights {
        width,
        height,
        layers: layers.len(),
        data,
    })
}
