//! Detail density maps: per-rule occupancy at a chosen resolution.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::check_range;
use crate::{CancelToken, HeightGrid, NoiseSource, SlopeMetric, TerrainError};

/// Where a detail layer (grass, rocks) may be placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityRule {
    pub min_height: f32,
    pub max_height: f32,
    pub min_slope: f32,
    pub max_slope: f32,
    /// Probability in `[0, 1]` that a stride point is considered at all.
    pub density: f32,
    /// Stride between considered cells, in output cells.
    pub spacing: usize,
    /// Noise frequency for widening the height band. `None` keeps the band
    /// fixed.
    pub height_noise: Option<f32>,
}

impl Default for DensityRule {
    fn default() -> Self {
        Self {
            min_height: 0.1,
            max_height: 0.2,
            min_slope: 0.0,
            max_slope: 45.0,
            density: 0.5,
            spacing: 5,
            height_noise: Some(0.05),
        }
    }
}

impl DensityRule {
    fn validate(&self) -> Result<(), TerrainError> {
        check_range("density_height", self.min_height, self.max_height)?;
        check_range("density_slope", self.min_slope, self.max_slope)?;
        if self.spacing == 0 {
            return Err(TerrainError::invalid_parameter("spacing", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(TerrainError::invalid_parameter(
                "density",
                format!("{} is outside [0, 1]", self.density),
            ));
        }
        Ok(())
    }

    /// Height band at output cell `(x, y)`, scaled by noise remapped into
    /// `[0.5, 1]` when `height_noise` is set.
    fn band(&self, noise: &(impl NoiseSource + ?Sized), x: usize, y: usize) -> (f32, f32) {
        let t = match self.height_noise {
            Some(m) => 0.5 + 0.5 * noise.noise2d(x as f32 * m, y as f32 * m),
            None => 1.0,
        };
        (t * self.min_height, t * self.max_height)
    }
}

/// A per-rule occupancy grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensityMap {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl DensityMap {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    /// Occupancy in row-major order.
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Build one occupancy map per rule at `resolution`.
///
/// Output cell `(x, y)` reads the grid at
/// `(x * grid_width / res_width, y * grid_height / res_height)`. Each stride
/// point draws one uniform value per rule and is skipped when it exceeds the
/// rule's density.
///
/// # Errors
///
/// [`TerrainError::InvalidDimensions`] for an empty resolution,
/// [`TerrainError::InvalidParameter`] for a bad rule and
/// [`TerrainError::Cancelled`] between rows.
pub fn generate_density_maps(
    grid: &HeightGrid,
    rules: &[DensityRule],
    resolution: (usize, usize),
    metric: SlopeMetric,
    rng: &mut impl Rng,
    noise: &(impl NoiseSource + ?Sized),
    cancel: &CancelToken,
) -> Result<Vec<DensityMap>, TerrainError> {
    let (res_w, res_h) = resolution;
    if res_w == 0 || res_h == 0 {
        return Err(TerrainError::InvalidDimensions {
            width: res_w,
            height: res_h,
            reason: "density resolution must be non-empty",
        });
    }
    metric.validate()?;
    for rule in rules {
        rule.validate()?;
    }

    let (width, height) = grid.dimensions();
    let mut maps = Vec::with_capacity(rules.len());
    for rule in rules {
        let mut map = DensityMap::new(res_w, res_h);
        for y in (0..res_h).step_by(rule.spacing) {
            cancel.check()?;
            for x in (0..res_w).step_by(rule.spacing) {
                if rng.random::<f32>() > rule.density {
                    continue;
                }
                let gx = (x * width / res_w).min(width - 1);
                let gy = (y * height / res_h).min(height - 1);
                let (lo, hi) = rule.band(noise, x, y);
                let h = grid.get(gx, gy);
                let slope = metric.measure(grid, gx, gy);
                if h >= lo && h <= hi && slope >= rule.min_slope && slope <= rule.max_slope {
                    map.cells[y * res_w + x] = true;
                }
            }
        }
        tracing::debug!(occupied = map.occupied_count(), "density map generated");
        maps.push(map);
    }
    Ok(maps)
}
