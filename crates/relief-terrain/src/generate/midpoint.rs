//! Diamond-square midpoint displacement.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::check_range;
use crate::seed::det_pow;
use crate::{CancelToken, HeightGrid, TerrainError};

/// Parameters for [`midpoint_displacement`].
///
/// Both the square and the diamond step draw offsets from
/// `[height_min, height_max]`. Tools that draw the diamond offset from
/// `[-height_min, height_max]` instead produce a different surface for an
/// asymmetric range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidpointParams {
    /// Lower bound of the random offset at the coarsest scale.
    pub height_min: f32,
    /// Upper bound of the random offset at the coarsest scale.
    pub height_max: f32,
    /// Base of the per-scale dampener. Must be positive.
    pub dampener_power: f32,
    /// The offset range shrinks by `dampener_power^-roughness` each scale.
    pub roughness: f32,
    /// Multiplier applied to every random offset.
    pub randomness: f32,
}

impl Default for MidpointParams {
    fn default() -> Self {
        Self {
            height_min: -2.0,
            height_max: 2.0,
            dampener_power: 2.0,
            roughness: 2.0,
            randomness: 0.5,
        }
    }
}

impl MidpointParams {
    fn validate(&self) -> Result<(), TerrainError> {
        check_range("height", self.height_min, self.height_max)?;
        if !(self.dampener_power > 0.0) {
            return Err(TerrainError::invalid_parameter(
                "dampener_power",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Reshape the grid with diamond-square subdivision.
///
/// The grid must be square with side `2^k + 1`. The four corners seed the
/// recursion and are never written. Diamond midpoints whose neighbouring
/// square would reach the border are skipped, so some edge cells keep their
/// incoming heights.
///
/// # Errors
///
/// [`TerrainError::InvalidDimensions`] for a non-square or non-`2^k + 1`
/// grid, [`TerrainError::InvalidParameter`] for bad bounds, and
/// [`TerrainError::Cancelled`] between scales.
pub fn midpoint_displacement(
    grid: &mut HeightGrid,
    params: &MidpointParams,
    rng: &mut impl Rng,
    cancel: &CancelToken,
) -> Result<(), TerrainError> {
    let (width, height) = grid.dimensions();
    if width != height || !(width - 1).is_power_of_two() {
        return Err(TerrainError::InvalidDimensions {
            width,
            height,
            reason: "midpoint displacement needs a square 2^k+1 grid",
        });
    }
    params.validate()?;

    let size = width - 1;
    let dampener = det_pow(params.dampener_power, -params.roughness);
    let mut lo = params.height_min;
    let mut hi = params.height_max;
    let mut square = size;
    let mut scales = 0;

    while square >= 2 {
        cancel.check()?;
        let half = square / 2;

        // Square step: centre = mean of the four corners plus an offset.
        for x in (0..size).step_by(square) {
            for y in (0..size).step_by(square) {
                let (cx, cy) = (x + square, y + square);
                let (mx, my) = (x + half, y + half);
                let mean =
                    (grid.get(x, y) + grid.get(cx, y) + grid.get(x, cy) + grid.get(cx, cy)) / 4.0;
                let offset = rng.random_range(lo..=hi) * params.randomness;
                grid.set(mx, my, mean + offset);
            }
        }

        // Diamond step: each edge midpoint averages its two corners, this
        // square's centre and the centre of the square across the edge.
        for x in (0..size).step_by(square) {
            for y in (0..size).step_by(square) {
                let (cx, cy) = (x + square, y + square);
                let (mx, my) = (x + half, y + half);
                if mx <= square || my <= square || mx + square >= size - 1 || my + square >= size - 1
                {
                    continue;
                }
                let centre = grid.get(mx, my);

                let bottom = (grid.get(x, y) + grid.get(cx, y) + centre + grid.get(mx, my - square))
                    / 4.0;
                let top = (grid.get(x, cy) + grid.get(cx, cy) + centre + grid.get(mx, my + square))
                    / 4.0;
                let left = (grid.get(x, y) + grid.get(x, cy) + centre + grid.get(mx - square, my))
                    / 4.0;
                let right = (grid.get(cx, y) + grid.get(cx, cy) + centre + grid.get(mx + square, my))
                    / 4.0;

                grid.set(mx, y, bottom + rng.random_range(lo..=hi) * params.randomness);
                grid.set(mx, cy, top + rng.random_range(lo..=hi) * params.randomness);
                grid.set(x, my, left + rng.random_range(lo..=hi) * params.randomness);
                grid.set(cx, my, right + rng.random_range(lo..=hi) * params.randomness);
            }
        }

        square /= 2;
        lo *= dampener;
        hi *= dampener;
        scales += 1;
    }

    tracing::debug!(size = width, scales, "midpoint displacement complete");
    Ok(())
}
