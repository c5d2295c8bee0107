//! Wind erosion: dig/pile sediment transport along a rotated sweep.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::seed::{det_cos, det_sin};
use crate::{HeightGrid, NoiseSource};

/// Height moved from each dig cell to its pile cell.
pub const WIND_TRANSFER: f32 = 0.001;

/// Distance along the wind between a dig point and its pile point.
const PILE_DISTANCE: i64 = 5;

/// Rows of the sweep are sampled every this many units.
const ROW_STRIDE: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindParams {
    /// Wind direction in degrees.
    pub angle_degrees: f32,
    /// Noise sampling scale.
    pub scale: f32,
    /// Multiplier turning noise into a row offset.
    pub noise_multiplier: f32,
}

impl Default for WindParams {
    fn default() -> Self {
        Self {
            angle_degrees: 30.0,
            scale: 0.05,
            noise_multiplier: 25.0,
        }
    }
}

/// Move [`WIND_TRANSFER`] from dig points to pile points across the grid.
///
/// The sweep covers an area larger than the grid so every rotation angle
/// still reaches each corner; samples whose dig or pile point falls outside
/// the grid are dropped.
pub fn wind(
    grid: &mut HeightGrid,
    params: &WindParams,
    strength: f32,
    noise: &(impl NoiseSource + ?Sized),
) {
    let (width, height) = grid.dimensions();
    let (w, h) = (width as i64, height as i64);
    let angle = params.angle_degrees.to_radians();
    let sin = -det_sin(angle);
    let cos = det_cos(angle);
    let rotate = |x: i64, y: i64| {
        let (x, y) = (x as f32, y as f32);
        Vec2::new(x * cos - y * sin, y * cos + x * sin)
    };
    let max = Vec2::new((width - 1) as f32, (height - 1) as f32);
    let inside = |p: Vec2| p.cmpge(Vec2::ZERO).all() && p.cmple(max).all();

    let mut moved = 0usize;
    for y in (-(h - 1) * 2..h * 2).step_by(ROW_STRIDE) {
        for x in -(w - 1) * 2..=w * 2 {
            let sample = noise.noise2d(x as f32 * params.scale, y as f32 * params.scale);
            let offset = (sample * params.noise_multiplier * strength) as i64;
            let dig = rotate(x, y + offset);
            let pile = rotate(x, y + offset + PILE_DISTANCE);
            if inside(dig) && inside(pile) {
                grid.add(dig.x as usize, dig.y as usize, -WIND_TRANSFER);
                grid.add(pile.x as usize, pile.y as usize, WIND_TRANSFER);
                moved += 1;
            }
        }
    }
    tracing::trace!(moved, "wind transfers");
}
