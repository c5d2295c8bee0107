use serde::{Deserialize, Serialize};

use crate::HeightGrid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalParams {
    /// Talus threshold: the drop a slope must exceed before material moves.
    pub height_difference: f32,
}

impl Default for ThermalParams {
    fn default() -> Self {
        Self {
            height_difference: 0.01,
        }
    }
}

/// Slide material from each cell onto lower neighbors.
///
/// For every cell and neighbor with `cell > neighbor + height_difference`,
/// `cell * strength` moves from the cell to the neighbor. The pass reads and
/// writes one live grid in row-major order, so cells later in the scan see
/// material already moved by earlier ones.
pub fn thermal(grid: &mut HeightGrid, params: &ThermalParams, strength: f32) {
    let (width, height) = grid.dimensions();
    for y in 0..height {
        for x in 0..width {
            for (nx, ny) in grid.neighbors(x, y) {
                let current = grid.get(x, y);
                if current > grid.get(nx, ny) + params.height_difference {
                    let moved = current * strength;
                    grid.add(x, y, -moved);
                    grid.add(nx, ny, moved);
                }
            }
        }
    }
}
