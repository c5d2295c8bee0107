use serde::{Deserialize, Serialize};

use crate::{HeightGrid, TerrainError};

/// How rule slope bounds are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SlopeMetric {
    /// Raw gradient magnitude from [`HeightGrid::slope`], in height units
    /// per cell.
    #[default]
    Gradient,
    /// Inclination in degrees, `0..90`, for a grid whose cells are
    /// `horizontal_spacing` world units apart and whose heights are scaled by
    /// `vertical_scale`.
    Degrees {
        horizontal_spacing: f32,
        vertical_scale: f32,
    },
}

impl SlopeMetric {
    /// Slope at `(x, y)` under this metric.
    pub fn measure(&self, grid: &HeightGrid, x: usize, y: usize) -> f32 {
        let gradient = grid.slope(x, y);
        match *self {
            SlopeMetric::Gradient => gradient,
            SlopeMetric::Degrees {
                horizontal_spacing,
                vertical_scale,
            } => libm::atanf(gradient * vertical_scale / horizontal_spacing).to_degrees(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), TerrainError> {
        match *self {
            SlopeMetric::Degrees {
                horizontal_spacing, ..
            } if !(horizontal_spacing > 0.0) => Err(TerrainError::invalid_parameter(
                "horizontal_spacing",
                "must be positive",
            )),
            _ => Ok(()),
        }
    }
}
