use serde::{Deserialize, Serialize};

use crate::HeightGrid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TidalParams {
    pub water_height: f32,
}

impl Default for TidalParams {
    fn default() -> Self {
        Self { water_height: 0.5 }
    }
}

/// Level the shoreline: wherever a cell below the water height touches a
/// neighbor above it, both snap to exactly the water height.
pub fn tidal(grid: &mut HeightGrid, params: &TidalParams) {
    let water = params.water_height;
    let (width, height) = grid.dimensions();
    for y in 0..height {
        for x in 0..width {
            for (nx, ny) in grid.neighbors(x, y) {
                if grid.get(x, y) < water && grid.get(nx, ny) > water {
                    grid.set(x, y, water);
                    grid.set(nx, ny, water);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_water_height_is_noop() {
        let mut grid = HeightGrid::new(7, 7).unwrap();
        grid.fill(0.5);
        let before = grid.clone();
        tidal(&mut grid, &TidalParams { water_height: 0.5 });
        assert_eq!(grid, before);
    }

    #[test]
    fn test_shore_pair_is_levelled() {
        let mut grid = HeightGrid::new(4, 4).unwrap();
        grid.fill(0.2);
        grid.set(3, 3, 0.9);
        tidal(&mut grid, &TidalParams { water_height: 0.5 });
        // (2, 2) is the first cell in scan order touching the high corner.
        assert_eq!(grid.get(2, 2), 0.5);
        assert_eq!(grid.get(3, 3), 0.5);
        assert_eq!(grid.get(0, 0), 0.2);
    }

    #[test]
    fn test_all_submerged_is_noop() {
        let mut grid = HeightGrid::from_fn(5, 5, |x, y| (x + y) as f32 * 0.01).unwrap();
        let before = grid.clone();
        tidal(&mut grid, &TidalParams { water_height: 0.5 });
        assert_eq!(grid, before);
    }
}
