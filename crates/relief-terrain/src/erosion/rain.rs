use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::HeightGrid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainParams {
    pub droplets: u32,
}

impl Default for RainParams {
    fn default() -> Self {
        Self { droplets: 10 }
    }
}

/// Lower `droplets` random cells by `strength`. A cell may be hit twice.
pub fn rain(grid: &mut HeightGrid, params: &RainParams, strength: f32, rng: &mut impl Rng) {
    let (width, height) = grid.dimensions();
    for _ in 0..params.droplets {
        let x = rng.random_range(0..width);
        let y = rng.random_range(0..height);
        grid.add(x, y, -strength);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_zero_droplets_is_noop() {
        let mut grid = HeightGrid::from_fn(10, 10, |x, y| (x * y) as f32 * 0.01).unwrap();
        let before = grid.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        rain(&mut grid, &RainParams { droplets: 0 }, 0.1, &mut rng);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_total_loss_matches_droplets() {
        let mut grid = HeightGrid::new(10, 10).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        rain(&mut grid, &RainParams { droplets: 20 }, 0.1, &mut rng);
        let total: f32 = grid.as_slice().iter().sum();
        assert!((total + 2.0).abs() < 1e-4, "expected -2.0 total, got {total}");
    }
}
