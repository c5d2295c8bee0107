//! Voronoi peaks: random summits composited onto the grid with `max`.

use std::f32::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::check_range;
use crate::seed::{det_hypot, det_pow, det_sin};
use crate::{CancelToken, HeightGrid, TerrainError};

/// How a peak's height decays with normalized distance `d` in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Falloff {
    /// `peak - d * fall_off`
    #[default]
    Linear,
    /// `peak - d^drop_off * fall_off`
    Power,
    /// `peak - d * fall_off - d^drop_off`
    Combined,
    /// `peak - (3d)^fall_off - sin(2 pi d) / drop_off`
    SinPow,
}

impl Falloff {
    /// Candidate height at normalized distance `d` from a peak of `peak_height`.
    pub fn height_at(self, peak_height: f32, d: f32, fall_off: f32, drop_off: f32) -> f32 {
        match self {
            Falloff::Linear => peak_height - d * fall_off,
            Falloff::Power => peak_height - det_pow(d, drop_off) * fall_off,
            Falloff::Combined => peak_height - d * fall_off - det_pow(d, drop_off),
            Falloff::SinPow => {
                peak_height - det_pow(d * 3.0, fall_off) - det_sin(d * 2.0 * PI) / drop_off
            }
        }
    }
}

/// Parameters for [`voronoi_peaks`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiParams {
    pub peak_count: u32,
    pub min_height: f32,
    pub max_height: f32,
    pub fall_off: f32,
    pub drop_off: f32,
    pub falloff: Falloff,
}

impl Default for VoronoiParams {
    fn default() -> Self {
        Self {
            peak_count: 5,
            min_height: 0.1,
            max_height: 0.5,
            fall_off: 0.2,
            drop_off: 0.6,
            falloff: Falloff::Linear,
        }
    }
}

impl VoronoiParams {
    fn validate(&self) -> Result<(), TerrainError> {
        check_range("peak_height", self.min_height, self.max_height)?;
        if self.falloff == Falloff::SinPow && self.drop_off == 0.0 {
            return Err(TerrainError::invalid_parameter(
                "drop_off",
                "SinPow falloff divides by drop_off, which must be non-zero",
            ));
        }
        Ok(())
    }
}

/// A peak that was applied to the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoronoiPeak {
    pub x: usize,
    pub y: usize,
    pub height: f32,
}

/// Place `peak_count` random peaks and return those that were applied.
///
/// A peak whose cell is already at least as high as its target is discarded
/// without touching the grid. Peaks are applied in order since each
/// placement check depends on the heights left by earlier peaks.
///
/// # Errors
///
/// [`TerrainError::InvalidParameter`] for inverted height bounds or a zero
/// `drop_off` with [`Falloff::SinPow`]; [`TerrainError::Cancelled`] between
/// peaks.
pub fn voronoi_peaks(
    grid: &mut HeightGrid,
    params: &VoronoiParams,
    rng: &mut impl Rng,
    cancel: &CancelToken,
) -> Result<Vec<VoronoiPeak>, TerrainError> {
    params.validate()?;
    let (width, height) = grid.dimensions();
    let mut applied = Vec::new();

    for _ in 0..params.peak_count {
        cancel.check()?;
        let peak = VoronoiPeak {
            x: rng.random_range(0..width),
            y: rng.random_range(0..height),
            height: rng.random_range(params.min_height..=params.max_height),
        };
        if apply_peak(grid, peak, params) {
            applied.push(peak);
        }
    }

    tracing::debug!(
        requested = params.peak_count,
        applied = applied.len(),
        "voronoi peaks placed"
    );
    Ok(applied)
}

/// Composite a single peak onto the grid. Returns `false` if the peak was
/// discarded because its cell was already at or above its height.
pub fn apply_peak(grid: &mut HeightGrid, peak: VoronoiPeak, params: &VoronoiParams) -> bool {
    if grid.get(peak.x, peak.y) >= peak.height {
        return false;
    }
    grid.set(peak.x, peak.y, peak.height);

    let (width, height) = grid.dimensions();
    let max_distance = det_hypot(width as f32, height as f32);
    for y in 0..height {
        for x in 0..width {
            if (x, y) == (peak.x, peak.y) {
                continue;
            }
            let dx = x as f32 - peak.x as f32;
            let dy = y as f32 - peak.y as f32;
            let d = det_hypot(dx, dy) / max_distance;
            let candidate = params
                .falloff
                .height_at(peak.height, d, params.fall_off, params.drop_off);
            if candidate > grid.get(x, y) {
                grid.set(x, y, candidate);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_falloff_curves_at_known_points() {
        let (fo, dr) = (0.2, 2.0);
        assert!((Falloff::Linear.height_at(1.0, 0.5, fo, dr) - 0.9).abs() < 1e-6);
        assert!((Falloff::Power.height_at(1.0, 0.5, fo, dr) - 0.95).abs() < 1e-6);
        assert!((Falloff::Combined.height_at(1.0, 0.5, fo, dr) - 0.65).abs() < 1e-6);
        // sin(pi) ~ 0, so only the power term remains: 1 - 1.5^0.2
        let expected = 1.0 - 1.5_f32.powf(0.2);
        assert!((Falloff::SinPow.height_at(1.0, 0.5, fo, dr) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_peak_never_lowers_terrain() {
        let mut grid = HeightGrid::from_fn(20, 20, |x, y| ((x * 7 + y * 3) % 10) as f32 * 0.05)
            .unwrap();
        let before = grid.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        voronoi_peaks(&mut grid, &VoronoiParams::default(), &mut rng, &CancelToken::new())
            .unwrap();
        for (a, b) in before.as_slice().iter().zip(grid.as_slice()) {
            assert!(b >= a, "height dropped from {a} to {b}");
        }
    }

    #[test]
    fn test_result_is_max_of_applied_peaks() {
        let initial = HeightGrid::from_fn(24, 16, |x, _| x as f32 * 0.01).unwrap();
        let params = VoronoiParams {
            peak_count: 8,
            falloff: Falloff::Combined,
            ..Default::default()
        };
        let mut grid = initial.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let peaks = voronoi_peaks(&mut grid, &params, &mut rng, &CancelToken::new()).unwrap();
        assert!(!peaks.is_empty());

        let max_distance = det_hypot(24.0, 16.0);
        for ((x, y), h) in grid.cells() {
            let mut expected = initial.get(x, y);
            for p in &peaks {
                let candidate = if (x, y) == (p.x, p.y) {
                    p.height
                } else {
                    let d = det_hypot(x as f32 - p.x as f32, y as f32 - p.y as f32) / max_distance;
                    params
                        .falloff
                        .height_at(p.height, d, params.fall_off, params.drop_off)
                };
                expected = expected.max(candidate);
            }
            assert_eq!(h, expected, "cell ({x}, {y})");
        }
    }

    #[test]
    fn test_peak_below_existing_is_discarded() {
        let mut grid = HeightGrid::new(8, 8).unwrap();
        grid.fill(0.9);
        let before = grid.clone();
        let peak = VoronoiPeak {
            x: 3,
            y: 3,
            height: 0.5,
        };
        assert!(!apply_peak(&mut grid, peak, &VoronoiParams::default()));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_tallest_peak_sets_its_cell() {
        let mut grid = HeightGrid::new(8, 8).unwrap();
        let peak = VoronoiPeak {
            x: 2,
            y: 5,
            height: 0.7,
        };
        assert!(apply_peak(&mut grid, peak, &VoronoiParams::default()));
        assert_eq!(grid.get(2, 5), 0.7);
        assert!(grid.get(7, 0) < 0.7);
    }

    #[test]
    fn test_sinpow_requires_nonzero_drop_off() {
        let mut grid = HeightGrid::new(8, 8).unwrap();
        let params = VoronoiParams {
            falloff: Falloff::SinPow,
            drop_off: 0.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(voronoi_peaks(&mut grid, &params, &mut rng, &CancelToken::new()).is_err());
    }
}
