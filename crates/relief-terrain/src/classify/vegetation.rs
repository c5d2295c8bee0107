//! Vegetation instance placement.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::check_range;
use crate::{CancelToken, HeightGrid, SlopeMetric, TerrainError};

/// Where one kind of tree or plant may grow, and how its instances vary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationRule {
    pub min_height: f32,
    pub max_height: f32,
    pub min_slope: f32,
    pub max_slope: f32,
    /// Probability in `[0, 1]` that a stride point is considered.
    pub density: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for VegetationRule {
    fn default() -> Self {
        Self {
            min_height: 0.1,
            max_height: 0.2,
            min_slope: 0.0,
            max_slope: 45.0,
            density: 0.5,
            min_scale: 0.5,
            max_scale: 0.5,
        }
    }
}

impl VegetationRule {
    fn validate(&self) -> Result<(), TerrainError> {
        check_range("vegetation_height", self.min_height, self.max_height)?;
        check_range("vegetation_slope", self.min_slope, self.max_slope)?;
        check_range("vegetation_scale", self.min_scale, self.max_scale)?;
        if !(0.0..=1.0).contains(&self.density) {
            return Err(TerrainError::invalid_parameter(
                "density",
                format!("{} is outside [0, 1]", self.density),
            ));
        }
        Ok(())
    }

    fn accepts(&self, height: f32, slope: f32) -> bool {
        height >= self.min_height
            && height <= self.max_height
            && slope >= self.min_slope
            && slope <= self.max_slope
    }
}

/// Settings shared by every vegetation rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationParams {
    /// Stride between candidate cells.
    pub spacing: usize,
    /// Maximum random offset of an instance from its stride point, in cells.
    pub jitter: f32,
    /// Planting stops once this many instances exist.
    pub max_instances: usize,
}

impl Default for VegetationParams {
    fn default() -> Self {
        Self {
            spacing: 5,
            jitter: 5.0,
            max_instances: 5000,
        }
    }
}

/// A placed plant. Positions are in grid cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantInstance {
    /// Index of the rule that produced this instance.
    pub rule: usize,
    pub x: f32,
    pub y: f32,
    /// Terrain height under the instance.
    pub height: f32,
    pub scale: f32,
    /// Rotation about the vertical axis, radians in `[0, 2π)`.
    pub rotation: f32,
    /// Blend factor in `[0, 1)` between a rule's two tint colours.
    pub tint: f32,
}

/// Plant instances rule by rule until `max_instances` is reached.
///
/// Rules earlier in the list get first claim on the instance budget.
pub fn plant_vegetation(
    grid: &HeightGrid,
    rules: &[VegetationRule],
    params: &VegetationParams,
    metric: SlopeMetric,
    rng: &mut impl Rng,
    cancel: &CancelToken,
) -> Result<Vec<PlantInstance>, TerrainError> {
    if params.spacing == 0 {
        return Err(TerrainError::invalid_parameter("spacing", "must be positive"));
    }
    if !(params.jitter >= 0.0) {
        return Err(TerrainError::invalid_parameter("jitter", "must not be negative"));
    }
    metric.validate()?;
    for rule in rules {
        rule.validate()?;
    }

    let (width, height) = grid.dimensions();
    let (max_x, max_y) = ((width - 1) as f32, (height - 1) as f32);
    let jitter = params.jitter;
    let mut instances = Vec::new();

    'rules: for (index, rule) in rules.iter().enumerate() {
        for y in (0..height).step_by(params.spacing) {
            cancel.check()?;
            for x in (0..width).step_by(params.spacing) {
                if instances.len() >= params.max_instances {
                    break 'rules;
                }
                if rng.random::<f32>() > rule.density {
                    continue;
                }
                if !rule.accepts(grid.get(x, y), metric.measure(grid, x, y)) {
                    continue;
                }

                let px = (x as f32 + rng.random_range(-jitter..=jitter)).clamp(0.0, max_x);
                let py = (y as f32 + rng.random_range(-jitter..=jitter)).clamp(0.0, max_y);
                instances.push(PlantInstance {
                    rule: index,
                    x: px,
                    y: py,
                    height: grid.get(px.round() as usize, py.round() as usize),
                    scale: rng.random_range(rule.min_scale..=rule.max_scale),
                    rotation: rng.random_range(0.0..TAU),
                    tint: rng.random(),
                });
            }
        }
    }

    tracing::debug!(instances = instances.len(), rules = rules.len(), "vegetation planted");
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn everywhere() -> VegetationRule {
        VegetationRule {
            min_height: 0.0,
            max_height: 1.0,
            max_slope: 90.0,
            density: 1.0,
            min_scale: 0.5,
            max_scale: 2.0,
            ..Default::default()
        }
    }

    fn plant(
        grid: &HeightGrid,
        rules: &[VegetationRule],
        params: &VegetationParams,
    ) -> Vec<PlantInstance> {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        plant_vegetation(grid, rules, params, SlopeMetric::Gradient, &mut rng, &CancelToken::new())
            .unwrap()
    }

    #[test]
    fn test_instances_stay_on_grid_and_in_ranges() {
        let grid = HeightGrid::from_fn(32, 32, |x, y| (x + y) as f32 / 62.0).unwrap();
        let instances = plant(&grid, &[everywhere()], &VegetationParams::default());
        assert!(!instances.is_empty());
        for p in &instances {
            assert!((0.0..=31.0).contains(&p.x) && (0.0..=31.0).contains(&p.y));
            assert!((0.5..=2.0).contains(&p.scale), "scale {}", p.scale);
            assert!((0.0..TAU).contains(&p.rotation));
            assert!((0.0..1.0).contains(&p.tint));
        }
    }

    #[test]
    fn test_cap_stops_planting() {
        let grid = HeightGrid::new(64, 64).unwrap();
        let params = VegetationParams {
            spacing: 1,
            max_instances: 10,
            ..Default::default()
        };
        let instances = plant(&grid, &[everywhere(), everywhere()], &params);
        assert_eq!(instances.len(), 10);
        assert!(instances.iter().all(|p| p.rule == 0), "first rule fills the budget");
    }

    #[test]
    fn test_height_bounds_exclude_cells() {
        let mut grid = HeightGrid::new(16, 16).unwrap();
        grid.fill(0.8);
        let rule = VegetationRule {
            max_height: 0.5,
            ..everywhere()
        };
        assert!(plant(&grid, &[rule], &VegetationParams::default()).is_empty());
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let grid = HeightGrid::new(4, 4).unwrap();
        let params = VegetationParams {
            spacing: 0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = plant_vegetation(
            &grid,
            &[everywhere()],
            &params,
            SlopeMetric::Gradient,
            &mut rng,
            &CancelToken::new(),
        );
        assert!(result.is_err());
    }
}
