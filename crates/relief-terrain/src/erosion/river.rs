//! River erosion: downhill accumulator traces applied once at the end.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{HeightGrid, TerrainError};

/// Solubility below this is raised to it so every trace terminates.
pub const MIN_SOLUBILITY: f32 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    /// Number of river seeds.
    pub droplets: u32,
    /// Traces run from each seed.
    pub springs_per_river: u32,
    /// Accumulator lost per step.
    pub solubility: f32,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            droplets: 10,
            springs_per_river: 5,
            solubility: 0.01,
        }
    }
}

impl RiverParams {
    /// Solubility with the floor applied.
    pub fn effective_solubility(&self) -> f32 {
        if self.solubility.is_nan() || self.solubility < MIN_SOLUBILITY {
            MIN_SOLUBILITY
        } else {
            self.solubility
        }
    }
}

/// One step of a river trace: the cell the accumulator sits on and its value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiverStep {
    pub x: usize,
    pub y: usize,
    pub accumulator: f32,
}

/// Seed `droplets` rivers, trace them, then subtract the accumulated erosion.
///
/// Overlapping traces overwrite each other's accumulator values, so a cell
/// is lowered at most once per call.
///
/// # Errors
///
/// [`TerrainError::InvalidParameter`] for a non-finite `strength`.
pub fn river(
    grid: &mut HeightGrid,
    params: &RiverParams,
    strength: f32,
    rng: &mut impl Rng,
) -> Result<(), TerrainError> {
    if !strength.is_finite() {
        return Err(TerrainError::invalid_parameter(
            "strength",
            format!("{strength} is not finite"),
        ));
    }
    let solubility = params.effective_solubility();
    if solubility != params.solubility {
        tracing::debug!(
            requested = params.solubility,
            solubility,
            "solubility floored"
        );
    }

    let (width, height) = grid.dimensions();
    let mut erosion = HeightGrid::new(width, height)?;
    for _ in 0..params.droplets {
        let x = rng.random_range(0..width);
        let y = rng.random_range(0..height);
        erosion.set(x, y, strength);
        for _ in 0..params.springs_per_river {
            walk(grid, &mut erosion, (x, y), solubility, rng, |_| {});
        }
    }

    for (h, &e) in grid.as_mut_slice().iter_mut().zip(erosion.as_slice()) {
        if e > 0.0 {
            *h -= e;
        }
    }
    Ok(())
}

/// Walk one trace from `start` over static `heights`, writing accumulator
/// values into `erosion`. Returns every step taken, starting with `start`.
///
/// The accumulator drops by `solubility` each step whether it moves to a
/// strictly lower neighbor or stays put, so the walk ends within
/// `accumulator / solubility + 1` steps.
pub fn trace_river(
    heights: &HeightGrid,
    erosion: &mut HeightGrid,
    start: (usize, usize),
    solubility: f32,
    rng: &mut impl Rng,
) -> Vec<RiverStep> {
    let mut path = vec![RiverStep {
        x: start.0,
        y: start.1,
        accumulator: erosion.get(start.0, start.1),
    }];
    walk(heights, erosion, start, solubility, rng, |step| path.push(step));
    path
}

/// The trace loop behind [`river`] and [`trace_river`]; `on_step` sees each
/// step after it is written.
///
/// Stops early once subtracting `solubility` no longer changes the
/// accumulator, which happens for accumulators large enough that
/// `solubility` is below half their f32 spacing.
fn walk(
    heights: &HeightGrid,
    erosion: &mut HeightGrid,
    start: (usize, usize),
    solubility: f32,
    rng: &mut impl Rng,
    mut on_step: impl FnMut(RiverStep),
) {
    let (mut x, mut y) = start;
    let mut neighbors = Vec::with_capacity(8);

    loop {
        let current = erosion.get(x, y);
        if !(current > 0.0) {
            break;
        }
        let carried = current - solubility;
        if carried >= current {
            tracing::debug!(accumulator = current, solubility, "river trace stalled");
            break;
        }

        neighbors.clear();
        neighbors.extend(heights.neighbors(x, y));
        neighbors.shuffle(rng);

        let here = heights.get(x, y);
        let lower = neighbors.iter().copied().find(|&(nx, ny)| heights.get(nx, ny) < here);
        match lower {
            Some((nx, ny)) => {
                erosion.set(nx, ny, carried);
                (x, y) = (nx, ny);
            }
            None => erosion.set(x, y, carried),
        }
        on_step(RiverStep {
            x,
            y,
            accumulator: carried,
        });
    }
}
