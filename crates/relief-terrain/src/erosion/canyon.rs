//! Canyon carving: a meandering channel dug from the left edge.
//!
//! The carve around each channel head is a depth-first flood over six
//! directions. It runs on an explicit stack whose frames remember which
//! direction they try next, so random draws happen in the same order as a
//! recursive walk would make them. A cell is re-carved whenever a later path
//! proposes a lower height; the walk ends because proposals rise with every
//! step while the terrain they must undercut does not.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{HeightGrid, TerrainError};

/// Directions tried from each carved cell, in order.
const BRANCHES: [(i64, i64); 6] = [(1, 0), (-1, 0), (1, 1), (-1, 1), (0, -1), (0, 1)];

/// Rows kept clear of the channel start on grids tall enough to spare them.
const START_MARGIN: usize = 10;

/// Extra random rise on top of `bank_slope` per step.
const BANK_JITTER: f32 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanyonParams {
    /// How far below the head cell the channel floor starts.
    pub dig_depth: f32,
    /// Minimum rise of the proposed floor per step away from the head.
    pub bank_slope: f32,
    /// Floor the carve never reaches.
    pub max_depth: f32,
    /// Largest carve stack allowed before giving up.
    pub recursion_limit: usize,
}

impl Default for CanyonParams {
    fn default() -> Self {
        Self {
            dig_depth: 0.05,
            bank_slope: 0.001,
            max_depth: 0.0,
            recursion_limit: 10_000,
        }
    }
}

impl CanyonParams {
    fn validate(&self) -> Result<(), TerrainError> {
        if self.recursion_limit == 0 {
            return Err(TerrainError::invalid_parameter(
                "recursion_limit",
                "must be at least 1",
            ));
        }
        if !(self.bank_slope >= 0.0) {
            return Err(TerrainError::invalid_parameter(
                "bank_slope",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    x: i64,
    y: i64,
    height: f32,
    next_branch: usize,
}

/// Carve one canyon.
///
/// The channel head starts at `x = 1` on a random row and steps right by 1
/// or 2 and up or down by at most 2 until it leaves the grid. Carving happens
/// on a copy that replaces the grid only once the whole channel is done.
///
/// # Errors
///
/// [`TerrainError::RecursionLimitExceeded`] if any carve needs a deeper
/// stack than `recursion_limit`; the grid is then left untouched.
pub fn carve_canyon(
    grid: &mut HeightGrid,
    params: &CanyonParams,
    rng: &mut impl Rng,
) -> Result<(), TerrainError> {
    params.validate()?;
    let (width, height) = grid.dimensions();
    let margin = if height > 2 * START_MARGIN { START_MARGIN } else { 0 };

    let mut scratch = grid.clone();
    let mut x: i64 = 1;
    let mut y = rng.random_range(margin..height - margin) as i64;
    let mut carved = 0;
    let mut heads = 0;

    while x > 0 && scratch.contains(x, y) {
        let floor = scratch.get(x as usize, y as usize) - params.dig_depth;
        carved += crawl(&mut scratch, x, y, floor, params, rng)?;
        heads += 1;
        x += rng.random_range(1..=2);
        y += rng.random_range(-2..=2);
    }

    *grid = scratch;
    tracing::debug!(heads, carved, width, "canyon carved");
    Ok(())
}

/// Lower `(x, y)` to `height` if the proposal is in bounds, above the floor
/// and below the current value.
fn try_carve(grid: &mut HeightGrid, x: i64, y: i64, height: f32, floor: f32) -> bool {
    if !grid.contains(x, y) || height <= floor {
        return false;
    }
    let (x, y) = (x as usize, y as usize);
    if grid.get(x, y) <= height {
        return false;
    }
    grid.set(x, y, height);
    true
}

/// Flood-carve outward from one channel head. Returns the number of writes.
fn crawl(
    grid: &mut HeightGrid,
    x: i64,
    y: i64,
    height: f32,
    params: &CanyonParams,
    rng: &mut impl Rng,
) -> Result<usize, TerrainError> {
    if !try_carve(grid, x, y, height, params.max_depth) {
        return Ok(0);
    }
    let mut writes = 1;
    let mut stack = vec![Frame {
        x,
        y,
        height,
        next_branch: 0,
    }];

    while let Some(top) = stack.last_mut() {
        let Some(&(dx, dy)) = BRANCHES.get(top.next_branch) else {
            stack.pop();
            continue;
        };
        top.next_branch += 1;
        let (nx, ny) = (top.x + dx, top.y + dy);
        let proposed =
            top.height + rng.random_range(params.bank_slope..=params.bank_slope + BANK_JITTER);

        if try_carve(grid, nx, ny, proposed, params.max_depth) {
            if stack.len() >= params.recursion_limit {
                return Err(TerrainError::RecursionLimitExceeded {
                    limit: params.recursion_limit,
                });
            }
            writes += 1;
            stack.push(Frame {
                x: nx,
                y: ny,
                height: proposed,
                next_branch: 0,
            });
        }
    }
    Ok(writes)
}
