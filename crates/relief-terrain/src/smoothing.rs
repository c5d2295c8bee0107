//! Neighborhood-mean smoothing.

use crate::{CancelToken, HeightGrid, TerrainError};

/// Run `passes` smoothing passes, checking for cancellation before each.
///
/// Passes that completed before a cancellation stay applied.
pub fn smooth(grid: &mut HeightGrid, passes: u32, cancel: &CancelToken) -> Result<(), TerrainError> {
    for pass in 0..passes {
        cancel.check()?;
        smooth_pass(grid);
        tracing::trace!(pass, "smoothing pass");
    }
    Ok(())
}

/// Replace each cell by the mean of itself and its clamped neighbors.
///
/// Border cells count among their own clamped neighbors, so they weigh
/// themselves twice. Works in place in row-major order: a cell's left and
/// upper neighbors have already been smoothed when it is visited.
pub fn smooth_pass(grid: &mut HeightGrid) {
    let (width, height) = grid.dimensions();
    for y in 0..height {
        for x in 0..width {
            let mut sum = grid.get(x, y);
            let mut count = 1u32;
            for (nx, ny) in grid.clamped_neighbors(x, y) {
                sum += grid.get(nx, ny);
                count += 1;
            }
            grid.set(x, y, sum / count as f32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rough() -> HeightGrid {
        HeightGrid::from_fn(9, 7, |x, y| ((x * 13 + y * 7) % 5) as f32 * 0.2).unwrap()
    }

    #[test]
    fn test_zero_passes_is_bit_exact_noop() {
        let mut grid = rough();
        let before = grid.clone();
        smooth(&mut grid, 0, &CancelToken::new()).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_n_passes_equal_n_single_passes() {
        let mut batched = rough();
        let mut single = rough();
        smooth(&mut batched, 4, &CancelToken::new()).unwrap();
        for _ in 0..4 {
            smooth(&mut single, 1, &CancelToken::new()).unwrap();
        }
        assert_eq!(batched, single);
    }

    #[test]
    fn test_smoothing_reduces_range() {
        let mut grid = rough();
        let (lo, hi) = grid.min_max();
        smooth(&mut grid, 3, &CancelToken::new()).unwrap();
        let (new_lo, new_hi) = grid.min_max();
        assert!(new_hi - new_lo < hi - lo, "range did not shrink");
    }

    #[test]
    fn test_corner_counts_itself_twice() {
        // (2 * 1.0 + 0 + 0 + 0) / 5
        let mut grid = HeightGrid::new(3, 3).unwrap();
        grid.set(0, 0, 1.0);
        smooth_pass(&mut grid);
        assert!((grid.get(0, 0) - 0.4).abs() < 1e-6, "got {}", grid.get(0, 0));
    }

    #[test]
    fn test_flat_grid_is_unchanged_at_borders() {
        let mut grid = HeightGrid::new(4, 3).unwrap();
        grid.fill(0.7);
        smooth_pass(&mut grid);
        for &h in grid.as_slice() {
            assert!((h - 0.7).abs() < 1e-6, "got {h}");
        }
    }

    #[test]
    fn test_cancel_stops_between_passes() {
        let mut grid = rough();
        let before = grid.clone();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(smooth(&mut grid, 5, &cancel), Err(TerrainError::Cancelled));
        assert_eq!(grid, before);
    }
}
