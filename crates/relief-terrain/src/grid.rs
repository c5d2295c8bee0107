//! The height grid: an owned, row-major buffer of elevation samples.

use std::ops::{Index, IndexMut};

use crate::TerrainError;

/// Smallest allowed side length of a [`HeightGrid`].
pub const MIN_GRID_SIDE: usize = 2;

/// Offsets of the 8-connected neighborhood in scan order (row by row, left to right).
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A `width × height` field of elevation samples.
///
/// Values are conventionally a fraction of the maximum terrain height in
/// `[0, 1]`, but nothing clamps them: erosion may dig below zero and peaks
/// may exceed one. Storage is row-major, `index = y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl HeightGrid {
    /// Create a zero-filled grid.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidDimensions`] if either side is below 2.
    pub fn new(width: usize, height: usize) -> Result<Self, TerrainError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; width * height],
        })
    }

    /// Wrap an existing row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidDimensions`] if either side is below 2
    /// or the buffer length is not `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self, TerrainError> {
        check_dimensions(width, height)?;
        if data.len() != width * height {
            return Err(TerrainError::InvalidDimensions {
                width,
                height,
                reason: "buffer length does not match width * height",
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> f32,
    ) -> Result<Self, TerrainError> {
        let mut grid = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                grid.data[y * width + x] = f(x, y);
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Row-major index of `(x, y)`.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Height at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.index_of(x, y)]
    }

    /// Overwrite the height at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let idx = self.index_of(x, y);
        self.data[idx] = value;
    }

    /// Add `delta` to the height at `(x, y)`.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, delta: f32) {
        let idx = self.index_of(x, y);
        self.data[idx] += delta;
    }

    /// Returns `true` if the signed coordinate lies inside the grid.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Clamp a signed coordinate onto the grid (never wraps).
    pub fn clamp_coord(&self, x: i64, y: i64) -> (usize, usize) {
        (
            x.clamp(0, self.width as i64 - 1) as usize,
            y.clamp(0, self.height as i64 - 1) as usize,
        )
    }

    /// In-bounds 8-connected neighbors of `(x, y)` in scan order.
    ///
    /// Interior cells have 8 neighbors, edge cells 5 and corner cells 3. The
    /// iterator owns its state, so the grid may be mutated while iterating.
    pub fn neighbors(&self, x: usize, y: usize) -> Neighbors {
        Neighbors {
            x: x as i64,
            y: y as i64,
            width: self.width as i64,
            height: self.height as i64,
            next: 0,
        }
    }

    /// The 8 neighbor offsets of `(x, y)` clamped onto the grid, with
    /// duplicates removed, in scan order.
    ///
    /// Matches [`neighbors`](Self::neighbors) for interior cells. On the
    /// border, clamped offsets land on the cell itself, so the cell appears
    /// once in its own list.
    pub fn clamped_neighbors(
        &self,
        x: usize,
        y: usize,
    ) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (x, y) = (x as i64, y as i64);
        let (max_x, max_y) = (self.width as i64 - 1, self.height as i64 - 1);
        let clamp = move |(dx, dy): (i64, i64)| {
            (
                (x + dx).clamp(0, max_x) as usize,
                (y + dy).clamp(0, max_y) as usize,
            )
        };
        NEIGHBOR_OFFSETS
            .iter()
            .enumerate()
            .filter_map(move |(i, &offset)| {
                let cell = clamp(offset);
                let seen = NEIGHBOR_OFFSETS[..i].iter().any(|&earlier| clamp(earlier) == cell);
                (!seen).then_some(cell)
            })
    }

    /// Magnitude of the local height gradient at `(x, y)`.
    ///
    /// Uses forward differences, switching to backward differences on the
    /// last column/row.
    pub fn slope(&self, x: usize, y: usize) -> f32 {
        let h = self.get(x, y);
        let nx = if x + 1 < self.width { x + 1 } else { x - 1 };
        let ny = if y + 1 < self.height { y + 1 } else { y - 1 };
        let dx = self.get(nx, y) - h;
        let dy = self.get(x, ny) - h;
        glam::Vec2::new(dx, dy).length()
    }

    /// Zero every cell.
    pub fn reset(&mut self) {
        self.fill(0.0);
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Returns `(min, max)` over all cells.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Returns `true` if `other` has the same width and height.
    pub fn same_dimensions(&self, other: &HeightGrid) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Iterate `((x, y), height)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), f32)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &h)| ((i % width, i / width), h))
    }
}

impl Index<(usize, usize)> for HeightGrid {
    type Output = f32;

    fn index(&self, (x, y): (usize, usize)) -> &f32 {
        &self.data[self.index_of(x, y)]
    }
}

impl IndexMut<(usize, usize)> for HeightGrid {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut f32 {
        let idx = self.index_of(x, y);
        &mut self.data[idx]
    }
}

/// Iterator over the in-bounds neighbors of a cell. See [`HeightGrid::neighbors`].
#[derive(Clone, Debug)]
pub struct Neighbors {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    next: usize,
}

impl Iterator for Neighbors {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        while self.next < NEIGHBOR_OFFSETS.len() {
            let (dx, dy) = NEIGHBOR_OFFSETS[self.next];
            self.next += 1;
            let nx = self.x + dx;
            let ny = self.y + dy;
            if nx >= 0 && ny >= 0 && nx < self.width && ny < self.height {
                return Some((nx as usize, ny as usize));
            }
        }
        None
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), TerrainError> {
    if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
        return Err(TerrainError::InvalidDimensions {
            width,
            height,
            reason: "grid must be at least 2x2",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_zero_filled() {
        let grid = HeightGrid::new(4, 3).unwrap();
        assert_eq!(grid.dimensions(), (4, 3));
        assert_eq!(grid.cell_count(), 12);
        assert!(grid.as_slice().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_rejects_degenerate_dimensions() {
        for (w, h) in [(1, 5), (5, 1), (0, 0)] {
            let result = HeightGrid::new(w, h);
            assert!(
                matches!(result, Err(TerrainError::InvalidDimensions { .. })),
                "{w}x{h} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(HeightGrid::from_vec(2, 2, vec![0.0; 4]).is_ok());
        assert!(matches!(
            HeightGrid::from_vec(2, 2, vec![0.0; 5]),
            Err(TerrainError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_row_major_layout() {
        let grid = HeightGrid::from_fn(3, 2, |x, y| (y * 10 + x) as f32).unwrap();
        assert_eq!(grid.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(grid[(2, 1)], 12.0);
        assert_eq!(grid.get(1, 1), 11.0);
    }

    #[test]
    fn test_neighbor_counts() {
        let grid = HeightGrid::new(5, 5).unwrap();
        assert_eq!(grid.neighbors(2, 2).count(), 8);
        assert_eq!(grid.neighbors(0, 2).count(), 5);
        assert_eq!(grid.neighbors(4, 4).count(), 3);
    }

    #[test]
    fn test_neighbors_scan_order_and_exclude_self() {
        let grid = HeightGrid::new(3, 3).unwrap();
        let ns: Vec<_> = grid.neighbors(1, 1).collect();
        assert_eq!(
            ns,
            vec![
                (0, 0),
                (1, 0),
                (2, 0),
                (0, 1),
                (2, 1),
                (0, 2),
                (1, 2),
                (2, 2)
            ]
        );
        assert!(!grid.neighbors(0, 0).any(|c| c == (0, 0)));
    }

    #[test]
    fn test_clamped_neighbors_fold_onto_the_cell() {
        let grid = HeightGrid::new(3, 3).unwrap();
        let corner: Vec<_> = grid.clamped_neighbors(0, 0).collect();
        assert_eq!(corner, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        let edge: Vec<_> = grid.clamped_neighbors(1, 0).collect();
        assert_eq!(edge, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
        let interior: Vec<_> = grid.clamped_neighbors(1, 1).collect();
        assert_eq!(interior, grid.neighbors(1, 1).collect::<Vec<_>>());
    }

    #[test]
    fn test_clamp_coord_never_wraps() {
        let grid = HeightGrid::new(4, 6).unwrap();
        assert_eq!(grid.clamp_coord(-3, 10), (0, 5));
        assert_eq!(grid.clamp_coord(7, -1), (3, 0));
        assert!(grid.contains(3, 5));
        assert!(!grid.contains(4, 0));
        assert!(!grid.contains(-1, 0));
    }

    #[test]
    fn test_slope_forward_and_backward_differences() {
        // Height rises by 0.1 per column, flat along rows.
        let grid = HeightGrid::from_fn(4, 4, |x, _| x as f32 * 0.1).unwrap();
        assert!((grid.slope(0, 0) - 0.1).abs() < 1e-6);
        // Last column uses the backward difference, same magnitude.
        assert!((grid.slope(3, 3) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_flat_grid_has_zero_slope() {
        let mut grid = HeightGrid::new(5, 5).unwrap();
        grid.fill(0.3);
        for ((x, y), _) in grid.cells() {
            assert_eq!(grid.slope(x, y), 0.0);
        }
    }

    #[test]
    fn test_min_max_and_reset() {
        let mut grid = HeightGrid::from_fn(3, 3, |x, y| x as f32 - y as f32).unwrap();
        assert_eq!(grid.min_max(), (-2.0, 2.0));
        grid.reset();
        assert_eq!(grid.min_max(), (0.0, 0.0));
    }
}
