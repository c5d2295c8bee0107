use crate::HeightGrid;

/// A submerged cell touching a dry neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShorelineSegment {
    /// The cell below the water line.
    pub wet: (usize, usize),
    /// The neighbor above it.
    pub dry: (usize, usize),
}

/// Every `(wet, dry)` neighbor pair across `water_height`, in scan order.
///
/// Cells exactly at the water height are neither wet nor dry.
pub fn extract_shoreline(grid: &HeightGrid, water_height: f32) -> Vec<ShorelineSegment> {
    grid.cells()
        .filter(|&(_, h)| h < water_height)
        .flat_map(|((x, y), _)| {
            grid.neighbors(x, y)
                .filter(|&(nx, ny)| grid.get(nx, ny) > water_height)
                .map(move |dry| ShorelineSegment { wet: (x, y), dry })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_island_has_ring_of_segments() {
        let mut grid = HeightGrid::new(5, 5).unwrap();
        grid.set(2, 2, 1.0);
        let segments = extract_shoreline(&grid, 0.5);
        assert_eq!(segments.len(), 8, "each of the 8 wet neighbors touches the peak");
        assert!(segments.iter().all(|s| s.dry == (2, 2)));
    }

    #[test]
    fn test_cells_at_water_height_are_ignored() {
        let mut grid = HeightGrid::new(4, 4).unwrap();
        grid.fill(0.5);
        assert!(extract_shoreline(&grid, 0.5).is_empty());
    }

    #[test]
    fn test_extraction_does_not_level() {
        let grid = HeightGrid::from_fn(6, 6, |x, _| x as f32 / 5.0).unwrap();
        let before = grid.clone();
        let segments = extract_shoreline(&grid, 0.5);
        assert!(!segments.is_empty());
        assert_eq!(grid, before);
        for s in &segments {
            assert!(grid.get(s.wet.0, s.wet.1) < 0.5);
            assert!(grid.get(s.dry.0, s.dry.1) > 0.5);
        }
    }
}
