//! Ordered sculpting pipeline over one height grid.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::seed::{Stream, noise_seed, stream_rng};
use crate::{
    CancelToken, ErosionParams, FbmLayer, HeightGrid, ImportScale, LuminanceImage, MidpointParams,
    PerlinSource, TerrainError, VoronoiParams, add_luminance, apply_fbm, apply_fbm_layers, erode,
    midpoint_displacement, random_fill, smooth, voronoi_peaks,
};

/// One sculpting operation. Serializable so step lists can live in config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Zero the grid.
    Reset,
    /// Add uniform noise in `[min, max]` to every cell.
    Random { min: f32, max: f32 },
    Fbm(FbmLayer),
    FbmLayers(Vec<FbmLayer>),
    MidpointDisplacement(MidpointParams),
    Voronoi(VoronoiParams),
    Erode(ErosionParams),
    Smooth { passes: u32 },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Reset => "reset",
            Step::Random { .. } => "random",
            Step::Fbm(_) => "fbm",
            Step::FbmLayers(_) => "fbm_layers",
            Step::MidpointDisplacement(_) => "midpoint_displacement",
            Step::Voronoi(_) => "voronoi",
            Step::Erode(_) => "erode",
            Step::Smooth { .. } => "smooth",
        }
    }

    /// Generators build terrain rather than reshape it, and honour the
    /// sculptor's reset flag.
    pub fn is_generator(&self) -> bool {
        matches!(
            self,
            Step::Random { .. }
                | Step::Fbm(_)
                | Step::FbmLayers(_)
                | Step::MidpointDisplacement(_)
                | Step::Voronoi(_)
        )
    }
}

/// Owns a grid plus the seeded random and noise sources every step draws
/// from, so a seed and a step list fully determine the result.
pub struct Sculptor {
    grid: HeightGrid,
    rng: ChaCha8Rng,
    noise: PerlinSource,
    cancel: CancelToken,
    reset: bool,
}

impl Sculptor {
    /// A sculptor over a zeroed `width × height` grid.
    pub fn new(width: usize, height: usize, seed: u64) -> Result<Self, TerrainError> {
        Ok(Self::from_grid(HeightGrid::new(width, height)?, seed))
    }

    /// A sculptor that starts from existing heights.
    pub fn from_grid(grid: HeightGrid, seed: u64) -> Self {
        Self {
            grid,
            rng: stream_rng(seed, Stream::Sculpt),
            noise: PerlinSource::new(noise_seed(seed)),
            cancel: CancelToken::new(),
            reset: false,
        }
    }

    /// When set, every generator step zeroes the grid before it runs.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// A handle that cancels this sculptor's running and future steps.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    pub fn noise(&self) -> &PerlinSource {
        &self.noise
    }

    pub fn into_grid(self) -> HeightGrid {
        self.grid
    }

    /// Add heights from an 8-bit luminance image.
    ///
    /// With the reset flag set the import lands on a zeroed copy, which
    /// replaces the grid only if the import succeeds.
    pub fn import_luminance(
        &mut self,
        image: &LuminanceImage,
        scale: ImportScale,
    ) -> Result<(), TerrainError> {
        if !self.reset {
            return add_luminance(&mut self.grid, image, scale);
        }
        let mut fresh = self.grid.clone();
        fresh.reset();
        add_luminance(&mut fresh, image, scale)?;
        self.grid = fresh;
        Ok(())
    }

    /// Run a single step.
    ///
    /// With the reset flag set, a generator runs on a zeroed copy of the
    /// grid that replaces it only when the step succeeds, so a rejected step
    /// leaves the previous heights in place.
    pub fn apply(&mut self, step: &Step) -> Result<(), TerrainError> {
        self.cancel.check()?;
        if self.reset && step.is_generator() {
            let mut fresh = self.grid.clone();
            fresh.reset();
            execute(&mut fresh, step, &mut self.rng, &self.noise, &self.cancel)?;
            self.grid = fresh;
            return Ok(());
        }
        execute(&mut self.grid, step, &mut self.rng, &self.noise, &self.cancel)
    }

    /// Run `steps` in order, stopping at the first error.
    pub fn run(&mut self, steps: &[Step]) -> Result<(), TerrainError> {
        for (index, step) in steps.iter().enumerate() {
            let started = std::time::Instant::now();
            self.apply(step)?;
            let (min, max) = self.grid.min_max();
            tracing::info!(
                index,
                step = step.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                min,
                max,
                "sculpt step complete"
            );
        }
        Ok(())
    }
}

fn execute(
    grid: &mut HeightGrid,
    step: &Step,
    rng: &mut ChaCha8Rng,
    noise: &PerlinSource,
    cancel: &CancelToken,
) -> Result<(), TerrainError> {
    match step {
        Step::Reset => grid.reset(),
        Step::Random { min, max } => random_fill(grid, rng, *min, *max)?,
        Step::Fbm(layer) => apply_fbm(grid, noise, layer, cancel)?,
        Step::FbmLayers(layers) => apply_fbm_layers(grid, noise, layers, cancel)?,
        Step::MidpointDisplacement(params) => midpoint_displacement(grid, params, rng, cancel)?,
        Step::Voronoi(params) => {
            voronoi_peaks(grid, params, rng, cancel)?;
        }
        Step::Erode(params) => erode(grid, params, rng, noise, cancel)?,
        Step::Smooth { passes } => smooth(grid, *passes, cancel)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErosionKind, ErosionVariant};

    fn steps() -> Vec<Step> {
        vec![
            Step::Fbm(FbmLayer {
                height_scale: 0.3,
                ..Default::default()
            }),
            Step::Voronoi(VoronoiParams::default()),
            Step::MidpointDisplacement(MidpointParams {
                randomness: 0.05,
                ..Default::default()
            }),
            Step::Erode(ErosionParams {
                kind: ErosionKind::from(ErosionVariant::Thermal),
                ..Default::default()
            }),
            Step::Smooth { passes: 2 },
        ]
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let mut a = Sculptor::new(33, 33, 1234).unwrap();
        let mut b = Sculptor::new(33, 33, 1234).unwrap();
        a.run(&steps()).unwrap();
        b.run(&steps()).unwrap();
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = Sculptor::new(33, 33, 1).unwrap();
        let mut b = Sculptor::new(33, 33, 2).unwrap();
        a.run(&steps()).unwrap();
        b.run(&steps()).unwrap();
        assert_ne!(a.grid(), b.grid());
    }

    #[test]
    fn test_reset_flag_zeroes_before_generators() {
        let mut grid = HeightGrid::new(9, 9).unwrap();
        grid.fill(5.0);
        let mut sculptor = Sculptor::from_grid(grid, 7).with_reset(true);
        sculptor.apply(&Step::Random { min: 0.0, max: 0.1 }).unwrap();
        let (_, max) = sculptor.grid().min_max();
        assert!(max <= 0.1, "old heights should have been cleared, max = {max}");
    }

    #[test]
    fn test_without_reset_generators_accumulate() {
        let mut grid = HeightGrid::new(9, 9).unwrap();
        grid.fill(5.0);
        let mut sculptor = Sculptor::from_grid(grid, 7);
        sculptor.apply(&Step::Random { min: 0.0, max: 0.1 }).unwrap();
        let (min, _) = sculptor.grid().min_max();
        assert!(min >= 5.0);
    }

    #[test]
    fn test_rejected_generator_keeps_heights_under_reset() {
        let mut grid = HeightGrid::new(10, 10).unwrap();
        grid.fill(0.7);
        let mut sculptor = Sculptor::from_grid(grid.clone(), 3).with_reset(true);
        let result = sculptor.apply(&Step::MidpointDisplacement(MidpointParams::default()));
        assert!(matches!(result, Err(TerrainError::InvalidDimensions { .. })));
        assert_eq!(sculptor.grid(), &grid, "a rejected step must not zero the grid");
    }

    #[test]
    fn test_rejected_import_keeps_heights_under_reset() {
        let mut grid = HeightGrid::new(4, 4).unwrap();
        grid.fill(0.7);
        let mut sculptor = Sculptor::from_grid(grid.clone(), 3).with_reset(true);
        let image = LuminanceImage::new(2, 2, vec![255; 4]).unwrap();
        let scale = ImportScale {
            x: -1.0,
            ..Default::default()
        };
        assert!(sculptor.import_luminance(&image, scale).is_err());
        assert_eq!(sculptor.grid(), &grid);

        sculptor.import_luminance(&image, ImportScale::default()).unwrap();
        assert!(sculptor.grid().as_slice().iter().all(|&h| h == 1.0));
    }

    #[test]
    fn test_error_stops_the_run() {
        let mut sculptor = Sculptor::new(10, 10, 0).unwrap();
        let steps = vec![
            Step::Random { min: 0.0, max: 0.1 },
            Step::MidpointDisplacement(MidpointParams::default()),
            Step::Reset,
        ];
        let result = sculptor.run(&steps);
        assert!(matches!(result, Err(TerrainError::InvalidDimensions { .. })));
        assert!(sculptor.grid().as_slice().iter().any(|&h| h != 0.0), "reset must not run");
    }

    #[test]
    fn test_cancel_token_stops_next_step() {
        let mut sculptor = Sculptor::new(9, 9, 0).unwrap();
        sculptor.cancel_token().cancel();
        assert_eq!(sculptor.apply(&Step::Reset), Err(TerrainError::Cancelled));
    }

    #[test]
    fn test_steps_roundtrip_through_ron() {
        let text = ron::to_string(&steps()).unwrap();
        let parsed: Vec<Step> = ron::from_str(&text).unwrap();
        assert_eq!(parsed, steps());
    }
}
