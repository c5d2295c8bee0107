//! The 2D coherent-noise primitive every noise-driven pass samples.

use noise::{NoiseFn, Perlin};

/// A deterministic, continuous 2D noise function with output in `[0, 1]`.
///
/// Implementations must return the same value for the same input. Any
/// `Fn(f32, f32) -> f32` closure is a `NoiseSource`, which keeps tests free
/// of real noise when they need exact expected values.
pub trait NoiseSource {
    /// Sample the noise at `(x, y)`.
    fn noise2d(&self, x: f32, y: f32) -> f32;
}

impl<F> NoiseSource for F
where
    F: Fn(f32, f32) -> f32,
{
    fn noise2d(&self, x: f32, y: f32) -> f32 {
        self(x, y)
    }
}

/// Perlin noise from the `noise` crate, remapped from `[-1, 1]` to `[0, 1]`.
#[derive(Clone, Debug)]
pub struct PerlinSource {
    perlin: Perlin,
}

impl PerlinSource {
    /// Create a source for the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl NoiseSource for PerlinSource {
    fn noise2d(&self, x: f32, y: f32) -> f32 {
        let raw = self.perlin.get([x as f64, y as f64]);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }
}

/// Constant noise. Useful when a pass needs a source but noise should not matter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatSource(pub f32);

impl NoiseSource for FlatSource {
    fn noise2d(&self, _x: f32, _y: f32) -> f32 {
        self.0
    }
}
