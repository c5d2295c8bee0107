//! Deterministic seeding utilities.
//!
//! Derives independent RNG streams from one terrain seed so that, for example,
//! changing the number of erosion droplets does not reshuffle vegetation
//! placement. Also wraps the `libm` functions used wherever a pass turns an
//! angle or distance into a height, keeping results identical across
//! platforms.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Independent random streams derived from a terrain seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Generators and erosion.
    Sculpt,
    /// Density maps.
    Density,
    /// Vegetation instances.
    Vegetation,
}

/// Derive a u64 seed for a stream from the terrain seed.
pub fn derive_stream_seed(seed: u64, stream: Stream) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    stream.hash(&mut hasher);
    hasher.finish()
}

/// A reproducible RNG for one stream of a terrain seed.
pub fn stream_rng(seed: u64, stream: Stream) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, stream))
}

/// Derive the 32-bit seed used by Perlin noise sources.
pub fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[inline]
pub fn det_sin(x: f32) -> f32 {
    libm::sinf(x)
}

#[inline]
pub fn det_cos(x: f32) -> f32 {
    libm::cosf(x)
}

#[inline]
pub fn det_pow(base: f32, exp: f32) -> f32 {
    libm::powf(base, exp)
}

#[inline]
pub fn det_hypot(x: f32, y: f32) -> f32 {
    libm::hypotf(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_stream_seed_deterministic() {
        assert_eq!(
            derive_stream_seed(42, Stream::Sculpt),
            derive_stream_seed(42, Stream::Sculpt)
        );
    }

    #[test]
    fn test_streams_are_decorrelated() {
        let sculpt = derive_stream_seed(42, Stream::Sculpt);
        let density = derive_stream_seed(42, Stream::Density);
        let vegetation = derive_stream_seed(42, Stream::Vegetation);
        assert_ne!(sculpt, density);
        assert_ne!(density, vegetation);
        assert_ne!(sculpt, vegetation);
    }

    #[test]
    fn test_stream_rng_sequences_match() {
        let mut a = stream_rng(7, Stream::Density);
        let mut b = stream_rng(7, Stream::Density);
        for _ in 0..256 {
            assert_eq!(a.next_u64(), b.next_u64(), "Same stream must replay");
        }
    }

    #[test]
    fn test_deterministic_math() {
        let x = 1.234_567_f32;
        assert_eq!(det_sin(x), det_sin(x));
        assert_eq!(det_cos(x), det_cos(x));
        assert!((det_pow(2.0, 3.0) - 8.0).abs() < 1e-6);
        assert!((det_hypot(3.0, 4.0) - 5.0).abs() < 1e-6);
    }
}
