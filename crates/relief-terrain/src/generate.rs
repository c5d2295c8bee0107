//! Shape generators: random and image fills, midpoint displacement, and
//! Voronoi peak composition.
//!
//! Every generator adds to or reshapes the grid it is given. Callers that
//! want a fresh terrain reset the grid first (see [`crate::Step`]).

mod fill;
mod midpoint;
mod voronoi;

pub use fill::{ImportScale, LuminanceImage, add_luminance, random_fill, to_luminance8};
pub use midpoint::{MidpointParams, midpoint_displacement};
pub use voronoi::{Falloff, VoronoiParams, VoronoiPeak, apply_peak, voronoi_peaks};
