//! Procedural height-field sculpting: fBm, midpoint displacement, Voronoi
//! peaks, six erosion operators and smoothing, plus read-only classification
//! into splat weights, density maps, vegetation and shorelines.

mod cancel;
mod error;
mod fbm;
mod grid;
mod pipeline;
mod smoothing;
mod source;
mod texture;

pub mod classify;
pub mod erosion;
pub mod generate;
pub mod seed;

pub use cancel::CancelToken;
pub use classify::{
    DensityMap, DensityRule, PlantInstance, ShorelineSegment, SlopeMetric, SplatLayer,
    SplatWeights, VegetationParams, VegetationRule, compute_splat_weights, extract_shoreline,
    generate_density_maps, normalize_weights, plant_vegetation,
};
pub use erosion::{ErosionKind, ErosionParams, ErosionVariant, erode};
pub use error::TerrainError;
pub use fbm::{FbmLayer, apply_fbm, apply_fbm_layers, fbm};
pub use generate::{
    Falloff, ImportScale, LuminanceImage, MidpointParams, VoronoiParams, VoronoiPeak,
    add_luminance, midpoint_displacement, random_fill, to_luminance8, voronoi_peaks,
};
pub use grid::{HeightGrid, MIN_GRID_SIDE, Neighbors};
pub use pipeline::{Sculptor, Step};
pub use smoothing::{smooth, smooth_pass};
pub use source::{FlatSource, NoiseSource, PerlinSource};
pub use texture::{NoiseTexture, NoiseTextureParams, generate_noise_texture};
