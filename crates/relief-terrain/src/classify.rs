//! Read-only passes that classify a finished height grid: texture splat
//! weights, detail density maps, vegetation instances and shoreline segments.
//!
//! None of these mutate the grid. Rules are evaluated in list order and the
//! position of a rule in its list is its output channel.

mod density;
mod shoreline;
mod slope;
mod splat;
mod vegetation;

pub use density::{DensityMap, DensityRule, generate_density_maps};
pub use shoreline::{ShorelineSegment, extract_shoreline};
pub use slope::SlopeMetric;
pub use splat::{SplatLayer, SplatWeights, compute_splat_weights, normalize_weights};
pub use vegetation::{PlantInstance, VegetationParams, VegetationRule, plant_vegetation};
