//! Erosion operators.
//!
//! Each variant is an independent pass over a [`HeightGrid`] and is always
//! followed by [`ErosionParams::smooth_passes`] smoothing passes. Parameters
//! shared by every variant live on [`ErosionParams`]; variant-specific ones
//! ride inside [`ErosionKind`].
//!
//! | Variant | Effect |
//! |---------|--------|
//! | Rain    | random cells lose `strength` |
//! | River   | downhill accumulator traces carve channels |
//! | Thermal | material slides off slopes steeper than a talus threshold |
//! | Tidal   | shoreline cells snap to the water height |
//! | Wind    | noise-perturbed dig/pile transport along a wind direction |
//! | Canyon  | one meandering channel carved left to right |

mod canyon;
mod rain;
mod river;
mod thermal;
mod tidal;
mod wind;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{CancelToken, HeightGrid, NoiseSource, TerrainError, smooth};

pub use canyon::{CanyonParams, carve_canyon};
pub use rain::{RainParams, rain};
pub use river::{MIN_SOLUBILITY, RiverParams, RiverStep, river, trace_river};
pub use thermal::{ThermalParams, thermal};
pub use tidal::{TidalParams, tidal};
pub use wind::{WIND_TRANSFER, WindParams, wind};

/// The six erosion operators, without their parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErosionVariant {
    Rain,
    River,
    Thermal,
    Tidal,
    Wind,
    Canyon,
}

impl ErosionVariant {
    pub const ALL: [ErosionVariant; 6] = [
        ErosionVariant::Rain,
        ErosionVariant::River,
        ErosionVariant::Thermal,
        ErosionVariant::Tidal,
        ErosionVariant::Wind,
        ErosionVariant::Canyon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErosionVariant::Rain => "rain",
            ErosionVariant::River => "river",
            ErosionVariant::Thermal => "thermal",
            ErosionVariant::Tidal => "tidal",
            ErosionVariant::Wind => "wind",
            ErosionVariant::Canyon => "canyon",
        }
    }
}

impl fmt::Display for ErosionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErosionVariant {
    type Err = TerrainError;

    /// Parse a variant name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TerrainError::InvalidVariant(s.to_string()))
    }
}

/// An erosion variant together with its own parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ErosionKind {
    Rain(RainParams),
    River(RiverParams),
    Thermal(ThermalParams),
    Tidal(TidalParams),
    Wind(WindParams),
    Canyon(CanyonParams),
}

impl Default for ErosionKind {
    fn default() -> Self {
        ErosionKind::Rain(RainParams::default())
    }
}

impl ErosionKind {
    pub fn variant(&self) -> ErosionVariant {
        match self {
            ErosionKind::Rain(_) => ErosionVariant::Rain,
            ErosionKind::River(_) => ErosionVariant::River,
            ErosionKind::Thermal(_) => ErosionVariant::Thermal,
            ErosionKind::Tidal(_) => ErosionVariant::Tidal,
            ErosionKind::Wind(_) => ErosionVariant::Wind,
            ErosionKind::Canyon(_) => ErosionVariant::Canyon,
        }
    }
}

impl From<ErosionVariant> for ErosionKind {
    /// The variant with its default parameters.
    fn from(variant: ErosionVariant) -> Self {
        match variant {
            ErosionVariant::Rain => ErosionKind::Rain(RainParams::default()),
            ErosionVariant::River => ErosionKind::River(RiverParams::default()),
            ErosionVariant::Thermal => ErosionKind::Thermal(ThermalParams::default()),
            ErosionVariant::Tidal => ErosionKind::Tidal(TidalParams::default()),
            ErosionVariant::Wind => ErosionKind::Wind(WindParams::default()),
            ErosionVariant::Canyon => ErosionKind::Canyon(CanyonParams::default()),
        }
    }
}

/// One erosion invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Per-variant intensity. Canyon ignores it.
    pub strength: f32,
    /// Smoothing passes run after the erosion pass.
    pub smooth_passes: u32,
    pub kind: ErosionKind,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            strength: 0.1,
            smooth_passes: 5,
            kind: ErosionKind::default(),
        }
    }
}

/// Run one erosion pass followed by the configured smoothing passes.
///
/// The erosion pass itself is atomic: it either completes or fails before
/// writing. Cancellation is honoured before the pass and between smoothing
/// passes.
pub fn erode(
    grid: &mut HeightGrid,
    params: &ErosionParams,
    rng: &mut impl Rng,
    noise: &(impl NoiseSource + ?Sized),
    cancel: &CancelToken,
) -> Result<(), TerrainError> {
    cancel.check()?;
    let strength = params.strength;
    match &params.kind {
        ErosionKind::Rain(p) => rain(grid, p, strength, rng),
        ErosionKind::River(p) => river(grid, p, strength, rng)?,
        ErosionKind::Thermal(p) => thermal(grid, p, strength),
        ErosionKind::Tidal(p) => tidal(grid, p),
        ErosionKind::Wind(p) => wind(grid, p, strength, noise),
        ErosionKind::Canyon(p) => carve_canyon(grid, p, rng)?,
    }
    tracing::debug!(variant = %params.kind.variant(), strength, "erosion pass complete");
    smooth(grid, params.smooth_passes, cancel)
}
