//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use relief_terrain::{
    DensityRule, ErosionKind, ErosionParams, FbmLayer, ImportScale, MIN_GRID_SIDE,
    NoiseTextureParams, SlopeMetric, SplatLayer, Step, VegetationParams, VegetationRule,
    VoronoiParams, erosion::RiverParams,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Platform config directory for the relief tools, e.g.
/// `~/.config/relief` on Linux.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("relief"))
}

/// Top-level run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// What to sculpt.
    pub terrain: TerrainConfig,
    /// How to classify the sculpted terrain.
    pub classification: ClassificationConfig,
    /// Where results go.
    pub output: OutputConfig,
    pub debug: DebugConfig,
}

/// Grid size, seed and the ordered sculpting steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub width: usize,
    pub height: usize,
    /// Root seed for every random and noise stream.
    pub seed: u64,
    /// Zero the grid before each generator step.
    pub reset: bool,
    /// Grayscale image added to the grid before any step runs.
    pub import: Option<ImportConfig>,
    pub steps: Vec<Step>,
}

/// A heightmap image to import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub scale: ImportScale,
}

/// Rules for splat weights, density maps, vegetation and the shoreline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassificationConfig {
    pub slope_metric: SlopeMetric,
    /// Level used for shoreline extraction.
    pub water_height: f32,
    /// One weight channel per layer, in order.
    pub splat_layers: Vec<SplatLayer>,
    pub density_rules: Vec<DensityRule>,
    /// Density map size. `None` uses the grid size.
    pub density_resolution: Option<(usize, usize)>,
    pub vegetation: VegetationParams,
    pub vegetation_rules: Vec<VegetationRule>,
}

/// Output directory and which images to write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub heightmap: bool,
    pub splat_maps: bool,
    pub density_maps: bool,
    /// Parameters for a standalone noise texture. `None` skips it.
    pub noise_texture: Option<NoiseTextureParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g., "debug", "info", "relief_terrain=trace").
    pub log_level: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 257,
            height: 257,
            seed: 42,
            reset: false,
            import: None,
            steps: vec![
                Step::Fbm(FbmLayer {
                    height_scale: 0.3,
                    ..Default::default()
                }),
                Step::Voronoi(VoronoiParams::default()),
                Step::Erode(ErosionParams {
                    kind: ErosionKind::River(RiverParams::default()),
                    ..Default::default()
                }),
                Step::Smooth { passes: 2 },
            ],
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            slope_metric: SlopeMetric::Degrees {
                horizontal_spacing: 1.0,
                vertical_scale: 64.0,
            },
            water_height: 0.15,
            splat_layers: vec![
                // sand
                SplatLayer {
                    min_height: 0.0,
                    max_height: 0.18,
                    max_slope: 30.0,
                    ..Default::default()
                },
                // grass
                SplatLayer {
                    min_height: 0.15,
                    max_height: 0.45,
                    max_slope: 35.0,
                    ..Default::default()
                },
                // rock
                SplatLayer {
                    min_height: 0.0,
                    max_height: 1.0,
                    min_slope: 30.0,
                    max_slope: 90.0,
                    noise_multiplier: 0.0,
                    ..Default::default()
                },
            ],
            density_rules: vec![DensityRule {
                min_height: 0.15,
                max_height: 0.45,
                max_slope: 30.0,
                ..Default::default()
            }],
            density_resolution: None,
            vegetation: VegetationParams::default(),
            vegetation_rules: vec![VegetationRule {
                min_height: 0.2,
                max_height: 0.5,
                max_slope: 25.0,
                density: 0.3,
                min_scale: 0.8,
                max_scale: 1.2,
                ..Default::default()
            }],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("relief-output"),
            heightmap: true,
            splat_maps: true,
            density_maps: true,
            noise_texture: Some(NoiseTextureParams {
                width: 256,
                height: 256,
                ..Default::default()
            }),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl Config {
    /// Reject values that parse but cannot drive a run. Per-operation
    /// parameters are checked by the operations themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let terrain = &self.terrain;
        if terrain.width < MIN_GRID_SIDE || terrain.height < MIN_GRID_SIDE {
            return Err(ConfigError::Invalid {
                field: "terrain",
                reason: format!(
                    "grid {}x{} is smaller than {MIN_GRID_SIDE}x{MIN_GRID_SIDE}",
                    terrain.width, terrain.height
                ),
            });
        }
        match self.classification.density_resolution {
            Some((w, h)) if w == 0 || h == 0 => {
                return Err(ConfigError::Invalid {
                    field: "classification.density_resolution",
                    reason: format!("{w}x{h} is empty"),
                });
            }
            _ => {}
        }
        if !self.classification.water_height.is_finite() {
            return Err(ConfigError::Invalid {
                field: "classification.water_height",
                reason: "must be finite".to_string(),
            });
        }
        if self.debug.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "debug.log_level",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Density map size: the configured resolution or the grid size.
    pub fn density_resolution(&self) -> (usize, usize) {
        self.classification
            .density_resolution
            .unwrap_or((self.terrain.width, self.terrain.height))
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }
}
