//! Sculpts a terrain from `config.ron`, classifies it and writes the results
//! as PNG images.

mod images;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use relief_config::{CliArgs, Config, ConfigError, default_config_dir};
use relief_terrain::seed::{Stream, stream_rng};
use relief_terrain::{
    CancelToken, HeightGrid, PerlinSource, Sculptor, TerrainError, compute_splat_weights,
    extract_shoreline, generate_density_maps, generate_noise_texture, plant_vegetation,
    to_luminance8,
};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to create output directory: {0}")]
    Output(#[source] std::io::Error),

    #[error("pixel buffer does not fit a {width}x{height} image")]
    BufferSize { width: usize, height: usize },
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    // Load or create config, then apply CLI overrides
    let (mut config, load_error) = match Config::load_or_create(&config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    relief_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    if let Some(e) = load_error {
        warn!("Failed to load config: {e}, using defaults");
    }

    if let Err(e) = run(&config) {
        tracing::error!("relief run failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), DemoError> {
    config.validate()?;
    let out = &config.output.directory;
    std::fs::create_dir_all(out).map_err(DemoError::Output)?;

    let (grid, noise) = sculpt(config)?;
    classify(config, &grid, &noise, out)?;

    if let Some(params) = &config.output.noise_texture {
        let texture = generate_noise_texture(params, &noise, &CancelToken::new())?;
        images::save_noise_texture(&texture, &out.join("noise_texture.png"))?;
    }

    info!(directory = %out.display(), "relief run complete");
    Ok(())
}

/// Run the configured steps and write the heightmap.
fn sculpt(config: &Config) -> Result<(HeightGrid, PerlinSource), DemoError> {
    let terrain = &config.terrain;
    let mut sculptor =
        Sculptor::new(terrain.width, terrain.height, terrain.seed)?.with_reset(terrain.reset);

    if let Some(import) = &terrain.import {
        let image = images::load_luminance(&import.path)?;
        sculptor.import_luminance(&image, import.scale)?;
        info!(path = %import.path.display(), "heightmap imported");
    }

    let started = Instant::now();
    sculptor.run(&terrain.steps)?;
    let (min, max) = sculptor.grid().min_max();
    info!(
        steps = terrain.steps.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        min,
        max,
        "terrain sculpted"
    );

    let noise = sculptor.noise().clone();
    let grid = sculptor.into_grid();
    if config.output.heightmap {
        let path = config.output.directory.join("heightmap.png");
        images::save_luminance(&to_luminance8(&grid), &path)?;
    }
    Ok((grid, noise))
}

/// Splat weights, density maps, vegetation and shoreline for `grid`.
fn classify(
    config: &Config,
    grid: &HeightGrid,
    noise: &PerlinSource,
    out: &Path,
) -> Result<(), DemoError> {
    let rules = &config.classification;
    let cancel = CancelToken::new();
    let seed = config.terrain.seed;

    let weights =
        compute_splat_weights(grid, &rules.splat_layers, rules.slope_metric, noise, &cancel)?;
    if config.output.splat_maps {
        for layer in 0..weights.layer_count() {
            images::save_splat_layer(&weights, layer, &out.join(format!("splat_{layer}.png")))?;
        }
    }
    info!(layers = weights.layer_count(), "splat weights computed");

    let maps = generate_density_maps(
        grid,
        &rules.density_rules,
        config.density_resolution(),
        rules.slope_metric,
        &mut stream_rng(seed, Stream::Density),
        noise,
        &cancel,
    )?;
    if config.output.density_maps {
        for (index, map) in maps.iter().enumerate() {
            images::save_density_map(map, &out.join(format!("density_{index}.png")))?;
        }
    }
    for (index, map) in maps.iter().enumerate() {
        info!(rule = index, occupied = map.occupied_count(), "density map generated");
    }

    let plants = plant_vegetation(
        grid,
        &rules.vegetation_rules,
        &rules.vegetation,
        rules.slope_metric,
        &mut stream_rng(seed, Stream::Vegetation),
        &cancel,
    )?;
    if plants.len() >= rules.vegetation.max_instances {
        warn!(
            max_instances = rules.vegetation.max_instances,
            "vegetation budget exhausted"
        );
    }
    info!(instances = plants.len(), "vegetation planted");

    let shoreline = extract_shoreline(grid, rules.water_height);
    info!(
        water_height = rules.water_height,
        segments = shoreline.len(),
        "shoreline extracted"
    );
    Ok(())
}
