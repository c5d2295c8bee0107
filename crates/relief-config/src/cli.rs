//! Command-line argument parsing for the relief tools.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Relief command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "relief", about = "Sculpt and classify procedural terrain")]
pub struct CliArgs {
    /// Grid width in cells.
    #[arg(long)]
    pub width: Option<usize>,

    /// Grid height in cells.
    #[arg(long)]
    pub height: Option<usize>,

    /// Root seed for all random and noise streams.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory that receives the generated images.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log filter (error, warn, info, debug, trace, or directives).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.terrain.width = w;
        }
        if let Some(h) = args.height {
            self.terrain.height = h;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
