//! Run configuration for the relief tools.
//!
//! Settings persist to disk as RON, grid size, seed and output location can
//! be overridden from the command line, and the sculpting step list is the
//! same serializable [`relief_terrain::Step`] the pipeline executes.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    ClassificationConfig, Config, DebugConfig, ImportConfig, OutputConfig, TerrainConfig,
    default_config_dir,
};
pub use error::ConfigError;
