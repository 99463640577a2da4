pub mod angle;
pub mod clean;
pub mod config;
pub mod needle;
pub mod tension;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use droplet_core::geometry::Point;
use droplet_core::io::read_contour;
use droplet_core::pipeline::AnalysisConfig;
use tracing::{debug, info};

/// Load the analysis config from `path`, or use the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading analysis config");
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&contents).context("Invalid analysis config")
        }
        None => Ok(AnalysisConfig::default()),
    }
}

pub fn read_points(path: &Path) -> Result<Vec<Point>> {
    read_contour(path).with_context(|| format!("Failed to read contour {}", path.display()))
}

/// Read every contour file in parallel, keeping input order.
pub fn read_all(paths: &[PathBuf]) -> Result<Vec<Vec<Point>>> {
    use rayon::prelude::*;
    info!(files = paths.len(), "Reading contours");
    paths.par_iter().map(|p| read_points(p)).collect()
}
