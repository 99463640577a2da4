use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use droplet_core::clean::clean;
use droplet_core::io::write_contour;
use droplet_core::pipeline::AnalysisConfig;

use crate::summary::print_clean_summary;

#[derive(Args)]
pub struct CleanArgs {
    /// Raw contour file (`x y` per line)
    pub file: PathBuf,

    /// Write the cleaned, ordered profile to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the jump threshold in pixels
    #[arg(long)]
    pub jump: Option<f64>,
}

pub fn run(args: &CleanArgs, config: &AnalysisConfig) -> Result<()> {
    let raw = super::read_points(&args.file)?;
    let mut clean_config = config.clean.clone();
    if let Some(jump) = args.jump {
        clean_config.jump_threshold = jump;
    }

    let cleaned = clean(&raw, &clean_config)
        .with_context(|| format!("Failed to clean {}", args.file.display()))?;
    print_clean_summary(&args.file, raw.len(), &cleaned);

    if let Some(ref path) = args.output {
        write_contour(path, &cleaned.profile)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Cleaned profile saved to {}", path.display());
    }
    Ok(())
}
