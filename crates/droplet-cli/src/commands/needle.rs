use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use droplet_core::pipeline::AnalysisConfig;
use droplet_core::tensiometry::fit_needle_width;

use crate::summary::print_needle_summary;

#[derive(Args)]
pub struct NeedleArgs {
    /// Points on the first needle edge
    pub left: PathBuf,
    /// Points on the second needle edge
    pub right: PathBuf,
}

pub fn run(args: &NeedleArgs, config: &AnalysisConfig) -> Result<()> {
    let left = super::read_points(&args.left)?;
    let right = super::read_points(&args.right)?;
    let needle = fit_needle_width(&left, &right, &config.tensiometry.tolerances)
        .context("Needle fit failed")?;
    print_needle_summary(&needle, &config.tensiometry.physical);
    Ok(())
}
