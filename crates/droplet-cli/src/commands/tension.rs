use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use droplet_core::pipeline::{analyze_tension_batch_reported, AnalysisConfig};
use droplet_core::tensiometry::{fit_needle_width, DropOrientation};
use tracing::info;

use crate::progress::BarReporter;
use crate::summary::{print_needle_summary, print_tension_table};

#[derive(Clone, Copy, ValueEnum)]
pub enum OrientationArg {
    Pendant,
    Sessile,
}

#[derive(Args)]
pub struct TensionArgs {
    /// Drop outline files, one frame each, in time order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Points on the first needle edge
    #[arg(long)]
    pub needle_left: PathBuf,

    /// Points on the second needle edge
    #[arg(long)]
    pub needle_right: PathBuf,

    /// Needle outer diameter in millimetres
    #[arg(long)]
    pub needle_mm: Option<f64>,

    /// Drop orientation
    #[arg(long, value_enum)]
    pub orientation: Option<OrientationArg>,

    /// Seconds between frames
    #[arg(long, default_value = "1.0")]
    pub interval: f64,

    /// Write one tab-separated row per frame
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &TensionArgs, config: &AnalysisConfig) -> Result<()> {
    let mut tension_config = config.tensiometry.clone();
    if let Some(mm) = args.needle_mm {
        tension_config.physical.needle_diameter_mm = mm;
    }
    if let Some(orientation) = args.orientation {
        tension_config.orientation = match orientation {
            OrientationArg::Pendant => DropOrientation::Pendant,
            OrientationArg::Sessile => DropOrientation::Sessile,
        };
    }

    let left = super::read_points(&args.needle_left)?;
    let right = super::read_points(&args.needle_right)?;
    let needle = fit_needle_width(&left, &right, &tension_config.tolerances)
        .context("Needle fit failed")?;
    info!(diameter_px = needle.diameter, theta = needle.theta, "Needle fitted");
    print_needle_summary(&needle, &tension_config.physical);

    let frames = super::read_all(&args.files)?;
    let reporter = Arc::new(BarReporter::new()?);
    let results =
        analyze_tension_batch_reported(&frames, needle.diameter, &tension_config, reporter.clone());
    reporter.finish();

    print_tension_table(&args.files, &results, args.interval);

    if let Some(ref path) = args.output {
        let mut text = String::from(
            "time\ttension\tvolume\tarea\tapex_x\tapex_y\tapex_radius\tbond_number\trotation\n",
        );
        for (i, result) in results.iter().enumerate() {
            let Ok(result) = result else { continue };
            let row = result.to_row(i as f64 * args.interval);
            text.push_str(&format!(
                "{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.6}\t{:.6}\n",
                row.time,
                row.tension,
                row.volume,
                row.area,
                row.apex_x,
                row.apex_y,
                row.apex_radius,
                row.bond_number,
                row.rotation
            ));
        }
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Results saved to {}", path.display());
    }
    Ok(())
}
