use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use droplet_core::fit::ContactAngleMethod;
use droplet_core::pipeline::{analyze_batch_reported, AnalysisConfig};

use crate::progress::BarReporter;
use crate::summary::print_angle_table;

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Tangent,
    Polynomial,
    Circle,
    Ellipse,
    YoungLaplace,
}

impl From<MethodArg> for ContactAngleMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Tangent => Self::Tangent,
            MethodArg::Polynomial => Self::Polynomial,
            MethodArg::Circle => Self::Circle,
            MethodArg::Ellipse => Self::Ellipse,
            MethodArg::YoungLaplace => Self::YoungLaplace,
        }
    }
}

#[derive(Args)]
pub struct AngleArgs {
    /// Raw contour files, one frame each
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Methods to run (repeatable); defaults to the config's list
    #[arg(long, value_enum)]
    pub method: Vec<MethodArg>,

    /// Write one tab-separated row per frame and method
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &AngleArgs, config: &AnalysisConfig) -> Result<()> {
    let mut config = config.clone();
    if !args.method.is_empty() {
        config.methods = args.method.iter().map(|&m| m.into()).collect();
    }

    let frames = super::read_all(&args.files)?;
    let reporter = Arc::new(BarReporter::new()?);
    let reports = analyze_batch_reported(&frames, &config, reporter.clone());
    reporter.finish();

    print_angle_table(&args.files, &reports);

    if let Some(ref path) = args.output {
        let mut text = String::from("frame\tmethod\tleft\tright\trmse\n");
        for report in reports.iter().flatten() {
            for row in report.rows() {
                let rmse = row
                    .metrics
                    .map(|m| format!("{:.6}", m.rmse))
                    .unwrap_or_default();
                text.push_str(&format!(
                    "{}\t{}\t{:.4}\t{:.4}\t{}\n",
                    report.frame_index, row.method, row.left_angle, row.right_angle, rmse
                ));
            }
        }
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Results saved to {}", path.display());
    }
    Ok(())
}
