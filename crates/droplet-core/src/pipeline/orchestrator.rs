use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::clean::{clean, CleanedProfile};
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::Result;
use crate::fit::{elapsed_ms, fit, Timing};
use crate::geometry::Point;
use crate::tensiometry::{analyze_drop, TensiometryConfig, TensiometryResult};

use super::config::AnalysisConfig;
use super::types::{AnalysisStage, FrameReport, NoOpReporter, ProgressReporter};

/// Clean one contour and run every configured contact-angle method on it.
///
/// Cleaning failures abort the frame; fitter failures are recorded per
/// method. All errors carry `frame_index`.
pub fn analyze_contact_angles(
    raw: &[Point],
    frame_index: usize,
    config: &AnalysisConfig,
) -> Result<FrameReport> {
    let t0 = Instant::now();
    let cleaned = clean(raw, &config.clean).map_err(|e| e.in_frame(frame_index))?;
    Ok(fit_frame(cleaned, elapsed_ms(t0), frame_index, config))
}

fn fit_frame(
    cleaned: CleanedProfile,
    cleaning_ms: f64,
    frame_index: usize,
    config: &AnalysisConfig,
) -> FrameReport {
    let t0 = Instant::now();
    let outcomes: Vec<_> = config
        .methods
        .iter()
        .map(|&method| {
            let outcome = fit(&cleaned, method, &config.fit)
                .map(|r| r.with_cleaning_ms(cleaning_ms))
                .map_err(|e| {
                    warn!(frame = frame_index, method = %method, error = %e, "Fit failed");
                    e.in_frame(frame_index)
                });
            (method, outcome)
        })
        .collect();
    FrameReport {
        frame_index,
        cleaned,
        outcomes,
        timing: Timing {
            cleaning_ms,
            fitting_ms: elapsed_ms(t0),
        },
    }
}

/// Contact-angle analysis over many frames with a thread-safe progress reporter.
///
/// Frames are cleaned, then fitted; each stage runs in parallel once there
/// are at least [`PARALLEL_FRAME_THRESHOLD`] frames. The output has one entry
/// per input frame, in order.
pub fn analyze_batch_reported(
    frames: &[Vec<Point>],
    config: &AnalysisConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Vec<Result<FrameReport>> {
    info!(frames = frames.len(), methods = config.methods.len(), "Starting batch analysis");

    reporter.begin_stage(AnalysisStage::Cleaning, Some(frames.len()));
    let cleaned = for_each_frame(frames, &reporter, |i, raw| {
        let t0 = Instant::now();
        clean(raw, &config.clean)
            .map(|c| (c, elapsed_ms(t0)))
            .map_err(|e| e.in_frame(i))
    });
    reporter.finish_stage();

    reporter.begin_stage(AnalysisStage::Fitting, Some(frames.len()));
    let counter = AtomicUsize::new(0);
    let run = |(i, c): (usize, Result<(CleanedProfile, f64)>)| {
        let report = c.map(|(profile, ms)| fit_frame(profile, ms, i, config));
        reporter.advance(counter.fetch_add(1, Ordering::Relaxed) + 1);
        report
    };
    let reports: Vec<_> = if frames.len() >= PARALLEL_FRAME_THRESHOLD {
        cleaned.into_par_iter().enumerate().map(run).collect()
    } else {
        cleaned.into_iter().enumerate().map(run).collect()
    };
    reporter.finish_stage();

    let failed = reports.iter().filter(|r| r.is_err()).count();
    info!(frames = reports.len(), failed, "Batch analysis complete");
    reports
}

/// Contact-angle analysis over many frames.
pub fn analyze_batch(frames: &[Vec<Point>], config: &AnalysisConfig) -> Vec<Result<FrameReport>> {
    analyze_batch_reported(frames, config, Arc::new(NoOpReporter))
}

/// Tensiometry over a time series of drop outlines sharing one needle scale.
pub fn analyze_tension_batch_reported(
    frames: &[Vec<Point>],
    needle_diameter_px: f64,
    config: &TensiometryConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Vec<Result<TensiometryResult>> {
    reporter.begin_stage(AnalysisStage::Tensiometry, Some(frames.len()));
    let results = for_each_frame(frames, &reporter, |i, raw| {
        analyze_drop(raw, needle_diameter_px, config).map_err(|e| e.in_frame(i))
    });
    reporter.finish_stage();
    results
}

pub fn analyze_tension_batch(
    frames: &[Vec<Point>],
    needle_diameter_px: f64,
    config: &TensiometryConfig,
) -> Vec<Result<TensiometryResult>> {
    analyze_tension_batch_reported(frames, needle_diameter_px, config, Arc::new(NoOpReporter))
}

/// Map `op` over frames in order, in parallel above the frame threshold.
fn for_each_frame<T, F>(
    frames: &[Vec<Point>],
    reporter: &Arc<dyn ProgressReporter>,
    op: F,
) -> Vec<Result<T>>
where
    T: Send,
    F: Fn(usize, &[Point]) -> Result<T> + Send + Sync,
{
    let counter = AtomicUsize::new(0);
    let run = |(i, raw): (usize, &Vec<Point>)| {
        let result = op(i, raw);
        reporter.advance(counter.fetch_add(1, Ordering::Relaxed) + 1);
        result
    };
    if frames.len() >= PARALLEL_FRAME_THRESHOLD {
        frames.par_iter().enumerate().map(run).collect()
    } else {
        frames.iter().enumerate().map(run).collect()
    }
}
