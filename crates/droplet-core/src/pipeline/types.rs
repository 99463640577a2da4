use serde::{Deserialize, Serialize};

use crate::clean::CleanedProfile;
use crate::error::DropletError;
use crate::fit::{ContactAngleMethod, FitResult, Timing};
use crate::geometry::ErrorMetrics;

/// Analysis stage, used for progress reporting.
#[derive(Clone, Copy, Debug)]
pub enum AnalysisStage {
    Cleaning,
    Fitting,
    Tensiometry,
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cleaning => write!(f, "Cleaning contours"),
            Self::Fitting => write!(f, "Fitting contact angles"),
            Self::Tensiometry => write!(f, "Fitting drop profiles"),
        }
    }
}

/// Everything learned from one frame.
///
/// Each method's outcome is kept separately so one failing fitter does not
/// hide the others.
#[derive(Debug)]
pub struct FrameReport {
    pub frame_index: usize,
    pub cleaned: CleanedProfile,
    pub outcomes: Vec<(ContactAngleMethod, Result<FitResult, DropletError>)>,
    pub timing: Timing,
}

impl FrameReport {
    /// Successful fits in method order.
    pub fn successes(&self) -> impl Iterator<Item = &FitResult> {
        self.outcomes.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    /// Flattened rows for every successful fit.
    pub fn rows(&self) -> Vec<ContactAngleRow> {
        self.outcomes
            .iter()
            .filter_map(|(method, outcome)| {
                let fit = outcome.as_ref().ok()?;
                let angles = fit.angles();
                Some(ContactAngleRow {
                    left_angle: angles.left,
                    right_angle: angles.right,
                    method: *method,
                    metrics: fit.metrics(),
                })
            })
            .collect()
    }
}

/// One output line per method and frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactAngleRow {
    pub left_angle: f64,
    pub right_angle: f64,
    pub method: ContactAngleMethod,
    pub metrics: Option<ErrorMetrics>,
}

/// Thread-safe progress reporting for batch analysis.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started with `total_items` work items, if known.
    fn begin_stage(&self, _stage: AnalysisStage, _total_items: Option<usize>) {}

    /// One more work item of the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `analyze_batch` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
