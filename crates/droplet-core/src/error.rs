use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Side;
use crate::ode::Termination;

/// Which iterative solver a numeric failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitMode {
    /// Geometric circle refinement.
    Circle,
    /// Polynomial / tangent least squares.
    Polynomial,
    /// Direct conic fit.
    Ellipse,
    /// Pixel-only Young–Laplace simplex fit.
    BashforthAdams,
    /// Five-parameter Levenberg–Marquardt fit.
    Tensiometry,
    /// Needle edge Gauss–Newton fit.
    Needle,
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle => write!(f, "circle fit"),
            Self::Polynomial => write!(f, "polynomial fit"),
            Self::Ellipse => write!(f, "ellipse fit"),
            Self::BashforthAdams => write!(f, "Bashforth-Adams fit"),
            Self::Tensiometry => write!(f, "tensiometry fit"),
            Self::Needle => write!(f, "needle fit"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DropletError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Contour has no points")]
    EmptyContour,

    #[error("Cannot isolate the drop apex: {0}")]
    DegenerateApex(String),

    #[error("{mode}: fitted curve does not intersect the baseline")]
    NonIntersectingGeometry { mode: FitMode },

    #[error("{mode}: singular normal matrix at iteration {iteration}")]
    SingularJacobian { mode: FitMode, iteration: usize },

    #[error("{mode}: no convergence after {iterations} iterations")]
    MaxIterationsExceeded { mode: FitMode, iterations: usize },

    #[error("{mode}: profile integration stopped early ({termination})")]
    IntegrationFailed {
        mode: FitMode,
        termination: Termination,
    },

    #[error("Invalid contour data at line {line}: {reason}")]
    ContourParse { line: usize, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Frame {frame_index}: {source}")]
    Frame {
        frame_index: usize,
        #[source]
        source: Box<DropletError>,
    },
}

impl DropletError {
    /// Attach the frame index to an error.
    pub fn in_frame(self, frame_index: usize) -> Self {
        match self {
            Self::Frame { .. } => self,
            other => Self::Frame {
                frame_index,
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, DropletError>;

/// Non-fatal numerical condition noticed while processing a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// Fewer points than recommended for stable fits.
    ShortContour { points: usize, recommended: usize },
    /// An ordered path hit a jump and the remaining points were dropped.
    PathTruncated { kept: usize, dropped: usize },
    /// Density clustering found no cluster; all points were kept.
    ClusteringFallback,
    /// Density clustering discarded points as noise or minor clusters.
    PointsDiscarded { count: usize },
    /// Fewer points than requested were available for a local fit.
    FewFitPoints { requested: usize, available: usize },
    /// The ML input profile was longer than the fixed length and was subsampled.
    ProfileSubsampled { original: usize, length: usize },
    /// The contact point is not the lowest point of its half's bottom band,
    /// as happens on wetting drops.
    ContactAboveBand { side: Side, height: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortContour {
                points,
                recommended,
            } => write!(
                f,
                "contour has {points} points, at least {recommended} recommended"
            ),
            Self::PathTruncated { kept, dropped } => write!(
                f,
                "ordered path truncated at a jump ({kept} kept, {dropped} dropped)"
            ),
            Self::ClusteringFallback => write!(f, "no dense cluster found, kept all points"),
            Self::PointsDiscarded { count } => {
                write!(f, "{count} points discarded as noise")
            }
            Self::FewFitPoints {
                requested,
                available,
            } => write!(
                f,
                "only {available} of {requested} requested points available"
            ),
            Self::ProfileSubsampled { original, length } => {
                write!(f, "profile of {original} points subsampled to {length}")
            }
            Self::ContactAboveBand { side, height } => write!(
                f,
                "{side} contact point sits {height:.2} px above the bottom of its profile"
            ),
        }
    }
}
