use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{DropletError, FitMode, Result, Warning};
use crate::geometry::{ErrorMetrics, Point};

/// Left and right contact angles in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactAngles {
    pub left: f64,
    pub right: f64,
}

/// Wall-clock time spent per stage, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub cleaning_ms: f64,
    pub fitting_ms: f64,
}

impl Timing {
    pub fn fitting_since(t0: Instant) -> Self {
        Self {
            cleaning_ms: 0.0,
            fitting_ms: elapsed_ms(t0),
        }
    }
}

pub fn elapsed_ms(t0: Instant) -> f64 {
    t0.elapsed().as_secs_f64() * 1e3
}

/// How an iterative fit ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitStatus {
    Converged { iterations: usize },
    /// The step budget ran out; parameters are the best found.
    MaxIterationsExceeded { iterations: usize },
}

impl FitStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match *self {
            Self::Converged { iterations } | Self::MaxIterationsExceeded { iterations } => {
                iterations
            }
        }
    }

    /// Turn a non-converged status into an error, for callers that treat it as fatal.
    pub fn require_converged(&self, mode: FitMode) -> Result<()> {
        match *self {
            Self::Converged { .. } => Ok(()),
            Self::MaxIterationsExceeded { iterations } => {
                Err(DropletError::MaxIterationsExceeded { mode, iterations })
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleParams {
    pub center: Point,
    pub radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EllipseParams {
    pub center: Point,
    /// Semi-major axis.
    pub semi_major: f64,
    /// Semi-minor axis.
    pub semi_minor: f64,
    /// Major-axis rotation from +x in radians, in (−π/2, π/2].
    pub rotation: f64,
}

impl EllipseParams {
    /// `n` points around the ellipse, closed (first point repeated).
    pub fn sample(&self, n: usize) -> Vec<Point> {
        let (sin_r, cos_r) = self.rotation.sin_cos();
        (0..=n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                let px = self.semi_major * t.cos();
                let py = self.semi_minor * t.sin();
                Point::new(
                    self.center.x + cos_r * px - sin_r * py,
                    self.center.y + sin_r * px + cos_r * py,
                )
            })
            .collect()
    }
}

/// Polynomial coefficients (ascending powers) of the along-baseline offset as
/// a function of height above the baseline, per side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolynomialParams {
    pub degree: usize,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

/// Pixel-mode Young–Laplace parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BashforthAdamsParams {
    /// Capillary length in pixels.
    pub a: f64,
    /// Apex radius of curvature in pixels.
    pub b: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircleFit {
    pub angles: ContactAngles,
    pub params: CircleParams,
    /// Distance between the two baseline intersections.
    pub baseline_width: f64,
    pub metrics: ErrorMetrics,
    pub timing: Timing,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EllipseFit {
    pub angles: ContactAngles,
    pub params: EllipseParams,
    pub baseline_width: f64,
    pub metrics: ErrorMetrics,
    pub timing: Timing,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolynomialFit {
    pub angles: ContactAngles,
    pub params: PolynomialParams,
    pub metrics: ErrorMetrics,
    pub timing: Timing,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YoungLaplaceFit {
    pub angles: ContactAngles,
    pub params: BashforthAdamsParams,
    /// `18·b²/a²`, see [`crate::consts::PIXEL_BOND_SCALE`].
    pub bond_number: f64,
    /// Drop volume in cubic pixels.
    pub volume: f64,
    pub baseline_width: f64,
    /// Apex height above the baseline in pixels.
    pub height: f64,
    pub metrics: ErrorMetrics,
    pub status: FitStatus,
    pub timing: Timing,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictedFit {
    pub angles: ContactAngles,
    pub timing: Timing,
    /// Input-preparation warnings, such as subsampled halves.
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

/// Result of one contact-angle method on one frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FitResult {
    Circle(CircleFit),
    Ellipse(EllipseFit),
    PolynomialTangent(PolynomialFit),
    YoungLaplace(YoungLaplaceFit),
    /// Angles from an external regression model.
    Predicted(PredictedFit),
}

impl FitResult {
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Circle(_) => "circle fit",
            Self::Ellipse(_) => "ellipse fit",
            Self::PolynomialTangent(p) if p.params.degree == 1 => "tangent fit",
            Self::PolynomialTangent(_) => "polynomial fit",
            Self::YoungLaplace(_) => "Young-Laplace fit",
            Self::Predicted(_) => "ML model",
        }
    }

    pub fn angles(&self) -> ContactAngles {
        match self {
            Self::Circle(r) => r.angles,
            Self::Ellipse(r) => r.angles,
            Self::PolynomialTangent(r) => r.angles,
            Self::YoungLaplace(r) => r.angles,
            Self::Predicted(r) => r.angles,
        }
    }

    /// Fit-error statistics; `None` for methods without a fitted curve.
    pub fn metrics(&self) -> Option<ErrorMetrics> {
        match self {
            Self::Circle(r) => Some(r.metrics),
            Self::Ellipse(r) => Some(r.metrics),
            Self::PolynomialTangent(r) => Some(r.metrics),
            Self::YoungLaplace(r) => Some(r.metrics),
            Self::Predicted(_) => None,
        }
    }

    pub fn timing(&self) -> Timing {
        match self {
            Self::Circle(r) => r.timing,
            Self::Ellipse(r) => r.timing,
            Self::PolynomialTangent(r) => r.timing,
            Self::YoungLaplace(r) => r.timing,
            Self::Predicted(r) => r.timing,
        }
    }

    /// Copy of the result with the frame's cleaning time recorded.
    pub fn with_cleaning_ms(self, cleaning_ms: f64) -> Self {
        let stamp = |t: Timing| Timing { cleaning_ms, ..t };
        match self {
            Self::Circle(r) => Self::Circle(CircleFit {
                timing: stamp(r.timing),
                ..r
            }),
            Self::Ellipse(r) => Self::Ellipse(EllipseFit {
                timing: stamp(r.timing),
                ..r
            }),
            Self::PolynomialTangent(r) => Self::PolynomialTangent(PolynomialFit {
                timing: stamp(r.timing),
                ..r
            }),
            Self::YoungLaplace(r) => Self::YoungLaplace(YoungLaplaceFit {
                timing: stamp(r.timing),
                ..r
            }),
            Self::Predicted(r) => Self::Predicted(PredictedFit {
                timing: stamp(r.timing),
                ..r
            }),
        }
    }
}
