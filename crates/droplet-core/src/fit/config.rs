use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_POLYNOMIAL_POINTS, INITIAL_CAPILLARY_RATIO, NELDER_MEAD_F_TOLERANCE,
    NELDER_MEAD_ITERATIONS_PER_PARAM, NELDER_MEAD_X_TOLERANCE,
};
use crate::ode::Integrator;
use crate::optimize::NelderMeadOptions;

/// Contact-angle estimation method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactAngleMethod {
    Circle,
    Ellipse,
    /// Degree-1 fit near each contact point.
    Tangent,
    /// Degree-2 fit near each contact point.
    Polynomial,
    /// Pixel-only Young–Laplace (Bashforth–Adams) fit.
    YoungLaplace,
}

impl ContactAngleMethod {
    pub const ALL: [ContactAngleMethod; 5] = [
        Self::Tangent,
        Self::Polynomial,
        Self::Circle,
        Self::Ellipse,
        Self::YoungLaplace,
    ];
}

impl fmt::Display for ContactAngleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle => write!(f, "Circle"),
            Self::Ellipse => write!(f, "Ellipse"),
            Self::Tangent => write!(f, "Tangent"),
            Self::Polynomial => write!(f, "Polynomial"),
            Self::YoungLaplace => write!(f, "Young-Laplace"),
        }
    }
}

/// Circle fit options.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircleFitConfig {
    /// Round center and radius to whole pixels before intersecting the baseline.
    #[serde(default = "default_round_to_pixel")]
    pub round_to_pixel: bool,
}

fn default_round_to_pixel() -> bool {
    true
}

impl Default for CircleFitConfig {
    fn default() -> Self {
        Self {
            round_to_pixel: true,
        }
    }
}

/// Polynomial / tangent fit options.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolynomialFitConfig {
    /// Points taken next to each contact point.
    #[serde(default = "default_polynomial_points")]
    pub points: usize,
}

fn default_polynomial_points() -> usize {
    DEFAULT_POLYNOMIAL_POINTS
}

impl Default for PolynomialFitConfig {
    fn default() -> Self {
        Self {
            points: DEFAULT_POLYNOMIAL_POINTS,
        }
    }
}

/// Pixel-mode Young–Laplace fit options.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BashforthAdamsConfig {
    /// Initial capillary length as a multiple of the circle-fit radius.
    #[serde(default = "default_capillary_ratio")]
    pub initial_capillary_ratio: f64,
    /// ODE integrator used to generate candidate profiles.
    #[serde(default)]
    pub integrator: Integrator,
    /// Simplex minimizer settings.
    #[serde(default = "default_simplex")]
    pub simplex: NelderMeadOptions,
}

fn default_capillary_ratio() -> f64 {
    INITIAL_CAPILLARY_RATIO
}

fn default_simplex() -> NelderMeadOptions {
    NelderMeadOptions {
        max_iterations: 2 * NELDER_MEAD_ITERATIONS_PER_PARAM,
        x_tolerance: NELDER_MEAD_X_TOLERANCE,
        f_tolerance: NELDER_MEAD_F_TOLERANCE,
        ..NelderMeadOptions::default()
    }
}

impl Default for BashforthAdamsConfig {
    fn default() -> Self {
        Self {
            initial_capillary_ratio: INITIAL_CAPILLARY_RATIO,
            integrator: Integrator::default(),
            simplex: default_simplex(),
        }
    }
}

/// Options for every contact-angle fitter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FitConfig {
    #[serde(default)]
    pub circle: CircleFitConfig,
    #[serde(default)]
    pub polynomial: PolynomialFitConfig,
    #[serde(default)]
    pub young_laplace: BashforthAdamsConfig,
}
