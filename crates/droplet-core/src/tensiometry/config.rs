use serde::{Deserialize, Serialize};

use crate::clean::CleanConfig;
use crate::consts::{
    DEFAULT_ARCLENGTH_TOL, DEFAULT_CONTINUOUS_DENSITY, DEFAULT_DELTA_TOL, DEFAULT_DROP_DENSITY,
    DEFAULT_GRADIENT_TOL, DEFAULT_MAX_ARCLENGTH_STEPS, DEFAULT_MAX_FITTING_STEPS,
    DEFAULT_NEEDLE_DIAMETER_MM, DEFAULT_NEEDLE_STEPS, DEFAULT_NEEDLE_TOL, DEFAULT_OBJECTIVE_TOL,
    STANDARD_GRAVITY,
};
use crate::ode::Integrator;
use crate::young_laplace::DropOrientation;

/// Stopping rules for the Levenberg–Marquardt, arc-length and needle loops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Largest relative parameter change that still counts as converged.
    #[serde(default = "default_delta_tol")]
    pub delta_tol: f64,
    /// Scaled-gradient threshold.
    #[serde(default = "default_gradient_tol")]
    pub gradient_tol: f64,
    #[serde(default = "default_max_fitting_steps")]
    pub max_fitting_steps: usize,
    /// Relative objective change threshold.
    #[serde(default = "default_objective_tol")]
    pub objective_tol: f64,
    /// Newton step size below which an arc-length match is final.
    #[serde(default = "default_arclength_tol")]
    pub arclength_tol: f64,
    #[serde(default = "default_max_arclength_steps")]
    pub max_arclength_steps: usize,
    #[serde(default = "default_needle_tol")]
    pub needle_tol: f64,
    #[serde(default = "default_needle_steps")]
    pub needle_steps: usize,
}

fn default_delta_tol() -> f64 {
    DEFAULT_DELTA_TOL
}
fn default_gradient_tol() -> f64 {
    DEFAULT_GRADIENT_TOL
}
fn default_max_fitting_steps() -> usize {
    DEFAULT_MAX_FITTING_STEPS
}
fn default_objective_tol() -> f64 {
    DEFAULT_OBJECTIVE_TOL
}
fn default_arclength_tol() -> f64 {
    DEFAULT_ARCLENGTH_TOL
}
fn default_max_arclength_steps() -> usize {
    DEFAULT_MAX_ARCLENGTH_STEPS
}
fn default_needle_tol() -> f64 {
    DEFAULT_NEEDLE_TOL
}
fn default_needle_steps() -> usize {
    DEFAULT_NEEDLE_STEPS
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            delta_tol: DEFAULT_DELTA_TOL,
            gradient_tol: DEFAULT_GRADIENT_TOL,
            max_fitting_steps: DEFAULT_MAX_FITTING_STEPS,
            objective_tol: DEFAULT_OBJECTIVE_TOL,
            arclength_tol: DEFAULT_ARCLENGTH_TOL,
            max_arclength_steps: DEFAULT_MAX_ARCLENGTH_STEPS,
            needle_tol: DEFAULT_NEEDLE_TOL,
            needle_steps: DEFAULT_NEEDLE_STEPS,
        }
    }
}

/// Fluid and apparatus constants (SI units except the needle diameter).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    /// Drop phase density in kg/m³.
    #[serde(default = "default_drop_density")]
    pub drop_density: f64,
    /// Surrounding phase density in kg/m³.
    #[serde(default = "default_continuous_density")]
    pub continuous_density: f64,
    #[serde(default = "default_needle_diameter_mm")]
    pub needle_diameter_mm: f64,
    /// m/s².
    #[serde(default = "default_gravity")]
    pub gravity: f64,
}

fn default_drop_density() -> f64 {
    DEFAULT_DROP_DENSITY
}
fn default_continuous_density() -> f64 {
    DEFAULT_CONTINUOUS_DENSITY
}
fn default_needle_diameter_mm() -> f64 {
    DEFAULT_NEEDLE_DIAMETER_MM
}
fn default_gravity() -> f64 {
    STANDARD_GRAVITY
}

impl PhysicalParameters {
    pub fn density_difference(&self) -> f64 {
        (self.drop_density - self.continuous_density).abs()
    }
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            drop_density: DEFAULT_DROP_DENSITY,
            continuous_density: DEFAULT_CONTINUOUS_DENSITY,
            needle_diameter_mm: DEFAULT_NEEDLE_DIAMETER_MM,
            gravity: STANDARD_GRAVITY,
        }
    }
}

/// Everything the five-parameter fit needs besides the contour.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TensiometryConfig {
    #[serde(default)]
    pub tolerances: Tolerances,
    #[serde(default)]
    pub physical: PhysicalParameters,
    #[serde(default)]
    pub orientation: DropOrientation,
    #[serde(default)]
    pub integrator: Integrator,
    /// Outlier removal and ordering of the drop outline.
    #[serde(default)]
    pub clean: CleanConfig,
}
