//! Pendant / sessile drop tensiometry.
//!
//! [`analyze_drop`] runs the full chain: outline preparation, initial
//! estimate, five-parameter Levenberg–Marquardt fit and the derived
//! physical quantities.

pub mod config;
pub mod fitter;
pub mod model;
pub mod needle;
pub mod pendant;
pub mod physics;
pub mod residuals;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::fit::{elapsed_ms, FitStatus, Timing};
use crate::geometry::Point;

pub use crate::young_laplace::DropOrientation;
pub use config::{PhysicalParameters, TensiometryConfig, Tolerances};
pub use fitter::{fit_drop_profile, ProfileFit};
pub use model::{DropParameters, ImageMapping};
pub use needle::{fit_needle_width, NeedleFit};
pub use pendant::{initial_estimate, prepare_pendant_profile, PendantProfile};
pub use physics::{derive_quantities, mm_per_pixel, PhysicalQuantities};

/// Outcome of one tensiometry frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TensiometryResult {
    pub params: DropParameters,
    pub quantities: PhysicalQuantities,
    /// Root-mean-square residual in pixels.
    pub rms_residual: f64,
    pub status: FitStatus,
    pub timing: Timing,
}

impl TensiometryResult {
    /// Flattened row for the report writer.
    pub fn to_row(&self, time: f64) -> TensiometryRow {
        TensiometryRow {
            time,
            tension: self.quantities.tension,
            volume: self.quantities.volume,
            area: self.quantities.area,
            apex_x: self.params.apex_x,
            apex_y: self.params.apex_y,
            apex_radius: self.params.apex_radius,
            bond_number: self.params.bond_number,
            rotation: self.params.rotation,
        }
    }
}

/// One output line per frame: time (s), tension (mN/m), volume (mm³),
/// area (mm²), then the fitted parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TensiometryRow {
    pub time: f64,
    pub tension: f64,
    pub volume: f64,
    pub area: f64,
    pub apex_x: f64,
    pub apex_y: f64,
    pub apex_radius: f64,
    pub bond_number: f64,
    pub rotation: f64,
}

/// Measure tension, volume and area of the drop outlined by `raw`.
///
/// `needle_diameter_px` is the fitted needle width, which sets the pixel
/// scale together with [`PhysicalParameters::needle_diameter_mm`].
pub fn analyze_drop(
    raw: &[Point],
    needle_diameter_px: f64,
    config: &TensiometryConfig,
) -> Result<TensiometryResult> {
    let t0 = Instant::now();
    let scale = mm_per_pixel(&config.physical, needle_diameter_px)?;
    let outline = prepare_pendant_profile(raw, config.orientation, &config.clean)?;
    let cleaning_ms = elapsed_ms(t0);

    let t1 = Instant::now();
    let (initial, s_max) = initial_estimate(&outline)?;
    let fit = fit_drop_profile(&outline.points, initial, s_max, config)?;
    let quantities = derive_quantities(
        &fit.params,
        &fit.table,
        fit.evaluation.max_arc_length(),
        scale,
        &config.physical,
    )?;

    info!(
        tension = quantities.tension,
        volume = quantities.volume,
        area = quantities.area,
        worthington = quantities.worthington,
        "Tensiometry complete"
    );

    Ok(TensiometryResult {
        params: fit.params,
        quantities,
        rms_residual: fit.rms_residual(),
        status: fit.status,
        timing: Timing {
            cleaning_ms,
            fitting_ms: elapsed_ms(t1),
        },
    })
}
