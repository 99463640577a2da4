use serde::{Deserialize, Serialize};

use crate::error::{DropletError, Result};
use crate::young_laplace::ProfileTable;

use super::config::PhysicalParameters;
use super::model::DropParameters;

/// Physical quantities derived from a fitted profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalQuantities {
    /// Interfacial tension in mN/m.
    pub tension: f64,
    /// Drop volume in mm³.
    pub volume: f64,
    /// Drop surface area in mm².
    pub area: f64,
    /// Worthington number `Δρ g V / (π γ D)`.
    pub worthington: f64,
    /// Apex radius in mm.
    pub apex_radius_mm: f64,
}

/// Pixel size in mm from the needle's known diameter and its fitted width.
pub fn mm_per_pixel(physical: &PhysicalParameters, needle_diameter_px: f64) -> Result<f64> {
    if !(needle_diameter_px > 0.0) || !(physical.needle_diameter_mm > 0.0) {
        return Err(DropletError::InvalidInput(format!(
            "needle diameter must be positive ({} mm, {needle_diameter_px} px)",
            physical.needle_diameter_mm
        )));
    }
    Ok(physical.needle_diameter_mm / needle_diameter_px)
}

/// Interfacial tension in N/m: `γ = Δρ g R₀² / Bo`.
pub fn interfacial_tension(physical: &PhysicalParameters, apex_radius_m: f64, bond_number: f64) -> f64 {
    physical.density_difference() * physical.gravity * apex_radius_m * apex_radius_m / bond_number
}

/// Tension, volume, area and Worthington number for a fitted profile.
///
/// Volume and area integrate the table from the apex to `s_limit`, the last
/// matched arc length.
pub fn derive_quantities(
    params: &DropParameters,
    table: &ProfileTable,
    s_limit: f64,
    mm_per_px: f64,
    physical: &PhysicalParameters,
) -> Result<PhysicalQuantities> {
    if !(params.bond_number > 0.0) {
        return Err(DropletError::InvalidInput(format!(
            "Bond number must be positive to derive a tension, got {}",
            params.bond_number
        )));
    }
    let r0_mm = params.apex_radius * mm_per_px;
    let r0_m = r0_mm * 1e-3;
    let gamma = interfacial_tension(physical, r0_m, params.bond_number);

    let (volume_hat, area_hat) = table.volume_and_area(s_limit);
    let volume = volume_hat * r0_mm.powi(3);
    let area = area_hat * r0_mm * r0_mm;

    let needle_m = physical.needle_diameter_mm * 1e-3;
    let worthington = physical.density_difference() * physical.gravity * volume * 1e-9
        / (std::f64::consts::PI * gamma * needle_m);

    Ok(PhysicalQuantities {
        tension: gamma * 1e3,
        volume,
        area,
        worthington,
        apex_radius_mm: r0_mm,
    })
}
