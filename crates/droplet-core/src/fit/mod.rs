//! Contact-angle fitters.
//!
//! Every fitter takes a [`CleanedProfile`] and returns a [`FitResult`]
//! variant. Fitters are pure: the same profile and configuration always
//! give the same parameters.

pub mod bashforth_adams;
pub mod circle;
pub mod config;
pub mod ellipse;
pub mod polynomial;
pub mod result;

use tracing::info;

use crate::clean::CleanedProfile;
use crate::error::Result;

pub use bashforth_adams::fit_bashforth_adams;
pub use circle::{fit_circle, fit_circle_params, kasa_fit};
pub use config::{
    BashforthAdamsConfig, CircleFitConfig, ContactAngleMethod, FitConfig, PolynomialFitConfig,
};
pub use ellipse::{fit_conic, fit_ellipse, Conic};
pub use polynomial::fit_polynomial;
pub use result::{
    elapsed_ms, BashforthAdamsParams, CircleFit, CircleParams, ContactAngles, EllipseFit,
    EllipseParams, FitResult, FitStatus, PolynomialFit, PolynomialParams, PredictedFit, Timing,
    YoungLaplaceFit,
};

/// Run one contact-angle method on a cleaned profile.
pub fn fit(
    profile: &CleanedProfile,
    method: ContactAngleMethod,
    config: &FitConfig,
) -> Result<FitResult> {
    let result = match method {
        ContactAngleMethod::Circle => fit_circle(profile, &config.circle),
        ContactAngleMethod::Ellipse => fit_ellipse(profile),
        ContactAngleMethod::Tangent => fit_polynomial(profile, 1, &config.polynomial),
        ContactAngleMethod::Polynomial => fit_polynomial(profile, 2, &config.polynomial),
        ContactAngleMethod::YoungLaplace => fit_bashforth_adams(profile, &config.young_laplace),
    }?;
    let angles = result.angles();
    info!(
        method = %method,
        left = angles.left,
        right = angles.right,
        ms = result.timing().fitting_ms,
        "Contact angles fitted"
    );
    Ok(result)
}
