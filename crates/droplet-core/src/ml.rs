//! Boundary to an external contact-angle regression model.
//!
//! The model itself lives outside this crate; this module prepares its input
//! (two fixed-length, height-normalized half profiles) and wraps its output
//! as a [`FitResult::Predicted`].

use std::time::Instant;

use ndarray::Array2;
use tracing::warn;

use crate::clean::{CleanedProfile, HalfProfile};
use crate::consts::EPSILON;
use crate::error::{DropletError, Result, Warning};
use crate::fit::{ContactAngles, FitResult, PredictedFit, Timing};

/// Model input: left and right halves, each `[length, 2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedProfilePair {
    pub left: Array2<f64>,
    pub right: Array2<f64>,
}

/// An opaque regressor returning `(left, right)` contact angles in degrees.
pub trait ContactAnglePredictor: Send + Sync {
    fn predict(&self, input: &NormalizedProfilePair) -> Result<(f64, f64)>;
}

/// Apex-relative, height-normalized halves, zero-padded to `length` rows.
///
/// Column 0 is the outward distance from the apex, column 1 the depth below
/// it, both divided by the drop height so depth spans `[0, 1]`. Halves longer
/// than `length` are subsampled evenly.
pub fn prepare_input(
    profile: &CleanedProfile,
    length: usize,
) -> Result<(NormalizedProfilePair, Vec<Warning>)> {
    let height = profile.height();
    if height <= EPSILON {
        return Err(DropletError::DegenerateApex(
            "profile has no height to normalize by".into(),
        ));
    }
    let mut warnings = Vec::new();
    let left = normalize_half(&profile.left, height, length, &mut warnings);
    let right = normalize_half(&profile.right, height, length, &mut warnings);
    Ok((NormalizedProfilePair { left, right }, warnings))
}

fn normalize_half(
    half: &HalfProfile,
    height: f64,
    length: usize,
    warnings: &mut Vec<Warning>,
) -> Array2<f64> {
    let n = half.len();
    let indices: Vec<usize> = if n > length {
        let warning = Warning::ProfileSubsampled {
            original: n,
            length,
        };
        warn!(%warning, side = %half.side, "ML input");
        warnings.push(warning);
        (0..length)
            .map(|i| {
                if length == 1 {
                    0
                } else {
                    i * (n - 1) / (length - 1)
                }
            })
            .collect()
    } else {
        (0..n).collect()
    };

    let mut out = Array2::<f64>::zeros((length, 2));
    for (row, &i) in indices.iter().enumerate() {
        let p = half.points[i];
        out[[row, 0]] = p.x / height;
        out[[row, 1]] = (-p.y / height).clamp(0.0, 1.0);
    }
    out
}

/// Run `predictor` on a cleaned profile; angles are clamped to `[0°, 180°]`.
pub fn predict_contact_angles(
    profile: &CleanedProfile,
    predictor: &dyn ContactAnglePredictor,
    length: usize,
) -> Result<FitResult> {
    let t0 = Instant::now();
    let (input, warnings) = prepare_input(profile, length)?;
    let (left, right) = predictor.predict(&input)?;
    Ok(FitResult::Predicted(PredictedFit {
        angles: ContactAngles {
            left: left.clamp(0.0, 180.0),
            right: right.clamp(0.0, 180.0),
        },
        timing: Timing::fitting_since(t0),
        warnings,
    }))
}
