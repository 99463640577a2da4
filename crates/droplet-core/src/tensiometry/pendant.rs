use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clean::dbscan::largest_cluster;
use crate::clean::ordering::{leftmost_index, order_path};
use crate::clean::CleanConfig;
use crate::consts::{
    APEX_REGION_FRACTION, EPSILON, INITIAL_BOND_NUMBER, MIN_APEX_POINTS, MIN_CONTOUR_POINTS,
};
use crate::error::{DropletError, Result, Warning};
use crate::fit::kasa_fit;
use crate::geometry::{mean_spacing, x_extent, y_extent, Point};
use crate::young_laplace::DropOrientation;

use super::model::DropParameters;

/// Outline of a drop ordered from one end through the apex to the other,
/// without any baseline split.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendantProfile {
    pub points: Vec<Point>,
    /// Extreme point along gravity in image coordinates.
    pub apex: Point,
    pub orientation: DropOrientation,
    pub warnings: Vec<Warning>,
}

impl PendantProfile {
    /// Total polyline length in pixels.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Remove outliers from a drop outline and order it end to end.
pub fn prepare_pendant_profile(
    raw: &[Point],
    orientation: DropOrientation,
    config: &CleanConfig,
) -> Result<PendantProfile> {
    let points: Vec<Point> = raw.iter().copied().filter(|p| p.is_finite()).collect();
    if points.is_empty() {
        return Err(DropletError::EmptyContour);
    }
    if points.len() < MIN_CONTOUR_POINTS {
        return Err(DropletError::DegenerateApex(format!(
            "outline has {} points, need at least {MIN_CONTOUR_POINTS}",
            points.len()
        )));
    }
    let mut warnings = Vec::new();

    let rough = order_path(&points, leftmost_index(&points), config.jump_threshold);
    let spacing = mean_spacing(&rough.points)
        .filter(|s| *s > EPSILON)
        .ok_or_else(|| DropletError::DegenerateApex("outline points coincide".into()))?;
    let clustered = match largest_cluster(&points, spacing * config.eps_multiplier, config.min_samples) {
        Some(cluster) => {
            let discarded = points.len() - cluster.len();
            if discarded > 0 {
                record(&mut warnings, Warning::PointsDiscarded { count: discarded });
            }
            cluster
        }
        None => {
            record(&mut warnings, Warning::ClusteringFallback);
            points
        }
    };

    let apex = find_apex(&clustered, orientation, config.top_fraction)?;

    // Start at the far end of the left half.
    let start = clustered
        .iter()
        .enumerate()
        .filter(|(_, p)| p.x < apex.x)
        .max_by(|(_, a), (_, b)| {
            let depth = |p: &Point| orientation.image_sign() * (p.y - apex.y);
            depth(a).total_cmp(&depth(b))
        })
        .map(|(i, _)| i)
        .unwrap_or_else(|| leftmost_index(&clustered));
    let path = order_path(&clustered, start, config.jump_threshold);
    if path.dropped > 0 {
        record(
            &mut warnings,
            Warning::PathTruncated {
                kept: path.points.len(),
                dropped: path.dropped,
            },
        );
    }

    debug!(points = path.points.len(), apex_x = apex.x, apex_y = apex.y, "Drop outline prepared");
    Ok(PendantProfile {
        points: path.points,
        apex,
        orientation,
        warnings,
    })
}

/// Apex: extreme y along gravity, x at the middle of the apex band.
fn find_apex(points: &[Point], orientation: DropOrientation, fraction: f64) -> Result<Point> {
    let (y_min, y_max) = y_extent(points).ok_or(DropletError::EmptyContour)?;
    let span = y_max - y_min;
    if span <= EPSILON {
        return Err(DropletError::DegenerateApex(
            "all points share a single y coordinate".into(),
        ));
    }
    let band = fraction.clamp(0.0, 1.0) * span;
    let sign = orientation.image_sign();
    let apex_y = match orientation {
        DropOrientation::Pendant => y_max,
        DropOrientation::Sessile => y_min,
    };
    let apex_band: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| sign * (p.y - apex_y) <= band)
        .collect();
    if apex_band.len() < MIN_APEX_POINTS {
        return Err(DropletError::DegenerateApex(format!(
            "apex band holds {} point(s)",
            apex_band.len()
        )));
    }
    let (x_lo, x_hi) = x_extent(&apex_band).ok_or(DropletError::EmptyContour)?;
    Ok(Point::new(0.5 * (x_lo + x_hi), apex_y))
}

/// Starting parameters and arc-length domain for the profile fit.
///
/// The apex radius comes from an algebraic circle through the points within
/// [`APEX_REGION_FRACTION`] of the drop height from the apex.
pub fn initial_estimate(profile: &PendantProfile) -> Result<(DropParameters, f64)> {
    let sign = profile.orientation.image_sign();
    let (y_min, y_max) = y_extent(&profile.points).ok_or(DropletError::EmptyContour)?;
    let cutoff = APEX_REGION_FRACTION * (y_max - y_min);
    let region: Vec<Point> = profile
        .points
        .iter()
        .copied()
        .filter(|p| sign * (p.y - profile.apex.y) <= cutoff)
        .collect();
    let circle = kasa_fit(&region)?;

    let r0 = circle.radius;
    let params = DropParameters {
        apex_x: circle.center.x,
        apex_y: circle.center.y - sign * r0,
        apex_radius: r0,
        bond_number: INITIAL_BOND_NUMBER,
        rotation: 0.0,
    };
    // Half the outline, in apex radii, with some headroom.
    let s_max = 1.2 * 0.5 * profile.length() / r0;
    Ok((params, s_max))
}

fn record(warnings: &mut Vec<Warning>, warning: Warning) {
    warn!(%warning, "Drop outline");
    warnings.push(warning);
}
