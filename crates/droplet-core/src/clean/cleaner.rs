use tracing::{debug, warn};

use crate::consts::{
    BASELINE_LEVEL_TOLERANCE, BASELINE_MAX_REACH, BASELINE_MIN_POINTS, EPSILON, MIN_APEX_POINTS,
    MIN_CONTOUR_POINTS, RECOMMENDED_CONTOUR_POINTS,
};
use crate::error::{DropletError, Result, Warning};
use crate::geometry::{mean_spacing, x_extent, y_extent, Point, Side};

use super::config::CleanConfig;
use super::dbscan::largest_cluster;
use super::ordering::{leftmost_index, nearest_index, order_path};
use super::profile::{ApexFrame, CleanedProfile, ContactPoints, HalfProfile};

/// Clean a raw edge contour into an ordered drop profile.
///
/// Pipeline: apex spacing estimate -> density clustering -> apex split ->
/// per-half ordering -> baseline cut -> contact point detection ->
/// truncation -> reassembly.
///
/// The input is never modified; all work happens on an owned copy.
pub fn clean(raw: &[Point], config: &CleanConfig) -> Result<CleanedProfile> {
    if raw.is_empty() {
        return Err(DropletError::EmptyContour);
    }
    let points: Vec<Point> = raw.iter().copied().filter(|p| p.is_finite()).collect();
    if points.is_empty() {
        return Err(DropletError::EmptyContour);
    }
    if points.len() < MIN_CONTOUR_POINTS {
        return Err(DropletError::DegenerateApex(format!(
            "contour has {} points, need at least {}",
            points.len(),
            MIN_CONTOUR_POINTS
        )));
    }

    let mut warnings = Vec::new();
    if points.len() < RECOMMENDED_CONTOUR_POINTS {
        push_warning(
            &mut warnings,
            Warning::ShortContour {
                points: points.len(),
                recommended: RECOMMENDED_CONTOUR_POINTS,
            },
        );
    }

    // Step 1: spacing along the apex region sets the clustering radius.
    let top = top_fraction(&points, config.top_fraction)?;
    let top_path = order_path(&top, leftmost_index(&top), config.jump_threshold);
    let spacing = mean_spacing(&top_path.points)
        .filter(|s| *s > EPSILON)
        .ok_or_else(|| DropletError::DegenerateApex("apex points coincide".into()))?;
    debug!(apex_points = top.len(), spacing, "Apex spacing estimated");

    // Step 2: keep the largest density-connected cluster.
    let eps = spacing * config.eps_multiplier;
    let clustered = match largest_cluster(&points, eps, config.min_samples) {
        Some(cluster) => {
            let discarded = points.len() - cluster.len();
            if discarded > 0 {
                push_warning(&mut warnings, Warning::PointsDiscarded { count: discarded });
            }
            cluster
        }
        None => {
            push_warning(&mut warnings, Warning::ClusteringFallback);
            points
        }
    };

    // Step 3: apex from the x-extent of the cleaned top fraction.
    let top = top_fraction(&clustered, config.top_fraction)?;
    let (x_min, x_max) = x_extent(&top).ok_or(DropletError::EmptyContour)?;
    let (y_min, _) = y_extent(&clustered).ok_or(DropletError::EmptyContour)?;
    let frame = ApexFrame::new(Point::new(0.5 * (x_min + x_max), y_min));

    // Step 4: split and mirror into apex-local coordinates.
    let mut left_local = Vec::new();
    let mut right_local = Vec::new();
    for &p in &clustered {
        match frame.side_of(p) {
            Side::Left => left_local.push(frame.to_local(p, Side::Left)),
            Side::Right => right_local.push(frame.to_local(p, Side::Right)),
        }
    }

    // Step 5: order, cut at the baseline, find contact points, truncate.
    let left = prepare_half(&left_local, Side::Left, spacing, config, &mut warnings)?;
    let right = prepare_half(&right_local, Side::Right, spacing, config, &mut warnings)?;

    // Step 6: reassemble in image space.
    let mut profile: Vec<Point> = left.image_points(&frame);
    profile.reverse();
    profile.extend(right.image_points(&frame));

    let contact_points = ContactPoints {
        left: frame.to_image(left.contact().ok_or(DropletError::EmptyContour)?, Side::Left),
        right: frame.to_image(right.contact().ok_or(DropletError::EmptyContour)?, Side::Right),
    };

    debug!(
        points = profile.len(),
        left = left.len(),
        right = right.len(),
        apex_x = frame.apex.x,
        apex_y = frame.apex.y,
        "Contour cleaned"
    );

    Ok(CleanedProfile {
        profile,
        left,
        right,
        contact_points,
        frame,
        warnings,
    })
}

/// Points within the top `fraction` of the y-extent (smallest image y).
fn top_fraction(points: &[Point], fraction: f64) -> Result<Vec<Point>> {
    let (y_min, y_max) = y_extent(points).ok_or(DropletError::EmptyContour)?;
    let span = y_max - y_min;
    if span <= EPSILON {
        return Err(DropletError::DegenerateApex(
            "all points share a single y coordinate".into(),
        ));
    }
    let cutoff = y_min + fraction.clamp(0.0, 1.0) * span;
    let top: Vec<Point> = points.iter().copied().filter(|p| p.y <= cutoff).collect();
    if top.len() < MIN_APEX_POINTS {
        return Err(DropletError::DegenerateApex(format!(
            "top {:.0}% of the contour holds {} point(s), need at least {}",
            fraction * 100.0,
            top.len(),
            MIN_APEX_POINTS
        )));
    }
    Ok(top)
}

/// Order one mirrored half from the apex outward and cut it at the contact point.
///
/// When the half carries a visible baseline, the ordered path is first cut
/// where it reaches the baseline level and closed with the extrapolated
/// crossing, so baseline and reflection points never reach the contact search.
fn prepare_half(
    local: &[Point],
    side: Side,
    spacing: f64,
    config: &CleanConfig,
    warnings: &mut Vec<Warning>,
) -> Result<HalfProfile> {
    if local.is_empty() {
        return Err(DropletError::DegenerateApex(format!(
            "no contour points on the {side} side of the apex"
        )));
    }

    let start = nearest_index(local, Point::default());
    let path = order_path(local, start, config.jump_threshold);
    if path.dropped > 0 {
        push_warning(
            warnings,
            Warning::PathTruncated {
                kept: path.points.len(),
                dropped: path.dropped,
            },
        );
    }

    let tolerance = BASELINE_LEVEL_TOLERANCE * spacing;
    let mut points = path.points;
    if let Some(level) = baseline_level(local, tolerance) {
        let cut = cut_at_baseline(&mut points, level, tolerance, BASELINE_MAX_REACH * spacing);
        debug!(%side, level, cut, "Baseline found");
    }

    let Some(cutoff) = bottom_cutoff(&points, config.bottom_fraction) else {
        return Err(DropletError::EmptyContour);
    };
    let contact = contact_index(&points, cutoff);
    let lowest = points
        .iter()
        .filter(|p| p.y <= cutoff)
        .map(|p| p.y)
        .fold(f64::INFINITY, f64::min);
    let height = points[contact].y - lowest;
    if height > tolerance {
        push_warning(warnings, Warning::ContactAboveBand { side, height });
    }
    points.truncate(contact + 1);

    Ok(HalfProfile { side, points })
}

/// Local y of a horizontal baseline in the lower half of `local`, if one
/// level band of height `2 * tolerance` holds at least
/// [`BASELINE_MIN_POINTS`] points. The densest band wins.
fn baseline_level(local: &[Point], tolerance: f64) -> Option<f64> {
    let (y_min, _) = y_extent(local)?;
    let mut ys: Vec<f64> = local
        .iter()
        .map(|p| p.y)
        .filter(|&y| y <= 0.5 * y_min)
        .collect();
    ys.sort_unstable_by(f64::total_cmp);

    let mut best: Option<(usize, usize)> = None;
    let mut lo = 0;
    for hi in 0..ys.len() {
        while ys[hi] - ys[lo] > 2.0 * tolerance {
            lo += 1;
        }
        if best.map_or(true, |(a, b)| hi - lo > b - a) {
            best = Some((lo, hi));
        }
    }

    let (lo, hi) = best?;
    let band = &ys[lo..=hi];
    (band.len() >= BASELINE_MIN_POINTS).then(|| band.iter().sum::<f64>() / band.len() as f64)
}

/// Cut `path` before the first point on or below the baseline and close it
/// with the crossing extrapolated from its last step. Returns whether the
/// path reached the baseline.
fn cut_at_baseline(path: &mut Vec<Point>, level: f64, tolerance: f64, max_reach: f64) -> bool {
    let Some(at) = path.iter().position(|p| p.y <= level + tolerance) else {
        return false;
    };
    if at == 0 {
        return false;
    }
    path.truncate(at);

    let last = path[at - 1];
    let x = match at.checked_sub(2).map(|i| path[i]) {
        Some(prev) if prev.y - last.y > EPSILON => {
            let run = (last.x - prev.x) / (prev.y - last.y) * (last.y - level);
            last.x + run.clamp(-max_reach, max_reach)
        }
        _ => last.x,
    };
    path.push(Point::new(x, level));
    true
}

/// Local y at the top of the bottom `fraction` of the path's y-extent.
fn bottom_cutoff(path: &[Point], fraction: f64) -> Option<f64> {
    let (y_min, y_max) = y_extent(path)?;
    Some(y_min + fraction.clamp(0.0, 1.0) * (y_max - y_min))
}

/// Contact point: minimum x at or below `cutoff`, ties broken by the lower
/// point (maximum image y).
fn contact_index(path: &[Point], cutoff: f64) -> usize {
    let mut best: Option<usize> = None;
    for (i, p) in path.iter().enumerate() {
        if p.y > cutoff {
            continue;
        }
        best = match best {
            None => Some(i),
            Some(b) => {
                let q = path[b];
                if p.x < q.x - EPSILON || ((p.x - q.x).abs() <= EPSILON && p.y < q.y) {
                    Some(i)
                } else {
                    Some(b)
                }
            }
        };
    }
    best.unwrap_or(path.len() - 1)
}

fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    warn!(%warning, "Contour cleaning");
    warnings.push(warning);
}
