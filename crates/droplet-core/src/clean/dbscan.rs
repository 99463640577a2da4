//! Density-reachability clustering (DBSCAN) over contour points.
//!
//! Detector noise and lensing highlights show up as sparse points or small
//! islands away from the drop edge. Clustering with a radius tied to the
//! edge's own point spacing keeps the connected drop boundary and drops the
//! rest.

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::consts::PARALLEL_POINT_THRESHOLD;
use crate::geometry::Point;

/// Statistics for a single cluster.
#[derive(Clone, Debug)]
pub struct ClusterStats {
    /// Cluster label.
    pub label: usize,
    /// Number of member points.
    pub size: usize,
}

/// Cluster labels per point (`None` = noise) plus cluster statistics sorted
/// by size descending.
pub fn dbscan(points: &[Point], eps: f64, min_samples: usize) -> (Vec<Option<usize>>, Vec<ClusterStats>) {
    let n = points.len();
    let neighbours = neighbour_lists(points, eps);

    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut stats = Vec::new();
    let mut next_label = 0usize;

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        if neighbours[i].len() < min_samples {
            // Noise for now; may still become a border point of a later cluster.
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[i] = Some(label);
        let mut size = 1usize;

        let mut queue: VecDeque<usize> = neighbours[i].iter().copied().collect();
        while let Some(q) = queue.pop_front() {
            if labels[q].is_none() {
                labels[q] = Some(label);
                size += 1;
            }
            if visited[q] {
                continue;
            }
            visited[q] = true;
            if neighbours[q].len() >= min_samples {
                queue.extend(neighbours[q].iter().copied().filter(|&r| !visited[r] || labels[r].is_none()));
            }
        }

        stats.push(ClusterStats { label, size });
    }

    stats.sort_unstable_by(|a, b| b.size.cmp(&a.size).then(a.label.cmp(&b.label)));
    (labels, stats)
}

/// Members of the largest cluster, in input order. `None` if every point is noise.
pub fn largest_cluster(points: &[Point], eps: f64, min_samples: usize) -> Option<Vec<Point>> {
    let (labels, stats) = dbscan(points, eps, min_samples);
    let largest = stats.first()?.label;
    Some(
        points
            .iter()
            .zip(&labels)
            .filter(|(_, l)| **l == Some(largest))
            .map(|(p, _)| *p)
            .collect(),
    )
}

/// Indices within `eps` of each point (the point itself included).
fn neighbour_lists(points: &[Point], eps: f64) -> Vec<Vec<usize>> {
    let eps_sq = eps * eps;
    let within = |i: usize| -> Vec<usize> {
        let p = points[i];
        points
            .iter()
            .enumerate()
            .filter(|(_, q)| p.distance_sq(**q) <= eps_sq)
            .map(|(j, _)| j)
            .collect()
    };

    if points.len() >= PARALLEL_POINT_THRESHOLD {
        (0..points.len()).into_par_iter().map(within).collect()
    } else {
        (0..points.len()).map(within).collect()
    }
}
