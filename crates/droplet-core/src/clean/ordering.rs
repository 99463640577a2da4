use crate::geometry::Point;

/// A greedily ordered path and the number of points cut off after a jump.
#[derive(Clone, Debug)]
pub struct OrderedPath {
    pub points: Vec<Point>,
    pub dropped: usize,
}

/// Order points into a path by repeatedly appending the nearest unvisited
/// point to the tail, starting at `start`.
pub fn order_nearest_neighbour(points: &[Point], start: usize) -> Vec<Point> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }
    let mut visited = vec![false; n];
    let mut path = Vec::with_capacity(n);
    let mut current = start.min(n - 1);
    visited[current] = true;
    path.push(points[current]);

    for _ in 1..n {
        let tail = points[current];
        let mut best = None;
        let mut best_d2 = f64::INFINITY;
        for (i, p) in points.iter().enumerate() {
            if visited[i] {
                continue;
            }
            let d2 = tail.distance_sq(*p);
            if d2 < best_d2 {
                best_d2 = d2;
                best = Some(i);
            }
        }
        let Some(next) = best else { break };
        visited[next] = true;
        path.push(points[next]);
        current = next;
    }
    path
}

/// Cut a path at the first consecutive gap larger than `threshold`.
pub fn truncate_at_jump(mut path: Vec<Point>, threshold: f64) -> OrderedPath {
    let cut = path
        .windows(2)
        .position(|w| w[0].distance(w[1]) > threshold)
        .map(|i| i + 1);
    let dropped = match cut {
        Some(at) => {
            let dropped = path.len() - at;
            path.truncate(at);
            dropped
        }
        None => 0,
    };
    OrderedPath {
        points: path,
        dropped,
    }
}

/// Greedy nearest-neighbour ordering followed by jump truncation.
pub fn order_path(points: &[Point], start: usize, threshold: f64) -> OrderedPath {
    truncate_at_jump(order_nearest_neighbour(points, start), threshold)
}

/// Index of the point with the smallest x (ties: smallest y).
pub fn leftmost_index(points: &[Point]) -> usize {
    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Index of the point closest to `target`.
pub fn nearest_index(points: &[Point], target: Point) -> usize {
    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance_sq(target).total_cmp(&b.distance_sq(target)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
