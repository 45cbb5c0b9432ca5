//! Polygon measurements over traced contours
//!
//! Contours come out of the tracer as closed pixel chains whose start point is
//! arbitrary, so the approximation here splits the chain at its two mutually
//! farthest points and runs Douglas-Peucker on each half.

use imageproc::point::Point;
use std::f64::consts::PI;

/// Absolute enclosed area of a closed polygon (shoelace formula)
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    twice_area.abs() as f64 / 2.0
}

/// Length of a closed polygon, including the closing edge
pub fn perimeter(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| distance(*a, *b))
        .sum()
}

/// Isoperimetric ratio `4πA / P²`: 1.0 for a disc, lower for spiky outlines
pub fn circularity(points: &[Point<i32>]) -> f64 {
    let length = perimeter(points);
    if length == 0.0 {
        return 0.0;
    }
    4.0 * PI * polygon_area(points) / (length * length)
}

/// Approximate a closed contour with fewer vertices
///
/// No point of the original chain lies farther than `epsilon` from the
/// returned polygon's edges. The result does not repeat its first vertex.
pub fn approximate_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let a = farthest_from(points, points[0]);
    let b = farthest_from(points, points[a]);
    if a == b {
        return vec![points[a]];
    }

    let (lo, hi) = (a.min(b), a.max(b));
    let wrapped: Vec<Point<i32>> = points[hi..]
        .iter()
        .chain(points[..=lo].iter())
        .copied()
        .collect();

    let mut polygon = simplify(&points[lo..=hi], epsilon);
    let other_half = simplify(&wrapped, epsilon);
    // Both halves share their endpoints; keep only the interior of the second.
    polygon.extend_from_slice(&other_half[1..other_half.len() - 1]);
    polygon
}

/// Douglas-Peucker over an open chain, keeping both endpoints
fn simplify(chain: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let last = chain.len() - 1;
    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[last] = true;

    let mut pending = vec![(0, last)];
    while let Some((start, end)) = pending.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut split = start;
        let mut max_distance = -1.0;
        for (offset, point) in chain[start + 1..end].iter().enumerate() {
            let d = distance_to_line(*point, chain[start], chain[end]);
            if d > max_distance {
                max_distance = d;
                split = start + 1 + offset;
            }
        }

        if max_distance > epsilon {
            keep[split] = true;
            pending.push((start, split));
            pending.push((split, end));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

fn farthest_from(points: &[Point<i32>], origin: Point<i32>) -> usize {
    let mut best = 0;
    let mut best_distance = -1.0;
    for (i, point) in points.iter().enumerate() {
        let d = distance(*point, origin);
        if d > best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `point` to the infinite line through `start` and `end`
fn distance_to_line(point: Point<i32>, start: Point<i32>, end: Point<i32>) -> f64 {
    let length = distance(start, end);
    if length == 0.0 {
        return distance(point, start);
    }

    let cross = (end.x - start.x) as f64 * (start.y - point.y) as f64
        - (start.x - point.x) as f64 * (end.y - start.y) as f64;
    cross.abs() / length
}
