//! Geometry utilities for strokes and contours.
//!
//! Everything here is pure: angles, distances, polygon area, path
//! decimation, Douglas-Peucker simplification and exact vertex-count
//! enforcement. Polygons are always treated as closed (last vertex connects
//! back to the first) and never repeat their first vertex at the end.

use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Snap both coordinates to the nearest whole pixel.
    pub fn round(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

/// Interior angle at `b` in degrees, formed by the neighbours `a` and `c`.
///
/// Coincident neighbours (a zero-length vector) count as a straight angle,
/// which makes the vertex the first candidate for removal.
pub fn angle_at(a: Point, b: Point, c: Point) -> f32 {
    let (ba_x, ba_y) = (a.x - b.x, a.y - b.y);
    let (bc_x, bc_y) = (c.x - b.x, c.y - b.y);

    let mag_ba = ba_x.hypot(ba_y);
    let mag_bc = bc_x.hypot(bc_y);
    if mag_ba == 0.0 || mag_bc == 0.0 {
        return 180.0;
    }

    let dot = ba_x * bc_x + ba_y * bc_y;
    let cos = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Unsigned area of a closed polygon (shoelace formula).
pub fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y))
        .sum();
    (twice.abs() / 2.0) as f32
}

/// Length of the closed outline through `points`.
pub fn perimeter(points: &[Point]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| p.distance_to(q))
        .sum()
}

/// Ray-casting point-in-polygon test.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Flatten points into `[x1, y1, x2, y2, ...]`.
pub fn flatten(points: &[Point]) -> Vec<f32> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

/// Keep every n-th point so that at most `target` points remain.
///
/// The stride is `ceil(len / target)` and the kept points are rounded to
/// whole pixels. A path of three or more points decimated to four keeps
/// either three or four of them.
pub fn decimate_path(path: &[Point], target: usize) -> Vec<Point> {
    if path.is_empty() || target == 0 {
        return Vec::new();
    }
    let stride = path.len().div_ceil(target);
    path.iter().step_by(stride).map(Point::round).collect()
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is split at its first vertex and the vertex farthest from it,
/// both halves are simplified as open polylines and stitched back together.
pub fn simplify_closed(points: &[Point], epsilon: f32) -> Vec<Point> {
    let n = points.len();
    if n < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let origin = points[0];
    let far = (1..n)
        .max_by(|&i, &j| {
            origin
                .distance_to(&points[i])
                .total_cmp(&origin.distance_to(&points[j]))
        })
        .unwrap_or(n / 2);

    let first_half = simplify_open(&points[..=far], epsilon);

    let mut second: Vec<Point> = points[far..].to_vec();
    second.push(origin);
    let second_half = simplify_open(&second, epsilon);

    let mut result = first_half;
    // Second half starts at `far` and ends at `origin`, both already present.
    let interior = second_half.len().saturating_sub(1);
    result.extend(second_half.into_iter().take(interior).skip(1));
    result
}

fn simplify_open(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        let mut max_distance = 0.0f32;
        let mut index = start;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = segment_distance(*p, points[start], points[end]);
            if d > max_distance {
                max_distance = d;
                index = i;
            }
        }
        if max_distance > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Add or remove vertices until the polygon has exactly `target` of them.
///
/// Too many: drop the vertex whose interior angle is closest to 180°.
/// Too few: split the longest edge at its (rounded) midpoint.
/// Each direction gives up after `max_iterations` steps or as soon as a
/// step makes no progress, so the result can miss the target on
/// degenerate input.
pub fn enforce_vertex_count(points: &[Point], target: usize, max_iterations: usize) -> Vec<Point> {
    let mut points = points.to_vec();

    let mut iterations = 0;
    while points.len() > target && iterations < max_iterations {
        if !remove_most_collinear(&mut points) {
            log::debug!("Could not remove more vertices ({} left)", points.len());
            break;
        }
        iterations += 1;
    }

    iterations = 0;
    while points.len() < target && iterations < max_iterations {
        if !insert_on_longest_edge(&mut points) {
            log::debug!("Could not add more vertices ({} present)", points.len());
            break;
        }
        iterations += 1;
    }

    points
}

fn remove_most_collinear(points: &mut Vec<Point>) -> bool {
    let n = points.len();
    if n <= 3 {
        return false;
    }

    let significance = |i: usize| {
        let prev = points[(i + n - 1) % n];
        let next = points[(i + 1) % n];
        (180.0 - angle_at(prev, points[i], next)).abs()
    };

    // min_by keeps the first of equal candidates
    let Some(index) = (0..n).min_by(|&i, &j| significance(i).total_cmp(&significance(j))) else {
        return false;
    };
    points.remove(index);
    true
}

fn insert_on_longest_edge(points: &mut Vec<Point>) -> bool {
    let n = points.len();
    if n == 0 {
        return false;
    }

    let mut longest = 0;
    let mut max_length = 0.0f32;
    for i in 0..n {
        let length = points[i].distance_to(&points[(i + 1) % n]);
        if length > max_length {
            max_length = length;
            longest = i;
        }
    }

    let midpoint = points[longest].midpoint(&points[(longest + 1) % n]).round();
    points.insert(longest + 1, midpoint);
    true
}
