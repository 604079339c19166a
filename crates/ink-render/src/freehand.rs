//! Pressure-less freehand stroke outlines.
//!
//! Turns a raw pointer polyline into the closed outline of a variable-width
//! stroke. Input is first streamlined (each point pulled toward the previous
//! one), then each point gets a radius from simulated pressure (fast
//! segments get thinner) and left/right offsets along the local normal.
//! Sharp corners get a half-circle of points, both ends get round caps.
//! The outline is finally turned into a smooth quadratic path.

use kurbo::{BezPath, Point, Vec2};

/// π nudged up so the cap arcs close without a seam.
const FIXED_PI: f64 = std::f64::consts::PI + 0.0001;
/// How quickly simulated pressure follows velocity.
const RATE_OF_PRESSURE_CHANGE: f64 = 0.275;
const START_CAP_STEPS: usize = 13;
const END_CAP_STEPS: usize = 29;
const CORNER_STEPS: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeOptions {
    /// Base diameter.
    pub size: f64,
    /// How much simulated pressure affects width, 0 = uniform.
    pub thinning: f64,
    /// Minimum spacing between outline points, as a fraction of `size`.
    pub smoothing: f64,
    /// How strongly input is pulled toward the previous point, 0 = raw.
    pub streamline: f64,
    /// The input is complete: the last point is used unstreamlined.
    pub last: bool,
}

impl StrokeOptions {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
            last: true,
        }
    }

    pub fn uniform(size: f64) -> Self {
        Self {
            thinning: 0.0,
            ..Self::new(size)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StrokePoint {
    point: Point,
    /// Unit vector pointing back toward the previous point.
    vector: Vec2,
    distance: f64,
    running_length: f64,
}

fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

fn rotate_around(p: Point, center: Point, angle: f64) -> Point {
    let (s, c) = angle.sin_cos();
    let d = p - center;
    Point::new(d.x * c - d.y * s + center.x, d.x * s + d.y * c + center.y)
}

fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len == 0.0 { v } else { v / len }
}

fn stroke_radius(size: f64, thinning: f64, pressure: f64) -> f64 {
    size * (0.5 - thinning * (0.5 - pressure))
}

/// Streamline the input and annotate each kept point.
fn stroke_points(input: &[Point], options: &StrokeOptions) -> Vec<StrokePoint> {
    let Some(&first) = input.first() else {
        return Vec::new();
    };
    let t = 0.15 + (1.0 - options.streamline) * 0.85;

    let mut raw: Vec<Point> = input.to_vec();
    if raw.len() == 1 {
        raw.push(first + Vec2::new(1.0, 1.0));
    }

    let mut out = vec![StrokePoint {
        point: first,
        vector: Vec2::new(1.0, 1.0),
        distance: 0.0,
        running_length: 0.0,
    }];
    let mut reached_min_length = false;
    let mut running_length = 0.0;
    let max = raw.len() - 1;

    for (i, &target) in raw.iter().enumerate().skip(1) {
        let prev = out[out.len() - 1];
        let point = if options.last && i == max {
            target
        } else {
            prev.point.lerp(target, t)
        };
        if point == prev.point {
            continue;
        }
        let distance = point.distance(prev.point);
        running_length += distance;
        if i < max && !reached_min_length {
            if running_length < options.size {
                continue;
            }
            reached_min_length = true;
        }
        out.push(StrokePoint {
            point,
            vector: unit(prev.point - point),
            distance,
            running_length,
        });
    }
    if out.len() > 1 {
        out[0].vector = out[1].vector;
    }
    out
}

/// Closed outline polygon of a freehand stroke.
pub fn stroke_outline(input: &[Point], options: &StrokeOptions) -> Vec<Point> {
    let points = stroke_points(input, options);
    let Some(first) = points.first().copied() else {
        return Vec::new();
    };
    let size = options.size;
    let min_distance = (size * options.smoothing).powi(2);

    let mut left: Vec<Point> = Vec::new();
    let mut right: Vec<Point> = Vec::new();

    // Seed pressure from the first few points so the start isn't a blob.
    let mut prev_pressure = points.iter().take(10).fold(0.5, |acc: f64, p| {
        let sp = (p.distance / size).min(1.0);
        let rp = (1.0 - sp).min(1.0);
        (acc + (rp - acc) * (sp * RATE_OF_PRESSURE_CHANGE)).min(1.0)
    });

    let mut radius = stroke_radius(size, options.thinning, prev_pressure);
    let mut first_radius: Option<f64> = None;
    let mut prev_vector = first.vector;
    let mut pl = first.point;
    let mut pr = first.point;
    let mut prev_sharp = false;

    for (i, curr) in points.iter().enumerate() {
        let sp = (curr.distance / size).min(1.0);
        let rp = (1.0 - sp).min(1.0);
        let pressure = (prev_pressure + (rp - prev_pressure) * (sp * RATE_OF_PRESSURE_CHANGE)).min(1.0);

        radius = if options.thinning > 0.0 {
            stroke_radius(size, options.thinning, pressure)
        } else {
            size / 2.0
        };
        radius = radius.max(0.01);
        first_radius.get_or_insert(radius);

        let is_last = i == points.len() - 1;
        let next_vector = if is_last { curr.vector } else { points[i + 1].vector };
        let next_dpr = if is_last { 1.0 } else { curr.vector.dot(next_vector) };
        let prev_dpr = curr.vector.dot(prev_vector);

        let sharp = prev_dpr < 0.0 && !prev_sharp;
        let next_sharp = next_dpr < 0.0;

        if sharp || next_sharp {
            let offset = perpendicular(prev_vector) * radius;
            for step in 0..=CORNER_STEPS {
                let t = step as f64 / CORNER_STEPS as f64;
                pl = rotate_around(curr.point - offset, curr.point, FIXED_PI * t);
                left.push(pl);
                pr = rotate_around(curr.point + offset, curr.point, FIXED_PI * -t);
                right.push(pr);
            }
            prev_pressure = pressure;
            prev_vector = curr.vector;
            if next_sharp {
                prev_sharp = true;
            }
            continue;
        }
        prev_sharp = false;

        if is_last {
            let offset = perpendicular(curr.vector) * radius;
            left.push(curr.point - offset);
            right.push(curr.point + offset);
            continue;
        }

        let offset = perpendicular(next_vector.lerp(curr.vector, next_dpr)) * radius;
        let tl = curr.point - offset;
        if i <= 1 || (tl - pl).hypot2() > min_distance {
            left.push(tl);
            pl = tl;
        }
        let tr = curr.point + offset;
        if i <= 1 || (tr - pr).hypot2() > min_distance {
            right.push(tr);
            pr = tr;
        }

        prev_pressure = pressure;
        prev_vector = curr.vector;
    }

    let first_point = first.point;
    let last = points[points.len() - 1];
    let last_point = if points.len() > 1 {
        last.point
    } else {
        first_point + Vec2::new(1.0, 1.0)
    };
    let start_radius = first_radius.unwrap_or(radius);

    // A dot: just a circle.
    if left.len() <= 1 || right.len() <= 1 || last.running_length < size / 2.0 {
        let start = first_point - unit(perpendicular(first_point - last_point)) * start_radius;
        return (1..=START_CAP_STEPS)
            .map(|step| {
                let t = step as f64 / START_CAP_STEPS as f64;
                rotate_around(start, first_point, FIXED_PI * 2.0 * t)
            })
            .collect();
    }

    let start_cap = (0..=START_CAP_STEPS).map(|step| {
        let t = step as f64 / START_CAP_STEPS as f64;
        rotate_around(right[0], first_point, FIXED_PI * t)
    });

    let direction = perpendicular(-last.vector);
    let end_start = last_point + direction * radius;
    let end_cap = (0..END_CAP_STEPS).map(|step| {
        let t = step as f64 / END_CAP_STEPS as f64;
        rotate_around(end_start, last_point, FIXED_PI * 3.0 * t)
    });

    let mut outline = left.clone();
    outline.extend(end_cap);
    outline.extend(right.iter().rev().copied());
    outline.extend(start_cap);
    outline
}

/// Closed quadratic path through an outline polygon's edge midpoints.
pub fn outline_path(outline: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = outline.first() else {
        return path;
    };
    path.move_to(first);
    for (i, &p) in outline.iter().enumerate() {
        let next = outline[(i + 1) % outline.len()];
        path.quad_to(p, p.midpoint(next));
    }
    path.close_path();
    path
}

/// Outline + path in one call.
pub fn stroke_path(input: &[Point], options: &StrokeOptions) -> BezPath {
    outline_path(&stroke_outline(input, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    fn line(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64 * 5.0, 0.0)).collect()
    }

    #[test]
    fn empty_input_empty_outline() {
        assert!(stroke_outline(&[], &StrokeOptions::new(8.0)).is_empty());
        assert!(outline_path(&[]).elements().is_empty());
    }

    #[test]
    fn single_point_is_a_dot() {
        let outline = stroke_outline(&[Point::new(50.0, 50.0)], &StrokeOptions::new(8.0));
        assert_eq!(outline.len(), START_CAP_STEPS);
        for p in &outline {
            assert!((p.distance(Point::new(50.0, 50.0)) - 4.0).abs() < 1.5);
        }
    }

    #[test]
    fn straight_stroke_has_width_close_to_size() {
        let size = 10.0;
        let outline = stroke_outline(&line(20), &StrokeOptions::uniform(size));
        let bbox = outline_path(&outline).bounding_box();
        assert!((bbox.height() - size).abs() < 1.0, "height {}", bbox.height());
        // Round caps extend past both ends.
        assert!(bbox.x0 < 0.0);
        assert!(bbox.x1 > 95.0);
    }

    #[test]
    fn thinning_narrows_fast_strokes() {
        let fast: Vec<_> = (0..10).map(|i| Point::new(i as f64 * 40.0, 0.0)).collect();
        let thick = outline_path(&stroke_outline(&fast, &StrokeOptions::uniform(12.0))).bounding_box();
        let thin = outline_path(&stroke_outline(&fast, &StrokeOptions::new(12.0))).bounding_box();
        assert!(thin.height() < thick.height());
    }

    #[test]
    fn reversal_produces_corner_arc() {
        let mut pts = line(10);
        pts.extend((0..10).rev().map(|i| Point::new(i as f64 * 5.0, 1.0)));
        let outline = stroke_outline(&pts, &StrokeOptions::new(8.0));
        assert!(outline.len() > 2 * CORNER_STEPS);
        assert!(outline.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
