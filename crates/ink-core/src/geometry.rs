//! Geometry utilities shared by hit-testing, rendering, and the tools.
//!
//! Everything here is a pure function over `kurbo::Point`s; no figure
//! knowledge, no state.

use crate::palette::{Color, GradientStop};
use kurbo::{Point, Vec2};
use smallvec::SmallVec;

/// Drags shorter than this never snap.
pub const SNAP_MIN_DISTANCE: f64 = 30.0;
/// Snap angle step in degrees.
pub const SNAP_STEP_DEG: f64 = 15.0;
/// Maximum angular deviation (degrees) that still snaps.
pub const SNAP_TOLERANCE_DEG: f64 = 9.0;
/// Lazy-brush friction: 0 = brush jumps to the leash end, 1 = brush never moves.
pub const LAZY_FRICTION: f64 = 0.25;
/// Rainbow hue advance per pixel of path length.
pub const RAINBOW_SCALE: f64 = 0.5;

/// Euclidean distance.
pub fn distance_between_points(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Distance from `p` to the finite segment `a–b`.
///
/// The projection parameter is clamped to [0, 1], so points beyond either end
/// measure to that end. A degenerate segment (`a == b`) is a point.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Simplify a polyline: the first and last points are always kept, interior
/// points only when farther than `min_distance` from the last kept point.
pub fn filter_close_points(points: &[Point], min_distance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    let last = points.len() - 1;
    for &p in &points[1..last] {
        // `out` is never empty here.
        let kept = out[out.len() - 1];
        if p.distance(kept) > min_distance {
            out.push(p);
        }
    }
    out.push(points[last]);
    out
}

/// Lazy-brush smoothing.
///
/// A brush trails the raw pointer on a leash of length `radius`: it only
/// moves when the pointer gets farther than `radius` away, and then only part
/// of the way (damped by [`LAZY_FRICTION`]). Each time the brush moves its new
/// position is emitted. Stationary input emits only the first point.
pub fn lazy_points(points: &[Point], radius: f64) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut brush = first;
    let mut out = vec![brush];
    for &p in &points[1..] {
        let d = brush.distance(p);
        if d <= radius {
            continue;
        }
        let dir = (p - brush) / d;
        let travel = (d - radius) * (1.0 - LAZY_FRICTION);
        if travel <= f64::EPSILON {
            continue;
        }
        brush += dir * travel;
        out.push(brush);
    }
    out
}

/// Soft angle snap for line/arrow drawing.
///
/// Once the free end is farther than [`SNAP_MIN_DISTANCE`] from `start`, its
/// angle snaps to the nearest multiple of [`SNAP_STEP_DEG`] if it deviates by
/// at most [`SNAP_TOLERANCE_DEG`]. Otherwise `p` passes through unchanged.
pub fn apply_soft_snap(start: Point, p: Point) -> Point {
    let v = p - start;
    let len = v.hypot();
    if len <= SNAP_MIN_DISTANCE {
        return p;
    }
    let angle = v.y.atan2(v.x).to_degrees();
    let snapped = (angle / SNAP_STEP_DEG).round() * SNAP_STEP_DEG;
    if (angle - snapped).abs() > SNAP_TOLERANCE_DEG {
        return p;
    }
    let rad = snapped.to_radians();
    start + Vec2::new(rad.cos(), rad.sin()) * len
}

/// Constrain the free corner of a box so that `width / height == ratio`.
///
/// Two candidates are built, one trusting the cursor's x and one trusting
/// its y, and the smaller box wins, so the cursor never ends up inside the box
/// it drags. Drag direction (sign per axis) is preserved. A drag that is flat
/// along one axis trusts the other one.
pub fn apply_aspect_ratio_lock(start: Point, p: Point, ratio: f64) -> Point {
    if !ratio.is_finite() || ratio <= 0.0 {
        return p;
    }
    let dx = p.x - start.x;
    let dy = p.y - start.y;
    let sx = if dx < 0.0 { -1.0 } else { 1.0 };
    let sy = if dy < 0.0 { -1.0 } else { 1.0 };

    let from_x = Point::new(p.x, start.y + sy * dx.abs() / ratio);
    let from_y = Point::new(start.x + sx * dy.abs() * ratio, p.y);

    if dx == 0.0 {
        return from_y;
    }
    if dy == 0.0 {
        return from_x;
    }
    let area_x = dx.abs() * (dx.abs() / ratio);
    let area_y = (dy.abs() * ratio) * dy.abs();
    if area_x <= area_y { from_x } else { from_y }
}

/// Width / height of the box spanned by two corners, `None` when flat.
pub fn aspect_ratio(a: Point, b: Point) -> Option<f64> {
    let w = (b.x - a.x).abs();
    let h = (b.y - a.y).abs();
    (w > 0.0 && h > 0.0).then(|| w / h)
}

/// Normalize two corners to `(min, max)`.
pub fn normalized_box(a: Point, b: Point) -> (Point, Point) {
    (
        Point::new(a.x.min(b.x), a.y.min(b.y)),
        Point::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// Translate every point by `delta`.
pub fn translate_points(points: &mut [Point], delta: Vec2) {
    for p in points {
        *p += delta;
    }
}

/// Rainbow gradient stops for the segment `a → b`, starting at hue `phase`.
///
/// One stop per unit of `distance * scale` (at least one); stop `i` has hue
/// `(phase + i) mod 360`. Returns the stops and the phase reached at `b`, so
/// the next segment continues the sweep.
pub fn rainbow_stops(
    a: Point,
    b: Point,
    phase: f64,
    scale: f64,
) -> (SmallVec<[GradientStop; 4]>, f64) {
    rainbow_stops_capped(a, b, phase, scale, usize::MAX)
}

/// [`rainbow_stops`] with at most `max_stops` stops spread evenly over the
/// same hue sweep. Below the cap the result is identical.
pub fn rainbow_stops_capped(
    a: Point,
    b: Point,
    phase: f64,
    scale: f64,
    max_stops: usize,
) -> (SmallVec<[GradientStop; 4]>, f64) {
    let travel = a.distance(b) * scale;
    let full = (travel.floor() as usize).max(1);
    let count = full.min(max_stops.max(2));
    let step = if count > 1 {
        (full - 1) as f64 / (count - 1) as f64
    } else {
        0.0
    };
    let stops = (0..count)
        .map(|i| GradientStop {
            offset: if count == 1 {
                0.0
            } else {
                i as f32 / (count - 1) as f32
            },
            color: Color::rainbow((phase + i as f64 * step).rem_euclid(360.0)),
        })
        .collect();
    (stops, (phase + travel).rem_euclid(360.0))
}

/// Two-stop rainbow gradient for one stroke segment: `hue(phase)` →
/// `hue(phase + distance * scale)`. Returns the stops and the new phase.
pub fn segment_hue_pair(phase: f64, distance: f64, scale: f64) -> ([GradientStop; 2], f64) {
    let end = (phase + distance * scale).rem_euclid(360.0);
    (
        [
            GradientStop {
                offset: 0.0,
                color: Color::rainbow(phase),
            },
            GradientStop {
                offset: 1.0,
                color: Color::rainbow(end),
            },
        ],
        end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn segment_distance_clamps_to_ends() {
        let a = p(0.0, 0.0);
        let b = p(10.0, 0.0);
        assert!((point_to_segment_distance(p(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_distance(p(-4.0, 3.0), a, b) - 5.0).abs() < 1e-9);
        assert!((point_to_segment_distance(p(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn segment_distance_degenerate_segment() {
        let a = p(2.0, 2.0);
        assert!((point_to_segment_distance(p(5.0, 6.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn filter_keeps_ends() {
        let pts = vec![p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0), p(5.0, 0.0), p(5.2, 0.0)];
        let out = filter_close_points(&pts, 2.0);
        assert_eq!(out, vec![p(0.0, 0.0), p(5.0, 0.0), p(5.2, 0.0)]);
    }

    #[test]
    fn filter_short_input_untouched() {
        let pts = vec![p(1.0, 1.0), p(1.0, 1.0)];
        assert_eq!(filter_close_points(&pts, 10.0), pts);
        assert!(filter_close_points(&[], 10.0).is_empty());
    }

    #[test]
    fn lazy_brush_trails_by_radius() {
        let pts = vec![p(0.0, 0.0), p(3.0, 0.0), p(20.0, 0.0)];
        let out = lazy_points(&pts, 5.0);
        assert_eq!(out.len(), 2);
        // (20 - 5) * (1 - friction) along x.
        assert!((out[1].x - 15.0 * (1.0 - LAZY_FRICTION)).abs() < 1e-9);
        assert_eq!(out[1].y, 0.0);
    }

    #[test]
    fn soft_snap_short_drag_passes_through() {
        let q = apply_soft_snap(p(0.0, 0.0), p(10.0, 1.0));
        assert_eq!(q, p(10.0, 1.0));
    }

    #[test]
    fn soft_snap_rounds_to_horizontal() {
        let q = apply_soft_snap(p(0.0, 0.0), p(100.0, 5.0));
        assert!(q.y.abs() < 1e-9);
        assert!((q.x - p(100.0, 5.0).to_vec2().hypot()).abs() < 1e-9);
    }

    #[test]
    fn soft_snap_rounds_to_45() {
        let q = apply_soft_snap(p(0.0, 0.0), p(100.0, 95.0));
        assert!((q.x - q.y).abs() < 1e-9);
    }

    #[test]
    fn aspect_lock_prefers_smaller_box() {
        // Ratio 2: trusting x=100 gives 100×50, trusting y=100 gives 200×100.
        let q = apply_aspect_ratio_lock(p(0.0, 0.0), p(100.0, 100.0), 2.0);
        assert_eq!(q, p(100.0, 50.0));
        // Negative drag keeps its direction.
        let q = apply_aspect_ratio_lock(p(0.0, 0.0), p(-100.0, -10.0), 2.0);
        assert_eq!(q, p(-20.0, -10.0));
    }

    #[test]
    fn aspect_lock_flat_drag_uses_other_axis() {
        let q = apply_aspect_ratio_lock(p(0.0, 0.0), p(0.0, 30.0), 0.5);
        assert_eq!(q, p(15.0, 30.0));
    }

    #[test]
    fn rainbow_stops_count_and_phase() {
        let (stops, phase) = rainbow_stops(p(0.0, 0.0), p(10.0, 0.0), 350.0, 1.0);
        assert_eq!(stops.len(), 10);
        assert_eq!(stops[0].offset, 0.0);
        assert_eq!(stops[9].offset, 1.0);
        assert!((phase - 0.0).abs() < 1e-9);
        assert_eq!(stops[0].color, Color::rainbow(350.0));
    }

    #[test]
    fn rainbow_stops_minimum_one() {
        let (stops, phase) = rainbow_stops(p(0.0, 0.0), p(0.0, 0.0), 90.0, 1.0);
        assert_eq!(stops.len(), 1);
        assert_eq!(phase, 90.0);
    }

    #[test]
    fn capped_stops_cover_the_same_sweep() {
        let (full, full_phase) = rainbow_stops(p(0.0, 0.0), p(1000.0, 0.0), 0.0, 1.0);
        let (capped, phase) = rainbow_stops_capped(p(0.0, 0.0), p(1000.0, 0.0), 0.0, 1.0, 64);
        assert_eq!(full.len(), 1000);
        assert_eq!(capped.len(), 64);
        assert_eq!(phase, full_phase);
        assert_eq!(capped[0].color, full[0].color);
        assert_eq!(capped[63].offset, 1.0);
        assert_eq!(capped[63].color.to_rgba8(), full[999].color.to_rgba8());

        let (short, _) = rainbow_stops_capped(p(0.0, 0.0), p(10.0, 0.0), 350.0, 1.0, 64);
        let (exact, _) = rainbow_stops(p(0.0, 0.0), p(10.0, 0.0), 350.0, 1.0);
        assert_eq!(short, exact);
    }

    #[test]
    fn segment_pair_continues_sweep() {
        let (first, phase) = segment_hue_pair(10.0, 20.0, 0.5);
        let (second, _) = segment_hue_pair(phase, 20.0, 0.5);
        assert_eq!(first[1].color, second[0].color);
        assert_eq!(phase, 20.0);
    }
}
