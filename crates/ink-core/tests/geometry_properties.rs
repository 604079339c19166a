//! Integration tests: geometry invariants over sweeps of inputs.

use ink_core::Point;
use ink_core::geometry::*;

// ─── Aspect lock ─────────────────────────────────────────────────────────

#[test]
fn aspect_lock_always_matches_ratio() {
    let start = Point::new(37.0, -12.0);
    let ratios = [0.25, 0.5, 1.0, 1.618, 3.0, 7.5];
    let drags = [
        (100.0, 10.0),
        (10.0, 100.0),
        (-80.0, 33.0),
        (45.0, -200.0),
        (-1.0, -1.0),
        (0.0, 50.0),
        (50.0, 0.0),
        (-0.5, 300.0),
    ];
    for &ratio in &ratios {
        for &(dx, dy) in &drags {
            let p = Point::new(start.x + dx, start.y + dy);
            let q = apply_aspect_ratio_lock(start, p, ratio);
            let w = (q.x - start.x).abs();
            let h = (q.y - start.y).abs();
            assert!(h > 0.0, "flat box for ratio {ratio}, drag ({dx}, {dy})");
            assert!(
                (w / h - ratio).abs() < 1e-9,
                "ratio {ratio}, drag ({dx}, {dy}) gave {w}x{h}"
            );
        }
    }
}

#[test]
fn aspect_lock_keeps_drag_direction() {
    let start = Point::new(0.0, 0.0);
    for &(dx, dy) in &[(30.0, 40.0), (-30.0, 40.0), (30.0, -40.0), (-30.0, -40.0)] {
        let q = apply_aspect_ratio_lock(start, Point::new(dx, dy), 1.0);
        assert_eq!(q.x.signum(), f64::signum(dx));
        assert_eq!(q.y.signum(), f64::signum(dy));
    }
}

// ─── Lazy brush ──────────────────────────────────────────────────────────

#[test]
fn lazy_brush_stationary_input_yields_start_only() {
    let p = Point::new(12.5, 40.0);
    let points = vec![p; 50];
    assert_eq!(lazy_points(&points, 6.0), vec![p]);
}

#[test]
fn lazy_brush_jitter_inside_radius_is_ignored() {
    let points: Vec<_> = (0..40)
        .map(|i| Point::new(100.0 + (i % 3) as f64, 100.0 - (i % 2) as f64))
        .collect();
    assert_eq!(lazy_points(&points, 5.0).len(), 1);
}

#[test]
fn lazy_brush_reduces_point_count() {
    let points: Vec<_> = (0..200).map(|i| Point::new(i as f64, (i as f64 * 0.1).sin())).collect();
    let lazy = lazy_points(&points, 4.0);
    assert!(lazy.len() < points.len());
    // The brush trails: it never overtakes the last raw point.
    assert!(lazy.last().unwrap().x < points.last().unwrap().x);
}

// ─── Simplification ──────────────────────────────────────────────────────

#[test]
fn filter_close_points_spacing() {
    let points: Vec<_> = (0..100).map(|i| Point::new(i as f64 * 0.5, 0.0)).collect();
    let out = filter_close_points(&points, 2.0);
    assert_eq!(out.first(), points.first());
    assert_eq!(out.last(), points.last());
    for w in out[..out.len() - 1].windows(2) {
        assert!(w[0].distance(w[1]) > 2.0);
    }
}

// ─── Rainbow ─────────────────────────────────────────────────────────────

#[test]
fn rainbow_phase_accumulates_over_a_polyline() {
    let points = [
        Point::new(0.0, 0.0),
        Point::new(30.0, 0.0),
        Point::new(30.0, 40.0),
    ];
    let mut phase = 100.0;
    for w in points.windows(2) {
        let (_, next) = rainbow_stops(w[0], w[1], phase, 1.0);
        phase = next;
    }
    assert!((phase - (100.0 + polyline_length(&points))).abs() < 1e-9);
}
