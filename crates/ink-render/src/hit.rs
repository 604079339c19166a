//! Hit testing: point → figure / handle lookup.
//!
//! Selection walks the persisted figures back to front (last painted =
//! topmost). Shapes are hit on their outline, not their fill: rectangles
//! near an edge segment, ovals inside an annulus around the ellipse.

use ink_core::geometry::point_to_segment_distance;
use ink_core::{Figure, FigureId, Handle, Shape};
use kurbo::{Point, Rect};
use smallvec::SmallVec;

/// Pixel distance from a stroke that still counts as a hit.
pub const HIT_THRESHOLD: f64 = 10.0;
/// Grab radius of a resize handle.
pub const HANDLE_RADIUS: f64 = 10.0;
/// Padding around a text block for hits and its scale handles.
pub const TEXT_MARGIN: f64 = 10.0;

/// Whether `p` lands on `figure`.
pub fn is_on_figure(p: Point, figure: &Figure) -> bool {
    match &figure.shape {
        Shape::Pen { points } | Shape::Highlighter { points } | Shape::FadePen { points } => {
            near_polyline(p, points)
        }
        // Arrow heads are not tested separately; the shaft segment decides.
        Shape::Line { a, b } | Shape::Arrow { a, b } => {
            point_to_segment_distance(p, *a, *b) <= HIT_THRESHOLD
        }
        Shape::Rectangle { a, b, .. } => near_rect_edge(p, Rect::from_points(*a, *b)),
        Shape::Oval { a, b, .. } => near_ellipse(p, *a, *b),
        Shape::Text { .. } => figure
            .text_box()
            .is_some_and(|r| r.inflate(TEXT_MARGIN, TEXT_MARGIN).contains(p)),
        // Trails are never selectable.
        Shape::Laser { .. } | Shape::Eraser { .. } => false,
    }
}

fn near_polyline(p: Point, points: &[Point]) -> bool {
    match points {
        [] => false,
        [only] => only.distance(p) <= HIT_THRESHOLD,
        _ => points
            .windows(2)
            .any(|w| point_to_segment_distance(p, w[0], w[1]) <= HIT_THRESHOLD),
    }
}

/// Within the threshold of an edge, and inside that edge's extent.
fn near_rect_edge(p: Point, r: Rect) -> bool {
    let t = HIT_THRESHOLD;
    let within_x = p.x >= r.x0 - t && p.x <= r.x1 + t;
    let within_y = p.y >= r.y0 - t && p.y <= r.y1 + t;
    let near_horizontal = within_x && ((p.y - r.y0).abs() < t || (p.y - r.y1).abs() < t);
    let near_vertical = within_y && ((p.x - r.x0).abs() < t || (p.x - r.x1).abs() < t);
    near_horizontal || near_vertical
}

fn near_ellipse(p: Point, a: Point, b: Point) -> bool {
    let rx = (b.x - a.x).abs() / 2.0;
    let ry = (b.y - a.y).abs() / 2.0;
    if rx < 1.0 || ry < 1.0 {
        return point_to_segment_distance(p, a, b) <= HIT_THRESHOLD;
    }
    let center = a.midpoint(b);
    let nx = (p.x - center.x) / rx;
    let ny = (p.y - center.y) / ry;
    // TODO: the annulus width is only exact on the shorter axis; an exact
    // distance-to-ellipse test would tighten hits on elongated ovals.
    let tolerance = 2.0 * HIT_THRESHOLD / rx.min(ry);
    (nx * nx + ny * ny - 1.0).abs() <= tolerance
}

/// Handle positions of a figure. Empty for figures that can't be resized.
pub fn handle_points(figure: &Figure) -> SmallVec<[(Handle, Point); 4]> {
    let mut out = SmallVec::new();
    match &figure.shape {
        Shape::Line { a, b } | Shape::Arrow { a, b } => {
            out.push((Handle::PointA, *a));
            out.push((Handle::PointB, *b));
        }
        Shape::Rectangle { a, b, .. } | Shape::Oval { a, b, .. } => {
            out.push((Handle::PointA, *a));
            out.push((Handle::PointB, *b));
            out.push((Handle::PointAB, Point::new(a.x, b.y)));
            out.push((Handle::PointBA, Point::new(b.x, a.y)));
        }
        Shape::Text { .. } => {
            if let Some(r) = figure.text_box() {
                let r = r.inflate(TEXT_MARGIN, TEXT_MARGIN);
                out.push((Handle::ScaleTopLeft, Point::new(r.x0, r.y0)));
                out.push((Handle::ScaleTopRight, Point::new(r.x1, r.y0)));
                out.push((Handle::ScaleBottomLeft, Point::new(r.x0, r.y1)));
                out.push((Handle::ScaleBottomRight, Point::new(r.x1, r.y1)));
            }
        }
        Shape::Pen { .. }
        | Shape::Highlighter { .. }
        | Shape::FadePen { .. }
        | Shape::Laser { .. }
        | Shape::Eraser { .. } => {}
    }
    out
}

/// First handle of `figure` within grab distance of `p`.
pub fn handle_at(p: Point, figure: &Figure) -> Option<Handle> {
    handle_points(figure)
        .into_iter()
        .find(|(_, at)| at.distance(p) <= HANDLE_RADIUS)
        .map(|(h, _)| h)
}

/// Topmost figure under `p`. Walks back to front so overlapping figures
/// resolve to whichever is painted last.
pub fn topmost_figure_at(p: Point, figures: &[Figure]) -> Option<FigureId> {
    figures
        .iter()
        .rev()
        .find(|f| is_on_figure(p, f))
        .map(|f| f.id)
}

/// Whether the segment `a → b` touches `figure`, sampled at half the hit
/// threshold so fast strokes can't skip over thin figures.
pub fn segment_hits_figure(a: Point, b: Point, figure: &Figure) -> bool {
    let len = a.distance(b);
    let steps = (len / (HIT_THRESHOLD / 2.0)).ceil().max(1.0) as usize;
    (0..=steps).any(|i| is_on_figure(a.lerp(b, i as f64 / steps as f64), figure))
}
