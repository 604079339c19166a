//! Arrow geometry: a filled polygon (shaft + triangular head) with a curved
//! back and a round cap circle at the tail.

use ink_core::WidthIndex;
use kurbo::{BezPath, Circle, Point, Vec2};

/// Head length as a fraction of the drag length, before the per-width cap.
const HEAD_LENGTH_RATIO: f64 = 0.35;
/// Head half-width relative to head length.
const HEAD_WIDTH_RATIO: f64 = 0.6;
/// Where the shaft meets the head, as a fraction of head length from the tip.
const NECK_RATIO: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct ArrowGeometry {
    pub body: BezPath,
    pub tail_cap: Circle,
    pub head_length: f64,
}

/// Arrow from `tail` to `tip`. `None` for a zero-length drag.
pub fn arrow_geometry(tail: Point, tip: Point, width: WidthIndex) -> Option<ArrowGeometry> {
    let len = tail.distance(tip);
    if len < 1.0 {
        return None;
    }
    let dir: Vec2 = (tip - tail) / len;
    let normal = Vec2::new(-dir.y, dir.x);

    let shaft_half = width.pixels() / 2.0;
    let head_length = (len * HEAD_LENGTH_RATIO).min(width.arrow_head_cap());
    let head_half = (head_length * HEAD_WIDTH_RATIO).max(shaft_half * 1.5);

    let neck = tip - dir * (head_length * NECK_RATIO);
    let head_base = tip - dir * head_length;

    let mut body = BezPath::new();
    body.move_to(tail + normal * shaft_half);
    body.line_to(neck + normal * shaft_half);
    body.line_to(head_base + normal * head_half);
    body.line_to(tip);
    body.line_to(head_base - normal * head_half);
    body.line_to(neck - normal * shaft_half);
    body.line_to(tail - normal * shaft_half);
    // Curve around the back of the shaft.
    body.quad_to(tail - dir * shaft_half, tail + normal * shaft_half);
    body.close_path();

    Some(ArrowGeometry {
        body,
        tail_cap: Circle::new(tail, shaft_half),
        head_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    #[test]
    fn zero_length_has_no_geometry() {
        assert!(arrow_geometry(Point::new(5.0, 5.0), Point::new(5.0, 5.0), WidthIndex::new(0)).is_none());
    }

    #[test]
    fn head_scales_then_caps() {
        let w = WidthIndex::new(1);
        let short = arrow_geometry(Point::ZERO, Point::new(20.0, 0.0), w).unwrap();
        assert!((short.head_length - 7.0).abs() < 1e-9);
        let long = arrow_geometry(Point::ZERO, Point::new(1000.0, 0.0), w).unwrap();
        assert_eq!(long.head_length, w.arrow_head_cap());
    }

    #[test]
    fn body_reaches_tip_and_wraps_tail() {
        let g = arrow_geometry(Point::new(10.0, 10.0), Point::new(110.0, 10.0), WidthIndex::new(2)).unwrap();
        let bbox = g.body.bounding_box();
        assert!((bbox.x1 - 110.0).abs() < 1e-9);
        assert!(bbox.x0 < 10.0);
        assert!(g.body.contains(Point::new(60.0, 10.0)));
    }
}
