//! Figure data model.
//!
//! A [`Figure`] is one drawable entity: a freehand stroke, a two-point shape,
//! a text block, or a transient laser/eraser trail. The variant-specific
//! geometry lives in the closed [`Shape`] sum type so every consumer
//! (hit-testing, painting, mutation) matches exhaustively. Two-point shapes
//! store their endpoints as fields, so they can never lose one.

use crate::geometry;
use crate::id::FigureId;
use crate::palette::{ColorIndex, WidthIndex};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The discriminant of a [`Shape`], used by tools and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureKind {
    Pen,
    Highlighter,
    FadePen,
    Line,
    Arrow,
    Rectangle,
    Oval,
    Text,
    Laser,
    Eraser,
}

impl FigureKind {
    /// Kinds drawn as a growing polyline.
    pub fn is_freeform(self) -> bool {
        matches!(
            self,
            FigureKind::Pen
                | FigureKind::Highlighter
                | FigureKind::FadePen
                | FigureKind::Laser
                | FigureKind::Eraser
        )
    }

    /// Kinds that never enter the persisted figure list or the history.
    pub fn is_transient(self) -> bool {
        matches!(self, FigureKind::FadePen | FigureKind::Laser | FigureKind::Eraser)
    }
}

/// Variant-specific geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Pen { points: Vec<Point> },
    Highlighter { points: Vec<Point> },
    FadePen { points: Vec<Point> },
    Line { a: Point, b: Point },
    Arrow { a: Point, b: Point },
    /// Opposite corners plus the width/height ratio captured at gesture end.
    Rectangle { a: Point, b: Point, aspect: f64 },
    Oval { a: Point, b: Point, aspect: f64 },
    /// `anchor` is the top-left corner of the unscaled text block;
    /// `width`/`height` are the measured, unscaled extents.
    Text {
        anchor: Point,
        text: String,
        width: f64,
        height: f64,
        scale: f64,
    },
    Laser { points: Vec<Point> },
    Eraser { points: Vec<Point> },
}

/// Named control point of a figure.
///
/// `PointA`/`PointB` are the two stored points of a two-point shape.
/// `PointAB` is the implied corner at (A.x, B.y), `PointBA` at (B.x, A.y).
/// The four `Scale*` handles sit on the corners of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    PointA,
    PointB,
    PointAB,
    PointBA,
    ScaleTopLeft,
    ScaleTopRight,
    ScaleBottomLeft,
    ScaleBottomRight,
}

/// Smallest text scale reachable by resizing.
pub const MIN_TEXT_SCALE: f64 = 0.3;

/// A single drawable entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub id: FigureId,
    pub color: ColorIndex,
    pub width: WidthIndex,
    /// Hue in degrees. Only meaningful when `color` is rainbow.
    pub rainbow_phase: f64,
    /// Pending-delete marker set by the eraser.
    pub erased: bool,
    pub shape: Shape,
}

impl Figure {
    /// Create a figure with a fresh id.
    pub fn new(shape: Shape, color: ColorIndex, width: WidthIndex) -> Self {
        Self {
            id: FigureId::next(),
            color,
            width,
            rainbow_phase: 0.0,
            erased: false,
            shape,
        }
    }

    /// Start a figure of `kind` at `origin` (the pointer-down position).
    pub fn start(kind: FigureKind, origin: Point, color: ColorIndex, width: WidthIndex) -> Self {
        let shape = match kind {
            FigureKind::Pen => Shape::Pen { points: vec![origin] },
            FigureKind::Highlighter => Shape::Highlighter { points: vec![origin] },
            FigureKind::FadePen => Shape::FadePen { points: vec![origin] },
            FigureKind::Laser => Shape::Laser { points: vec![origin] },
            FigureKind::Eraser => Shape::Eraser { points: vec![origin] },
            FigureKind::Line => Shape::Line { a: origin, b: origin },
            FigureKind::Arrow => Shape::Arrow { a: origin, b: origin },
            FigureKind::Rectangle => Shape::Rectangle {
                a: origin,
                b: origin,
                aspect: 1.0,
            },
            FigureKind::Oval => Shape::Oval {
                a: origin,
                b: origin,
                aspect: 1.0,
            },
            FigureKind::Text => Shape::Text {
                anchor: origin,
                text: String::new(),
                width: 0.0,
                height: 0.0,
                scale: 1.0,
            },
        };
        Self::new(shape, color, width)
    }

    pub fn kind(&self) -> FigureKind {
        match &self.shape {
            Shape::Pen { .. } => FigureKind::Pen,
            Shape::Highlighter { .. } => FigureKind::Highlighter,
            Shape::FadePen { .. } => FigureKind::FadePen,
            Shape::Line { .. } => FigureKind::Line,
            Shape::Arrow { .. } => FigureKind::Arrow,
            Shape::Rectangle { .. } => FigureKind::Rectangle,
            Shape::Oval { .. } => FigureKind::Oval,
            Shape::Text { .. } => FigureKind::Text,
            Shape::Laser { .. } => FigureKind::Laser,
            Shape::Eraser { .. } => FigureKind::Eraser,
        }
    }

    /// Polyline points of a freeform figure.
    pub fn polyline(&self) -> Option<&[Point]> {
        match &self.shape {
            Shape::Pen { points }
            | Shape::Highlighter { points }
            | Shape::FadePen { points }
            | Shape::Laser { points }
            | Shape::Eraser { points } => Some(points),
            _ => None,
        }
    }

    pub fn polyline_mut(&mut self) -> Option<&mut Vec<Point>> {
        match &mut self.shape {
            Shape::Pen { points }
            | Shape::Highlighter { points }
            | Shape::FadePen { points }
            | Shape::Laser { points }
            | Shape::Eraser { points } => Some(points),
            _ => None,
        }
    }

    /// Endpoints / corners of a two-point figure.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match self.shape {
            Shape::Line { a, b }
            | Shape::Arrow { a, b }
            | Shape::Rectangle { a, b, .. }
            | Shape::Oval { a, b, .. } => Some((a, b)),
            _ => None,
        }
    }

    /// All stored points, in order.
    pub fn points(&self) -> SmallVec<[Point; 2]> {
        match &self.shape {
            Shape::Text { anchor, .. } => SmallVec::from_slice(&[*anchor]),
            _ => match (self.polyline(), self.endpoints()) {
                (Some(points), _) => SmallVec::from_slice(points),
                (None, Some((a, b))) => SmallVec::from_slice(&[a, b]),
                (None, None) => SmallVec::new(),
            },
        }
    }

    /// The point that lands under the cursor when pasting.
    pub fn reference_point(&self) -> Option<Point> {
        self.points().first().copied()
    }

    /// Append a point to a freeform figure, or move the free end of a
    /// two-point figure. Text ignores it.
    pub fn extend_to(&mut self, p: Point) {
        match &mut self.shape {
            Shape::Pen { points }
            | Shape::Highlighter { points }
            | Shape::FadePen { points }
            | Shape::Laser { points }
            | Shape::Eraser { points } => points.push(p),
            Shape::Line { b, .. }
            | Shape::Arrow { b, .. }
            | Shape::Rectangle { b, .. }
            | Shape::Oval { b, .. } => *b = p,
            Shape::Text { .. } => {}
        }
    }

    /// Move every point by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.shape {
            Shape::Pen { points }
            | Shape::Highlighter { points }
            | Shape::FadePen { points }
            | Shape::Laser { points }
            | Shape::Eraser { points } => geometry::translate_points(points, delta),
            Shape::Line { a, b }
            | Shape::Arrow { a, b }
            | Shape::Rectangle { a, b, .. }
            | Shape::Oval { a, b, .. } => {
                *a += delta;
                *b += delta;
            }
            Shape::Text { anchor, .. } => *anchor += delta,
        }
    }

    /// Recompute the stored aspect ratio of a rectangle/oval from its corners.
    /// Flat boxes keep their previous ratio.
    pub fn refresh_aspect(&mut self) {
        if let Shape::Rectangle { a, b, aspect } | Shape::Oval { a, b, aspect } = &mut self.shape
            && let Some(ratio) = geometry::aspect_ratio(*a, *b)
        {
            *aspect = ratio;
        }
    }

    /// Stored aspect ratio of a rectangle/oval.
    pub fn aspect(&self) -> Option<f64> {
        match self.shape {
            Shape::Rectangle { aspect, .. } | Shape::Oval { aspect, .. } => Some(aspect),
            _ => None,
        }
    }

    /// Scaled bounding box of a text figure.
    pub fn text_box(&self) -> Option<Rect> {
        match &self.shape {
            Shape::Text {
                anchor,
                width,
                height,
                scale,
                ..
            } => Some(Rect::new(
                anchor.x,
                anchor.y,
                anchor.x + width * scale,
                anchor.y + height * scale,
            )),
            _ => None,
        }
    }

    /// Axis-aligned bounds of the stored geometry (no stroke width).
    pub fn bounds(&self) -> Option<Rect> {
        if let Some(r) = self.text_box() {
            return Some(r);
        }
        let points = self.points();
        let first = *points.first()?;
        Some(
            points
                .iter()
                .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)),
        )
    }

    /// Whether this candidate is too small to keep.
    ///
    /// Freeform strokes need at least two points; two-point shapes need a
    /// non-zero drag (rectangles/ovals in both axes); text needs content.
    pub fn is_degenerate(&self) -> bool {
        match &self.shape {
            Shape::Pen { points }
            | Shape::Highlighter { points }
            | Shape::FadePen { points }
            | Shape::Laser { points }
            | Shape::Eraser { points } => points.len() < 2,
            Shape::Line { a, b } | Shape::Arrow { a, b } => a.distance(*b) < MIN_SHAPE_EXTENT,
            Shape::Rectangle { a, b, .. } | Shape::Oval { a, b, .. } => {
                (a.x - b.x).abs() < MIN_SHAPE_EXTENT || (a.y - b.y).abs() < MIN_SHAPE_EXTENT
            }
            Shape::Text { text, .. } => text.trim().is_empty(),
        }
    }

    /// Deep copy with a fresh id and cleared transient flags.
    pub fn duplicate(&self) -> Self {
        Self {
            id: FigureId::next(),
            erased: false,
            ..self.clone()
        }
    }
}

/// Two-point shapes smaller than this (per axis) are discarded on commit.
pub const MIN_SHAPE_EXTENT: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(a: (f64, f64), b: (f64, f64)) -> Figure {
        Figure::new(
            Shape::Rectangle {
                a: Point::new(a.0, a.1),
                b: Point::new(b.0, b.1),
                aspect: 1.0,
            },
            ColorIndex::default(),
            WidthIndex::default(),
        )
    }

    #[test]
    fn start_and_extend_line_keeps_two_points() {
        let mut f = Figure::start(
            FigureKind::Line,
            Point::new(1.0, 1.0),
            ColorIndex::default(),
            WidthIndex::default(),
        );
        f.extend_to(Point::new(5.0, 5.0));
        f.extend_to(Point::new(9.0, 1.0));
        assert_eq!(f.points().len(), 2);
        assert_eq!(f.endpoints(), Some((Point::new(1.0, 1.0), Point::new(9.0, 1.0))));
    }

    #[test]
    fn translate_moves_all_points() {
        let mut f = rect((0.0, 0.0), (10.0, 20.0));
        f.translate(Vec2::new(5.0, -5.0));
        assert_eq!(f.endpoints(), Some((Point::new(5.0, -5.0), Point::new(15.0, 15.0))));
    }

    #[test]
    fn refresh_aspect_ignores_flat_boxes() {
        let mut f = rect((0.0, 0.0), (40.0, 20.0));
        f.refresh_aspect();
        assert_eq!(f.aspect(), Some(2.0));
        if let Shape::Rectangle { b, .. } = &mut f.shape {
            b.y = 0.0;
        }
        f.refresh_aspect();
        assert_eq!(f.aspect(), Some(2.0));
    }

    #[test]
    fn degenerate_candidates() {
        let f = Figure::start(
            FigureKind::Pen,
            Point::ZERO,
            ColorIndex::default(),
            WidthIndex::default(),
        );
        assert!(f.is_degenerate());
        assert!(rect((0.0, 0.0), (10.0, 0.0)).is_degenerate());
        assert!(!rect((0.0, 0.0), (10.0, 10.0)).is_degenerate());
    }

    #[test]
    fn duplicate_gets_fresh_id() {
        let mut f = rect((0.0, 0.0), (10.0, 10.0));
        f.erased = true;
        let copy = f.duplicate();
        assert_ne!(copy.id, f.id);
        assert!(!copy.erased);
        assert_eq!(copy.shape, f.shape);
    }

    #[test]
    fn text_box_is_scaled() {
        let f = Figure::new(
            Shape::Text {
                anchor: Point::new(10.0, 10.0),
                text: "hi".into(),
                width: 40.0,
                height: 20.0,
                scale: 2.0,
            },
            ColorIndex::default(),
            WidthIndex::default(),
        );
        assert_eq!(f.text_box(), Some(Rect::new(10.0, 10.0, 90.0, 50.0)));
        assert_eq!(f.reference_point(), Some(Point::new(10.0, 10.0)));
    }
}
