//! The drawing target abstraction.
//!
//! Painters only need a retained 2D surface with path fill/stroke, a
//! transform stack, global alpha, a drop shadow, and text. Backends (HTML
//! canvas, Vello, SVG export, the test recorder) implement [`Surface`].

use ink_core::{Color, Paint};
use kurbo::{Affine, BezPath, Point, Rect, Shape, Stroke, Vec2};

/// Drop shadow applied to subsequent fills/strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub offset: Vec2,
    pub blur: f64,
    pub color: Color,
}

pub trait Surface {
    /// Push the current alpha, shadow, and transform.
    fn save(&mut self);
    /// Pop back to the last `save`.
    fn restore(&mut self);
    /// Multiply the current global alpha by `alpha`.
    fn set_alpha(&mut self, alpha: f64);
    fn set_shadow(&mut self, shadow: Option<Shadow>);
    /// Post-multiply the current transform.
    fn transform(&mut self, affine: Affine);
    fn fill_path(&mut self, path: &BezPath, paint: &Paint);
    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, stroke: &Stroke);
    /// Draw `text` with its top-left corner at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint);

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.fill_path(&rect.to_path(0.1), paint);
    }
}
