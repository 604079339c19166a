//! A [`Surface`] that records every call, used by tests and tooling to
//! inspect what the painters emit without a rasterizer.

use crate::surface::{Shadow, Surface};
use ink_core::Paint;
use kurbo::{Affine, BezPath, Point, Stroke};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Alpha(f64),
    Shadow(Option<Shadow>),
    Transform(Affine),
    Fill { path: BezPath, paint: Paint },
    Stroke { path: BezPath, paint: Paint, width: f64 },
    Text {
        text: String,
        origin: Point,
        font_size: f64,
        paint: Paint,
    },
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub ops: Vec<DrawOp>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fills(&self) -> impl Iterator<Item = (&BezPath, &Paint)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Fill { path, paint } => Some((path, paint)),
            _ => None,
        })
    }

    pub fn strokes(&self) -> impl Iterator<Item = (&BezPath, &Paint, f64)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Stroke { path, paint, width } => Some((path, paint, *width)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Save/restore calls are balanced.
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0i64;
        for op in &self.ops {
            match op {
                DrawOp::Save => depth += 1,
                DrawOp::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl Surface for Recorder {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ops.push(DrawOp::Alpha(alpha));
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.ops.push(DrawOp::Shadow(shadow));
    }

    fn transform(&mut self, affine: Affine) {
        self.ops.push(DrawOp::Transform(affine));
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        self.ops.push(DrawOp::Fill {
            path: path.clone(),
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, stroke: &Stroke) {
        self.ops.push(DrawOp::Stroke {
            path: path.clone(),
            paint: paint.clone(),
            width: stroke.width,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            origin,
            font_size,
            paint: paint.clone(),
        });
    }
}
