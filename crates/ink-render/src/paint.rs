//! Scene → surface drawing commands.
//!
//! One painter per figure kind. Painters never mutate the scene: rainbow
//! figures report the hue phase they reached so the caller can animate by
//! writing it back.

use crate::arrow::arrow_geometry;
use crate::freehand::{StrokeOptions, stroke_path};
use crate::hit::{TEXT_MARGIN, handle_points};
use crate::surface::{Shadow, Surface};
use ink_core::geometry::{self, RAINBOW_SCALE};
use ink_core::palette::{HIGHLIGHTER_ALPHA, HIGHLIGHTER_WIDTH_FACTOR};
use ink_core::{Color, Figure, FigureId, Millis, Paint, Ripple, Scene, Shape};
use kurbo::{Affine, BezPath, Cap, Circle, Ellipse, Join, Line, Point, Rect, RoundedRect, Shape as _, Stroke, Vec2};
use smallvec::smallvec;

/// Selection accent: active outlines and the inner handle ring.
pub const ACCENT: Color = Color::rgb8(0x00, 0x7A, 0xFF);
/// Outer ring of a handle marker.
pub const HANDLE_RING: Color = Color::rgba(1.0, 1.0, 1.0, 0.95);
pub const HANDLE_OUTER_RADIUS: f64 = 7.0;
pub const HANDLE_INNER_RADIUS: f64 = 4.5;
/// Alpha of figures the eraser has marked.
pub const ERASED_ALPHA: f64 = 0.3;
/// Text line advance as a multiple of font size.
pub const LINE_HEIGHT: f64 = 1.2;
/// Average glyph advance as a multiple of font size.
const GLYPH_ADVANCE: f64 = 0.6;
const LAZY_RADIUS: f64 = 5.0;
const LASER_GLOW_FACTOR: f64 = 3.0;
const ERASER_TRAIL_SIZE: f64 = 12.0;
const ERASER_TRAIL: Color = Color::rgba(0.6, 0.6, 0.6, 0.5);
const RIPPLE_MAX_RADIUS: f64 = 36.0;
const TOLERANCE: f64 = 0.1;
/// Stops per rainbow gradient; long shapes sample the sweep.
const MAX_GRADIENT_STOPS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintOptions {
    pub now: Millis,
    /// Selected figure, drawn with its highlight and handles.
    pub active: Option<FigureId>,
    pub show_handles: bool,
    /// Paint an opaque background over the whole viewport first.
    pub whiteboard: bool,
    pub viewport: Rect,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            now: 0,
            active: None,
            show_handles: true,
            whiteboard: false,
            viewport: Rect::new(0.0, 0.0, 1920.0, 1080.0),
        }
    }
}

/// What a frame produced beyond the draw calls.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameStats {
    /// Hue phase reached by each rainbow figure.
    pub rainbow_phases: Vec<(FigureId, f64)>,
    pub figures_painted: usize,
}

/// Unscaled size of a text block at `font_size`.
pub fn measure_text(text: &str, font_size: f64) -> (f64, f64) {
    let lines = text.split('\n');
    let (count, widest) = lines.fold((0usize, 0usize), |(n, w), line| {
        (n + 1, w.max(line.chars().count()))
    });
    (
        widest as f64 * font_size * GLYPH_ADVANCE,
        count as f64 * font_size * LINE_HEIGHT,
    )
}

/// Paint the whole scene: background, persisted figures, fade strokes,
/// eraser trails, lasers, then ripples on top.
pub fn paint_scene(surface: &mut dyn Surface, scene: &Scene, options: &PaintOptions) -> FrameStats {
    let mut stats = FrameStats::default();

    if options.whiteboard {
        surface.fill_rect(options.viewport, &Paint::Solid(Color::WHITE));
    }

    for figure in &scene.figures {
        let active = options.show_handles && options.active == Some(figure.id);
        record(&mut stats, figure, paint_figure(surface, figure, active));
    }

    if !scene.fade.is_empty() && scene.fade_opacity > 0.0 {
        surface.save();
        surface.set_alpha(scene.fade_opacity);
        for figure in &scene.fade {
            record(&mut stats, figure, paint_figure(surface, figure, false));
        }
        surface.restore();
    }

    for figure in scene.erasers.iter().chain(&scene.lasers) {
        record(&mut stats, figure, paint_figure(surface, figure, false));
    }

    for ripple in &scene.ripples {
        paint_ripple(surface, ripple, options.now);
    }

    log::trace!("frame: {} figures", stats.figures_painted);
    stats
}

fn record(stats: &mut FrameStats, figure: &Figure, phase: Option<f64>) {
    stats.figures_painted += 1;
    if let Some(phase) = phase {
        stats.rainbow_phases.push((figure.id, phase));
    }
}

/// Paint one figure. Returns the reached hue phase for rainbow figures.
pub fn paint_figure(surface: &mut dyn Surface, figure: &Figure, active: bool) -> Option<f64> {
    if figure.erased {
        surface.save();
        surface.set_alpha(ERASED_ALPHA);
    }

    let phase = match &figure.shape {
        Shape::Pen { points } | Shape::FadePen { points } => paint_pen(surface, figure, points, 1.0, 1.0),
        Shape::Highlighter { points } => paint_pen(
            surface,
            figure,
            points,
            HIGHLIGHTER_WIDTH_FACTOR,
            HIGHLIGHTER_ALPHA,
        ),
        Shape::Line { a, b } => paint_line(surface, figure, *a, *b, active),
        Shape::Arrow { a, b } => paint_arrow(surface, figure, *a, *b, active),
        Shape::Rectangle { a, b, .. } => {
            let rect = Rect::from_points(*a, *b);
            let radius = figure.width.pixels().min(rect.width() / 2.0).min(rect.height() / 2.0);
            let path = RoundedRect::from_rect(rect, radius).to_path(TOLERANCE);
            paint_outline(surface, figure, &path, *a, *b, active)
        }
        Shape::Oval { a, b, .. } => {
            let path = Ellipse::from_rect(Rect::from_points(*a, *b)).to_path(TOLERANCE);
            paint_outline(surface, figure, &path, *a, *b, active)
        }
        Shape::Text { .. } => paint_text(surface, figure, active),
        Shape::Laser { points } => paint_laser(surface, figure, points),
        Shape::Eraser { points } => {
            if points.len() > 1 {
                let path = stroke_path(points, &StrokeOptions::uniform(ERASER_TRAIL_SIZE));
                surface.fill_path(&path, &Paint::Solid(ERASER_TRAIL));
            }
            None
        }
    };

    if figure.erased {
        surface.restore();
    }
    phase
}

/// Solid palette colour, or a rainbow gradient along `start → end`.
fn resolve_paint(figure: &Figure, start: Point, end: Point) -> (Paint, Option<f64>) {
    match figure.color.solid() {
        Some(color) => (Paint::Solid(color), None),
        None => {
            let (stops, phase) = geometry::rainbow_stops_capped(
                start,
                end,
                figure.rainbow_phase,
                RAINBOW_SCALE,
                MAX_GRADIENT_STOPS,
            );
            (Paint::Linear { start, end, stops }, Some(phase))
        }
    }
}

fn round_stroke(width: f64) -> Stroke {
    Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round)
}

fn paint_pen(
    surface: &mut dyn Surface,
    figure: &Figure,
    points: &[Point],
    width_factor: f64,
    alpha: f32,
) -> Option<f64> {
    let size = figure.width.pixels() * width_factor;
    let Some(color) = figure.color.solid() else {
        return Some(paint_rainbow_polyline(surface, figure, points, size, alpha));
    };
    let options = if width_factor > 1.0 {
        StrokeOptions::uniform(size)
    } else {
        StrokeOptions::new(size)
    };
    surface.fill_path(&stroke_path(points, &options), &Paint::Solid(color.with_alpha(alpha)));
    None
}

/// Rainbow strokes: lazy-smoothed points, one two-stop gradient per segment,
/// with the hue carried across segments.
fn paint_rainbow_polyline(
    surface: &mut dyn Surface,
    figure: &Figure,
    points: &[Point],
    size: f64,
    alpha: f32,
) -> f64 {
    let smoothed = geometry::lazy_points(points, LAZY_RADIUS);
    let mut phase = figure.rainbow_phase;

    if smoothed.len() < 2 {
        if let Some(&p) = smoothed.first() {
            let dot = Circle::new(p, size / 2.0).to_path(TOLERANCE);
            surface.fill_path(&dot, &Paint::Solid(Color::rainbow(phase).with_alpha(alpha)));
        }
        return phase;
    }

    let stroke = round_stroke(size);
    for pair in smoothed.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (stops, next) = geometry::segment_hue_pair(phase, a.distance(b), RAINBOW_SCALE);
        let paint = Paint::Linear {
            start: a,
            end: b,
            stops: smallvec![stops[0], stops[1]],
        };
        let paint = if alpha < 1.0 { paint.with_alpha(alpha) } else { paint };
        surface.stroke_path(&Line::new(a, b).to_path(TOLERANCE), &paint, &stroke);
        phase = next;
    }
    phase
}

fn paint_line(surface: &mut dyn Surface, figure: &Figure, a: Point, b: Point, active: bool) -> Option<f64> {
    let path = Line::new(a, b).to_path(TOLERANCE);
    let width = figure.width.pixels();
    let (paint, phase) = resolve_paint(figure, a, b);
    if active {
        surface.stroke_path(&path, &Paint::Solid(ACCENT.with_alpha(0.35)), &round_stroke(width + 6.0));
    }
    surface.stroke_path(&path, &paint, &round_stroke(width));
    if active {
        paint_handles(surface, figure);
    }
    phase
}

fn paint_arrow(surface: &mut dyn Surface, figure: &Figure, a: Point, b: Point, active: bool) -> Option<f64> {
    let geometry = arrow_geometry(a, b, figure.width)?;
    let (paint, phase) = resolve_paint(figure, a, b);
    surface.save();
    surface.set_shadow(Some(Shadow {
        offset: Vec2::new(0.0, 1.0),
        blur: 4.0,
        color: Color::rgba(0.0, 0.0, 0.0, 0.35),
    }));
    surface.fill_path(&geometry.body, &paint);
    surface.fill_path(&geometry.tail_cap.to_path(TOLERANCE), &paint);
    surface.restore();
    if active {
        paint_handles(surface, figure);
    }
    phase
}

/// Stroked rectangle/oval outline with corner handles when active.
fn paint_outline(
    surface: &mut dyn Surface,
    figure: &Figure,
    path: &BezPath,
    a: Point,
    b: Point,
    active: bool,
) -> Option<f64> {
    let (paint, phase) = resolve_paint(figure, a, b);
    surface.stroke_path(path, &paint, &round_stroke(figure.width.pixels()));
    if active {
        paint_handles(surface, figure);
    }
    phase
}

fn paint_text(surface: &mut dyn Surface, figure: &Figure, active: bool) -> Option<f64> {
    let Shape::Text {
        anchor,
        text,
        height,
        scale,
        ..
    } = &figure.shape
    else {
        return None;
    };
    let font_size = figure.width.font_size();
    // In the text frame: origin at the anchor, unscaled units.
    let (paint, phase) = resolve_paint(figure, Point::ZERO, Point::new(0.0, height.max(1.0)));

    surface.save();
    surface.transform(Affine::translate(anchor.to_vec2()) * Affine::scale(*scale));
    for (i, line) in text.split('\n').enumerate() {
        let origin = Point::new(0.0, i as f64 * font_size * LINE_HEIGHT);
        surface.fill_text(line, origin, font_size, &paint);
    }
    surface.restore();

    if active && let Some(r) = figure.text_box() {
        let frame = r.inflate(TEXT_MARGIN, TEXT_MARGIN).to_path(TOLERANCE);
        surface.stroke_path(&frame, &Paint::Solid(ACCENT), &Stroke::new(1.5));
        paint_handles(surface, figure);
    }
    phase
}

/// Wide coloured glow with a narrow white core.
fn paint_laser(surface: &mut dyn Surface, figure: &Figure, points: &[Point]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let size = figure.width.pixels();
    let (color, phase) = match figure.color.solid() {
        Some(c) => (c, None),
        None => (
            Color::rainbow(figure.rainbow_phase),
            Some((figure.rainbow_phase + geometry::polyline_length(points) * RAINBOW_SCALE).rem_euclid(360.0)),
        ),
    };

    surface.save();
    surface.set_shadow(Some(Shadow {
        offset: Vec2::ZERO,
        blur: 12.0,
        color,
    }));
    let glow = stroke_path(points, &StrokeOptions::uniform(size * LASER_GLOW_FACTOR));
    surface.fill_path(&glow, &Paint::Solid(color.with_alpha(0.8)));
    let core = stroke_path(points, &StrokeOptions::uniform(size));
    surface.fill_path(&core, &Paint::Solid(Color::WHITE));
    surface.restore();
    phase
}

fn paint_ripple(surface: &mut dyn Surface, ripple: &Ripple, now: Millis) {
    let t = ripple.progress(now);
    if t >= 1.0 {
        return;
    }
    let color = ripple.color.solid().unwrap_or_else(|| Color::rainbow(t * 360.0));
    let circle = Circle::new(ripple.center, RIPPLE_MAX_RADIUS * t).to_path(TOLERANCE);
    surface.save();
    surface.set_alpha(1.0 - t);
    surface.stroke_path(&circle, &Paint::Solid(color), &Stroke::new(1.0 + 3.0 * (1.0 - t)));
    surface.restore();
}

fn paint_handles(surface: &mut dyn Surface, figure: &Figure) {
    for (_, at) in handle_points(figure) {
        paint_handle_marker(surface, at);
    }
}

/// Concentric circles at a fixed screen-space radius.
pub fn paint_handle_marker(surface: &mut dyn Surface, at: Point) {
    surface.save();
    surface.set_shadow(Some(Shadow {
        offset: Vec2::new(0.0, 1.0),
        blur: 3.0,
        color: Color::rgba(0.0, 0.0, 0.0, 0.3),
    }));
    surface.fill_path(&Circle::new(at, HANDLE_OUTER_RADIUS).to_path(TOLERANCE), &Paint::Solid(HANDLE_RING));
    surface.set_shadow(None);
    surface.fill_path(&Circle::new(at, HANDLE_INNER_RADIUS).to_path(TOLERANCE), &Paint::Solid(ACCENT));
    surface.restore();
}
