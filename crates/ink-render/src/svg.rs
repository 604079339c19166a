//! SVG export surface.
//!
//! Serializes painter output to a standalone SVG document. Gradients and
//! shadows become `<defs>` entries referenced by id.

use crate::surface::{Shadow, Surface};
use ink_core::{Color, Paint};
use kurbo::{Affine, BezPath, Cap, Join, Point, Stroke};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy)]
struct State {
    alpha: f64,
    shadow: Option<Shadow>,
    transform: Affine,
}

impl Default for State {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            shadow: None,
            transform: Affine::IDENTITY,
        }
    }
}

pub struct SvgSurface {
    width: f64,
    height: f64,
    defs: String,
    body: String,
    state: State,
    stack: Vec<State>,
    next_def: usize,
}

/// Opaque hex; alpha goes into a separate opacity attribute.
fn svg_color(c: &Color) -> String {
    Color { a: 1.0, ..*c }.to_hex()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn cap_name(cap: Cap) -> &'static str {
    match cap {
        Cap::Butt => "butt",
        Cap::Round => "round",
        Cap::Square => "square",
    }
}

fn join_name(join: Join) -> &'static str {
    match join {
        Join::Bevel => "bevel",
        Join::Miter => "miter",
        Join::Round => "round",
    }
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
            state: State::default(),
            stack: Vec::new(),
            next_def: 0,
        }
    }

    fn def_id(&mut self, prefix: &str) -> String {
        self.next_def += 1;
        format!("{prefix}{}", self.next_def)
    }

    /// Returns the attribute value for a paint, registering a gradient if needed.
    fn paint_ref(&mut self, paint: &Paint) -> String {
        match paint {
            Paint::Solid(c) => svg_color(c),
            Paint::Linear { start, end, stops } => {
                let id = self.def_id("g");
                let _ = write!(
                    self.defs,
                    r#"<linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}">"#,
                    start.x, start.y, end.x, end.y
                );
                for stop in stops {
                    let _ = write!(
                        self.defs,
                        r#"<stop offset="{:.4}" stop-color="{}" stop-opacity="{:.3}"/>"#,
                        stop.offset,
                        svg_color(&stop.color),
                        stop.color.a
                    );
                }
                self.defs.push_str("</linearGradient>");
                format!("url(#{id})")
            }
        }
    }

    /// Common attributes: opacity, transform, shadow filter.
    fn common_attrs(&mut self, paint_alpha: f32) -> String {
        let mut attrs = String::new();
        let opacity = self.state.alpha * paint_alpha as f64;
        if opacity < 1.0 {
            let _ = write!(attrs, r#" opacity="{opacity:.3}""#);
        }
        if self.state.transform != Affine::IDENTITY {
            let [a, b, c, d, e, f] = self.state.transform.as_coeffs();
            let _ = write!(attrs, r#" transform="matrix({a} {b} {c} {d} {e} {f})""#);
        }
        if let Some(shadow) = self.state.shadow {
            let id = self.def_id("s");
            let _ = write!(
                self.defs,
                r#"<filter id="{id}"><feDropShadow dx="{:.2}" dy="{:.2}" stdDeviation="{:.2}" flood-color="{}" flood-opacity="{:.3}"/></filter>"#,
                shadow.offset.x,
                shadow.offset.y,
                shadow.blur / 2.0,
                svg_color(&shadow.color),
                shadow.color.a
            );
            let _ = write!(attrs, r#" filter="url(#{id})""#);
        }
        attrs
    }

    /// Finish the document. `background` fills the whole canvas first.
    pub fn finish(self, background: Option<Color>) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        if !self.defs.is_empty() {
            let _ = write!(out, "<defs>{}</defs>", self.defs);
        }
        if let Some(bg) = background {
            let _ = write!(
                out,
                r#"<rect width="100%" height="100%" fill="{}"/>"#,
                svg_color(&bg)
            );
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

impl Surface for SvgSurface {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.state.alpha *= alpha.clamp(0.0, 1.0);
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform *= affine;
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        let fill = self.paint_ref(paint);
        let attrs = self.common_attrs(solid_alpha(paint));
        let _ = write!(self.body, r#"<path d="{}" fill="{fill}"{attrs}/>"#, path.to_svg());
    }

    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, stroke: &Stroke) {
        let color = self.paint_ref(paint);
        let attrs = self.common_attrs(solid_alpha(paint));
        let _ = write!(
            self.body,
            r#"<path d="{}" fill="none" stroke="{color}" stroke-width="{:.2}" stroke-linecap="{}" stroke-linejoin="{}"{attrs}/>"#,
            path.to_svg(),
            stroke.width,
            cap_name(stroke.start_cap),
            join_name(stroke.join),
        );
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint) {
        let fill = self.paint_ref(paint);
        let attrs = self.common_attrs(solid_alpha(paint));
        let _ = write!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" font-size="{font_size:.1}" dominant-baseline="hanging" fill="{fill}"{attrs}>{}</text>"#,
            origin.x,
            origin.y,
            escape(text)
        );
    }
}

/// Alpha carried by a solid paint; gradient alpha lives in the stops.
fn solid_alpha(paint: &Paint) -> f32 {
    match paint {
        Paint::Solid(c) => c.a,
        Paint::Linear { .. } => 1.0,
    }
}
