//! Colours, paints, and the fixed palette / size tables.
//!
//! Figures never store colours or pixel widths directly — they store an
//! index into the tables below. The palette has one reserved slot,
//! [`ColorIndex::RAINBOW`], which renders as a hue sweep that advances with
//! path length.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Same colour with alpha multiplied by `alpha`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: self.a * alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// HSL → RGB. `hue` in degrees (any range), `saturation`/`lightness` in [0, 1].
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        if s == 0.0 {
            let v = l as f32;
            return Self::rgba(v, v, v, 1.0);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f64| -> f32 {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            v as f32
        };
        Self::rgba(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0), 1.0)
    }

    /// The rainbow hue at `phase` degrees.
    pub fn rainbow(phase: f64) -> Self {
        Self::from_hsl(phase, RAINBOW_SATURATION, RAINBOW_LIGHTNESS)
    }
}

/// Saturation of every rainbow stop.
pub const RAINBOW_SATURATION: f64 = 1.0;
/// Lightness of every rainbow stop.
pub const RAINBOW_LIGHTNESS: f64 = 0.5;

// ─── Paint ───────────────────────────────────────────────────────────────

/// A gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32, // 0.0 .. 1.0
    pub color: Color,
}

/// Fill or stroke paint.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient along the `start → end` axis.
    Linear {
        start: Point,
        end: Point,
        stops: SmallVec<[GradientStop; 4]>,
    },
}

impl Paint {
    /// A flat colour for backends that cannot express gradients: the first stop.
    pub fn representative(&self) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::Linear { stops, .. } => stops.first().map(|s| s.color).unwrap_or(Color::BLACK),
        }
    }

    pub fn with_alpha(&self, alpha: f32) -> Paint {
        match self {
            Paint::Solid(c) => Paint::Solid(c.with_alpha(alpha)),
            Paint::Linear { start, end, stops } => Paint::Linear {
                start: *start,
                end: *end,
                stops: stops
                    .iter()
                    .map(|s| GradientStop {
                        offset: s.offset,
                        color: s.color.with_alpha(alpha),
                    })
                    .collect(),
            },
        }
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────

/// The fixed drawing palette, in toolbar order.
pub const PALETTE: [Color; 9] = [
    Color::rgb8(0xFF, 0x3B, 0x30), // red
    Color::rgb8(0xFF, 0x95, 0x00), // orange
    Color::rgb8(0xFF, 0xCC, 0x00), // yellow
    Color::rgb8(0x34, 0xC7, 0x59), // green
    Color::rgb8(0x00, 0x7A, 0xFF), // blue
    Color::rgb8(0xAF, 0x52, 0xDE), // purple
    Color::rgb8(0xFF, 0xFF, 0xFF), // white
    Color::rgb8(0x1C, 0x1C, 0x1E), // black
    Color::rgb8(0xFF, 0x2D, 0x55), // pink
];

/// Index into [`PALETTE`], or the reserved rainbow slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ColorIndex(u8);

impl ColorIndex {
    /// Reserved index: procedurally animated rainbow.
    pub const RAINBOW: ColorIndex = ColorIndex(PALETTE.len() as u8);

    /// Panics when `index` is neither a palette slot nor the rainbow slot.
    pub fn new(index: u8) -> Self {
        assert!(
            index as usize <= PALETTE.len(),
            "colour index {index} out of range"
        );
        ColorIndex(index)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_rainbow(self) -> bool {
        self == Self::RAINBOW
    }

    /// Solid colour of this slot, `None` for rainbow.
    pub fn solid(self) -> Option<Color> {
        PALETTE.get(self.0 as usize).copied()
    }
}

impl Default for ColorIndex {
    fn default() -> Self {
        ColorIndex(0)
    }
}

impl fmt::Debug for ColorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rainbow() {
            write!(f, "ColorIndex(rainbow)")
        } else {
            write!(f, "ColorIndex({})", self.0)
        }
    }
}

impl TryFrom<u8> for ColorIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value as usize <= PALETTE.len() {
            Ok(ColorIndex(value))
        } else {
            Err(format!("colour index {value} out of range 0..={}", PALETTE.len()))
        }
    }
}

impl From<ColorIndex> for u8 {
    fn from(value: ColorIndex) -> Self {
        value.0
    }
}

// ─── Sizes ───────────────────────────────────────────────────────────────

/// Stroke widths in pixels, smallest first.
pub const WIDTHS: [f64; 5] = [2.0, 4.0, 6.0, 10.0, 16.0];

/// Text font size per width index.
pub const FONT_SIZES: [f64; 5] = [16.0, 22.0, 30.0, 42.0, 60.0];

/// Maximum arrow-head length per width index.
pub const ARROW_HEAD_CAPS: [f64; 5] = [18.0, 26.0, 34.0, 46.0, 62.0];

/// Highlighter strokes are this many times wider than the pen.
pub const HIGHLIGHTER_WIDTH_FACTOR: f64 = 4.0;

/// Highlighter alpha.
pub const HIGHLIGHTER_ALPHA: f32 = 0.4;

/// Index into [`WIDTHS`] (and the per-index tables that follow it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WidthIndex(u8);

impl WidthIndex {
    pub const MAX: WidthIndex = WidthIndex(WIDTHS.len() as u8 - 1);

    /// Panics when `index` is not a valid slot.
    pub fn new(index: u8) -> Self {
        assert!((index as usize) < WIDTHS.len(), "width index {index} out of range");
        WidthIndex(index)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn pixels(self) -> f64 {
        WIDTHS[self.0 as usize]
    }

    pub fn font_size(self) -> f64 {
        FONT_SIZES[self.0 as usize]
    }

    pub fn arrow_head_cap(self) -> f64 {
        ARROW_HEAD_CAPS[self.0 as usize]
    }

    /// One step thinner, saturating.
    pub fn thinner(self) -> Self {
        WidthIndex(self.0.saturating_sub(1))
    }

    /// One step thicker, saturating.
    pub fn thicker(self) -> Self {
        WidthIndex((self.0 + 1).min(Self::MAX.0))
    }
}

impl Default for WidthIndex {
    fn default() -> Self {
        WidthIndex(1)
    }
}

impl TryFrom<u8> for WidthIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (value as usize) < WIDTHS.len() {
            Ok(WidthIndex(value))
        } else {
            Err(format!("width index {value} out of range 0..{}", WIDTHS.len()))
        }
    }
}

impl From<WidthIndex> for u8 {
    fn from(value: WidthIndex) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_output() {
        assert_eq!(Color::rgb8(0xFF, 0x3B, 0x30).to_hex(), "#FF3B30");
        assert_eq!(Color::BLACK.with_alpha(0.5).to_hex(), "#00000080");
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(Color::rainbow(0.0).to_rgba8(), [255, 0, 0, 255]);
        assert_eq!(Color::rainbow(120.0).to_rgba8(), [0, 255, 0, 255]);
        assert_eq!(Color::rainbow(240.0).to_rgba8(), [0, 0, 255, 255]);
        assert_eq!(Color::rainbow(360.0).to_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn rainbow_slot_has_no_solid_colour() {
        assert!(ColorIndex::RAINBOW.is_rainbow());
        assert!(ColorIndex::RAINBOW.solid().is_none());
        assert_eq!(ColorIndex::new(0).solid(), Some(PALETTE[0]));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn colour_index_out_of_range_panics() {
        let _ = ColorIndex::new(200);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn width_index_out_of_range_panics() {
        let _ = WidthIndex::new(WIDTHS.len() as u8);
    }

    #[test]
    fn width_steps_saturate() {
        assert_eq!(WidthIndex::new(0).thinner(), WidthIndex::new(0));
        assert_eq!(WidthIndex::MAX.thicker(), WidthIndex::MAX);
        assert_eq!(WidthIndex::new(1).thicker(), WidthIndex::new(2));
    }

    #[test]
    fn indices_deserialize_with_range_check() {
        let ok: ColorIndex = serde_json::from_str("3").unwrap();
        assert_eq!(ok.get(), 3);
        assert!(serde_json::from_str::<ColorIndex>("42").is_err());
        assert!(serde_json::from_str::<WidthIndex>("9").is_err());
    }
}
