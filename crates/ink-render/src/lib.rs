pub mod arrow;
pub mod freehand;
pub mod hit;
pub mod paint;
pub mod record;
pub mod surface;
pub mod svg;

pub use hit::{handle_at, is_on_figure, segment_hits_figure, topmost_figure_at};
pub use paint::{FrameStats, PaintOptions, measure_text, paint_figure, paint_scene};
pub use record::{DrawOp, Recorder};
pub use surface::{Shadow, Surface};
pub use svg::SvgSurface;
