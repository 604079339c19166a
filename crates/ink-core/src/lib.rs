pub mod geometry;
pub mod id;
pub mod model;
pub mod palette;
pub mod scene;
pub mod settings;

pub use id::FigureId;
pub use model::{Figure, FigureKind, Handle, Shape};
pub use palette::{Color, ColorIndex, GradientStop, Paint, WidthIndex};
pub use scene::{Layer, Ripple, Scene};
pub use settings::{PersistedState, ScreenArea, Settings, SettingsError};

// Re-export kurbo geometry so downstream crates share one point type.
pub use kurbo::{Point, Rect, Vec2};

/// Milliseconds since the session started. All timing is injected by the host.
pub type Millis = u64;
