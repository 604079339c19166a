pub mod commands;
pub mod host;
pub mod input;
pub mod overlays;
pub mod ratelimit;
pub mod scheduler;
pub mod shortcuts;
pub mod tools;

pub use commands::{Command, CommandStack};
pub use host::{HostCommand, HostRequest, Notification};
pub use input::{InputEvent, Modifiers};
pub use overlays::{FadePhase, OverlayTimings, Overlays};
pub use scheduler::{Scheduler, Task};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::{Controller, Gesture, ToolKind, UiState};
