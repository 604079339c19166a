pub mod script;

pub use script::{Replay, ReplayError, Script, Step, replay};
