//! Replay scripts: timed input events and host commands.
//!
//! ```json
//! {
//!   "settings": { "tool": "rectangle" },
//!   "steps": [
//!     { "at": 0,   "input": { "type": "pointerDown", "x": 10, "y": 10 } },
//!     { "at": 16,  "input": { "type": "pointerMove", "x": 80, "y": 60 } },
//!     { "at": 32,  "input": { "type": "pointerUp", "x": 80, "y": 60 } },
//!     { "at": 500, "command": { "type": "toggleWhiteboard" } }
//!   ],
//!   "end": 2000
//! }
//! ```
//!
//! Timers due before a step fire before it runs, so a script sees the same
//! laser decay and fade-out a live session would.

use ink_core::{Millis, Settings, SettingsError};
use ink_editor::{Controller, HostCommand, HostRequest, InputEvent};
use ink_render::SvgSurface;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed script: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("step {index} at {at} ms comes before the previous step at {previous} ms")]
    OutOfOrder { index: usize, at: Millis, previous: Millis },
    #[error("step {index} has neither `input` nor `command`")]
    EmptyStep { index: usize },
}

/// One timed entry of a script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub at: Millis,
    #[serde(default)]
    pub input: Option<InputEvent>,
    #[serde(default)]
    pub command: Option<HostCommand>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub settings: Settings,
    pub steps: Vec<Step>,
    /// Keep the clock running until this time after the last step.
    #[serde(default)]
    pub end: Option<Millis>,
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self, ReplayError> {
        let script: Script = serde_json::from_str(text)?;
        script.settings.validate()?;
        script.check()?;
        Ok(script)
    }

    fn check(&self) -> Result<(), ReplayError> {
        let mut previous = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at < previous {
                return Err(ReplayError::OutOfOrder {
                    index,
                    at: step.at,
                    previous,
                });
            }
            if step.input.is_none() && step.command.is_none() {
                return Err(ReplayError::EmptyStep { index });
            }
            previous = step.at;
        }
        Ok(())
    }

    /// Time the clock stops at.
    pub fn end_time(&self) -> Millis {
        let last = self.steps.last().map_or(0, |s| s.at);
        self.end.map_or(last, |end| end.max(last))
    }
}

/// What a replay left behind.
#[derive(Debug)]
pub struct Replay {
    pub svg: String,
    /// Every request the engine sent to the host, in order.
    pub requests: Vec<HostRequest>,
    pub figures: usize,
    pub undo_depth: usize,
}

/// Drive a fresh controller through `script` and render the final frame.
pub fn replay(script: &Script) -> Replay {
    let mut controller = Controller::new(script.settings.clone());
    let mut requests = Vec::new();

    for step in &script.steps {
        controller.tick(step.at);
        if let Some(command) = &step.command {
            controller.handle_command(command.clone(), step.at);
        }
        if let Some(input) = &step.input {
            log::trace!("{} ms: {input:?}", step.at);
            controller.handle_input(input, step.at);
        }
        requests.extend(drain(&mut controller));
    }
    controller.tick(script.end_time());
    controller.shutdown();
    requests.extend(drain(&mut controller));

    let screen = script.settings.screen;
    let mut surface = SvgSurface::new(screen.width, screen.height);
    let stats = controller.render(&mut surface);
    log::debug!("rendered {} figures", stats.figures_painted);

    Replay {
        svg: surface.finish(None),
        requests,
        figures: controller.scene().figures.len(),
        undo_depth: controller.commands().undo_len(),
    }
}

fn drain(controller: &mut Controller) -> Vec<HostRequest> {
    let requests = controller.take_requests();
    for request in &requests {
        log::info!("host request: {request:?}");
    }
    requests
}
