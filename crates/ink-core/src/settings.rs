//! Startup configuration handed to the engine by the host.
//!
//! The host keeps settings in a flat key-value store; here they arrive as a
//! JSON object with camelCase keys. Missing keys fall back to defaults.
//! Palette/width indices are range-checked during deserialization.

use crate::Millis;
use crate::model::FigureKind;
use crate::palette::{ColorIndex, WidthIndex};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from [`Settings::from_json`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("setting `{name}` must be greater than zero")]
    NotPositive { name: &'static str },
}

/// Usable screen area (work area minus taskbars/docks), surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenArea {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

impl Default for ScreenArea {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1920.0,
            height: 1080.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub tool: FigureKind,
    pub color: ColorIndex,
    pub width: WidthIndex,
    /// Quick-access colour swapped with `color` by the swap command.
    pub secondary_color: ColorIndex,
    pub toolbar_position: Point,
    pub show_toolbar: bool,
    pub show_whiteboard: bool,
    pub show_border: bool,
    pub show_cursor: bool,
    pub show_swap_colors: bool,
    /// Width restored when switching to a tool.
    pub tool_widths: HashMap<FigureKind, WidthIndex>,
    /// Delay before a laser trail's oldest point is removed.
    pub laser_time: Millis,
    /// Delay before an eraser trail's oldest point is removed.
    pub eraser_time: Millis,
    /// Idle time after the last fade-pen stroke before fading starts.
    pub fade_idle_delay: Millis,
    /// Length of the 1 → 0 opacity ramp.
    pub fade_duration: Millis,
    /// Pause after the ramp before the fade strokes are dropped.
    pub fade_extra_delay: Millis,
    /// Quiet period before UI state is persisted.
    pub persist_delay: Millis,
    /// Minimum interval between two pastes.
    pub paste_interval: Millis,
    /// Maximum number of undo entries kept.
    pub history_depth: usize,
    pub screen: ScreenArea,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool: FigureKind::Pen,
            color: ColorIndex::default(),
            width: WidthIndex::default(),
            secondary_color: ColorIndex::new(6),
            toolbar_position: Point::new(20.0, 20.0),
            show_toolbar: true,
            show_whiteboard: false,
            show_border: true,
            show_cursor: true,
            show_swap_colors: true,
            tool_widths: HashMap::new(),
            laser_time: 1500,
            eraser_time: 150,
            fade_idle_delay: 1500,
            fade_duration: 1000,
            fade_extra_delay: 200,
            persist_delay: 300,
            paste_interval: 300,
            history_depth: 200,
            screen: ScreenArea::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from the host's JSON key-value object.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject timings and sizes that would stall or divide by zero.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let checks: [(&'static str, bool); 6] = [
            ("laserTime", self.laser_time > 0),
            ("eraserTime", self.eraser_time > 0),
            ("fadeDuration", self.fade_duration > 0),
            ("historyDepth", self.history_depth > 0),
            ("screen.width", self.screen.width > 0.0),
            ("screen.height", self.screen.height > 0.0),
        ];
        for (name, ok) in checks {
            if !ok {
                log::warn!("rejecting settings: {name} must be positive");
                return Err(SettingsError::NotPositive { name });
            }
        }
        Ok(())
    }

    /// Default width for `tool`, falling back to the current width.
    pub fn width_for(&self, tool: FigureKind) -> WidthIndex {
        self.tool_widths.get(&tool).copied().unwrap_or(self.width)
    }
}

/// UI state the engine asks the host to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub tool: FigureKind,
    pub color: ColorIndex,
    pub width: WidthIndex,
    pub secondary_color: ColorIndex,
    pub toolbar_position: Point,
}

impl PersistedState {
    /// Flat key-value form for the host's settings store.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "tool": self.tool,
            "color": self.color,
            "width": self.width,
            "secondaryColor": self.secondary_color,
            "toolbarPosition": self.toolbar_position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        let s = Settings::from_json("{}").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn camel_case_keys() {
        let s = Settings::from_json(
            r#"{ "tool": "arrow", "color": 9, "laserTime": 2000, "toolWidths": { "highlighter": 4 } }"#,
        )
        .unwrap();
        assert_eq!(s.tool, FigureKind::Arrow);
        assert!(s.color.is_rainbow());
        assert_eq!(s.laser_time, 2000);
        assert_eq!(s.width_for(FigureKind::Highlighter), WidthIndex::new(4));
        assert_eq!(s.width_for(FigureKind::Pen), s.width);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = Settings::from_json(r#"{ "width": 12 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn zero_fade_duration_is_rejected() {
        let err = Settings::from_json(r#"{ "fadeDuration": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::NotPositive { name: "fadeDuration" }));
    }

    #[test]
    fn persisted_state_is_flat() {
        let state = PersistedState {
            tool: FigureKind::Oval,
            color: ColorIndex::new(2),
            width: WidthIndex::new(3),
            secondary_color: ColorIndex::new(6),
            toolbar_position: Point::new(5.0, 6.0),
        };
        let v = state.to_json();
        assert_eq!(v["tool"], "oval");
        assert_eq!(v["color"], 2);
        assert_eq!(v["toolbarPosition"]["x"], 5.0);
    }
}
