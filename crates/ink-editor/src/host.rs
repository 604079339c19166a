//! Messages exchanged with the host shell (window, tray, settings store,
//! screenshot capture, notifications).
//!
//! Inbound [`HostCommand`]s are applied synchronously by the controller.
//! Outbound [`HostRequest`]s are queued in an outbox the host drains; the
//! engine never waits on a reply.

use ink_core::PersistedState;
use serde::{Deserialize, Serialize};

/// A toast the host asked the overlay to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Opaque follow-up handed back when the toast is clicked.
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostCommand {
    Reset,
    ToggleToolbar,
    ToggleWhiteboard,
    /// Display flags changed in the settings window.
    #[serde(rename_all = "camelCase")]
    RefreshSettings {
        show_border: bool,
        show_cursor: bool,
        show_swap_colors: bool,
    },
    ShowNotification(Notification),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostRequest {
    /// Store the current tool/colour/width/toolbar position.
    Persist(PersistedState),
    HideWindow,
    OpenSettings,
    Screenshot,
    /// The user clicked a notification carrying `action`.
    OpenNotificationFollowup { action: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commands_parse_from_tagged_json() {
        let cmd: HostCommand = serde_json::from_str(
            r#"{ "type": "refreshSettings", "showBorder": false, "showCursor": true, "showSwapColors": false }"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            HostCommand::RefreshSettings {
                show_border: false,
                show_cursor: true,
                show_swap_colors: false,
            }
        );

        let toast: HostCommand =
            serde_json::from_str(r#"{ "type": "showNotification", "title": "Saved", "body": "ok" }"#).unwrap();
        assert!(matches!(toast, HostCommand::ShowNotification(Notification { action: None, .. })));
    }
}
