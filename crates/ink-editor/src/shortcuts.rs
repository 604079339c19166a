//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Single letters
//! pick tools, digits pick colours, brackets step the width. The command
//! modifier is ⌘ on macOS and Ctrl elsewhere.

use ink_core::{ColorIndex, FigureKind};

/// Actions that keyboard shortcuts (and toolbar buttons) can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool & style ──
    Tool(FigureKind),
    Color(ColorIndex),
    Thinner,
    Thicker,
    /// Swap the active colour with the quick-access colour.
    SwapColors,

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Copy,
    Paste,
    /// Abort the current gesture / close the editor / deselect.
    Cancel,
    /// Clear the whole scene (not undoable).
    Reset,

    // ── Fade pen ──
    /// Held: keep fade strokes from fading.
    PauseFade,

    // ── Host ──
    Screenshot,
    OpenSettings,
    ToggleWhiteboard,
    ToggleToolbar,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key press to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, ctrl: bool, shift: bool, _alt: bool, meta: bool) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "s" | "S" => Some(ShortcutAction::Screenshot),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "c" | "C" => Some(ShortcutAction::Copy),
                "v" | "V" => Some(ShortcutAction::Paste),
                "t" | "T" => Some(ShortcutAction::ToggleToolbar),
                "," => Some(ShortcutAction::OpenSettings),
                "Delete" | "Backspace" => Some(ShortcutAction::Reset),
                _ => None,
            };
        }

        // ── Plain keys (Shift only changes the letter case) ──
        match key {
            "p" | "P" => Some(ShortcutAction::Tool(FigureKind::Pen)),
            "h" | "H" => Some(ShortcutAction::Tool(FigureKind::Highlighter)),
            "f" | "F" => Some(ShortcutAction::Tool(FigureKind::FadePen)),
            "l" | "L" => Some(ShortcutAction::Tool(FigureKind::Line)),
            "a" | "A" => Some(ShortcutAction::Tool(FigureKind::Arrow)),
            "r" | "R" => Some(ShortcutAction::Tool(FigureKind::Rectangle)),
            "o" | "O" => Some(ShortcutAction::Tool(FigureKind::Oval)),
            "t" | "T" => Some(ShortcutAction::Tool(FigureKind::Text)),
            "s" | "S" => Some(ShortcutAction::Tool(FigureKind::Laser)),
            "e" | "E" => Some(ShortcutAction::Tool(FigureKind::Eraser)),
            "x" | "X" => Some(ShortcutAction::SwapColors),
            "w" | "W" => Some(ShortcutAction::ToggleWhiteboard),
            "[" => Some(ShortcutAction::Thinner),
            "]" => Some(ShortcutAction::Thicker),
            "0" => Some(ShortcutAction::Color(ColorIndex::RAINBOW)),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            " " => Some(ShortcutAction::PauseFade),
            _ => digit_color(key),
        }
    }

    /// Resolve a key release. Only held actions react to it.
    pub fn resolve_release(key: &str) -> Option<ShortcutAction> {
        match key {
            " " => Some(ShortcutAction::PauseFade),
            _ => None,
        }
    }
}

/// `1`..`9` → palette slots 0..8.
fn digit_color(key: &str) -> Option<ShortcutAction> {
    let mut chars = key.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let digit = c.to_digit(10)?;
    (1..=9)
        .contains(&digit)
        .then(|| ShortcutAction::Color(ColorIndex::new(digit as u8 - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_tool_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("p", false, false, false, false),
            Some(ShortcutAction::Tool(FigureKind::Pen))
        );
        assert_eq!(
            ShortcutMap::resolve("R", false, true, false, false),
            Some(ShortcutAction::Tool(FigureKind::Rectangle))
        );
        assert_eq!(
            ShortcutMap::resolve("e", false, false, false, false),
            Some(ShortcutAction::Tool(FigureKind::Eraser))
        );
        assert_eq!(
            ShortcutMap::resolve("s", false, false, false, false),
            Some(ShortcutAction::Tool(FigureKind::Laser))
        );
    }

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(ShortcutAction::Undo)
        );
        // Ctrl+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        // Ctrl+Shift+Z → Redo
        assert_eq!(
            ShortcutMap::resolve("Z", true, true, false, false),
            Some(ShortcutAction::Redo)
        );
        // Ctrl+Y → Redo
        assert_eq!(
            ShortcutMap::resolve("y", true, false, false, false),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn resolve_digits_to_colors() {
        assert_eq!(
            ShortcutMap::resolve("1", false, false, false, false),
            Some(ShortcutAction::Color(ColorIndex::new(0)))
        );
        assert_eq!(
            ShortcutMap::resolve("9", false, false, false, false),
            Some(ShortcutAction::Color(ColorIndex::new(8)))
        );
        assert_eq!(
            ShortcutMap::resolve("0", false, false, false, false),
            Some(ShortcutAction::Color(ColorIndex::RAINBOW))
        );
        assert_eq!(ShortcutMap::resolve("F1", false, false, false, false), None);
    }

    #[test]
    fn resolve_delete_and_reset() {
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Delete", true, false, false, false),
            Some(ShortcutAction::Reset)
        );
    }

    #[test]
    fn resolve_host_actions() {
        assert_eq!(
            ShortcutMap::resolve("S", true, true, false, false),
            Some(ShortcutAction::Screenshot)
        );
        assert_eq!(
            ShortcutMap::resolve(",", false, false, false, true),
            Some(ShortcutAction::OpenSettings)
        );
        assert_eq!(
            ShortcutMap::resolve("t", true, false, false, false),
            Some(ShortcutAction::ToggleToolbar)
        );
        assert_eq!(
            ShortcutMap::resolve("w", false, false, false, false),
            Some(ShortcutAction::ToggleWhiteboard)
        );
    }

    #[test]
    fn resolve_space_hold() {
        assert_eq!(
            ShortcutMap::resolve(" ", false, false, false, false),
            Some(ShortcutAction::PauseFade)
        );
        assert_eq!(ShortcutMap::resolve_release(" "), Some(ShortcutAction::PauseFade));
        assert_eq!(ShortcutMap::resolve_release("p"), None);
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("q", true, false, false, false), None);
    }
}
