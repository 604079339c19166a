//! Interaction controller: the tool state machine.
//!
//! Translates pointer, keyboard, timer, and host events into scene
//! mutations and history entries. The scene owns every figure; the
//! controller only holds ids (the active figure, the figure under the
//! current gesture).
//!
//! ## Pointer rules (persisted-figure tools)
//!
//! | Pointer-down lands on          | Result                          |
//! |--------------------------------|---------------------------------|
//! | a handle of the active figure  | resize with that handle         |
//! | the active figure's body       | drag it                         |
//! | any other figure               | select it, bring to front, drag |
//! | empty space                    | deselect, start drawing         |
//!
//! Laser, eraser, and fade pen always draw.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Line / Arrow | Rectangle / Oval |
//! |----------|--------------|------------------|
//! | **Shift** | Snap angle to 15° | Square while drawing, keep aspect ratio while resizing |

use crate::commands::{Command, CommandStack, same_content};
use crate::host::{HostCommand, HostRequest, Notification};
use crate::input::{InputEvent, Modifiers};
use crate::overlays::{OverlayTimings, Overlays};
use crate::ratelimit::{Debounce, Throttle};
use crate::scheduler::Scheduler;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use ink_core::geometry::{apply_aspect_ratio_lock, apply_soft_snap, filter_close_points};
use ink_core::model::MIN_TEXT_SCALE;
use ink_core::{
    ColorIndex, Figure, FigureId, FigureKind, Handle, Layer, Millis, PersistedState, Point, Rect, Scene, Settings,
    Shape, WidthIndex,
};
use ink_render::hit::{TEXT_MARGIN, handle_at, is_on_figure, topmost_figure_at};
use ink_render::paint::{PaintOptions, measure_text, paint_figure, paint_scene};
use ink_render::{FrameStats, Surface};
use std::collections::HashMap;

/// The active tool determines how pointer input is interpreted.
pub type ToolKind = FigureKind;

/// Freeform points closer than this to the previous kept point are dropped
/// when a stroke is committed.
pub const MIN_POINT_DISTANCE: f64 = 2.0;

/// What the pointer is doing right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    None,
    /// Growing a new figure in `layer`. `start` is the pointer-down position.
    Drawing { id: FigureId, layer: Layer, start: Point },
    Dragging { id: FigureId, last: Point },
    Resizing { id: FigureId, handle: Handle },
}

/// Overlay chrome state, owned here and mirrored by the host UI.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub show_toolbar: bool,
    pub show_whiteboard: bool,
    pub show_border: bool,
    pub show_cursor: bool,
    pub show_swap_colors: bool,
    pub toolbar_position: Point,
    pub notification: Option<Notification>,
}

impl From<&Settings> for UiState {
    fn from(s: &Settings) -> Self {
        Self {
            show_toolbar: s.show_toolbar,
            show_whiteboard: s.show_whiteboard,
            show_border: s.show_border,
            show_cursor: s.show_cursor,
            show_swap_colors: s.show_swap_colors,
            toolbar_position: s.toolbar_position,
            notification: None,
        }
    }
}

pub struct Controller {
    scene: Scene,
    commands: CommandStack,
    scheduler: Scheduler,
    overlays: Overlays,
    settings: Settings,

    tool: ToolKind,
    color: ColorIndex,
    secondary_color: ColorIndex,
    width: WidthIndex,
    /// Last width used with each tool.
    tool_widths: HashMap<ToolKind, WidthIndex>,

    active: Option<FigureId>,
    gesture: Gesture,
    /// Text block being typed; not in the scene until committed.
    text_editor: Option<Figure>,
    clipboard: Option<Figure>,
    pointer: Point,
    now: Millis,

    ui: UiState,
    persist: Debounce<PersistedState>,
    paste_throttle: Throttle,
    outbox: Vec<HostRequest>,
}

impl Controller {
    pub fn new(settings: Settings) -> Self {
        let tool = settings.tool;
        Self {
            scene: Scene::new(),
            commands: CommandStack::new(settings.history_depth),
            scheduler: Scheduler::new(),
            overlays: Overlays::new(OverlayTimings::from(&settings)),
            tool,
            color: settings.color,
            secondary_color: settings.secondary_color,
            width: settings.width_for(tool),
            tool_widths: settings.tool_widths.clone(),
            active: None,
            gesture: Gesture::None,
            text_editor: None,
            clipboard: None,
            pointer: Point::ZERO,
            now: 0,
            ui: UiState::from(&settings),
            persist: Debounce::new(settings.persist_delay),
            paste_throttle: Throttle::new(settings.paste_interval),
            outbox: Vec::new(),
            settings,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn commands(&self) -> &CommandStack {
        &self.commands
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn color(&self) -> ColorIndex {
        self.color
    }

    pub fn secondary_color(&self) -> ColorIndex {
        self.secondary_color
    }

    pub fn width(&self) -> WidthIndex {
        self.width
    }

    pub fn active(&self) -> Option<FigureId> {
        self.active
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn text_editor(&self) -> Option<&Figure> {
        self.text_editor.as_ref()
    }

    pub fn clipboard(&self) -> Option<&Figure> {
        self.clipboard.as_ref()
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// When the host should call [`Controller::tick`] next.
    pub fn next_wakeup(&self) -> Option<Millis> {
        match (self.scheduler.next_due(), self.persist.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn advance(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    // ─── Event entry points ──────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &InputEvent, now: Millis) {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => self.pointer_down(Point::new(*x, *y), *modifiers, now),
            InputEvent::PointerMove { x, y, modifiers } => self.pointer_move(Point::new(*x, *y), *modifiers, now),
            InputEvent::PointerUp { x, y, modifiers } => self.pointer_up(Point::new(*x, *y), *modifiers, now),
            InputEvent::KeyDown { key, modifiers } => {
                self.key_down(key, *modifiers, now);
            }
            InputEvent::KeyUp { key, .. } => self.key_up(key, now),
            InputEvent::TextInput { text } => self.update_text(text),
        }
    }

    pub fn pointer_down(&mut self, p: Point, _mods: Modifiers, now: Millis) {
        self.advance(now);
        self.pointer = p;

        // Clicking away from an open editor commits it.
        if self.text_editor.is_some() {
            self.commit_text();
            return;
        }
        if self.gesture != Gesture::None {
            log::debug!("pointer-down during {:?}, canceling it", self.gesture);
            self.cancel_gesture();
        }

        if self.tool.is_transient() {
            self.start_drawing(p, now);
            return;
        }

        let on_active = self
            .active
            .and_then(|id| self.scene.get(id))
            .map(|f| (f.id, handle_at(p, f), is_on_figure(p, f)));
        match on_active {
            Some((id, Some(handle), _)) => {
                self.commands.begin_gesture(&self.scene, id);
                self.gesture = Gesture::Resizing { id, handle };
                log::debug!("resize {id} via {handle:?}");
                return;
            }
            Some((id, None, true)) => {
                self.begin_drag(id, p);
                return;
            }
            _ => {}
        }

        if let Some(id) = topmost_figure_at(p, &self.scene.figures) {
            self.select(id);
            self.begin_drag(id, p);
            return;
        }

        self.active = None;
        if self.tool == FigureKind::Text {
            self.begin_text(p);
        } else {
            self.start_drawing(p, now);
        }
    }

    pub fn pointer_move(&mut self, p: Point, mods: Modifiers, now: Millis) {
        self.advance(now);
        self.pointer = p;
        match self.gesture {
            Gesture::None => {}
            Gesture::Drawing { id, layer, start } => self.extend_drawing(id, layer, start, p, mods, now),
            Gesture::Dragging { id, last } => {
                if let Some(figure) = self.scene.get_mut(id) {
                    figure.translate(p - last);
                }
                self.gesture = Gesture::Dragging { id, last: p };
            }
            Gesture::Resizing { id, handle } => {
                if let Some(figure) = self.scene.get_mut(id) {
                    resize(figure, handle, p, mods.shift);
                }
            }
        }
    }

    pub fn pointer_up(&mut self, p: Point, mods: Modifiers, now: Millis) {
        if p != self.pointer {
            self.pointer_move(p, mods, now);
        }
        self.advance(now);
        match std::mem::replace(&mut self.gesture, Gesture::None) {
            Gesture::None => {}
            Gesture::Drawing { id, layer, .. } => self.finish_drawing(id, layer, now),
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => {
                if let Some(figure) = self.scene.get_mut(id) {
                    figure.refresh_aspect();
                }
                self.commands.end_gesture(&self.scene);
            }
        }
    }

    /// Returns whether the key was consumed.
    pub fn key_down(&mut self, key: &str, mods: Modifiers, now: Millis) -> bool {
        self.advance(now);
        // The open editor receives typing; only commit/cancel keys reach us.
        if self.text_editor.is_some() {
            return match key {
                "Escape" => self.cancel_text(),
                "Enter" if !mods.shift => self.commit_text().is_some(),
                _ => false,
            };
        }
        let Some(action) = ShortcutMap::resolve(key, mods.ctrl, mods.shift, mods.alt, mods.meta) else {
            return false;
        };
        self.apply_action(action, now);
        true
    }

    pub fn key_up(&mut self, key: &str, now: Millis) {
        self.advance(now);
        if ShortcutMap::resolve_release(key) == Some(ShortcutAction::PauseFade) {
            self.overlays
                .set_paused(false, &mut self.scene, &mut self.scheduler, self.now);
        }
    }

    /// Run a shortcut or toolbar action.
    pub fn apply_action(&mut self, action: ShortcutAction, now: Millis) {
        self.advance(now);
        log::trace!("action {action:?}");
        match action {
            ShortcutAction::Tool(tool) => self.set_tool(tool, now),
            ShortcutAction::Color(color) => self.set_color(color, now),
            ShortcutAction::Thinner => self.set_width(self.width.thinner(), now),
            ShortcutAction::Thicker => self.set_width(self.width.thicker(), now),
            ShortcutAction::SwapColors => self.swap_colors(now),
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => {
                self.delete_active();
            }
            ShortcutAction::Copy => self.copy(),
            ShortcutAction::Paste => {
                self.paste(now);
            }
            ShortcutAction::Cancel => {
                if !self.cancel() {
                    self.outbox.push(HostRequest::HideWindow);
                }
            }
            ShortcutAction::Reset => self.reset(),
            ShortcutAction::PauseFade => {
                self.overlays
                    .set_paused(true, &mut self.scene, &mut self.scheduler, self.now);
            }
            ShortcutAction::Screenshot => {
                self.cancel_gesture();
                self.outbox.push(HostRequest::Screenshot);
            }
            ShortcutAction::OpenSettings => self.outbox.push(HostRequest::OpenSettings),
            ShortcutAction::ToggleWhiteboard => self.ui.show_whiteboard = !self.ui.show_whiteboard,
            ShortcutAction::ToggleToolbar => self.ui.show_toolbar = !self.ui.show_toolbar,
        }
    }

    /// Fire every task due at or before `now`, then release a pending
    /// persist request. Returns whether the scene changed.
    pub fn tick(&mut self, now: Millis) -> bool {
        self.advance(now);
        let mut changed = false;
        while let Some((due, task)) = self.scheduler.pop_due(now) {
            changed |= self
                .overlays
                .run(task, &mut self.scene, &mut self.scheduler, due);
        }
        if let Some(state) = self.persist.poll(now) {
            self.outbox.push(HostRequest::Persist(state));
        }
        changed
    }

    pub fn handle_command(&mut self, command: HostCommand, now: Millis) {
        self.advance(now);
        log::info!("host command {command:?}");
        match command {
            HostCommand::Reset => self.reset(),
            HostCommand::ToggleToolbar => self.ui.show_toolbar = !self.ui.show_toolbar,
            HostCommand::ToggleWhiteboard => self.ui.show_whiteboard = !self.ui.show_whiteboard,
            HostCommand::RefreshSettings {
                show_border,
                show_cursor,
                show_swap_colors,
            } => {
                self.ui.show_border = show_border;
                self.ui.show_cursor = show_cursor;
                self.ui.show_swap_colors = show_swap_colors;
            }
            HostCommand::ShowNotification(notification) => self.ui.notification = Some(notification),
        }
    }

    /// Drain queued host requests.
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Teardown: abandon gestures and flush a pending persist request.
    pub fn shutdown(&mut self) {
        self.cancel_gesture();
        if let Some(state) = self.persist.flush() {
            self.outbox.push(HostRequest::Persist(state));
        }
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    fn start_drawing(&mut self, p: Point, now: Millis) {
        let kind = self.tool;
        let figure = Figure::start(kind, p, self.color, self.width);
        let id = figure.id;
        let layer = match kind {
            FigureKind::Laser => Layer::Lasers,
            FigureKind::Eraser => Layer::Erasers,
            FigureKind::FadePen => Layer::Fade,
            _ => Layer::Figures,
        };
        if layer == Layer::Fade {
            self.overlays
                .fade_stroke_started(&mut self.scene, &mut self.scheduler);
        }
        self.scene.layer_mut(layer).push(figure);
        self.after_point_added(id, layer, now);
        self.gesture = Gesture::Drawing { id, layer, start: p };
        log::trace!("start {kind:?} {id}");
    }

    fn extend_drawing(&mut self, id: FigureId, layer: Layer, start: Point, p: Point, mods: Modifiers, now: Millis) {
        if self.scene.find_in(layer, id).is_none() {
            if matches!(layer, Layer::Lasers | Layer::Erasers) {
                // The trail decayed while the pointer held still.
                self.restart_trail(layer, start, p, now);
            } else {
                // Cleared underneath us.
                self.gesture = Gesture::None;
            }
            return;
        }
        let Some(figure) = self.scene.find_in_mut(layer, id) else {
            return;
        };
        match figure.kind() {
            FigureKind::Line | FigureKind::Arrow => {
                figure.extend_to(if mods.shift { apply_soft_snap(start, p) } else { p });
            }
            FigureKind::Rectangle | FigureKind::Oval => {
                figure.extend_to(if mods.shift {
                    apply_aspect_ratio_lock(start, p, 1.0)
                } else {
                    p
                });
            }
            FigureKind::Text => {}
            _ => {
                if figure.polyline().and_then(|pts| pts.last()) == Some(&p) {
                    return;
                }
                figure.extend_to(p);
                self.after_point_added(id, layer, now);
            }
        }
    }

    /// Continue a laser or eraser gesture on a fresh trail figure.
    fn restart_trail(&mut self, layer: Layer, start: Point, p: Point, now: Millis) {
        let kind = match layer {
            Layer::Lasers => FigureKind::Laser,
            _ => FigureKind::Eraser,
        };
        let figure = Figure::start(kind, p, self.color, self.width);
        let id = figure.id;
        self.scene.layer_mut(layer).push(figure);
        self.after_point_added(id, layer, now);
        self.gesture = Gesture::Drawing { id, layer, start };
        log::trace!("restart {kind:?} trail as {id}");
    }

    fn after_point_added(&mut self, id: FigureId, layer: Layer, now: Millis) {
        match layer {
            Layer::Lasers => self.overlays.laser_point_added(&mut self.scheduler, id, now),
            Layer::Erasers => {
                self.overlays
                    .eraser_point_added(&mut self.scene, &mut self.scheduler, id, now);
            }
            Layer::Figures | Layer::Fade => {}
        }
    }

    fn finish_drawing(&mut self, id: FigureId, layer: Layer, now: Millis) {
        match layer {
            Layer::Figures => self.commit_figure(id),
            Layer::Fade => {
                if let Some(figure) = self.scene.find_in_mut(Layer::Fade, id) {
                    if figure.is_degenerate() {
                        self.scene.remove_from(Layer::Fade, id);
                    } else if let Some(points) = figure.polyline_mut() {
                        *points = filter_close_points(points, MIN_POINT_DISTANCE);
                    }
                }
                self.overlays
                    .fade_stroke_ended(&self.scene, &mut self.scheduler, now);
            }
            Layer::Lasers => {
                self.overlays
                    .laser_finished(&mut self.scene, &mut self.scheduler, id, now);
            }
            Layer::Erasers => {
                let removed = self.overlays.eraser_finished(&mut self.scene);
                if removed.is_empty() {
                    return;
                }
                if let Some(active) = self.active
                    && removed.iter().any(|(_, f)| f.id == active)
                {
                    self.active = None;
                }
                self.commands.record(Command::Remove { entries: removed });
            }
        }
    }

    /// Keep or discard a finished persisted figure.
    fn commit_figure(&mut self, id: FigureId) {
        let Some(index) = self.scene.index_of(id) else {
            return;
        };
        let figure = &mut self.scene.figures[index];
        if figure.is_degenerate() {
            log::debug!("discarding degenerate {:?} {id}", figure.kind());
            self.scene.figures.remove(index);
            return;
        }
        if let Some(points) = figure.polyline_mut() {
            *points = filter_close_points(points, MIN_POINT_DISTANCE);
        }
        figure.refresh_aspect();
        let kind = figure.kind();
        let snapshot = figure.clone();
        self.commands.record(Command::add(index, snapshot));
        if matches!(
            kind,
            FigureKind::Line | FigureKind::Arrow | FigureKind::Rectangle | FigureKind::Oval
        ) {
            self.active = Some(id);
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    fn select(&mut self, id: FigureId) {
        if self.scene.bring_to_front(id) {
            self.active = Some(id);
            log::debug!("selected {id}");
        }
    }

    /// Move a figure to the top of the z-order without selecting it.
    pub fn bring_to_front(&mut self, id: FigureId) -> bool {
        self.scene.bring_to_front(id)
    }

    fn begin_drag(&mut self, id: FigureId, p: Point) {
        self.commands.begin_gesture(&self.scene, id);
        self.gesture = Gesture::Dragging { id, last: p };
    }

    fn drop_stale_active(&mut self) {
        if let Some(id) = self.active
            && !self.scene.contains(id)
        {
            self.active = None;
        }
    }

    /// Abort whatever the pointer is doing. New figures are discarded,
    /// drags and resizes snap back.
    fn cancel_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::None) {
            Gesture::None => {}
            Gesture::Drawing { id, layer, .. } => match layer {
                Layer::Figures => {
                    self.scene.remove_from(layer, id);
                }
                Layer::Fade => {
                    self.scene.remove_from(layer, id);
                    self.overlays
                        .fade_stroke_ended(&self.scene, &mut self.scheduler, self.now);
                }
                // The trail keeps decaying on its own.
                Layer::Lasers => {}
                Layer::Erasers => self.scene.clear_erased_marks(),
            },
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => self.commands.cancel_gesture(&mut self.scene),
        }
    }

    /// Escape: close the editor, else abort the gesture, else deselect.
    /// Returns false when there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if self.cancel_text() {
            return true;
        }
        if self.gesture != Gesture::None {
            self.cancel_gesture();
            return true;
        }
        self.active.take().is_some()
    }

    // ─── Tool & style ────────────────────────────────────────────────────

    pub fn set_tool(&mut self, tool: ToolKind, now: Millis) {
        if self.text_editor.is_some() {
            self.commit_text();
        }
        self.cancel_gesture();
        if tool == self.tool {
            return;
        }
        self.tool_widths.insert(self.tool, self.width);
        self.tool = tool;
        if let Some(&width) = self.tool_widths.get(&tool) {
            self.width = width;
        }
        if tool.is_transient() {
            self.active = None;
        }
        log::debug!("tool {tool:?}");
        self.schedule_persist(now);
    }

    pub fn set_color(&mut self, color: ColorIndex, now: Millis) {
        self.color = color;
        if let Some(editor) = &mut self.text_editor {
            editor.color = color;
        }
        self.restyle_active(|f| f.color = color);
        self.schedule_persist(now);
    }

    pub fn set_width(&mut self, width: WidthIndex, now: Millis) {
        self.width = width;
        self.tool_widths.insert(self.tool, width);
        if let Some(editor) = &mut self.text_editor {
            editor.width = width;
            remeasure(editor);
        }
        self.restyle_active(|f| f.width = width);
        self.schedule_persist(now);
    }

    /// Swap the active colour with the quick-access colour.
    pub fn swap_colors(&mut self, now: Millis) {
        let next = self.secondary_color;
        self.secondary_color = self.color;
        self.set_color(next, now);
    }

    /// Apply a style change to the active figure as one undo entry.
    fn restyle_active(&mut self, change: impl FnOnce(&mut Figure)) {
        if self.gesture != Gesture::None {
            return;
        }
        let Some(figure) = self.active.and_then(|id| self.scene.get_mut(id)) else {
            return;
        };
        let before = figure.clone();
        change(figure);
        if let Shape::Text { .. } = figure.shape {
            remeasure(figure);
        }
        if !same_content(&before, figure) {
            let after = figure.clone();
            self.commands.record(Command::modify(before, after));
        }
    }

    pub fn move_toolbar(&mut self, p: Point, now: Millis) {
        let area = self.settings.screen.rect();
        self.ui.toolbar_position = Point::new(p.x.clamp(area.x0, area.x1), p.y.clamp(area.y0, area.y1));
        self.schedule_persist(now);
    }

    fn persisted_state(&self) -> PersistedState {
        PersistedState {
            tool: self.tool,
            color: self.color,
            width: self.width,
            secondary_color: self.secondary_color,
            toolbar_position: self.ui.toolbar_position,
        }
    }

    fn schedule_persist(&mut self, now: Millis) {
        let state = self.persisted_state();
        self.persist.call(now, state);
    }

    // ─── History & clipboard ─────────────────────────────────────────────

    fn history_locked(&self) -> bool {
        self.gesture != Gesture::None || self.text_editor.is_some()
    }

    pub fn undo(&mut self) -> Option<String> {
        if self.history_locked() {
            log::debug!("undo ignored while editing");
            return None;
        }
        let desc = self.commands.undo(&mut self.scene)?;
        self.drop_stale_active();
        log::debug!("undo {desc}");
        Some(desc)
    }

    pub fn redo(&mut self) -> Option<String> {
        if self.history_locked() {
            log::debug!("redo ignored while editing");
            return None;
        }
        let desc = self.commands.redo(&mut self.scene)?;
        self.drop_stale_active();
        log::debug!("redo {desc}");
        Some(desc)
    }

    /// Delete the active figure. Returns whether anything was removed.
    pub fn delete_active(&mut self) -> bool {
        if self.history_locked() {
            return false;
        }
        let Some(id) = self.active.take() else {
            return false;
        };
        let Some((index, figure)) = self.scene.remove(id) else {
            return false;
        };
        self.commands.record(Command::Remove {
            entries: vec![(index, figure)],
        });
        true
    }

    pub fn copy(&mut self) {
        if let Some(figure) = self.active.and_then(|id| self.scene.get(id)) {
            self.clipboard = Some(figure.clone());
            log::debug!("copied {}", figure.id);
        }
    }

    /// Paste the clipboard so its reference point lands under the pointer.
    pub fn paste(&mut self, now: Millis) -> Option<FigureId> {
        self.advance(now);
        if self.history_locked() {
            return None;
        }
        let template = self.clipboard.as_ref()?;
        if !self.paste_throttle.try_acquire(now) {
            log::debug!("paste throttled");
            return None;
        }
        let mut figure = template.duplicate();
        if let Some(reference) = figure.reference_point() {
            figure.translate(self.pointer - reference);
        }
        let id = figure.id;
        let index = self.scene.figures.len();
        self.commands.execute(&mut self.scene, Command::add(index, figure));
        self.active = Some(id);
        Some(id)
    }

    /// Clear figures, overlays, history, and selection. Not undoable.
    pub fn reset(&mut self) {
        self.gesture = Gesture::None;
        self.text_editor = None;
        self.active = None;
        self.scene.clear();
        self.commands.clear();
        self.overlays.reset(&mut self.scheduler);
        self.scheduler.clear();
        log::info!("scene reset");
    }

    // ─── Text ────────────────────────────────────────────────────────────

    /// Open the text editor at `anchor`.
    pub fn begin_text(&mut self, anchor: Point) {
        self.cancel_gesture();
        self.active = None;
        self.text_editor = Some(Figure::start(FigureKind::Text, anchor, self.color, self.width));
    }

    /// Replace the editor's content.
    pub fn update_text(&mut self, text: &str) {
        if let Some(editor) = &mut self.text_editor
            && let Shape::Text { text: current, .. } = &mut editor.shape
        {
            *current = text.to_string();
            remeasure(editor);
        }
    }

    /// Close the editor, adding its text as a figure. Blank text is dropped.
    pub fn commit_text(&mut self) -> Option<FigureId> {
        let editor = self.text_editor.take()?;
        if editor.is_degenerate() {
            return None;
        }
        let id = editor.id;
        let index = self.scene.figures.len();
        self.commands.execute(&mut self.scene, Command::add(index, editor));
        self.active = Some(id);
        Some(id)
    }

    /// Close the editor without adding anything.
    pub fn cancel_text(&mut self) -> bool {
        self.text_editor.take().is_some()
    }

    // ─── Notifications ───────────────────────────────────────────────────

    /// The user clicked the toast: hand its follow-up to the host.
    pub fn notification_clicked(&mut self) {
        if let Some(Notification { action: Some(action), .. }) = self.ui.notification.take() {
            self.outbox.push(HostRequest::OpenNotificationFollowup { action });
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.ui.notification = None;
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Paint the current frame. Rainbow figures advance their hue by what
    /// was painted.
    pub fn render(&mut self, surface: &mut dyn Surface) -> FrameStats {
        let options = PaintOptions {
            now: self.now,
            active: self.active,
            show_handles: self.gesture == Gesture::None || matches!(self.gesture, Gesture::Resizing { .. }),
            whiteboard: self.ui.show_whiteboard,
            viewport: self.settings.screen.rect(),
        };
        let stats = paint_scene(surface, &self.scene, &options);
        if let Some(editor) = &self.text_editor {
            paint_figure(surface, editor, true);
        }
        for &(id, phase) in &stats.rainbow_phases {
            for layer in [Layer::Figures, Layer::Fade, Layer::Lasers] {
                if let Some(figure) = self.scene.find_in_mut(layer, id) {
                    figure.rainbow_phase = phase;
                    break;
                }
            }
        }
        stats
    }
}

/// Recompute a text figure's measured size after its content or width changed.
fn remeasure(figure: &mut Figure) {
    let font_size = figure.width.font_size();
    if let Shape::Text { text, width, height, .. } = &mut figure.shape {
        let (w, h) = measure_text(text, font_size);
        *width = w;
        *height = h;
    }
}

/// Move the point(s) behind `handle` to `p`. With `lock`, lines snap their
/// angle and boxes keep their stored aspect ratio.
fn resize(figure: &mut Figure, handle: Handle, p: Point, lock: bool) {
    match &mut figure.shape {
        Shape::Line { a, b } | Shape::Arrow { a, b } => match handle {
            Handle::PointA => *a = if lock { apply_soft_snap(*b, p) } else { p },
            Handle::PointB => *b = if lock { apply_soft_snap(*a, p) } else { p },
            _ => {}
        },
        Shape::Rectangle { a, b, aspect } | Shape::Oval { a, b, aspect } => {
            let fixed = match handle {
                Handle::PointA => *b,
                Handle::PointB => *a,
                Handle::PointAB => Point::new(b.x, a.y),
                Handle::PointBA => Point::new(a.x, b.y),
                _ => return,
            };
            let q = if lock { apply_aspect_ratio_lock(fixed, p, *aspect) } else { p };
            match handle {
                Handle::PointA => *a = q,
                Handle::PointB => *b = q,
                Handle::PointAB => {
                    a.x = q.x;
                    b.y = q.y;
                }
                Handle::PointBA => {
                    b.x = q.x;
                    a.y = q.y;
                }
                _ => {}
            }
        }
        Shape::Text {
            anchor,
            width,
            height,
            scale,
            ..
        } => {
            if *width <= 0.0 || *height <= 0.0 {
                return;
            }
            let r = Rect::new(anchor.x, anchor.y, anchor.x + *width * *scale, anchor.y + *height * *scale);
            // The corner opposite the dragged handle stays put.
            let fixed = match handle {
                Handle::ScaleTopLeft => Point::new(r.x1, r.y1),
                Handle::ScaleTopRight => Point::new(r.x0, r.y1),
                Handle::ScaleBottomLeft => Point::new(r.x1, r.y0),
                Handle::ScaleBottomRight => Point::new(r.x0, r.y0),
                _ => return,
            };
            // Handles sit TEXT_MARGIN outside the box.
            let dx = ((p.x - fixed.x).abs() - TEXT_MARGIN).max(0.0);
            let dy = ((p.y - fixed.y).abs() - TEXT_MARGIN).max(0.0);
            let s = (dx / *width).max(dy / *height).max(MIN_TEXT_SCALE);
            let (w, h) = (*width * s, *height * s);
            *anchor = match handle {
                Handle::ScaleTopLeft => Point::new(fixed.x - w, fixed.y - h),
                Handle::ScaleTopRight => Point::new(fixed.x, fixed.y - h),
                Handle::ScaleBottomLeft => Point::new(fixed.x - w, fixed.y),
                _ => fixed,
            };
            *scale = s;
        }
        Shape::Pen { .. }
        | Shape::Highlighter { .. }
        | Shape::FadePen { .. }
        | Shape::Laser { .. }
        | Shape::Eraser { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controller() -> Controller {
        Controller::new(Settings::default())
    }

    fn drag(c: &mut Controller, from: (f64, f64), to: (f64, f64), mods: Modifiers, now: Millis) {
        c.pointer_down(Point::new(from.0, from.1), mods, now);
        c.pointer_move(Point::new(to.0, to.1), mods, now + 10);
        c.pointer_up(Point::new(to.0, to.1), mods, now + 20);
    }

    #[test]
    fn zero_length_shape_is_discarded() {
        let mut c = controller();
        c.set_tool(FigureKind::Rectangle, 0);
        c.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE, 0);
        c.pointer_up(Point::new(10.0, 10.0), Modifiers::NONE, 5);
        assert!(c.scene().figures.is_empty());
        assert!(!c.commands().can_undo());
    }

    #[test]
    fn shift_draws_square() {
        let mut c = controller();
        c.set_tool(FigureKind::Rectangle, 0);
        drag(&mut c, (0.0, 0.0), (100.0, 40.0), Modifiers::SHIFT, 0);
        let (a, b) = c.scene().figures[0].endpoints().unwrap();
        assert!(((b.x - a.x).abs() - (b.y - a.y).abs()).abs() < 1e-9);
        assert_eq!(c.scene().figures[0].aspect(), Some(1.0));
    }

    #[test]
    fn new_shape_becomes_active_and_resizes_by_handle() {
        let mut c = controller();
        c.set_tool(FigureKind::Line, 0);
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), Modifiers::NONE, 0);
        let id = c.active().unwrap();

        c.pointer_down(Point::new(100.0, 0.0), Modifiers::NONE, 100);
        assert_eq!(
            c.gesture(),
            Gesture::Resizing {
                id,
                handle: Handle::PointB
            }
        );
        c.pointer_move(Point::new(150.0, 20.0), Modifiers::NONE, 110);
        c.pointer_up(Point::new(150.0, 20.0), Modifiers::NONE, 120);
        assert_eq!(
            c.scene().get(id).unwrap().endpoints(),
            Some((Point::new(0.0, 0.0), Point::new(150.0, 20.0)))
        );
        assert_eq!(c.commands().undo_len(), 2);
    }

    #[test]
    fn resizing_rectangle_corner_with_lock_keeps_aspect() {
        let mut c = controller();
        c.set_tool(FigureKind::Rectangle, 0);
        drag(&mut c, (0.0, 0.0), (200.0, 100.0), Modifiers::NONE, 0);
        let id = c.active().unwrap();
        c.pointer_down(Point::new(200.0, 100.0), Modifiers::NONE, 100);
        c.pointer_move(Point::new(300.0, 120.0), Modifiers::SHIFT, 110);
        c.pointer_up(Point::new(300.0, 120.0), Modifiers::SHIFT, 120);
        let f = c.scene().get(id).unwrap();
        let (a, b) = f.endpoints().unwrap();
        assert!(((b.x - a.x) / (b.y - a.y) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn implied_corner_handle_moves_both_points() {
        let mut f = Figure::new(
            Shape::Rectangle {
                a: Point::new(0.0, 0.0),
                b: Point::new(100.0, 100.0),
                aspect: 1.0,
            },
            ColorIndex::default(),
            WidthIndex::default(),
        );
        resize(&mut f, Handle::PointAB, Point::new(-20.0, 130.0), false);
        assert_eq!(f.endpoints(), Some((Point::new(-20.0, 0.0), Point::new(100.0, 130.0))));
    }

    #[test]
    fn text_resize_keeps_opposite_corner() {
        let mut f = Figure::new(
            Shape::Text {
                anchor: Point::new(100.0, 100.0),
                text: "hi".into(),
                width: 40.0,
                height: 20.0,
                scale: 1.0,
            },
            ColorIndex::default(),
            WidthIndex::default(),
        );
        // Drag the top-left handle outward: bottom-right stays at (140, 120).
        resize(&mut f, Handle::ScaleTopLeft, Point::new(50.0, 50.0), false);
        let r = f.text_box().unwrap();
        assert!((r.x1 - 140.0).abs() < 1e-9 && (r.y1 - 120.0).abs() < 1e-9);
        assert!(f.text_box().unwrap().width() > 40.0);

        // Collapsing clamps to the minimum scale.
        resize(&mut f, Handle::ScaleTopLeft, Point::new(139.0, 119.0), false);
        if let Shape::Text { scale, .. } = f.shape {
            assert_eq!(scale, MIN_TEXT_SCALE);
        }
    }

    #[test]
    fn escape_reverts_drag() {
        let mut c = controller();
        c.set_tool(FigureKind::Line, 0);
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), Modifiers::NONE, 0);
        let id = c.active().unwrap();
        c.pointer_down(Point::new(50.0, 0.0), Modifiers::NONE, 100);
        c.pointer_move(Point::new(50.0, 80.0), Modifiers::NONE, 110);
        assert!(c.key_down("Escape", Modifiers::NONE, 115));
        assert_eq!(c.gesture(), Gesture::None);
        assert_eq!(
            c.scene().get(id).unwrap().endpoints(),
            Some((Point::new(0.0, 0.0), Point::new(100.0, 0.0)))
        );
        // Stray pointer-up from before the cancel does nothing.
        c.pointer_up(Point::new(50.0, 90.0), Modifiers::NONE, 120);
        assert_eq!(c.commands().undo_len(), 1);
    }

    #[test]
    fn escape_with_nothing_to_cancel_hides_window() {
        let mut c = controller();
        c.key_down("Escape", Modifiers::NONE, 0);
        assert_eq!(c.take_requests(), vec![HostRequest::HideWindow]);
    }

    #[test]
    fn tool_switch_cancels_drawing_and_remembers_width() {
        let mut c = controller();
        c.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE, 0);
        c.pointer_move(Point::new(30.0, 0.0), Modifiers::NONE, 10);
        c.set_tool(FigureKind::Highlighter, 20);
        assert!(c.scene().figures.is_empty());
        assert_eq!(c.gesture(), Gesture::None);

        c.set_width(WidthIndex::new(4), 30);
        c.set_tool(FigureKind::Pen, 40);
        assert_eq!(c.width(), WidthIndex::default());
        c.set_tool(FigureKind::Highlighter, 50);
        assert_eq!(c.width(), WidthIndex::new(4));
    }

    #[test]
    fn colour_change_on_active_figure_is_undoable() {
        let mut c = controller();
        c.set_tool(FigureKind::Oval, 0);
        drag(&mut c, (0.0, 0.0), (80.0, 60.0), Modifiers::NONE, 0);
        let id = c.active().unwrap();
        c.set_color(ColorIndex::new(3), 100);
        assert_eq!(c.scene().get(id).unwrap().color, ColorIndex::new(3));
        c.undo();
        assert_eq!(c.scene().get(id).unwrap().color, ColorIndex::default());
    }

    #[test]
    fn swap_colors_exchanges_pair() {
        let mut c = controller();
        let (primary, secondary) = (c.color(), c.secondary_color());
        c.swap_colors(0);
        assert_eq!((c.color(), c.secondary_color()), (secondary, primary));
    }

    #[test]
    fn persist_is_debounced() {
        let mut c = controller();
        c.set_tool(FigureKind::Arrow, 0);
        c.set_color(ColorIndex::new(2), 100);
        c.tick(350);
        assert!(c.take_requests().is_empty());
        c.tick(400);
        let requests = c.take_requests();
        assert_eq!(requests.len(), 1);
        let HostRequest::Persist(state) = &requests[0] else {
            panic!("expected persist, got {requests:?}");
        };
        assert_eq!(state.tool, FigureKind::Arrow);
        assert_eq!(state.color, ColorIndex::new(2));
    }

    #[test]
    fn shutdown_flushes_pending_persist() {
        let mut c = controller();
        c.move_toolbar(Point::new(-50.0, 40.0), 0);
        c.shutdown();
        let requests = c.take_requests();
        assert!(matches!(
            &requests[..],
            [HostRequest::Persist(PersistedState { toolbar_position, .. })] if *toolbar_position == Point::new(0.0, 40.0)
        ));
    }

    #[test]
    fn text_editor_commits_measured_figure() {
        let mut c = controller();
        c.set_tool(FigureKind::Text, 0);
        c.pointer_down(Point::new(40.0, 40.0), Modifiers::NONE, 0);
        c.pointer_up(Point::new(40.0, 40.0), Modifiers::NONE, 5);
        assert!(c.text_editor().is_some());
        // Typing is not routed to shortcuts while the editor is open.
        assert!(!c.key_down("p", Modifiers::NONE, 6));
        c.update_text("hello");
        assert!(c.undo().is_none());
        assert!(c.key_down("Enter", Modifiers::NONE, 10));
        let id = c.active().unwrap();
        let f = c.scene().get(id).unwrap();
        assert_eq!(f.kind(), FigureKind::Text);
        assert!(f.text_box().unwrap().width() > 0.0);
        assert_eq!(c.tool(), FigureKind::Text);
    }

    #[test]
    fn blank_text_is_dropped() {
        let mut c = controller();
        c.begin_text(Point::new(10.0, 10.0));
        c.update_text("   ");
        assert_eq!(c.commit_text(), None);
        assert!(c.scene().figures.is_empty());
    }

    #[test]
    fn host_commands_update_ui() {
        let mut c = controller();
        let whiteboard = c.ui().show_whiteboard;
        c.handle_command(HostCommand::ToggleWhiteboard, 0);
        assert_eq!(c.ui().show_whiteboard, !whiteboard);
        c.handle_command(
            HostCommand::RefreshSettings {
                show_border: false,
                show_cursor: false,
                show_swap_colors: false,
            },
            0,
        );
        assert!(!c.ui().show_border);
        c.handle_command(
            HostCommand::ShowNotification(Notification {
                title: "Screenshot saved".into(),
                body: "Click to open".into(),
                action: Some("open:shot.png".into()),
            }),
            0,
        );
        c.notification_clicked();
        assert_eq!(
            c.take_requests(),
            vec![HostRequest::OpenNotificationFollowup {
                action: "open:shot.png".into()
            }]
        );
        assert!(c.ui().notification.is_none());
    }
}
