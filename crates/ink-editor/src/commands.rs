//! Undo/Redo command stack.
//!
//! Every structural change to the persisted figures is a reversible
//! [`Command`]. Entries carry full figure copies plus their z-order index, so
//! an inverse restores both membership and order.
//!
//! Drag/resize gestures use **snapshot batching**: the figure is copied at
//! gesture start and compared at gesture end, so the whole gesture becomes a
//! single `Modify` entry (or nothing, if it ended where it began).

use ink_core::{Figure, FigureId, Scene};

/// A reversible change to the persisted figure list.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Figures added at the given indices. Inverse removes them by id and
    /// remembers where they were, since selection reorders figures outside
    /// the history.
    Add { entries: Vec<(usize, Figure)> },
    /// Figures removed from the given (ascending) indices. Inverse
    /// reinserts them in ascending index order.
    Remove { entries: Vec<(usize, Figure)> },
    /// An in-place edit; swapped by id.
    Modify { before: Box<Figure>, after: Box<Figure> },
}

impl Command {
    pub fn add(index: usize, figure: Figure) -> Self {
        Command::Add {
            entries: vec![(index, figure)],
        }
    }

    pub fn modify(before: Figure, after: Figure) -> Self {
        Command::Modify {
            before: Box::new(before),
            after: Box::new(after),
        }
    }

    /// Human-readable description for UI display.
    pub fn description(&self) -> String {
        match self {
            Command::Add { entries } => match entries.as_slice() {
                [(_, f)] => format!("add {:?}", f.kind()).to_lowercase(),
                _ => format!("add {} figures", entries.len()),
            },
            Command::Remove { entries } => match entries.as_slice() {
                [(_, f)] => format!("remove {:?}", f.kind()).to_lowercase(),
                _ => format!("remove {} figures", entries.len()),
            },
            Command::Modify { after, .. } => format!("edit {:?}", after.kind()).to_lowercase(),
        }
    }

    fn apply(&mut self, scene: &mut Scene) {
        match self {
            Command::Add { entries } => insert_all(scene, entries),
            Command::Remove { entries } => remove_all(scene, entries),
            Command::Modify { after, .. } => replace(scene, after),
        }
    }

    fn revert(&mut self, scene: &mut Scene) {
        match self {
            Command::Add { entries } => remove_all(scene, entries),
            Command::Remove { entries } => insert_all(scene, entries),
            Command::Modify { before, .. } => replace(scene, before),
        }
    }
}

fn insert_all(scene: &mut Scene, entries: &[(usize, Figure)]) {
    for (index, figure) in entries {
        if scene.contains(figure.id) {
            log::debug!("figure {} already present, skipping insert", figure.id);
            continue;
        }
        let mut figure = figure.clone();
        figure.erased = false;
        scene.insert(*index, figure);
    }
}

/// Remove by id, first recording each figure's current index so the
/// inverse puts it back where it was.
fn remove_all(scene: &mut Scene, entries: &mut [(usize, Figure)]) {
    for (index, figure) in entries.iter_mut() {
        if let Some(current) = scene.index_of(figure.id) {
            *index = current;
        }
    }
    entries.sort_by_key(|(index, _)| *index);
    for (_, figure) in entries.iter() {
        if scene.remove(figure.id).is_none() {
            log::debug!("figure {} already gone", figure.id);
        }
    }
}

/// Equal for history purposes. The rainbow phase animates on every frame
/// and the erase marker is transient, so neither counts as an edit.
pub fn same_content(a: &Figure, b: &Figure) -> bool {
    a.id == b.id && a.shape == b.shape && a.color == b.color && a.width == b.width
}

fn replace(scene: &mut Scene, figure: &Figure) {
    if scene.replace(figure.clone()).is_none() {
        log::debug!("figure {} already gone", figure.id);
    }
}

/// Manages undo/redo stacks with snapshot batching for gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Figure copy captured at the start of a gesture.
    gesture_snapshot: Option<Figure>,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            gesture_snapshot: None,
        }
    }

    /// Apply a command to the scene and push it.
    pub fn execute(&mut self, scene: &mut Scene, mut cmd: Command) {
        cmd.apply(scene);
        self.record(cmd);
    }

    /// Push a command whose effect is already in the scene.
    pub fn record(&mut self, cmd: Command) {
        log::debug!("history: {}", cmd.description());
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }

        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Start a drag/resize gesture on `id`. Mutations until `end_gesture`
    /// are applied live and recorded as one step.
    pub fn begin_gesture(&mut self, scene: &Scene, id: FigureId) {
        self.gesture_snapshot = scene.get(id).cloned();
    }

    /// Close the gesture. Pushes one `Modify` if the figure changed.
    /// Returns whether anything was recorded.
    pub fn end_gesture(&mut self, scene: &Scene) -> bool {
        let Some(before) = self.gesture_snapshot.take() else {
            return false;
        };
        match scene.get(before.id) {
            Some(after) if !same_content(after, &before) => {
                let after = after.clone();
                self.record(Command::modify(before, after));
                true
            }
            _ => false,
        }
    }

    /// Abandon the gesture, restoring the figure to its snapshot.
    pub fn cancel_gesture(&mut self, scene: &mut Scene) {
        if let Some(before) = self.gesture_snapshot.take() {
            replace(scene, &before);
        }
    }

    /// Undo the last command.
    pub fn undo(&mut self, scene: &mut Scene) -> Option<String> {
        let mut cmd = self.undo_stack.pop()?;
        let desc = cmd.description();
        cmd.revert(scene);
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command.
    pub fn redo(&mut self, scene: &mut Scene) -> Option<String> {
        let mut cmd = self.redo_stack.pop()?;
        let desc = cmd.description();
        cmd.apply(scene);
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent undo entry.
    pub fn last(&self) -> Option<&Command> {
        self.undo_stack.last()
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.gesture_snapshot = None;
    }
}
