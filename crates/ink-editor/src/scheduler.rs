//! Deferred work driven by injected time.
//!
//! Stands in for host timers and animation frames. Tasks carry figure ids,
//! never references; a task whose figure is gone by the time it fires is a
//! no-op in the handler. Cancellation is by handle and is idempotent.

use ink_core::{FigureId, Millis};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Frame interval of the fade animation (~60 fps).
pub const FRAME_INTERVAL: Millis = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Drop the oldest point of a laser trail.
    LaserTail(FigureId),
    /// Drop the oldest point of an eraser trail.
    EraserTail(FigureId),
    /// Remove finished tap ripples.
    RippleExpire,
    /// Fade-pen idle period elapsed: start fading.
    FadeIdle,
    /// One frame of the fade opacity ramp.
    FadeFrame,
    /// Ramp and extra delay done: drop the fade strokes.
    FadeClear,
}

/// Cancel token returned by [`Scheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry {
    due: Millis,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: the heap pops the earliest due, then the earliest scheduled.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Entry>,
    canceled: HashSet<u64>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `now >= due`.
    pub fn schedule(&mut self, due: Millis, task: Task) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        log::trace!("schedule {task:?} at {due}");
        self.heap.push(Entry { due, seq, task });
        TaskHandle(seq)
    }

    pub fn cancel(&mut self, handle: TaskHandle) {
        self.canceled.insert(handle.0);
    }

    /// Pop the next task due at or before `now`, with its due time.
    /// Canceled tasks are skipped.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, Task)> {
        while let Some(entry) = self.heap.peek() {
            if entry.due > now {
                return None;
            }
            let entry = self.heap.pop()?;
            if self.canceled.remove(&entry.seq) {
                continue;
            }
            return Some((entry.due, entry.task));
        }
        None
    }

    /// Earliest pending due time, ignoring cancellation.
    pub fn next_due(&self) -> Option<Millis> {
        self.heap.peek().map(|e| e.due)
    }

    /// Number of live (not canceled) tasks.
    pub fn pending(&self) -> usize {
        self.heap
            .iter()
            .filter(|e| !self.canceled.contains(&e.seq))
            .count()
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.heap
            .iter()
            .any(|e| e.task == task && !self.canceled.contains(&e.seq))
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.canceled.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pops_in_due_then_schedule_order() {
        let mut s = Scheduler::new();
        s.schedule(20, Task::FadeClear);
        s.schedule(10, Task::FadeIdle);
        s.schedule(10, Task::FadeFrame);
        assert_eq!(s.pop_due(5), None);
        assert_eq!(s.pop_due(30), Some((10, Task::FadeIdle)));
        assert_eq!(s.pop_due(30), Some((10, Task::FadeFrame)));
        assert_eq!(s.pop_due(30), Some((20, Task::FadeClear)));
        assert_eq!(s.pop_due(30), None);
    }

    #[test]
    fn canceled_tasks_never_fire() {
        let mut s = Scheduler::new();
        let h = s.schedule(10, Task::FadeIdle);
        s.schedule(10, Task::RippleExpire);
        s.cancel(h);
        s.cancel(h);
        assert_eq!(s.pending(), 1);
        assert!(!s.is_scheduled(Task::FadeIdle));
        assert_eq!(s.pop_due(10), Some((10, Task::RippleExpire)));
        assert_eq!(s.pop_due(10), None);
    }
}
