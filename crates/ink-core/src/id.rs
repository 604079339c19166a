use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global creation counter. Ids are handed out in creation order.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// A unique, creation-ordered identifier for a figure.
/// Comparing two ids compares creation order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FigureId(u64);

impl FigureId {
    /// Allocate the next id. Never returns an id handed out before.
    pub fn next() -> Self {
        FigureId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value (for logs and SVG element ids).
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
