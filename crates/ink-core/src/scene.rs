//! Scene store: owns every figure by value.
//!
//! Persisted figures, fade-pen output, laser trails, and eraser trails live
//! in separate ordered collections. Within each collection z-order is vector
//! order (last = topmost). Figures are addressed by [`FigureId`]; nothing
//! outside the scene holds a reference to a figure.

use crate::id::FigureId;
use crate::model::Figure;
use crate::palette::ColorIndex;
use crate::Millis;
use kurbo::Point;

/// Which collection a figure lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Persisted figures, part of the undo history.
    Figures,
    /// Fade-pen strokes, cleared by the fade-out cycle.
    Fade,
    Lasers,
    Erasers,
}

/// How long a tap ripple stays on screen.
pub const RIPPLE_DURATION: Millis = 600;

/// One-shot expanding circle spawned by a laser tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub center: Point,
    pub color: ColorIndex,
    pub started_at: Millis,
}

impl Ripple {
    /// Animation progress in [0, 1] at `now`.
    pub fn progress(&self, now: Millis) -> f64 {
        (now.saturating_sub(self.started_at) as f64 / RIPPLE_DURATION as f64).min(1.0)
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub figures: Vec<Figure>,
    pub fade: Vec<Figure>,
    pub lasers: Vec<Figure>,
    pub erasers: Vec<Figure>,
    pub ripples: Vec<Ripple>,
    /// Opacity applied to every fade figure, 1.0 while idle.
    pub fade_opacity: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            figures: Vec::new(),
            fade: Vec::new(),
            lasers: Vec::new(),
            erasers: Vec::new(),
            ripples: Vec::new(),
            fade_opacity: 1.0,
        }
    }

    pub fn layer(&self, layer: Layer) -> &[Figure] {
        match layer {
            Layer::Figures => &self.figures,
            Layer::Fade => &self.fade,
            Layer::Lasers => &self.lasers,
            Layer::Erasers => &self.erasers,
        }
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Figure> {
        match layer {
            Layer::Figures => &mut self.figures,
            Layer::Fade => &mut self.fade,
            Layer::Lasers => &mut self.lasers,
            Layer::Erasers => &mut self.erasers,
        }
    }

    // ─── Persisted figures ───────────────────────────────────────────────

    pub fn get(&self, id: FigureId) -> Option<&Figure> {
        self.figures.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: FigureId) -> Option<&mut Figure> {
        self.figures.iter_mut().find(|f| f.id == id)
    }

    pub fn index_of(&self, id: FigureId) -> Option<usize> {
        self.figures.iter().position(|f| f.id == id)
    }

    pub fn contains(&self, id: FigureId) -> bool {
        self.index_of(id).is_some()
    }

    /// Append on top of the z-order.
    pub fn push(&mut self, figure: Figure) {
        self.figures.push(figure);
    }

    /// Insert at `index`, clamped to the end.
    pub fn insert(&mut self, index: usize, figure: Figure) {
        let index = index.min(self.figures.len());
        self.figures.insert(index, figure);
    }

    /// Remove by id, returning its former index. Misses are `None`.
    pub fn remove(&mut self, id: FigureId) -> Option<(usize, Figure)> {
        let idx = self.index_of(id)?;
        Some((idx, self.figures.remove(idx)))
    }

    /// Swap in `figure` for the figure with the same id, returning the old one.
    pub fn replace(&mut self, figure: Figure) -> Option<Figure> {
        let slot = self.get_mut(figure.id)?;
        Some(std::mem::replace(slot, figure))
    }

    /// Move a figure to the top of the z-order. Returns false on a miss.
    pub fn bring_to_front(&mut self, id: FigureId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx + 1 != self.figures.len() {
            let f = self.figures.remove(idx);
            self.figures.push(f);
        }
        true
    }

    /// Ids of the persisted figures in z-order.
    pub fn ids(&self) -> Vec<FigureId> {
        self.figures.iter().map(|f| f.id).collect()
    }

    // ─── Any collection ──────────────────────────────────────────────────

    /// Look a figure up in a specific collection.
    pub fn find_in(&self, layer: Layer, id: FigureId) -> Option<&Figure> {
        self.layer(layer).iter().find(|f| f.id == id)
    }

    pub fn find_in_mut(&mut self, layer: Layer, id: FigureId) -> Option<&mut Figure> {
        self.layer_mut(layer).iter_mut().find(|f| f.id == id)
    }

    /// Remove from a specific collection.
    pub fn remove_from(&mut self, layer: Layer, id: FigureId) -> Option<Figure> {
        let list = self.layer_mut(layer);
        let idx = list.iter().position(|f| f.id == id)?;
        Some(list.remove(idx))
    }

    /// Last figure of a collection, the one an in-progress gesture grows.
    pub fn last_mut(&mut self, layer: Layer) -> Option<&mut Figure> {
        self.layer_mut(layer).last_mut()
    }

    /// Remove every `erased` figure. Persisted removals are returned with
    /// their former indices (ascending) for the history; fade removals are
    /// only counted.
    pub fn take_erased(&mut self) -> (Vec<(usize, Figure)>, usize) {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.figures.len());
        for (idx, f) in std::mem::take(&mut self.figures).into_iter().enumerate() {
            if f.erased {
                removed.push((idx, f));
            } else {
                kept.push(f);
            }
        }
        self.figures = kept;

        let before = self.fade.len();
        self.fade.retain(|f| !f.erased);
        (removed, before - self.fade.len())
    }

    /// Clear every `erased` marker without removing anything.
    pub fn clear_erased_marks(&mut self) {
        for f in self.figures.iter_mut().chain(self.fade.iter_mut()) {
            f.erased = false;
        }
    }

    /// Drop everything and restore full fade opacity.
    pub fn clear(&mut self) {
        self.figures.clear();
        self.fade.clear();
        self.lasers.clear();
        self.erasers.clear();
        self.ripples.clear();
        self.fade_opacity = 1.0;
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
            && self.fade.is_empty()
            && self.lasers.is_empty()
            && self.erasers.is_empty()
            && self.ripples.is_empty()
    }
}
