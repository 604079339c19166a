//! Transient overlays: laser and eraser trails, tap ripples, and the
//! fade-pen fade-out cycle.
//!
//! Trails shrink from the tail: every appended point schedules the removal
//! of the oldest point. The fade cycle is idle timer → per-frame opacity
//! ramp → extra delay → clear, restarted by new fade strokes or the pause
//! key. Every handler re-resolves its figure by id and tolerates misses.

use crate::scheduler::{FRAME_INTERVAL, Scheduler, Task, TaskHandle};
use ink_core::geometry::polyline_length;
use ink_core::scene::RIPPLE_DURATION;
use ink_core::{Figure, FigureId, Layer, Millis, Point, Ripple, Scene, Settings};
use ink_render::hit::segment_hits_figure;

/// A laser stroke shorter than this, with few points, is a tap.
pub const TAP_MAX_DISTANCE: f64 = 10.0;
pub const TAP_MAX_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayTimings {
    pub laser_time: Millis,
    pub eraser_time: Millis,
    pub fade_idle_delay: Millis,
    pub fade_duration: Millis,
    pub fade_extra_delay: Millis,
}

impl From<&Settings> for OverlayTimings {
    fn from(s: &Settings) -> Self {
        Self {
            laser_time: s.laser_time,
            eraser_time: s.eraser_time,
            fade_idle_delay: s.fade_idle_delay,
            fade_duration: s.fade_duration.max(1),
            fade_extra_delay: s.fade_extra_delay,
        }
    }
}

/// Where the fade cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    /// Nothing scheduled.
    Idle,
    /// Waiting out the idle delay.
    Waiting,
    /// Ramping opacity down since the given time.
    Fading { since: Millis },
    /// Ramp done, waiting to clear.
    Clearing,
}

#[derive(Debug)]
pub struct Overlays {
    timings: OverlayTimings,
    phase: FadePhase,
    /// The one live fade task (idle, frame, or clear).
    fade_task: Option<TaskHandle>,
    paused: bool,
}

impl Overlays {
    pub fn new(timings: OverlayTimings) -> Self {
        Self {
            timings,
            phase: FadePhase::Idle,
            fade_task: None,
            paused: false,
        }
    }

    pub fn fade_phase(&self) -> FadePhase {
        self.phase
    }

    // ─── Laser ───────────────────────────────────────────────────────────

    /// A point was appended to laser `id`.
    pub fn laser_point_added(&self, scheduler: &mut Scheduler, id: FigureId, now: Millis) {
        scheduler.schedule(now + self.timings.laser_time, Task::LaserTail(id));
    }

    /// Laser stroke ended. A short, nearly stationary stroke becomes a ripple.
    /// Returns whether it was a tap.
    pub fn laser_finished(
        &self,
        scene: &mut Scene,
        scheduler: &mut Scheduler,
        id: FigureId,
        now: Millis,
    ) -> bool {
        let Some(laser) = scene.find_in(Layer::Lasers, id) else {
            return false;
        };
        let points = laser.polyline().unwrap_or(&[]);
        let (Some(&center), color) = (points.first(), laser.color) else {
            return false;
        };
        if points.len() >= TAP_MAX_POINTS || polyline_length(points) >= TAP_MAX_DISTANCE {
            return false;
        }
        scene.remove_from(Layer::Lasers, id);
        scene.ripples.push(Ripple {
            center,
            color,
            started_at: now,
        });
        scheduler.schedule(now + RIPPLE_DURATION, Task::RippleExpire);
        log::debug!("laser tap at ({:.0}, {:.0})", center.x, center.y);
        true
    }

    // ─── Eraser ──────────────────────────────────────────────────────────

    /// A point was appended to eraser `id`: schedule its decay and mark
    /// everything the newest segment touches. Returns how many figures were
    /// newly marked.
    pub fn eraser_point_added(
        &self,
        scene: &mut Scene,
        scheduler: &mut Scheduler,
        id: FigureId,
        now: Millis,
    ) -> usize {
        scheduler.schedule(now + self.timings.eraser_time, Task::EraserTail(id));
        let Some(points) = scene.find_in(Layer::Erasers, id).and_then(Figure::polyline) else {
            return 0;
        };
        let (a, b) = match points {
            [] => return 0,
            [only] => (*only, *only),
            [.., prev, last] => (*prev, *last),
        };
        mark_touched(&mut scene.figures, a, b) + mark_touched(&mut scene.fade, a, b)
    }

    /// Eraser stroke ended: remove every marked figure. Persisted removals
    /// are returned with their former indices for the history.
    pub fn eraser_finished(&self, scene: &mut Scene) -> Vec<(usize, Figure)> {
        let (removed, fade_removed) = scene.take_erased();
        if !removed.is_empty() || fade_removed > 0 {
            log::debug!("erased {} figures, {} fade strokes", removed.len(), fade_removed);
        }
        removed
    }

    // ─── Fade pen ────────────────────────────────────────────────────────

    /// A fade stroke started: stop any fade in progress and restore opacity.
    pub fn fade_stroke_started(&mut self, scene: &mut Scene, scheduler: &mut Scheduler) {
        self.stop_fade(scene, scheduler);
    }

    /// A fade stroke ended: start the idle timer unless paused.
    pub fn fade_stroke_ended(&mut self, scene: &Scene, scheduler: &mut Scheduler, now: Millis) {
        self.arm_idle(scene, scheduler, now);
    }

    /// Hold or release the pause modifier.
    pub fn set_paused(&mut self, paused: bool, scene: &mut Scene, scheduler: &mut Scheduler, now: Millis) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        if paused {
            self.stop_fade(scene, scheduler);
        } else {
            self.arm_idle(scene, scheduler, now);
        }
    }

    fn arm_idle(&mut self, scene: &Scene, scheduler: &mut Scheduler, now: Millis) {
        self.cancel_fade_task(scheduler);
        if self.paused || scene.fade.is_empty() {
            self.phase = FadePhase::Idle;
            return;
        }
        self.fade_task = Some(scheduler.schedule(now + self.timings.fade_idle_delay, Task::FadeIdle));
        self.phase = FadePhase::Waiting;
    }

    fn stop_fade(&mut self, scene: &mut Scene, scheduler: &mut Scheduler) {
        self.cancel_fade_task(scheduler);
        self.phase = FadePhase::Idle;
        scene.fade_opacity = 1.0;
    }

    fn cancel_fade_task(&mut self, scheduler: &mut Scheduler) {
        if let Some(handle) = self.fade_task.take() {
            scheduler.cancel(handle);
        }
    }

    // ─── Task handlers ───────────────────────────────────────────────────

    /// Run a fired task. Returns whether the scene changed.
    pub fn run(&mut self, task: Task, scene: &mut Scene, scheduler: &mut Scheduler, now: Millis) -> bool {
        match task {
            Task::LaserTail(id) => drop_tail(scene, Layer::Lasers, id),
            Task::EraserTail(id) => drop_tail(scene, Layer::Erasers, id),
            Task::RippleExpire => {
                let before = scene.ripples.len();
                scene.ripples.retain(|r| r.progress(now) < 1.0);
                scene.ripples.len() != before
            }
            Task::FadeIdle => {
                if self.phase != FadePhase::Waiting {
                    return false;
                }
                self.phase = FadePhase::Fading { since: now };
                self.fade_task = Some(scheduler.schedule(now, Task::FadeFrame));
                false
            }
            Task::FadeFrame => {
                let FadePhase::Fading { since } = self.phase else {
                    return false;
                };
                let t = (now - since) as f64 / self.timings.fade_duration as f64;
                let opacity = round2((1.0 - t).max(0.0));
                let changed = opacity != scene.fade_opacity;
                scene.fade_opacity = opacity;
                self.fade_task = Some(if t >= 1.0 {
                    self.phase = FadePhase::Clearing;
                    scheduler.schedule(now + self.timings.fade_extra_delay, Task::FadeClear)
                } else {
                    scheduler.schedule(now + FRAME_INTERVAL, Task::FadeFrame)
                });
                changed
            }
            Task::FadeClear => {
                if self.phase != FadePhase::Clearing {
                    return false;
                }
                self.fade_task = None;
                self.phase = FadePhase::Idle;
                let had = !scene.fade.is_empty();
                scene.fade.clear();
                scene.fade_opacity = 1.0;
                log::debug!("fade strokes cleared");
                had
            }
        }
    }

    /// Forget every pending fade task. Trail tasks stay scheduled and miss.
    pub fn reset(&mut self, scheduler: &mut Scheduler) {
        self.cancel_fade_task(scheduler);
        self.phase = FadePhase::Idle;
    }
}

fn mark_touched(figures: &mut [Figure], a: Point, b: Point) -> usize {
    let mut marked = 0;
    for f in figures.iter_mut().filter(|f| !f.erased) {
        if segment_hits_figure(a, b, f) {
            f.erased = true;
            marked += 1;
        }
    }
    marked
}

/// Remove the oldest point of a trail, dropping the trail once empty.
fn drop_tail(scene: &mut Scene, layer: Layer, id: FigureId) -> bool {
    let Some(points) = scene.find_in_mut(layer, id).and_then(Figure::polyline_mut) else {
        return false;
    };
    if !points.is_empty() {
        points.remove(0);
    }
    if points.is_empty() {
        scene.remove_from(layer, id);
    }
    true
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink_core::{ColorIndex, FigureKind, Shape, WidthIndex};

    fn timings() -> OverlayTimings {
        OverlayTimings::from(&Settings::default())
    }

    fn drain(o: &mut Overlays, scene: &mut Scene, s: &mut Scheduler, now: Millis) {
        while let Some((due, task)) = s.pop_due(now) {
            o.run(task, scene, s, due);
        }
    }

    fn laser(points: &[(f64, f64)]) -> Figure {
        let mut f = Figure::start(
            FigureKind::Laser,
            Point::new(points[0].0, points[0].1),
            ColorIndex::default(),
            WidthIndex::default(),
        );
        for &(x, y) in &points[1..] {
            f.extend_to(Point::new(x, y));
        }
        f
    }

    #[test]
    fn laser_tail_decays_to_nothing() {
        let mut o = Overlays::new(timings());
        let mut scene = Scene::new();
        let mut s = Scheduler::new();
        let f = laser(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0), (150.0, 0.0)]);
        let id = f.id;
        scene.lasers.push(f);
        for t in 0..4 {
            o.laser_point_added(&mut s, id, t * 10);
        }
        drain(&mut o, &mut scene, &mut s, 1500 + 15);
        assert_eq!(scene.lasers[0].polyline().unwrap().len(), 2);
        drain(&mut o, &mut scene, &mut s, 1500 + 30);
        assert!(scene.lasers.is_empty());
    }

    #[test]
    fn tail_task_after_reset_is_harmless() {
        let mut o = Overlays::new(timings());
        let mut scene = Scene::new();
        let mut s = Scheduler::new();
        let f = laser(&[(0.0, 0.0), (50.0, 0.0)]);
        let id = f.id;
        scene.lasers.push(f);
        o.laser_point_added(&mut s, id, 0);
        scene.clear();
        assert!(!o.run(Task::LaserTail(id), &mut scene, &mut s, 2000));
    }

    #[test]
    fn stationary_laser_becomes_ripple() {
        let o = Overlays::new(timings());
        let mut scene = Scene::new();
        let mut s = Scheduler::new();
        let f = laser(&[(10.0, 10.0), (11.0, 10.0)]);
        let id = f.id;
        scene.lasers.push(f);
        assert!(o.laser_finished(&mut scene, &mut s, id, 100));
        assert!(scene.lasers.is_empty());
        assert_eq!(scene.ripples.len(), 1);
        assert!(s.is_scheduled(Task::RippleExpire));
    }

    #[test]
    fn long_laser_is_not_a_tap() {
        let o = Overlays::new(timings());
        let mut scene = Scene::new();
        let mut s = Scheduler::new();
        let f = laser(&[(10.0, 10.0), (60.0, 10.0)]);
        let id = f.id;
        scene.lasers.push(f);
        assert!(!o.laser_finished(&mut scene, &mut s, id, 100));
        assert_eq!(scene.lasers.len(), 1);
    }

    #[test]
    fn eraser_marks_without_removing() {
        let o = Overlays::new(timings());
        let mut scene = Scene::new();
        let mut s = Scheduler::new();
        let line = Figure::new(
            Shape::Line {
                a: Point::new(50.0, 0.0),
                b: Point::new(50.0, 100.0),
            },
            ColorIndex::default(),
            WidthIndex::default(),
        );
        scene.push(line);
        let mut eraser = Figure::start(FigureKind::Eraser, Point::new(0.0, 50.0), ColorIndex::default(), WidthIndex::default());
        eraser.extend_to(Point::new(100.0, 50.0));
        let id = eraser.id;
        scene.erasers.push(eraser);

        assert_eq!(o.eraser_point_added(&mut scene, &mut s, id, 0), 1);
        assert!(scene.figures[0].erased);
        // Already marked: not counted again.
        assert_eq!(o.eraser_point_added(&mut scene, &mut s, id, 5), 0);

        let removed = o.eraser_finished(&mut scene);
        assert_eq!(removed.len(), 1);
        assert!(scene.figures.is_empty());
    }

    #[test]
    fn fade_cycle_ramps_then_clears() {
        let t = timings();
        let mut o = Overlays::new(t);
        let mut scene = Scene::new();
        let mut s = Scheduler::new();
        scene.fade.push(laser(&[(0.0, 0.0), (10.0, 0.0)]));

        o.fade_stroke_started(&mut scene, &mut s);
        o.fade_stroke_ended(&scene, &mut s, 0);
        assert_eq!(o.fade_phase(), FadePhase::Waiting);

        drain(&mut o, &mut scene, &mut s, t.fade_idle_delay + t.fade_duration / 2);
        assert!(scene.fade_opacity > 0.4 && scene.fade_opacity < 0.6);
        assert_eq!(scene.fade_opacity, round2(scene.fade_opacity));

        drain(&mut o, &mut scene, &mut s, t.fade_idle_delay + t.fade_duration + 20);
        assert_eq!(scene.fade_opacity, 0.0);
        assert_eq!(scene.fade.len(), 1);

        drain(&mut o, &mut scene, &mut s, t.fade_idle_delay + t.fade_duration + t.fade_extra_delay + 40);
        assert!(scene.fade.is_empty());
        assert_eq!(scene.fade_opacity, 1.0);
        assert_eq!(o.fade_phase(), FadePhase::Idle);
    }

    #[test]
    fn pause_restores_opacity_and_stops_ramp() {
        let t = timings();
        let mut o = Overlays::new(t);
        let mut scene = Scene::new();
        let mut s = Scheduler::new();
        scene.fade.push(laser(&[(0.0, 0.0), (10.0, 0.0)]));
        o.fade_stroke_ended(&scene, &mut s, 0);
        drain(&mut o, &mut scene, &mut s, t.fade_idle_delay + 300);
        assert!(scene.fade_opacity < 1.0);

        let now = t.fade_idle_delay + 300;
        o.set_paused(true, &mut scene, &mut s, now);
        assert_eq!(scene.fade_opacity, 1.0);
        drain(&mut o, &mut scene, &mut s, now + 10_000);
        assert_eq!(scene.fade.len(), 1);

        o.set_paused(false, &mut scene, &mut s, now + 10_000);
        assert_eq!(o.fade_phase(), FadePhase::Waiting);
    }
}
