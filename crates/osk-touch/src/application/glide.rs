//! Glide typing handoff.
//!
//! Glide typing lets the user draw a word by sliding across its letters.  The
//! touch controller does not decode words; it only decides *who owns the
//! pointer*.  A [`GlideDetector`] is offered every sample before normal
//! processing.  Once it claims the gesture, the controller cancels all key
//! presses and stops running its own tap and swipe logic until the glide
//! completes or is cancelled.
//!
//! The controller also keeps the glide trail for drawing and fades it out
//! after the glide ends: the dot radius shrinks from [`TRAIL_RADIUS`] to zero
//! along an accelerating curve, `r = 20 · (1 − t²)`, one frame every
//! [`FADE_FRAME_MS`].

use kurbo::Point;
use osk_core::{Key, PointerId, TouchAction, TouchSample, TrailDot};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::key_press::TouchState;
use super::scheduler::{TimerId, TimerTask};
use super::settings::GlideSettings;

/// Radius of a live trail dot, and the starting radius of the fade.
pub const TRAIL_RADIUS: f64 = 20.0;
/// Interval between trail fade frames.
pub const FADE_FRAME_MS: u64 = 16;

/// One point of a glide path in keyboard-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlidePoint {
    pub x: f64,
    pub y: f64,
    pub time_ms: u64,
}

/// Callbacks from a glide detector.
pub trait GlideListener {
    fn on_glide_add_point(&mut self, point: GlidePoint);
    fn on_glide_complete(&mut self, path: &[GlidePoint]);
    fn on_glide_cancelled(&mut self);
}

/// Competes with key presses for ownership of a touch.
pub trait GlideDetector: Send {
    /// Offered every keyboard-local sample.  `initial_key` is the first key
    /// touched by the pointer in slot 0.  Returns `true` while the detector
    /// owns the gesture.
    fn on_touch_event(
        &mut self,
        sample: &TouchSample,
        initial_key: Option<&Key>,
        listener: &mut dyn GlideListener,
    ) -> bool;
}

// ── Reference detector ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct GlideStart {
    pointer: PointerId,
    point: GlidePoint,
}

/// Claims a single-finger touch that starts on a letter and quickly travels
/// further than one key width.
#[derive(Debug)]
pub struct ThresholdGlideDetector {
    detect_window_ms: u64,
    velocity_threshold: f64,
    start: Option<GlideStart>,
    path: Vec<GlidePoint>,
    gliding: bool,
}

impl ThresholdGlideDetector {
    pub fn new(settings: &GlideSettings) -> Self {
        Self {
            detect_window_ms: settings.detect_window_ms,
            velocity_threshold: settings.velocity_threshold,
            start: None,
            path: Vec::new(),
            gliding: false,
        }
    }

    pub fn is_gliding(&self) -> bool {
        self.gliding
    }

    fn reset(&mut self) {
        self.start = None;
        self.path.clear();
        self.gliding = false;
    }

    fn cancel(&mut self, listener: &mut dyn GlideListener) -> bool {
        let was_gliding = self.gliding;
        self.reset();
        if was_gliding {
            debug!("glide cancelled");
            listener.on_glide_cancelled();
        }
        was_gliding
    }

    fn on_move(&mut self, sample: &TouchSample, initial_key: Option<&Key>, listener: &mut dyn GlideListener) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        let Some(p) = sample.pointer(start.pointer) else {
            return false;
        };
        let point = GlidePoint {
            x: p.x,
            y: p.y,
            time_ms: sample.time_ms,
        };
        if self.gliding {
            self.path.push(point);
            listener.on_glide_add_point(point);
            return true;
        }

        let Some(key) = initial_key.filter(|k| k.code().is_letter()) else {
            return false;
        };
        let elapsed = point.time_ms.saturating_sub(start.point.time_ms);
        if elapsed > self.detect_window_ms {
            self.start = None;
            return false;
        }
        let distance = Point::new(start.point.x, start.point.y).distance(Point::new(point.x, point.y));
        let speed = distance / elapsed.max(1) as f64;
        if distance <= key.touch_bounds.width() || speed < self.velocity_threshold {
            return false;
        }

        debug!(pointer = start.pointer.0, distance, speed, "glide started");
        self.gliding = true;
        for p in [start.point, point] {
            self.path.push(p);
            listener.on_glide_add_point(p);
        }
        true
    }
}

impl GlideDetector for ThresholdGlideDetector {
    fn on_touch_event(
        &mut self,
        sample: &TouchSample,
        initial_key: Option<&Key>,
        listener: &mut dyn GlideListener,
    ) -> bool {
        match sample.action {
            TouchAction::Down => {
                self.reset();
                self.start = sample.action_pointer().map(|p| GlideStart {
                    pointer: p.id,
                    point: GlidePoint {
                        x: p.x,
                        y: p.y,
                        time_ms: sample.time_ms,
                    },
                });
                false
            }
            // A second finger ends any chance of gliding.
            TouchAction::PointerDown => self.cancel(listener),
            TouchAction::Move => self.on_move(sample, initial_key, listener),
            TouchAction::PointerUp | TouchAction::Up => {
                if !self.gliding {
                    if sample.action == TouchAction::Up {
                        self.reset();
                    }
                    return false;
                }
                let path = std::mem::take(&mut self.path);
                self.reset();
                debug!(points = path.len(), "glide complete");
                listener.on_glide_complete(&path);
                true
            }
            TouchAction::Cancel => self.cancel(listener),
            TouchAction::Hover => false,
        }
    }
}

// ── Trail ─────────────────────────────────────────────────────────────────────

/// Radius of a fading trail dot `elapsed_ms` into a fade of `duration_ms`.
pub fn fade_radius(elapsed_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    let t = (elapsed_ms as f64 / duration_ms as f64).min(1.0);
    TRAIL_RADIUS * (1.0 - t * t)
}

/// Glide trail kept for drawing.
#[derive(Debug, Default)]
pub struct GlideTrail {
    live: Vec<GlidePoint>,
    fading: Vec<GlidePoint>,
    fade_start_ms: Option<u64>,
    fade_radius: f64,
    frame_timer: Option<TimerId>,
}

impl GlideTrail {
    pub fn is_gliding(&self) -> bool {
        !self.live.is_empty()
    }

    pub fn is_fading(&self) -> bool {
        self.fade_start_ms.is_some()
    }

    pub fn fade_radius(&self) -> f64 {
        self.fade_radius
    }

    /// Live dots at full radius followed by fading dots at the current fade
    /// radius.
    pub fn dots(&self) -> Vec<TrailDot> {
        let live = self.live.iter().map(|p| (p, TRAIL_RADIUS));
        let fading = self.fading.iter().map(|p| (p, self.fade_radius));
        live.chain(fading)
            .map(|(p, radius)| TrailDot {
                center: Point::new(p.x, p.y),
                radius,
            })
            .collect()
    }

    fn push(&mut self, point: GlidePoint) {
        self.live.push(point);
    }

    fn start_fade(&mut self, now_ms: u64) {
        self.fading = std::mem::take(&mut self.live);
        self.fade_start_ms = Some(now_ms);
        self.fade_radius = TRAIL_RADIUS;
    }

    /// Advances the fade; returns `false` once it has finished.
    fn update_fade(&mut self, now_ms: u64, duration_ms: u64) -> bool {
        let Some(start) = self.fade_start_ms else {
            return false;
        };
        let elapsed = now_ms.saturating_sub(start);
        self.fade_radius = fade_radius(elapsed, duration_ms);
        if elapsed >= duration_ms {
            self.fading.clear();
            self.fade_start_ms = None;
            return false;
        }
        true
    }

    fn clear(&mut self) {
        self.live.clear();
        self.fading.clear();
        self.fade_start_ms = None;
        self.fade_radius = 0.0;
    }
}

// ── Controller side ───────────────────────────────────────────────────────────

impl TouchState {
    fn end_glide(&mut self) {
        if let Some(frame) = self.trail.frame_timer.take() {
            self.timers.cancel(frame);
        }
        if self.settings.glide.show_trail {
            self.trail.start_fade(self.now_ms);
            self.trail.frame_timer = Some(
                self.timers
                    .schedule(self.now_ms + FADE_FRAME_MS, TimerTask::GlideFadeFrame),
            );
        } else {
            self.trail.clear();
        }
    }

    pub(crate) fn on_fade_frame(&mut self, timer: TimerId) {
        if self.trail.frame_timer != Some(timer) {
            return;
        }
        self.trail.frame_timer = None;
        if self
            .trail
            .update_fade(self.now_ms, self.settings.glide.trail_duration_ms)
        {
            trace!(radius = self.trail.fade_radius, "glide trail frame");
            self.trail.frame_timer = Some(
                self.timers
                    .schedule(self.now_ms + FADE_FRAME_MS, TimerTask::GlideFadeFrame),
            );
        }
    }
}

impl GlideListener for TouchState {
    fn on_glide_add_point(&mut self, point: GlidePoint) {
        if self.settings.glide.enabled {
            self.trail.push(point);
        }
    }

    fn on_glide_complete(&mut self, path: &[GlidePoint]) {
        self.collab.glide_decoder.decode(path);
        self.end_glide();
    }

    fn on_glide_cancelled(&mut self) {
        self.end_glide();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
