//! Scroll animation controller
//!
//! Combines the core easing curves with the timing helpers. Time is fed in
//! explicitly as frame deltas, the same clock the scroll engine runs on.

use std::time::Duration;

use signalscroll_core::Easing;

use super::config::ScrollSettings;
use super::timing::{is_complete, lerp, progress};

/// Active scroll animation state
#[derive(Debug, Clone)]
struct ActiveAnimation {
    elapsed: Duration,
    from: f64,
    to: f64,
    duration: Duration,
    easing: Easing,
}

/// Eases the document scroll offset towards a target
///
/// Call one of the `scroll_*` methods to move the target, then `update()`
/// each frame to get the current interpolated offset in document pixels.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    animation: Option<ActiveAnimation>,
    settings: ScrollSettings,
    current: f64,
    /// Pending delta for batching several key presses in one frame
    pending_delta: f64,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(ScrollSettings::default())
    }
}

impl ScrollAnimator {
    pub fn new(settings: ScrollSettings) -> Self {
        Self {
            animation: None,
            settings,
            current: 0.0,
            pending_delta: 0.0,
        }
    }

    pub fn settings(&self) -> &ScrollSettings {
        &self.settings
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Animation in flight or a delta waiting for the next frame
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.animation.is_some() || self.pending_delta != 0.0
    }

    /// Final offset once the running animation ends
    pub fn target(&self) -> f64 {
        self.animation
            .as_ref()
            .map(|a| a.to)
            .unwrap_or(self.current)
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Jump without animating
    pub fn set(&mut self, offset: f64) {
        self.animation = None;
        self.current = offset;
        self.pending_delta = 0.0;
    }

    /// Start an animation towards an absolute offset
    pub fn scroll_to(&mut self, target: f64, max_scroll: f64) {
        let target = target.clamp(0.0, max_scroll.max(0.0));

        if !self.settings.is_smooth() {
            self.set(target);
            return;
        }
        if (self.current - target).abs() < f64::EPSILON {
            self.animation = None;
            return;
        }
        self.start(target);
    }

    /// Move by a delta (positive = down); batched until the next `update`
    pub fn scroll_by(&mut self, delta: f64, max_scroll: f64) {
        if !self.settings.is_smooth() {
            let target = (self.current + delta).clamp(0.0, max_scroll.max(0.0));
            self.set(target);
            return;
        }
        self.pending_delta += delta;
    }

    pub fn scroll_down(&mut self, max_scroll: f64) {
        self.scroll_by(self.settings.step_px, max_scroll);
    }

    pub fn scroll_up(&mut self, max_scroll: f64) {
        self.scroll_by(-self.settings.step_px, max_scroll);
    }

    pub fn half_page_down(&mut self, viewport_height: f64, max_scroll: f64) {
        self.scroll_by(viewport_height / 2.0, max_scroll);
    }

    pub fn half_page_up(&mut self, viewport_height: f64, max_scroll: f64) {
        self.scroll_by(-viewport_height / 2.0, max_scroll);
    }

    pub fn page_down(&mut self, viewport_height: f64, max_scroll: f64) {
        self.scroll_by(viewport_height, max_scroll);
    }

    pub fn page_up(&mut self, viewport_height: f64, max_scroll: f64) {
        self.scroll_by(-viewport_height, max_scroll);
    }

    fn start(&mut self, target: f64) {
        self.animation = Some(ActiveAnimation {
            elapsed: Duration::ZERO,
            from: self.current,
            to: target,
            duration: self.settings.animation_duration,
            easing: self.settings.easing,
        });
    }

    /// Advance by one frame and return the current offset
    pub fn update(&mut self, dt: Duration, max_scroll: f64) -> f64 {
        let max_scroll = max_scroll.max(0.0);

        if self.pending_delta != 0.0 {
            let target = (self.target() + self.pending_delta).clamp(0.0, max_scroll);
            self.pending_delta = 0.0;
            if (target - self.current).abs() >= f64::EPSILON {
                // the new leg starts now; this frame's dt belongs to the old one
                self.start(target);
                return self.current;
            }
        }

        if let Some(anim) = self.animation.as_mut() {
            anim.elapsed += dt;
            if is_complete(anim.elapsed, anim.duration) {
                self.current = anim.to.min(max_scroll);
                self.animation = None;
            } else {
                let t = anim.easing.apply(progress(anim.elapsed, anim.duration));
                self.current = lerp(anim.from, anim.to, t).min(max_scroll);
            }
        }

        self.current
    }

    /// Stop where the animation currently is
    pub fn cancel(&mut self) {
        self.animation = None;
        self.pending_delta = 0.0;
    }
}
