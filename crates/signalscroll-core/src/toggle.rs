//! Two-state style toggle driven by a scroll threshold

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::easing::Easing;
use crate::property::PropertySet;
use crate::stage::TargetId;

/// Longest allowed transition between the two styles
pub const MAX_TRANSITION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    /// At or above the threshold (top of the page)
    Inactive,
    /// Scrolled past the threshold
    Active,
}

impl ToggleState {
    pub fn for_position(position: f64, threshold: f64) -> Self {
        if position > threshold {
            ToggleState::Active
        } else {
            ToggleState::Inactive
        }
    }
}

/// Threshold and the two canonical styles
#[derive(Debug, Clone)]
pub struct ToggleSpec {
    /// Element the style is written to, if any
    pub target: Option<TargetId>,
    pub threshold: f64,
    pub inactive: PropertySet,
    pub active: PropertySet,
    pub duration: Duration,
    pub easing: Easing,
}

impl ToggleSpec {
    pub fn new(threshold: f64, inactive: PropertySet, active: PropertySet) -> Self {
        Self {
            target: None,
            threshold,
            inactive,
            active,
            duration: MAX_TRANSITION,
            easing: Easing::default(),
        }
    }

    pub fn target(mut self, target: TargetId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    fn style_for(&self, state: ToggleState) -> &PropertySet {
        match state {
            ToggleState::Inactive => &self.inactive,
            ToggleState::Active => &self.active,
        }
    }
}

#[derive(Debug, Clone)]
struct Transition {
    from: PropertySet,
    started: f64,
}

/// Runs a [`ToggleSpec`] against scroll updates and frame ticks
#[derive(Debug, Clone)]
pub struct ToggleController {
    spec: ToggleSpec,
    /// Seconds
    duration: f64,
    state: Option<ToggleState>,
    style: PropertySet,
    transition: Option<Transition>,
    transitions_started: u64,
}

impl ToggleController {
    pub fn new(spec: ToggleSpec) -> Self {
        let duration = if spec.duration > MAX_TRANSITION {
            warn!(
                requested_ms = spec.duration.as_millis() as u64,
                "Toggle transition too long, clamping to 300ms"
            );
            MAX_TRANSITION
        } else {
            spec.duration
        };
        Self {
            style: spec.inactive.clone(),
            duration: duration.as_secs_f64(),
            spec,
            state: None,
            transition: None,
            transitions_started: 0,
        }
    }

    pub fn spec(&self) -> &ToggleSpec {
        &self.spec
    }

    /// Snap to the state for `position` without animating
    pub fn sync(&mut self, position: f64) -> ToggleState {
        let state = ToggleState::for_position(position, self.spec.threshold);
        self.state = Some(state);
        self.style = self.spec.style_for(state).clone();
        self.transition = None;
        state
    }

    /// React to a scroll update; returns the new state when it changed
    ///
    /// The first evaluation only syncs; every later change of side starts a
    /// transition from whatever style is currently showing.
    pub fn evaluate(&mut self, position: f64, now: f64) -> Option<ToggleState> {
        let next = ToggleState::for_position(position, self.spec.threshold);
        let Some(current) = self.state else {
            self.sync(position);
            return None;
        };
        if next == current {
            return None;
        }

        self.advance(now);
        self.state = Some(next);
        self.transitions_started += 1;
        debug!(?next, position, "Toggle crossed threshold");

        if self.duration <= 0.0 {
            self.style = self.spec.style_for(next).clone();
            self.transition = None;
        } else {
            self.transition = Some(Transition {
                from: self.style.clone(),
                started: now,
            });
        }
        Some(next)
    }

    /// Move the running transition to `now`; returns true while still animating
    pub fn advance(&mut self, now: f64) -> bool {
        let (Some(transition), Some(state)) = (&self.transition, self.state) else {
            return false;
        };
        let target = self.spec.style_for(state);
        let t = ((now - transition.started) / self.duration).clamp(0.0, 1.0);
        if t >= 1.0 {
            self.style = target.clone();
            self.transition = None;
            return false;
        }
        let eased = self.spec.easing.apply(t).clamp(0.0, 1.0);
        self.style = transition.from.lerp(target, eased);
        true
    }

    pub fn state(&self) -> ToggleState {
        self.state.unwrap_or(ToggleState::Inactive)
    }

    /// Style currently showing, mid-transition values included
    pub fn style(&self) -> &PropertySet {
        &self.style
    }

    pub fn transitions_started(&self) -> u64 {
        self.transitions_started
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }
}
