//! Timeline primitive
//!
//! A timeline sequences tweens in time and optionally repeats the whole
//! sequence. Building a timeline is declarative; [`Timeline::resolve`]
//! captures the start/end values from the stage and produces a
//! [`ResolvedTimeline`], a pure function of time (or progress) to property
//! values. Resolved timelines never keep counters between samples, so they
//! can be scrubbed back and forth freely.
//!
//! ```ignore
//! let intro = Timeline::new()
//!     .then(Tween::from(lines, PropertySet::new().with(Property::Y, 40.0))
//!         .duration(Duration::from_millis(1200))
//!         .stagger(Duration::from_millis(80)));
//! let resolved = intro.resolve(&stage);
//! let frame = resolved.sample(0.6);
//! ```

mod resolved;
mod tween;

use std::collections::BTreeSet;
use std::time::Duration;

pub use resolved::{Origin, ResolvedTimeline};
pub use tween::{Tween, TweenKind};

use crate::stage::{Stage, TargetId};

/// How many times a timeline plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Extra iterations after the first
    Count(u32),
    /// Never completes; must be cancelled
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(0)
    }
}

impl Repeat {
    pub(crate) fn extra_iterations(&self) -> Option<u32> {
        match self {
            Repeat::Count(n) => Some(*n),
            Repeat::Infinite => None,
        }
    }
}

/// Where a tween is placed on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// Right after the previous step ends
    Sequence,
    /// Absolute time from the timeline start
    At(Duration),
    /// Starts this long before the previous step ends
    Overlap(Duration),
    /// Starts this long after the previous step ends
    Gap(Duration),
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) start: f64,
    pub(crate) tween: Tween,
}

/// Sequenced, repeatable set of tweens
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<Entry>,
    /// End of the most recently added step
    cursor: f64,
    repeat: Repeat,
    repeat_delay: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline holding a single tween
    pub fn single(tween: Tween) -> Self {
        Self::new().then(tween)
    }

    /// Append a tween after the previous one
    pub fn then(self, tween: Tween) -> Self {
        self.at(tween, Position::Sequence)
    }

    /// Place a tween at an explicit position
    pub fn at(mut self, tween: Tween, position: Position) -> Self {
        let start = match position {
            Position::Sequence => self.cursor,
            Position::At(at) => at.as_secs_f64(),
            Position::Overlap(by) => (self.cursor - by.as_secs_f64()).max(0.0),
            Position::Gap(by) => self.cursor + by.as_secs_f64(),
        };
        self.cursor = start + tween.span();
        self.entries.push(Entry { start, tween });
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Pause between iterations
    pub fn repeat_delay(mut self, delay: Duration) -> Self {
        self.repeat_delay = delay.as_secs_f64();
        self
    }

    pub fn is_infinite(&self) -> bool {
        self.repeat == Repeat::Infinite
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of one iteration in seconds
    ///
    /// For steps appended with [`Timeline::then`] this is the sum of their
    /// durations and delays.
    pub fn iteration_secs(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.start + e.tween.span())
            .fold(0.0, f64::max)
    }

    /// Total play time; `None` for infinite timelines
    pub fn total_duration(&self) -> Option<Duration> {
        let extra = self.repeat.extra_iterations()?;
        let secs = self.iteration_secs() * f64::from(extra + 1) + self.repeat_delay * f64::from(extra);
        Some(Duration::from_secs_f64(secs))
    }

    /// Every target touched by the timeline
    pub fn targets(&self) -> BTreeSet<TargetId> {
        self.entries
            .iter()
            .flat_map(|e| e.tween.targets.iter().copied())
            .collect()
    }

    /// Capture start and end values from the stage
    pub fn resolve(&self, stage: &Stage) -> ResolvedTimeline {
        self.resolve_from(stage, Origin::Current)
    }

    pub fn resolve_from(&self, stage: &Stage, origin: Origin) -> ResolvedTimeline {
        ResolvedTimeline::build(
            &self.entries,
            self.iteration_secs(),
            self.repeat,
            self.repeat_delay,
            stage,
            origin,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::property::{Property, PropertySet};
    use crate::stage::Bounds;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn stage_with(names: &[&str]) -> (Stage, Vec<TargetId>) {
        let mut stage = Stage::new();
        let ids = names
            .iter()
            .map(|n| stage.insert(*n, Bounds::new(0.0, 10.0), PropertySet::new()))
            .collect();
        (stage, ids)
    }

    #[test]
    fn test_total_duration_is_sum_of_steps_and_delays() {
        let (_, ids) = stage_with(&["a"]);
        let timeline = Timeline::new()
            .then(Tween::to(ids.clone(), PropertySet::new().with(Property::X, 10.0)).duration(ms(1000)))
            .then(
                Tween::to(ids.clone(), PropertySet::new().with(Property::X, 0.0))
                    .duration(ms(500))
                    .delay(ms(250)),
            );
        assert_eq!(timeline.total_duration(), Some(ms(1750)));
    }

    #[test]
    fn test_repeat_count_and_delay() {
        let (_, ids) = stage_with(&["a"]);
        let timeline = Timeline::single(Tween::to(ids, PropertySet::new()).duration(ms(1000)))
            .repeat(Repeat::Count(2))
            .repeat_delay(ms(500));
        // three iterations, two pauses
        assert_eq!(timeline.total_duration(), Some(ms(4000)));
    }

    #[test]
    fn test_infinite_has_no_total() {
        let (_, ids) = stage_with(&["a"]);
        let timeline = Timeline::single(Tween::to(ids, PropertySet::new())).repeat(Repeat::Infinite);
        assert!(timeline.is_infinite());
        assert_eq!(timeline.total_duration(), None);
    }

    #[test]
    fn test_overlap_position() {
        let (_, ids) = stage_with(&["cursor", "cell"]);
        let timeline = Timeline::new()
            .then(Tween::to([ids[0]], PropertySet::new().with(Property::X, 80.0)).duration(ms(1000)))
            .at(
                Tween::to([ids[1]], PropertySet::new().with(Property::Opacity, 0.5)).duration(ms(200)),
                Position::Overlap(ms(200)),
            );
        // second step starts at 0.8 and ends at 1.0
        assert!((timeline.iteration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_targets_are_collected() {
        let (_, ids) = stage_with(&["a", "b"]);
        let timeline = Timeline::new()
            .then(Tween::to([ids[0]], PropertySet::new()).easing(Easing::Linear))
            .then(Tween::set(ids.clone(), PropertySet::new()));
        assert_eq!(timeline.targets().len(), 2);
    }
}
