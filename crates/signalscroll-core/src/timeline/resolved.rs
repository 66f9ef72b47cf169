//! Timelines with their start and end values captured

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::trace;

use super::tween::TweenKind;
use super::{Entry, Repeat};
use crate::easing::Easing;
use crate::property::{Property, PropertySet};
use crate::stage::{Stage, TargetId};

/// One target's slice of a tween
#[derive(Debug, Clone)]
struct Track {
    target: TargetId,
    /// Seconds from the start of the iteration
    start: f64,
    duration: f64,
    repeat: u32,
    yoyo: bool,
    easing: Easing,
    from: PropertySet,
    to: PropertySet,
    /// Values held before the track starts
    leading: PropertySet,
}

impl Track {
    fn end_value(&self) -> &PropertySet {
        if self.yoyo && self.repeat % 2 == 1 {
            &self.from
        } else {
            &self.to
        }
    }

    fn value_at(&self, elapsed: f64) -> PropertySet {
        if elapsed < 0.0 {
            return self.leading.clone();
        }
        if self.duration <= 0.0 {
            return self.to.clone();
        }
        let span = self.duration * f64::from(self.repeat + 1);
        if elapsed >= span {
            return self.end_value().clone();
        }
        let cycles = elapsed / self.duration;
        let lap = cycles.floor();
        let frac = cycles - lap;
        if self.yoyo && (lap as u32) % 2 == 1 {
            self.from.lerp(&self.to, self.easing.apply(1.0 - frac))
        } else {
            self.from.lerp(&self.to, self.easing.apply(frac))
        }
    }
}

/// Which style a timeline captures its implicit start values from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Whatever the engine last rendered
    Current,
    /// The unanimated style, ignoring leftovers from earlier scenes
    Natural,
}

/// A timeline bound to concrete start and end values
///
/// Sampling is a pure function of time, so a scrubbed timeline can be moved
/// back and forth without drift.
#[derive(Debug, Clone)]
pub struct ResolvedTimeline {
    tracks: Vec<Track>,
    iteration: f64,
    repeat: Repeat,
    repeat_delay: f64,
}

impl ResolvedTimeline {
    pub(crate) fn build(
        entries: &[Entry],
        iteration: f64,
        repeat: Repeat,
        repeat_delay: f64,
        stage: &Stage,
        origin: Origin,
    ) -> Self {
        let mut ordered: Vec<&Entry> = entries.iter().collect();
        ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut running: HashMap<TargetId, PropertySet> = HashMap::new();
        let mut written: HashMap<TargetId, BTreeSet<Property>> = HashMap::new();
        let mut tracks = Vec::new();

        for entry in ordered {
            let tween = &entry.tween;
            let properties: Vec<Property> = tween.values.properties().collect();

            for (index, &target) in tween.targets.iter().enumerate() {
                let Some(element) = stage.get(target) else {
                    trace!("Skipping tween on a target that is not on stage");
                    continue;
                };
                let current = running
                    .entry(target)
                    .or_insert_with(|| match origin {
                        Origin::Current => element.style().clone(),
                        Origin::Natural => element.natural().clone(),
                    });
                let before = current.project(properties.iter().copied());

                let (from, to, held) = match tween.kind {
                    TweenKind::To => (before.clone(), tween.values.clone(), before),
                    TweenKind::From => (tween.values.clone(), before, tween.values.clone()),
                    TweenKind::Set => (tween.values.clone(), tween.values.clone(), before),
                };

                let seen = written.entry(target).or_default();
                let leading: PropertySet = held
                    .iter()
                    .filter(|(property, _)| !seen.contains(property))
                    .collect();
                seen.extend(properties.iter().copied());

                let track = Track {
                    target,
                    start: entry.start + tween.target_offset(index),
                    duration: tween.duration,
                    repeat: tween.repeat,
                    yoyo: tween.yoyo,
                    easing: tween.easing,
                    from,
                    to,
                    leading,
                };
                current.merge(track.end_value());
                tracks.push(track);
            }
        }

        Self {
            tracks,
            iteration,
            repeat,
            repeat_delay,
        }
    }

    pub fn iteration_secs(&self) -> f64 {
        self.iteration
    }

    /// Total play time in seconds; `None` when repeating forever
    pub fn total_secs(&self) -> Option<f64> {
        let extra = self.repeat.extra_iterations()?;
        Some(self.iteration * f64::from(extra + 1) + self.repeat_delay * f64::from(extra))
    }

    pub fn is_complete(&self, time: f64) -> bool {
        self.total_secs().is_some_and(|total| time >= total)
    }

    pub fn is_infinite(&self) -> bool {
        self.repeat == Repeat::Infinite
    }

    pub fn targets(&self) -> BTreeSet<TargetId> {
        self.tracks.iter().map(|t| t.target).collect()
    }

    /// Properties written per target
    pub fn touched(&self) -> BTreeMap<TargetId, BTreeSet<Property>> {
        let mut out: BTreeMap<TargetId, BTreeSet<Property>> = BTreeMap::new();
        for track in &self.tracks {
            out.entry(track.target)
                .or_default()
                .extend(track.to.properties());
        }
        out
    }

    /// Position inside the current iteration
    fn local_time(&self, time: f64) -> f64 {
        let time = time.max(0.0);
        if self.iteration <= 0.0 {
            return 0.0;
        }
        if let Some(total) = self.total_secs() {
            if time >= total {
                return self.iteration;
            }
        }
        let cycle = self.iteration + self.repeat_delay;
        let lap = (time / cycle).floor();
        (time - lap * cycle).min(self.iteration)
    }

    /// Values of every animated target `time` seconds after playback began
    pub fn sample(&self, time: f64) -> BTreeMap<TargetId, PropertySet> {
        self.sample_local(self.local_time(time))
    }

    /// Values at a fraction of one iteration, for scroll-scrubbed playback
    pub fn sample_progress(&self, progress: f64) -> BTreeMap<TargetId, PropertySet> {
        self.sample_local(progress.clamp(0.0, 1.0) * self.iteration)
    }

    fn sample_local(&self, local: f64) -> BTreeMap<TargetId, PropertySet> {
        let mut frame: BTreeMap<TargetId, PropertySet> = BTreeMap::new();
        for track in &self.tracks {
            let values = track.value_at(local - track.start);
            if values.is_empty() {
                continue;
            }
            frame.entry(track.target).or_default().merge(&values);
        }
        frame
    }
}
