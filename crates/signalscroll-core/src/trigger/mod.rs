//! Trigger bindings: scroll ranges on reference regions
//!
//! # Layers
//!
//! - `anchor` - element/viewport anchor parsing and resolution
//! - `range` - half-open scroll ranges, progress and range ends
//!
//! A [`TriggerSpec`] describes a range declaratively; the engine resolves it
//! against the current layout every time layout changes.

pub mod anchor;
pub mod range;

use tracing::trace;

pub use anchor::{Anchor, Offset};
pub use range::{RangeEnd, ScrollRange, Side};

use crate::stage::{Bounds, Stage, TargetId};
use crate::timeline::Timeline;

/// Declarative description of a scroll range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSpec {
    /// Reference element; `None` means the whole document
    pub trigger: Option<TargetId>,
    pub start: Anchor,
    pub end: RangeEnd,
}

impl TriggerSpec {
    /// Range starting when the element enters from below and ending when it
    /// has left through the top
    pub fn new(trigger: TargetId) -> Self {
        Self {
            trigger: Some(trigger),
            start: Anchor::top_bottom(),
            end: RangeEnd::default(),
        }
    }

    /// Range measured against the document itself
    pub fn document() -> Self {
        Self {
            trigger: None,
            start: Anchor::top_top(),
            end: RangeEnd::Anchor {
                trigger: None,
                anchor: Anchor::bottom_bottom(),
            },
        }
    }

    pub fn start(mut self, start: Anchor) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: impl Into<RangeEnd>) -> Self {
        self.end = end.into();
        self
    }

    /// Resolve against the current layout
    ///
    /// Returns `None` ("never triggers") when a referenced element is gone,
    /// has zero height, or the resolved interval is empty.
    pub fn resolve(&self, stage: &Stage, viewport_height: f64) -> Option<ScrollRange> {
        let bounds = reference_bounds(stage, self.trigger, viewport_height)?;
        let start = self.start.resolve(bounds, viewport_height);
        let end = match self.end {
            RangeEnd::Anchor { trigger, anchor } => {
                let end_bounds = match trigger {
                    Some(other) => reference_bounds(stage, Some(other), viewport_height)?,
                    None => bounds,
                };
                anchor.resolve(end_bounds, viewport_height)
            }
            RangeEnd::Relative(offset) => start + offset.resolve(viewport_height),
            RangeEnd::Absolute(offset) => offset,
        };
        let range = ScrollRange::new(start, end);
        if range.is_none() {
            trace!(start, end, "Trigger range is empty and will never fire");
        }
        range
    }
}

fn reference_bounds(stage: &Stage, trigger: Option<TargetId>, viewport_height: f64) -> Option<Bounds> {
    match trigger {
        Some(id) => {
            let bounds = stage.get(id)?.bounds();
            if bounds.height <= 0.0 {
                trace!("Zero-height trigger region never fires");
                return None;
            }
            Some(bounds)
        }
        None => Some(Bounds::new(
            0.0,
            stage.document_height().max(viewport_height),
        )),
    }
}

/// What a binding does with its range
#[derive(Debug, Clone)]
pub enum BindingMode {
    /// Play a timeline once per entry transition
    OneShot {
        timeline: Timeline,
        /// Non-restartable bindings fire at most once
        restartable: bool,
    },
    /// Map scroll progress onto timeline progress
    Scrubbed { timeline: Option<Timeline> },
    /// Fix the trigger element to the viewport while inside the range
    Pinned,
}

impl BindingMode {
    pub fn one_shot(timeline: Timeline) -> Self {
        BindingMode::OneShot {
            timeline,
            restartable: false,
        }
    }

    pub fn restartable(timeline: Timeline) -> Self {
        BindingMode::OneShot {
            timeline,
            restartable: true,
        }
    }

    pub fn scrubbed(timeline: Timeline) -> Self {
        BindingMode::Scrubbed {
            timeline: Some(timeline),
        }
    }

    /// Scrubbed binding that only reports progress
    pub fn progress_only() -> Self {
        BindingMode::Scrubbed { timeline: None }
    }
}

/// Whether moving from `previous` to `current` passes into or through the range
///
/// Jumping clean across the range in one update counts as passing through it.
pub fn is_entry(previous: Option<Side>, current: Side) -> bool {
    match (previous, current) {
        (Some(Side::Inside), Side::Inside) => false,
        (_, Side::Inside) => true,
        (Some(Side::Before), Side::After) | (Some(Side::After), Side::Before) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertySet;

    #[test]
    fn test_entry_transitions() {
        assert!(is_entry(None, Side::Inside));
        assert!(is_entry(Some(Side::Before), Side::Inside));
        assert!(is_entry(Some(Side::After), Side::Inside));
        assert!(!is_entry(Some(Side::Inside), Side::Inside));
        assert!(!is_entry(Some(Side::Inside), Side::After));
        assert!(!is_entry(None, Side::After));
        assert!(is_entry(Some(Side::Before), Side::After));
    }

    #[test]
    fn test_resolve_relative_end() {
        let mut stage = Stage::new();
        let card = stage.insert("card", Bounds::new(1000.0, 1000.0), PropertySet::new());
        let spec = TriggerSpec::new(card)
            .start(Anchor::top_top())
            .end("+=100%".parse::<RangeEnd>().unwrap());
        let range = spec.resolve(&stage, 1000.0).unwrap();
        assert_eq!(range, ScrollRange::new(1000.0, 2000.0).unwrap());
    }

    #[test]
    fn test_resolve_end_trigger() {
        let mut stage = Stage::new();
        let container = stage.insert("protocol", Bounds::new(500.0, 3000.0), PropertySet::new());
        let card = stage.insert("card", Bounds::new(500.0, 1000.0), PropertySet::new());
        let spec = TriggerSpec::new(card)
            .start(Anchor::top_top())
            .end(RangeEnd::on(container, Anchor::bottom_bottom()));
        let range = spec.resolve(&stage, 1000.0).unwrap();
        assert_eq!(range.start, 500.0);
        assert_eq!(range.end, 2500.0);
    }

    #[test]
    fn test_zero_height_never_triggers() {
        let mut stage = Stage::new();
        let flat = stage.insert("flat", Bounds::new(100.0, 0.0), PropertySet::new());
        assert!(TriggerSpec::new(flat).resolve(&stage, 800.0).is_none());
    }

    #[test]
    fn test_missing_trigger_never_triggers() {
        let mut stage = Stage::new();
        let gone = stage.insert("gone", Bounds::new(0.0, 10.0), PropertySet::new());
        stage.remove(gone);
        assert!(TriggerSpec::new(gone).resolve(&stage, 800.0).is_none());
    }

    #[test]
    fn test_document_trigger() {
        let stage = Stage::new();
        let spec = TriggerSpec::document()
            .start("top -100px".parse().unwrap())
            .end(RangeEnd::Absolute(99999.0));
        let range = spec.resolve(&stage, 800.0).unwrap();
        assert_eq!(range.start, 100.0);
        assert_eq!(range.end, 99999.0);
    }
}
