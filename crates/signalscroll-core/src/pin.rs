//! Pinning and sticky-stacking
//!
//! A pinned region stays at a fixed viewport offset while the scroll
//! position is inside its range, then rejoins document flow shifted by the
//! pin length so nothing jumps. Placement is a pure function of the range
//! and the position, so scrolling back through a pin replays the phases in
//! reverse without residue.
//!
//! A [`StackSpec`] builds a sticky stack out of pins and scrubbed cover
//! effects: each card is pinned at the top and fades back under the next
//! card as that card slides over it.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::property::{Property, PropertySet};
use crate::stage::{Bounds, TargetId};
use crate::timeline::{Timeline, Tween};
use crate::trigger::{Anchor, BindingMode, Offset, RangeEnd, ScrollRange, TriggerSpec};

/// Where a pinned region is in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinPhase {
    /// Before the range (or no range at all)
    #[default]
    Unpinned,
    /// Inside the range, held in place
    Pinning,
    /// Past the range, back in flow
    Passed,
}

/// How a target is positioned relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Scrolls with the document, offset by `shift`
    Flow { shift: f64 },
    /// Held at a fixed offset from the viewport top
    Fixed { viewport_top: f64 },
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Flow { shift: 0.0 }
    }
}

impl Placement {
    /// Top edge relative to the viewport
    pub fn viewport_top(&self, bounds: Bounds, scroll: f64) -> f64 {
        match self {
            Placement::Flow { shift } => bounds.top + shift - scroll,
            Placement::Fixed { viewport_top } => *viewport_top,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Placement::Fixed { .. })
    }
}

/// Phase and placement of a region for a scroll position
pub fn place(range: Option<ScrollRange>, position: f64, bounds: Bounds) -> (PinPhase, Placement) {
    let Some(range) = range else {
        return (PinPhase::Unpinned, Placement::default());
    };
    if position < range.start {
        (PinPhase::Unpinned, Placement::default())
    } else if position < range.end {
        (
            PinPhase::Pinning,
            Placement::Fixed {
                viewport_top: bounds.top - range.start,
            },
        )
    } else {
        (
            PinPhase::Passed,
            Placement::Flow {
                shift: range.length(),
            },
        )
    }
}

/// Look applied to a card while the next one covers it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverEffect {
    pub scale: f64,
    pub blur: f64,
    pub opacity: f64,
}

impl Default for CoverEffect {
    fn default() -> Self {
        Self {
            scale: 0.9,
            blur: 20.0,
            opacity: 0.5,
        }
    }
}

impl CoverEffect {
    /// Values a fully covered card ends at
    pub fn to_values(&self) -> PropertySet {
        PropertySet::new()
            .with(Property::Scale, self.scale)
            .with(Property::Blur, self.blur)
            .with(Property::Opacity, self.opacity)
    }
}

/// A sticky stack of cards
///
/// Cards are listed in z-order: a card only ever covers the cards declared
/// before it.
#[derive(Debug, Clone)]
pub struct StackSpec {
    pub cards: Vec<TargetId>,
    pub pin_start: Anchor,
    pub pin_end: RangeEnd,
    /// Measured on the covering card
    pub cover_start: Anchor,
    pub cover_end: RangeEnd,
    pub effect: CoverEffect,
    /// Range, measured on the last card itself, over which it covers too
    pub trailing: Option<(Anchor, RangeEnd)>,
}

impl StackSpec {
    pub fn new(cards: impl IntoIterator<Item = TargetId>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
            pin_start: Anchor::top_top(),
            pin_end: RangeEnd::Relative(Offset::Percent(100.0)),
            cover_start: Anchor::top_top(),
            cover_end: RangeEnd::Relative(Offset::Percent(100.0)),
            effect: CoverEffect::default(),
            trailing: None,
        }
    }

    pub fn pin(mut self, start: Anchor, end: impl Into<RangeEnd>) -> Self {
        self.pin_start = start;
        self.pin_end = end.into();
        self
    }

    pub fn cover(mut self, start: Anchor, end: impl Into<RangeEnd>) -> Self {
        self.cover_start = start;
        self.cover_end = end.into();
        self
    }

    pub fn effect(mut self, effect: CoverEffect) -> Self {
        self.effect = effect;
        self
    }

    /// Let the last card play the cover effect as it scrolls away
    pub fn trailing_cover(mut self, start: Anchor, end: impl Into<RangeEnd>) -> Self {
        self.trailing = Some((start, end.into()));
        self
    }

    fn cover_binding(&self, covered: TargetId, trigger: TriggerSpec) -> (TriggerSpec, BindingMode) {
        let timeline = Timeline::single(
            Tween::to([covered], self.effect.to_values()).easing(Easing::Linear),
        );
        (trigger, BindingMode::scrubbed(timeline))
    }

    /// One pin per card plus one scrubbed cover per covered card, and the
    /// trailing cover when one is set
    pub fn bindings(&self) -> Vec<(TriggerSpec, BindingMode)> {
        let mut out = Vec::with_capacity(self.cards.len() * 2);
        for &card in &self.cards {
            out.push((
                TriggerSpec::new(card).start(self.pin_start).end(self.pin_end),
                BindingMode::Pinned,
            ));
        }
        for pair in self.cards.windows(2) {
            let (covered, covering) = (pair[0], pair[1]);
            out.push(self.cover_binding(
                covered,
                TriggerSpec::new(covering)
                    .start(self.cover_start)
                    .end(self.cover_end),
            ));
        }
        if let (Some(&last), Some((start, end))) = (self.cards.last(), self.trailing) {
            out.push(self.cover_binding(last, TriggerSpec::new(last).start(start).end(end)));
        }
        out
    }
}
