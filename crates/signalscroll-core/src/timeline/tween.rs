//! Single interpolation step over one or more targets

use std::time::Duration;

use crate::easing::Easing;
use crate::property::PropertySet;
use crate::stage::TargetId;

/// Direction of a tween relative to the target's current values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenKind {
    /// Animate from the current value to the given values
    To,
    /// Animate from the given values back to the current value
    From,
    /// Jump to the given values with no duration
    Set,
}

/// Interpolation of a property set across a group of targets
#[derive(Debug, Clone)]
pub struct Tween {
    pub(crate) kind: TweenKind,
    pub(crate) targets: Vec<TargetId>,
    pub(crate) values: PropertySet,
    /// Seconds
    pub(crate) duration: f64,
    pub(crate) easing: Easing,
    pub(crate) delay: f64,
    pub(crate) stagger: f64,
    pub(crate) repeat: u32,
    pub(crate) yoyo: bool,
}

impl Tween {
    fn new(kind: TweenKind, targets: impl IntoIterator<Item = TargetId>, values: PropertySet) -> Self {
        Self {
            kind,
            targets: targets.into_iter().collect(),
            values,
            duration: if kind == TweenKind::Set { 0.0 } else { 0.5 },
            easing: Easing::default(),
            delay: 0.0,
            stagger: 0.0,
            repeat: 0,
            yoyo: false,
        }
    }

    pub fn to(targets: impl IntoIterator<Item = TargetId>, values: PropertySet) -> Self {
        Self::new(TweenKind::To, targets, values)
    }

    /// Entrance-style tween: starts at `values`, ends at the natural style
    pub fn from(targets: impl IntoIterator<Item = TargetId>, values: PropertySet) -> Self {
        Self::new(TweenKind::From, targets, values)
    }

    pub fn set(targets: impl IntoIterator<Item = TargetId>, values: PropertySet) -> Self {
        Self::new(TweenKind::Set, targets, values)
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        if self.kind != TweenKind::Set {
            self.duration = duration.as_secs_f64();
        }
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay.as_secs_f64();
        self
    }

    /// Start offset between consecutive targets
    pub fn stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger.as_secs_f64();
        self
    }

    /// Extra plays of the tween after the first
    pub fn repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// Reverse direction on every other repeat
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn kind(&self) -> TweenKind {
        self.kind
    }

    pub fn targets(&self) -> &[TargetId] {
        &self.targets
    }

    /// Time one target spends animating, repeats included
    pub(crate) fn target_span(&self) -> f64 {
        self.duration * f64::from(self.repeat + 1)
    }

    /// Start offset of the `index`-th target
    pub(crate) fn target_offset(&self, index: usize) -> f64 {
        self.delay + self.stagger * index as f64
    }

    /// Time from the tween's position to the last target finishing
    pub fn span(&self) -> f64 {
        let last = self.targets.len().saturating_sub(1);
        self.target_offset(last) + self.target_span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;
    use slotmap::SlotMap;

    #[test]
    fn test_span_with_stagger() {
        let mut ids: SlotMap<TargetId, ()> = SlotMap::with_key();
        let targets: Vec<_> = (0..5).map(|_| ids.insert(())).collect();

        let tween = Tween::from(targets, PropertySet::new().with(Property::Opacity, 0.0))
            .duration(Duration::from_millis(1200))
            .stagger(Duration::from_millis(80))
            .delay(Duration::from_millis(200));

        // 0.2 delay + 4 * 0.08 stagger + 1.2 duration
        assert!((tween.span() - 1.72).abs() < 1e-9);
    }

    #[test]
    fn test_set_has_no_duration() {
        let tween = Tween::set(Vec::new(), PropertySet::new()).duration(Duration::from_secs(3));
        assert_eq!(tween.span(), 0.0);
    }

    #[test]
    fn test_repeat_extends_span() {
        let tween = Tween::to(Vec::new(), PropertySet::new())
            .duration(Duration::from_millis(100))
            .repeat(1)
            .yoyo(true);
        assert!((tween.span() - 0.2).abs() < 1e-9);
    }
}
