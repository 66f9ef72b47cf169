//! Rendered elements known to the engine
//!
//! The stage holds every target's layout box, its natural style and the
//! style the running animations have written to it. Targets come and go
//! with the presentation layer; writes to a target that is gone are
//! ignored.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::pin::Placement;
use crate::property::{Property, PropertySet, PropertyValue};

new_key_type! {
    /// Handle to an element registered on the stage
    pub struct TargetId;
}

/// Vertical layout box in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Size of the visible window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A rendered element
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    bounds: Bounds,
    natural: PropertySet,
    current: PropertySet,
    placement: Placement,
}

impl Target {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Style the element has with no animation applied
    pub fn natural(&self) -> &PropertySet {
        &self.natural
    }

    /// Style as last written by the engine (natural values underneath)
    pub fn style(&self) -> &PropertySet {
        &self.current
    }

    pub fn value(&self, property: Property) -> PropertyValue {
        self.current.value(property)
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Top edge relative to the viewport at the given scroll position
    pub fn viewport_top(&self, scroll: f64) -> f64 {
        self.placement.viewport_top(self.bounds, scroll)
    }
}

/// Registry of rendered elements
#[derive(Debug, Default)]
pub struct Stage {
    targets: SlotMap<TargetId, Target>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bounds: Bounds, natural: PropertySet) -> TargetId {
        self.targets.insert(Target {
            name: name.into(),
            bounds,
            current: natural.clone(),
            natural,
            placement: Placement::default(),
        })
    }

    pub fn remove(&mut self, id: TargetId) -> Option<Target> {
        self.targets.remove(id)
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id)
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.targets.contains_key(id)
    }

    pub fn find(&self, name: &str) -> Option<TargetId> {
        self.targets
            .iter()
            .find(|(_, target)| target.name == name)
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Lowest document edge of any target
    pub fn document_height(&self) -> f64 {
        self.targets
            .values()
            .map(|t| t.bounds.bottom())
            .fold(0.0, f64::max)
    }

    /// Write animated values; returns false if the target is gone
    pub fn apply(&mut self, id: TargetId, values: &PropertySet) -> bool {
        match self.targets.get_mut(id) {
            Some(target) => {
                target.current.merge(values);
                true
            }
            None => {
                trace!("Ignoring style write to removed target");
                false
            }
        }
    }

    pub fn set_bounds(&mut self, id: TargetId, bounds: Bounds) -> bool {
        match self.targets.get_mut(id) {
            Some(target) => {
                target.bounds = bounds;
                true
            }
            None => false,
        }
    }

    pub fn set_placement(&mut self, id: TargetId, placement: Placement) -> bool {
        match self.targets.get_mut(id) {
            Some(target) => {
                target.placement = placement;
                true
            }
            None => {
                trace!("Ignoring placement write to removed target");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_over_natural() {
        let mut stage = Stage::new();
        let natural = PropertySet::new().with(Property::Opacity, 1.0);
        let id = stage.insert("hero", Bounds::new(0.0, 100.0), natural);

        assert!(stage.apply(id, &PropertySet::new().with(Property::Y, 40.0)));
        let target = stage.get(id).unwrap();
        assert_eq!(target.style().number(Property::Y), 40.0);
        assert_eq!(target.style().number(Property::Opacity), 1.0);
        assert_eq!(target.natural().get(Property::Y), None);
    }

    #[test]
    fn test_writes_to_removed_target_are_ignored() {
        let mut stage = Stage::new();
        let id = stage.insert("card", Bounds::new(0.0, 10.0), PropertySet::new());
        stage.remove(id);

        assert!(!stage.apply(id, &PropertySet::new().with(Property::X, 1.0)));
        assert!(!stage.set_placement(id, Placement::default()));
        assert!(stage.get(id).is_none());
    }

    #[test]
    fn test_document_height() {
        let mut stage = Stage::new();
        stage.insert("a", Bounds::new(0.0, 100.0), PropertySet::new());
        stage.insert("b", Bounds::new(100.0, 250.0), PropertySet::new());
        assert_eq!(stage.document_height(), 350.0);
        assert_eq!(stage.find("b").map(|id| stage.get(id).unwrap().name()), Some("b"));
    }
}
