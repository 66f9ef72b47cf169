//! Animatable presentation properties

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// A presentation property a timeline can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Horizontal translation
    X,
    /// Vertical translation
    Y,
    Scale,
    Opacity,
    /// Blur radius
    Blur,
    /// Foreground (text) colour
    Color,
    Background,
    BorderColor,
}

impl Property {
    /// Value of the property on an element nobody has styled
    pub fn default_value(self) -> PropertyValue {
        match self {
            Property::X | Property::Y | Property::Blur => PropertyValue::Number(0.0),
            Property::Scale | Property::Opacity => PropertyValue::Number(1.0),
            Property::Color | Property::Background | Property::BorderColor => {
                PropertyValue::Color(Rgba::TRANSPARENT)
            }
        }
    }
}

/// A property's value: either a scalar or a colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Color(Rgba),
}

impl PropertyValue {
    /// Interpolate towards `other` by an already-eased factor
    ///
    /// Values of different kinds cannot be blended; they switch over at the
    /// end of the transition.
    pub fn lerp(&self, other: &PropertyValue, t: f64) -> PropertyValue {
        match (self, other) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => {
                PropertyValue::Number(a + (b - a) * t)
            }
            (PropertyValue::Color(a), PropertyValue::Color(b)) => PropertyValue::Color(a.lerp(b, t)),
            _ if t >= 1.0 => *other,
            _ => *self,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            PropertyValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            PropertyValue::Number(_) => None,
        }
    }

    pub fn approx_eq(&self, other: &PropertyValue, epsilon: f64) -> bool {
        match (self, other) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => (a - b).abs() < epsilon,
            (PropertyValue::Color(a), PropertyValue::Color(b)) => a.approx_eq(b, epsilon),
            _ => false,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<Rgba> for PropertyValue {
    fn from(value: Rgba) -> Self {
        PropertyValue::Color(value)
    }
}

/// An ordered set of property values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet(BTreeMap<Property, PropertyValue>);

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder pattern)
    pub fn with(mut self, property: Property, value: impl Into<PropertyValue>) -> Self {
        self.0.insert(property, value.into());
        self
    }

    pub fn insert(&mut self, property: Property, value: impl Into<PropertyValue>) {
        self.0.insert(property, value.into());
    }

    pub fn get(&self, property: Property) -> Option<PropertyValue> {
        self.0.get(&property).copied()
    }

    /// Stored value, or the property's default
    pub fn value(&self, property: Property) -> PropertyValue {
        self.get(property).unwrap_or_else(|| property.default_value())
    }

    pub fn number(&self, property: Property) -> f64 {
        self.value(property)
            .as_number()
            .or_else(|| property.default_value().as_number())
            .unwrap_or(0.0)
    }

    pub fn color(&self, property: Property) -> Rgba {
        self.value(property).as_color().unwrap_or(Rgba::TRANSPARENT)
    }

    pub fn contains(&self, property: Property) -> bool {
        self.0.contains_key(&property)
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, PropertyValue)> + '_ {
        self.0.iter().map(|(p, v)| (*p, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Overwrite values with those from `other`
    pub fn merge(&mut self, other: &PropertySet) {
        for (property, value) in other.iter() {
            self.0.insert(property, value);
        }
    }

    /// Values of `properties` as currently held by this set (defaults filled in)
    pub fn project(&self, properties: impl IntoIterator<Item = Property>) -> PropertySet {
        PropertySet(properties.into_iter().map(|p| (p, self.value(p))).collect())
    }

    /// Interpolate every property present in either set
    pub fn lerp(&self, other: &PropertySet, t: f64) -> PropertySet {
        let mut out = BTreeMap::new();
        for property in self.0.keys().chain(other.0.keys()) {
            let from = self.value(*property);
            let to = other.value(*property);
            out.insert(*property, from.lerp(&to, t));
        }
        PropertySet(out)
    }

    pub fn approx_eq(&self, other: &PropertySet, epsilon: f64) -> bool {
        self.0.keys().chain(other.0.keys()).all(|property| {
            self.value(*property)
                .approx_eq(&other.value(*property), epsilon)
        })
    }
}

impl FromIterator<(Property, PropertyValue)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (Property, PropertyValue)>>(iter: I) -> Self {
        PropertySet(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let set = PropertySet::new();
        assert_eq!(set.number(Property::Opacity), 1.0);
        assert_eq!(set.number(Property::Scale), 1.0);
        assert_eq!(set.number(Property::Y), 0.0);
        assert_eq!(set.color(Property::Background), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_lerp_fills_missing_with_defaults() {
        let from = PropertySet::new().with(Property::Y, 40.0);
        let to = PropertySet::new().with(Property::Opacity, 0.0);
        let mid = from.lerp(&to, 0.5);
        assert!((mid.number(Property::Y) - 20.0).abs() < 1e-9);
        assert!((mid.number(Property::Opacity) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_kinds_switch_at_end() {
        let a = PropertyValue::Number(1.0);
        let b = PropertyValue::Color(Rgba::rgb(1, 2, 3));
        assert_eq!(a.lerp(&b, 0.5), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = PropertySet::new().with(Property::X, 1.0).with(Property::Y, 2.0);
        base.merge(&PropertySet::new().with(Property::Y, 5.0));
        assert_eq!(base.number(Property::X), 1.0);
        assert_eq!(base.number(Property::Y), 5.0);
    }
}
