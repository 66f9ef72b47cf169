//! Scroll anchors: "when does this edge of the element meet that line of the viewport"
//!
//! An anchor is written as two tokens, the element position followed by the
//! viewport position: `"top top"`, `"top 80%"`, `"bottom bottom"`,
//! `"top -100px"`. Keywords map to 0% / 50% / 100%; bare numbers are pixels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stage::Bounds;
use crate::{Error, Result};

/// A distance along an element or the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    Px(f64),
    /// Percentage of the reference length
    Percent(f64),
}

impl Offset {
    pub fn resolve(&self, length: f64) -> f64 {
        match self {
            Offset::Px(px) => *px,
            Offset::Percent(pct) => length * pct / 100.0,
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "top" | "left" => return Some(Offset::Percent(0.0)),
            "center" => return Some(Offset::Percent(50.0)),
            "bottom" | "right" => return Some(Offset::Percent(100.0)),
            _ => {}
        }
        if let Some(pct) = token.strip_suffix('%') {
            return pct.parse().ok().map(Offset::Percent);
        }
        let px = token.strip_suffix("px").unwrap_or(token);
        px.parse().ok().map(Offset::Px)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Px(px) => write!(f, "{}px", px),
            Offset::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}

/// Where an element position meets a viewport position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Anchor {
    /// Point on the element, relative to its top edge
    pub element: Offset,
    /// Line in the viewport, relative to its top edge
    pub viewport: Offset,
}

impl Anchor {
    pub const fn new(element: Offset, viewport: Offset) -> Self {
        Self { element, viewport }
    }

    /// Element top meets viewport top
    pub const fn top_top() -> Self {
        Self::new(Offset::Percent(0.0), Offset::Percent(0.0))
    }

    /// Element top meets viewport bottom (element starts entering)
    pub const fn top_bottom() -> Self {
        Self::new(Offset::Percent(0.0), Offset::Percent(100.0))
    }

    /// Element bottom meets viewport top (element has left)
    pub const fn bottom_top() -> Self {
        Self::new(Offset::Percent(100.0), Offset::Percent(0.0))
    }

    pub const fn bottom_bottom() -> Self {
        Self::new(Offset::Percent(100.0), Offset::Percent(100.0))
    }

    /// Scroll offset at which the two positions coincide
    pub fn resolve(&self, bounds: Bounds, viewport_height: f64) -> f64 {
        bounds.top + self.element.resolve(bounds.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for Anchor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        match tokens.as_slice() {
            [element, viewport] => match (Offset::parse(element), Offset::parse(viewport)) {
                (Some(element), Some(viewport)) => Ok(Anchor { element, viewport }),
                _ => Err(Error::InvalidAnchor(s.to_string())),
            },
            _ => Err(Error::InvalidAnchor(s.to_string())),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

impl TryFrom<String> for Anchor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!("top top".parse::<Anchor>().unwrap(), Anchor::top_top());
        assert_eq!("bottom bottom".parse::<Anchor>().unwrap(), Anchor::bottom_bottom());
        assert_eq!(
            "top 80%".parse::<Anchor>().unwrap(),
            Anchor::new(Offset::Percent(0.0), Offset::Percent(80.0))
        );
        assert_eq!(
            "top -100px".parse::<Anchor>().unwrap(),
            Anchor::new(Offset::Percent(0.0), Offset::Px(-100.0))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("top".parse::<Anchor>().is_err());
        assert!("top top top".parse::<Anchor>().is_err());
        assert!("middle top".parse::<Anchor>().is_err());
    }

    #[test]
    fn test_resolve() {
        let bounds = Bounds::new(1200.0, 400.0);
        let vh = 800.0;
        assert_eq!(Anchor::top_top().resolve(bounds, vh), 1200.0);
        // top 80%: element top reaches 80% down the viewport
        let anchor: Anchor = "top 80%".parse().unwrap();
        assert_eq!(anchor.resolve(bounds, vh), 1200.0 - 640.0);
        assert_eq!(Anchor::bottom_bottom().resolve(bounds, vh), 1600.0 - 800.0);
    }

    #[test]
    fn test_negative_viewport_offset_on_document() {
        // Document-level trigger: starts once scrolled 100px down
        let anchor: Anchor = "top -100px".parse().unwrap();
        assert_eq!(anchor.resolve(Bounds::new(0.0, 5000.0), 800.0), 100.0);
    }

    #[test]
    fn test_display_round_trip() {
        let anchor: Anchor = "center 25%".parse().unwrap();
        assert_eq!(anchor.to_string().parse::<Anchor>().unwrap(), anchor);
    }
}
