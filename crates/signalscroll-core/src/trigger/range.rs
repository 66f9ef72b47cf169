//! Scroll ranges and their end boundaries

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::anchor::{Anchor, Offset};
use crate::stage::TargetId;
use crate::{Error, Result};

/// Which side of a range a scroll position is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Before,
    Inside,
    After,
}

/// Half-open scroll interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollRange {
    pub start: f64,
    pub end: f64,
}

impl ScrollRange {
    /// Build a range; empty or non-finite intervals never trigger
    pub fn new(start: f64, end: f64) -> Option<Self> {
        (start.is_finite() && end.is_finite() && end > start).then_some(Self { start, end })
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end
    }

    pub fn side(&self, position: f64) -> Side {
        if position < self.start {
            Side::Before
        } else if position < self.end {
            Side::Inside
        } else {
            Side::After
        }
    }

    /// Linear progress through the range, clamped to [0, 1]
    ///
    /// Exactly 0 at `start` and 1 at `end`.
    pub fn progress(&self, position: f64) -> f64 {
        ((position - self.start) / self.length()).clamp(0.0, 1.0)
    }
}

/// How the end of a range is found
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeEnd {
    /// Anchor on an element; `None` means the binding's own trigger element
    Anchor {
        trigger: Option<TargetId>,
        anchor: Anchor,
    },
    /// Distance past the start, percentages relative to the viewport height
    Relative(Offset),
    /// Absolute scroll offset
    Absolute(f64),
}

impl RangeEnd {
    /// Anchor on another element (an "end trigger")
    pub fn on(trigger: TargetId, anchor: Anchor) -> Self {
        RangeEnd::Anchor {
            trigger: Some(trigger),
            anchor,
        }
    }
}

impl Default for RangeEnd {
    /// The trigger's bottom edge leaving through the viewport top
    fn default() -> Self {
        RangeEnd::Anchor {
            trigger: None,
            anchor: Anchor::bottom_top(),
        }
    }
}

impl From<Anchor> for RangeEnd {
    fn from(anchor: Anchor) -> Self {
        RangeEnd::Anchor {
            trigger: None,
            anchor,
        }
    }
}

/// Parses `"+=100%"`, `"+=300px"`, `"99999"` or an anchor on the same trigger
impl FromStr for RangeEnd {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(rest) = trimmed.strip_prefix("+=") {
            let rest = rest.trim();
            let offset = if let Some(pct) = rest.strip_suffix('%') {
                pct.trim().parse().ok().map(Offset::Percent)
            } else {
                rest.strip_suffix("px")
                    .unwrap_or(rest)
                    .trim()
                    .parse()
                    .ok()
                    .map(Offset::Px)
            };
            return offset
                .map(RangeEnd::Relative)
                .ok_or_else(|| Error::InvalidAnchor(s.to_string()));
        }
        if let Ok(absolute) = trimmed.parse::<f64>() {
            return Ok(RangeEnd::Absolute(absolute));
        }
        trimmed.parse::<Anchor>().map(RangeEnd::from)
    }
}

impl fmt::Display for RangeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeEnd::Anchor { anchor, .. } => write!(f, "{}", anchor),
            RangeEnd::Relative(offset) => write!(f, "+={}", offset),
            RangeEnd::Absolute(offset) => write!(f, "{}", offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ranges_are_rejected() {
        assert!(ScrollRange::new(100.0, 100.0).is_none());
        assert!(ScrollRange::new(200.0, 100.0).is_none());
        assert!(ScrollRange::new(0.0, f64::INFINITY).is_none());
        assert!(ScrollRange::new(0.0, 1.0).is_some());
    }

    #[test]
    fn test_progress_is_clamped_and_exact_at_edges() {
        let range = ScrollRange::new(1000.0, 2000.0).unwrap();
        assert_eq!(range.progress(1000.0), 0.0);
        assert_eq!(range.progress(2000.0), 1.0);
        assert_eq!(range.progress(1500.0), 0.5);
        assert_eq!(range.progress(-50.0), 0.0);
        assert_eq!(range.progress(9000.0), 1.0);
    }

    #[test]
    fn test_progress_monotonic() {
        let range = ScrollRange::new(10.0, 90.0).unwrap();
        let mut prev = -1.0;
        for pos in (0..=100).map(f64::from) {
            let p = range.progress(pos);
            assert!(p >= prev);
            prev = p;
        }
    }

    #[test]
    fn test_sides() {
        let range = ScrollRange::new(0.0, 1000.0).unwrap();
        assert_eq!(range.side(-1.0), Side::Before);
        assert_eq!(range.side(0.0), Side::Inside);
        assert_eq!(range.side(999.9), Side::Inside);
        assert_eq!(range.side(1000.0), Side::After);
    }

    #[test]
    fn test_parse_range_end() {
        assert_eq!(
            "+=100%".parse::<RangeEnd>().unwrap(),
            RangeEnd::Relative(Offset::Percent(100.0))
        );
        assert_eq!(
            "+=300px".parse::<RangeEnd>().unwrap(),
            RangeEnd::Relative(Offset::Px(300.0))
        );
        assert_eq!("99999".parse::<RangeEnd>().unwrap(), RangeEnd::Absolute(99999.0));
        assert_eq!(
            "bottom bottom".parse::<RangeEnd>().unwrap(),
            RangeEnd::from(Anchor::bottom_bottom())
        );
        assert!("+=lots".parse::<RangeEnd>().is_err());
    }
}
