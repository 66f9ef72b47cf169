//! RGBA colours with component-wise interpolation
//!
//! Channels are kept as `f64` so interpolated values stay exact until they
//! are quantised for rendering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A colour with red/green/blue in [0, 255] and alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64, g as f64, b as f64, 1.0)
    }

    /// Component-wise linear interpolation
    pub fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Quantise to 8-bit channels, clamping out-of-range values
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        (channel(self.r), channel(self.g), channel(self.b))
    }

    /// Composite this colour over an opaque background
    pub fn over(&self, background: &Rgba) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        Rgba {
            r: self.r * a + background.r * (1.0 - a),
            g: self.g * a + background.g * (1.0 - a),
            b: self.b * a + background.b * (1.0 - a),
            a: 1.0,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Rgba {
        self.a = alpha;
        self
    }

    pub fn approx_eq(&self, other: &Rgba, epsilon: f64) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expand = |s: &str| -> Option<f64> {
        let v = u8::from_str_radix(s, 16).ok()?;
        Some(f64::from(v) * 17.0)
    };
    let pair = |s: &str| -> Option<f64> { u8::from_str_radix(s, 16).ok().map(f64::from) };

    match hex.len() {
        3 => Some(Rgba::new(
            expand(&hex[0..1])?,
            expand(&hex[1..2])?,
            expand(&hex[2..3])?,
            1.0,
        )),
        6 => Some(Rgba::new(pair(&hex[0..2])?, pair(&hex[2..4])?, pair(&hex[4..6])?, 1.0)),
        8 => Some(Rgba::new(
            pair(&hex[0..2])?,
            pair(&hex[2..4])?,
            pair(&hex[4..6])?,
            pair(&hex[6..8])? / 255.0,
        )),
        _ => None,
    }
}

fn parse_functional(args: &str, with_alpha: bool) -> Option<Rgba> {
    let parts: Vec<f64> = args
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match (parts.as_slice(), with_alpha) {
        ([r, g, b], false) => Some(Rgba::new(*r, *g, *b, 1.0)),
        ([r, g, b, a], true) => Some(Rgba::new(*r, *g, *b, a.clamp(0.0, 1.0))),
        _ => None,
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let parsed = if normalized == "transparent" {
            Some(Rgba::TRANSPARENT)
        } else if let Some(hex) = normalized.strip_prefix('#') {
            parse_hex(hex)
        } else if let Some(args) = normalized
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            parse_functional(args, true)
        } else if let Some(args) = normalized
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            parse_functional(args, false)
        } else {
            None
        };
        parsed.ok_or_else(|| Error::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        if (self.a - 1.0).abs() < 1e-9 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "rgba({}, {}, {}, {:.3})", r, g, b, self.a.clamp(0.0, 1.0))
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#E63B2E".parse::<Rgba>().unwrap(), Rgba::rgb(0xe6, 0x3b, 0x2e));
        assert_eq!("#fff".parse::<Rgba>().unwrap(), Rgba::rgb(255, 255, 255));
        let translucent: Rgba = "#11111180".parse().unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_functional() {
        let c: Rgba = "rgba(245, 243, 238, 0.8)".parse().unwrap();
        assert_eq!(c, Rgba::new(245.0, 243.0, 238.0, 0.8));
        let c: Rgba = "rgb(17, 17, 17)".parse().unwrap();
        assert_eq!(c, Rgba::rgb(17, 17, 17));
        assert_eq!("transparent".parse::<Rgba>().unwrap(), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#12".parse::<Rgba>().is_err());
        assert!("#zzzzzz".parse::<Rgba>().is_err());
        assert!("rgba(1, 2, 3)".parse::<Rgba>().is_err());
        assert!("signal-red".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_lerp_component_wise() {
        let from = Rgba::TRANSPARENT;
        let to = Rgba::new(245.0, 243.0, 238.0, 0.8);
        let mid = from.lerp(&to, 0.5);
        assert!(mid.approx_eq(&Rgba::new(122.5, 121.5, 119.0, 0.4), 1e-9));
    }

    #[test]
    fn test_over_background() {
        let half_white = Rgba::new(255.0, 255.0, 255.0, 0.5);
        let black = Rgba::rgb(0, 0, 0);
        let mixed = half_white.over(&black);
        assert_eq!(mixed.to_rgb8(), (128, 128, 128));
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgba::rgb(0x11, 0x11, 0x11).to_string(), "#111111");
        assert_eq!(
            Rgba::new(245.0, 243.0, 238.0, 0.8).to_string(),
            "rgba(245, 243, 238, 0.800)"
        );
    }
}
