//! Easing curves
//!
//! Pure functions mapping linear progress in [0, 1] onto eased progress.
//! Curves are named the way the page's motion design names them
//! (`power3.out`, `power2.inOut`, `none`, `cubic-bezier(...)`), so they can
//! be written as plain strings in the configuration file.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which end of the curve the acceleration is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseMode {
    In,
    Out,
    InOut,
}

impl EaseMode {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "inout" => Some(Self::InOut),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inOut",
        }
    }
}

/// Easing curve applied to linear progress before interpolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    /// No easing: output equals input
    Linear,
    /// Polynomial curve; `power1` is quadratic, `power4` is quintic
    Power(u8, EaseMode),
    Sine(EaseMode),
    Expo(EaseMode),
    /// CSS-style cubic bezier with control points (x1, y1) and (x2, y2)
    CubicBezier(f64, f64, f64, f64),
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Power(1, EaseMode::Out)
    }
}

impl Easing {
    /// Apply the easing function to a progress value
    ///
    /// Input is clamped to [0, 1]. Every curve maps 0 to 0 and 1 to 1;
    /// only cubic beziers with control points outside [0, 1] overshoot.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::Power(power, mode) => {
                let exponent = i32::from(power.clamp(1, 4)) + 1;
                polynomial(t, exponent, mode)
            }
            Easing::Sine(mode) => sine(t, mode),
            Easing::Expo(mode) => expo(t, mode),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

#[inline]
fn polynomial(t: f64, exponent: i32, mode: EaseMode) -> f64 {
    match mode {
        EaseMode::In => t.powi(exponent),
        EaseMode::Out => 1.0 - (1.0 - t).powi(exponent),
        EaseMode::InOut => {
            if t < 0.5 {
                (2.0 * t).powi(exponent) / 2.0
            } else {
                1.0 - (2.0 * (1.0 - t)).powi(exponent) / 2.0
            }
        }
    }
}

#[inline]
fn sine(t: f64, mode: EaseMode) -> f64 {
    match mode {
        EaseMode::In => 1.0 - (t * PI / 2.0).cos(),
        EaseMode::Out => (t * PI / 2.0).sin(),
        EaseMode::InOut => -((PI * t).cos() - 1.0) / 2.0,
    }
}

#[inline]
fn expo(t: f64, mode: EaseMode) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    match mode {
        EaseMode::In => 2.0_f64.powf(10.0 * t - 10.0),
        EaseMode::Out => 1.0 - 2.0_f64.powf(-10.0 * t),
        EaseMode::InOut => {
            if t < 0.5 {
                2.0_f64.powf(20.0 * t - 10.0) / 2.0
            } else {
                (2.0 - 2.0_f64.powf(-20.0 * t + 10.0)) / 2.0
            }
        }
    }
}

/// One coordinate of a cubic bezier with endpoints fixed at 0 and 1
#[inline]
fn bezier_component(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

#[inline]
fn bezier_slope(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Solve x(s) = t for the curve parameter, then return y(s)
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    // Newton-Raphson converges in a few steps for well-behaved curves
    let mut s = t;
    for _ in 0..8 {
        let error = bezier_component(x1, x2, s) - t;
        if error.abs() < EPSILON {
            return bezier_component(y1, y2, s);
        }
        let slope = bezier_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s = (s - error / slope).clamp(0.0, 1.0);
    }

    // Bisection fallback for flat regions
    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..48 {
        let x = bezier_component(x1, x2, s);
        if (x - t).abs() < EPSILON {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier_component(y1, y2, s)
}

fn parse_bezier(args: &str) -> Option<Easing> {
    let values: Vec<f64> = args
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        // x coordinates must stay inside [0, 1] for x(s) to be invertible
        [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
            Some(Easing::CubicBezier(*x1, *y1, *x2, *y2))
        }
        _ => None,
    }
}

impl FromStr for Easing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let invalid = || Error::InvalidEasing(s.to_string());

        if let Some(args) = normalized
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_bezier(args).ok_or_else(invalid);
        }

        // CSS keywords
        match normalized.as_str() {
            "none" | "linear" | "power0" => return Ok(Easing::Linear),
            "ease" => return Ok(Easing::CubicBezier(0.25, 0.1, 0.25, 1.0)),
            "ease-in" => return Ok(Easing::CubicBezier(0.42, 0.0, 1.0, 1.0)),
            "ease-out" => return Ok(Easing::CubicBezier(0.0, 0.0, 0.58, 1.0)),
            "ease-in-out" => return Ok(Easing::CubicBezier(0.42, 0.0, 0.58, 1.0)),
            _ => {}
        }

        let (family, mode) = match normalized.split_once('.') {
            Some((family, mode)) => (family, EaseMode::parse(mode).ok_or_else(invalid)?),
            None => (normalized.as_str(), EaseMode::Out),
        };

        match family {
            "power1" | "quad" => Ok(Easing::Power(1, mode)),
            "power2" | "cubic" => Ok(Easing::Power(2, mode)),
            "power3" | "quart" => Ok(Easing::Power(3, mode)),
            "power4" | "quint" => Ok(Easing::Power(4, mode)),
            "sine" => Ok(Easing::Sine(mode)),
            "expo" => Ok(Easing::Expo(mode)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("none"),
            Easing::Power(power, mode) => write!(f, "power{}.{}", power, mode.as_str()),
            Easing::Sine(mode) => write!(f, "sine.{}", mode.as_str()),
            Easing::Expo(mode) => write!(f, "expo.{}", mode.as_str()),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_curves() -> Vec<Easing> {
        vec![
            Easing::Linear,
            Easing::Power(1, EaseMode::Out),
            Easing::Power(2, EaseMode::InOut),
            Easing::Power(3, EaseMode::Out),
            Easing::Power(4, EaseMode::In),
            Easing::Sine(EaseMode::InOut),
            Easing::Expo(EaseMode::Out),
            Easing::CubicBezier(0.25, 0.46, 0.45, 0.94),
        ]
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in all_curves() {
            assert!(easing.apply(0.0).abs() < 1e-4, "{:?} at t=0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-4, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in all_curves() {
            let mut prev = 0.0;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let v = easing.apply(t);
                assert!(v + 1e-9 >= prev, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_input_is_clamped() {
        let easing = Easing::Power(3, EaseMode::Out);
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_power3_out_matches_quartic() {
        let easing: Easing = "power3.out".parse().unwrap();
        let t: f64 = 0.3;
        let expected = 1.0 - (1.0 - t).powi(4);
        assert!((easing.apply(t) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
        assert_eq!(
            "power2.inOut".parse::<Easing>().unwrap(),
            Easing::Power(2, EaseMode::InOut)
        );
        assert_eq!(
            "power1".parse::<Easing>().unwrap(),
            Easing::Power(1, EaseMode::Out)
        );
        assert_eq!(
            "cubic-bezier(0.34, 1.56, 0.64, 1)".parse::<Easing>().unwrap(),
            Easing::CubicBezier(0.34, 1.56, 0.64, 1.0)
        );
        assert!("bounce.out".parse::<Easing>().is_err());
        assert!("power2.sideways".parse::<Easing>().is_err());
        assert!("cubic-bezier(1.5, 0, 0, 1)".parse::<Easing>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for easing in all_curves() {
            let parsed: Easing = easing.to_string().parse().unwrap();
            assert_eq!(parsed, easing);
        }
    }

    #[test]
    fn test_spring_bezier_overshoots() {
        let easing: Easing = "cubic-bezier(0.34, 1.56, 0.64, 1)".parse().unwrap();
        let peak = (0..=50)
            .map(|i| easing.apply(i as f64 / 50.0))
            .fold(0.0_f64, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_bezier_linear_control_points() {
        let easing = Easing::CubicBezier(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!((easing.apply(t) - t).abs() < 1e-4);
        }
    }
}
