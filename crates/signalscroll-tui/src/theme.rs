use ratatui::style::{Color, Style};
use signalscroll_core::{Palette, Property, PropertySet, Rgba};

/// Blur radius at which content is as faded as its opacity allows
const FULL_BLUR: f64 = 40.0;

/// Page colours resolved for the terminal
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub palette: Palette,

    pub paper: Color,
    pub signal: Color,
    pub offwhite: Color,
    pub dark: Color,
    pub black: Color,

    /// Inner panels on dark cards (`#1A1A1A`)
    pub panel: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(Palette {
            paper: Rgba::rgb(0xE8, 0xE4, 0xDD),
            signal: Rgba::rgb(0xE6, 0x3B, 0x2E),
            offwhite: Rgba::rgb(0xF5, 0xF3, 0xEE),
            dark: Rgba::rgb(0x11, 0x11, 0x11),
            black: Rgba::rgb(0, 0, 0),
        })
    }
}

impl Theme {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            paper: to_color(palette.paper),
            signal: to_color(palette.signal),
            offwhite: to_color(palette.offwhite),
            dark: to_color(palette.dark),
            black: to_color(palette.black),
            panel: Color::Rgb(0x1A, 0x1A, 0x1A),
        }
    }

    /// Style of a possibly translucent layer drawn over an opaque underlay
    pub fn layered(&self, foreground: Rgba, background: Rgba, underlay: Rgba) -> Style {
        let background = background.over(&underlay);
        Style::default()
            .fg(to_color(foreground.over(&background)))
            .bg(to_color(background))
    }
}

/// Opaque terminal colour, ignoring alpha
pub fn to_color(color: Rgba) -> Color {
    let (r, g, b) = color.to_rgb8();
    Color::Rgb(r, g, b)
}

/// Colour at partial opacity, composited over an opaque background
pub fn tint(color: Rgba, alpha: f64, background: Rgba) -> Color {
    to_color(color.with_alpha(alpha).over(&background))
}

/// Blend an already resolved terminal colour towards `toward`
///
/// `keep` is the share of the original colour that survives.
pub fn fade_color(color: Color, toward: Rgba, keep: f64) -> Color {
    match color {
        Color::Rgb(r, g, b) => to_color(toward.lerp(&Rgba::rgb(r, g, b), keep.clamp(0.0, 1.0))),
        other => other,
    }
}

/// How much of an element survives its opacity and blur
///
/// A terminal can't blur, so blur is folded into extra fading.
pub fn visibility(style: &PropertySet) -> f64 {
    let opacity = style.number(Property::Opacity).clamp(0.0, 1.0);
    let blur = (style.number(Property::Blur) / FULL_BLUR).clamp(0.0, 1.0);
    opacity * (1.0 - 0.5 * blur)
}

/// Foreground faded towards the background by an element's animated style
pub fn faded(foreground: Rgba, background: Rgba, style: &PropertySet) -> Color {
    let fg = foreground.over(&background);
    to_color(background.lerp(&fg, visibility(style)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_folds_blur_into_opacity() {
        let plain = PropertySet::new();
        assert_eq!(visibility(&plain), 1.0);

        let covered = PropertySet::new()
            .with(Property::Opacity, 0.5)
            .with(Property::Blur, 20.0);
        assert!((visibility(&covered) - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_faded_hits_background_when_invisible() {
        let theme = Theme::default();
        let hidden = PropertySet::new().with(Property::Opacity, 0.0);
        assert_eq!(
            faded(theme.palette.dark, theme.palette.offwhite, &hidden),
            theme.offwhite
        );
        assert_eq!(
            faded(theme.palette.dark, theme.palette.offwhite, &PropertySet::new()),
            theme.dark
        );
    }

    #[test]
    fn test_fade_color_blends_rgb_only() {
        let toward = Rgba::rgb(0, 0, 0);
        assert_eq!(fade_color(Color::Rgb(200, 100, 50), toward, 0.5), Color::Rgb(100, 50, 25));
        assert_eq!(fade_color(Color::Reset, toward, 0.5), Color::Reset);
        assert_eq!(tint(Rgba::rgb(255, 255, 255), 0.5, toward), Color::Rgb(128, 128, 128));
    }

    #[test]
    fn test_translucent_background_is_composited() {
        let theme = Theme::default();
        let clear = theme.layered(theme.palette.paper, Rgba::TRANSPARENT, theme.palette.dark);
        assert_eq!(clear.bg, Some(theme.dark));
        assert_eq!(clear.fg, Some(theme.paper));

        let frosted = theme.layered(
            theme.palette.dark,
            theme.palette.offwhite.with_alpha(0.8),
            theme.palette.black,
        );
        // 0.8 * 245 = 196
        assert_eq!(frosted.bg, Some(Color::Rgb(196, 194, 190)));
    }
}
