mod navbar;
mod popup;
mod protocol;
mod sections;
mod status_bar;

pub use navbar::NavbarWidget;
pub use popup::PopupWidget;
pub use protocol::ProtocolWidget;
pub use sections::{FeaturesWidget, FooterWidget, HeroWidget, PhilosophyWidget};
pub use status_bar::StatusBarWidget;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};

/// Tallest surface ever allocated, in rows
const MAX_SURFACE_ROWS: u16 = 1024;

/// Convert document pixels to whole terminal rows
pub fn rows(px: f64, row_px: f64) -> i32 {
    if row_px <= 0.0 || !px.is_finite() {
        return 0;
    }
    (px / row_px).round() as i32
}

/// Off-screen drawing surface for one document box
///
/// Widgets render into it with ordinary layout code at full size; the
/// surface is then copied onto the frame at its scroll offset, so boxes
/// partly above or below the screen clip cleanly.
pub struct Surface {
    buf: Buffer,
}

impl Surface {
    pub fn new(width: u16, rows: i32) -> Self {
        let height = rows.clamp(0, i32::from(MAX_SURFACE_ROWS)) as u16;
        Self {
            buf: Buffer::empty(Rect::new(0, 0, width, height)),
        }
    }

    pub fn area(&self) -> Rect {
        self.buf.area
    }

    pub fn fill(&mut self, style: Style) {
        let area = self.area();
        Block::default().style(style).render(area, &mut self.buf);
    }

    pub fn render<W: Widget>(&mut self, widget: W, rect: Rect) {
        let rect = rect.intersection(self.area());
        if !rect.is_empty() {
            widget.render(rect, &mut self.buf);
        }
    }

    /// Copy onto `target` with the surface's first row at `top` rows below
    /// `clip.y` (negative = partly scrolled off the top)
    pub fn blit(&self, target: &mut Buffer, clip: Rect, x_offset: u16, top: i32) {
        self.blit_with(target, clip, x_offset, top, |c| c);
    }

    /// Like [`blit`](Self::blit), passing every colour through `recolor`
    pub fn blit_with(
        &self,
        target: &mut Buffer,
        clip: Rect,
        x_offset: u16,
        top: i32,
        recolor: impl Fn(Color) -> Color,
    ) {
        let area = self.area();
        for sy in 0..area.height {
            let ty = top + i32::from(sy);
            if ty < 0 || ty >= i32::from(clip.height) {
                continue;
            }
            let y = clip.y + ty as u16;
            for sx in 0..area.width {
                let x = clip.x + x_offset + sx;
                if x >= clip.right() {
                    break;
                }
                let (Some(src), Some(dst)) = (self.buf.cell((sx, sy)), target.cell_mut((x, y)))
                else {
                    continue;
                };
                *dst = src.clone();
                dst.fg = recolor(src.fg);
                dst.bg = recolor(src.bg);
            }
        }
    }
}

/// Shrink a rect horizontally around its centre
pub fn scaled(rect: Rect, scale: f64) -> Rect {
    let scale = scale.clamp(0.0, 1.0);
    let width = ((f64::from(rect.width) * scale).round() as u16).min(rect.width);
    let x = rect.x + (rect.width - width) / 2;
    Rect::new(x, rect.y, width, rect.height)
}

/// Horizontal band of `width` columns centred in `rect`
pub fn centered_band(rect: Rect, width: u16) -> Rect {
    let width = width.min(rect.width);
    Rect::new(rect.x + (rect.width - width) / 2, rect.y, width, rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    #[test]
    fn test_rows_rounds_to_nearest() {
        assert_eq!(rows(40.0, 20.0), 2);
        assert_eq!(rows(-29.0, 20.0), -1);
        assert_eq!(rows(f64::NAN, 20.0), 0);
    }

    #[test]
    fn test_blit_clips_rows_above_and_below() {
        let mut surface = Surface::new(4, 4);
        for (i, text) in ["a", "b", "c", "d"].into_iter().enumerate() {
            surface.render(Paragraph::new(text), Rect::new(0, i as u16, 4, 1));
        }
        let clip = Rect::new(0, 0, 4, 2);
        let mut target = Buffer::empty(clip);

        surface.blit(&mut target, clip, 0, -1);
        assert_eq!(target.cell((0, 0)).map(|c| c.symbol()), Some("b"));
        assert_eq!(target.cell((0, 1)).map(|c| c.symbol()), Some("c"));

        let mut target = Buffer::empty(clip);
        surface.blit(&mut target, clip, 0, 1);
        assert_eq!(target.cell((0, 0)).map(|c| c.symbol()), Some(" "));
        assert_eq!(target.cell((0, 1)).map(|c| c.symbol()), Some("a"));
    }

    #[test]
    fn test_blit_recolors() {
        let mut surface = Surface::new(2, 1);
        surface.fill(Style::default().bg(Color::Rgb(0, 0, 0)));
        let clip = Rect::new(0, 0, 2, 1);
        let mut target = Buffer::empty(clip);
        surface.blit_with(&mut target, clip, 0, 0, |_| Color::Rgb(9, 9, 9));
        assert_eq!(target.cell((1, 0)).map(|c| c.bg), Some(Color::Rgb(9, 9, 9)));
    }

    #[test]
    fn test_scaled_keeps_centre() {
        let rect = Rect::new(10, 0, 100, 5);
        assert_eq!(scaled(rect, 0.9), Rect::new(15, 0, 90, 5));
        assert_eq!(scaled(rect, 1.0), rect);
    }
}
