use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use signalscroll_core::config::ProtocolCardConfig;
use signalscroll_core::{Property, Rgba};

use super::{rows, Surface};
use crate::app::App;
use crate::page::Section;
use crate::theme::{fade_color, tint, to_color, visibility};

const CARD_MARGIN: u16 = 6;

/// Stacked protocol cards
///
/// Cards are pinned by the engine while the next one slides over them, so
/// each card is placed by its viewport offset rather than its document
/// position. Later cards draw on top. A covered card keeps its layout but
/// is narrowed by its scale and faded towards the page by its opacity and
/// blur.
pub struct ProtocolWidget;

impl ProtocolWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let page = &app.page;
        let palette = page.palette();
        let row_px = page.layout().row_px;

        let section = page.layout().section(Section::Protocol);
        let top = rows(section.top - page.position(), row_px);
        let bottom = top + rows(section.height, row_px);
        let (y0, y1) = (top.max(0), bottom.min(i32::from(area.height)));
        if y0 >= y1 {
            return;
        }
        frame.render_widget(
            Block::default().style(Style::default().bg(to_color(palette.offwhite))),
            Rect::new(area.x, area.y + y0 as u16, area.width, (y1 - y0) as u16),
        );

        let ids = &page.targets().cards;
        for (i, (id, card)) in ids.iter().zip(page.cards()).enumerate() {
            let (Some(screen_top), Some(bounds)) = (page.screen_top(*id), page.engine().bounds(*id))
            else {
                continue;
            };
            let height = rows(bounds.height, row_px);
            let card_top = rows(screen_top, row_px);
            if card_top >= i32::from(area.height) || card_top + height <= 0 {
                continue;
            }

            let style = page.style(*id);
            let mut surface = Surface::new(area.width, height);
            surface.fill(Style::default().bg(to_color(palette.offwhite)));
            draw_card(&mut surface, app, i, card, style.number(Property::Scale));

            let keep = visibility(&style);
            let page_bg = palette.offwhite;
            surface.blit_with(frame.buffer_mut(), area, 0, card_top, |c| {
                fade_color(c, page_bg, keep)
            });
        }
    }
}

fn draw_card(
    surface: &mut Surface,
    app: &App,
    index: usize,
    card: &ProtocolCardConfig,
    scale: f64,
) {
    let palette = app.page.palette();
    let full = surface.area();
    let scale = scale.clamp(0.0, 1.0);

    let width = full.width.saturating_sub(CARD_MARGIN * 2);
    let height = full.height.saturating_sub(2);
    let w = (f64::from(width) * scale).round() as u16;
    let h = (f64::from(height) * scale).round() as u16;
    let rect = Rect::new(
        (full.width.saturating_sub(w)) / 2,
        (full.height.saturating_sub(h)) / 2,
        w,
        h,
    );
    if rect.width < 4 || rect.height < 4 {
        return;
    }

    // alternate the card face so neighbours read as separate sheets
    let face = if index % 2 == 0 {
        palette.paper
    } else {
        Rgba::rgb(0xFF, 0xFF, 0xFF)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(tint(palette.dark, 0.15, face)))
        .style(Style::default().fg(to_color(palette.dark)).bg(to_color(face)));
    let inner = block.inner(rect);
    surface.render(block, rect);

    let x = inner.x + 3;
    let text_width = inner.width.saturating_sub(6);
    let middle = inner.y + inner.height / 2;

    surface.render(
        Paragraph::new(Span::styled(
            card.num.as_str(),
            Style::default()
                .fg(app.theme.signal)
                .add_modifier(Modifier::BOLD),
        )),
        Rect::new(x, middle.saturating_sub(3), text_width, 1),
    );
    surface.render(
        Paragraph::new(Span::styled(
            card.title.as_str(),
            Style::default()
                .fg(app.theme.dark)
                .add_modifier(Modifier::BOLD),
        )),
        Rect::new(x, middle.saturating_sub(1), text_width, 1),
    );
    surface.render(
        Paragraph::new(Line::from(vec![
            Span::styled("▎ ", Style::default().fg(app.theme.signal)),
            Span::styled(
                card.desc.as_str(),
                Style::default().fg(tint(palette.dark, 0.7, face)),
            ),
        ]))
        .wrap(Wrap { trim: true }),
        Rect::new(x, middle + 1, text_width, 3),
    );
}
