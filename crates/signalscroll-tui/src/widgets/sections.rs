//! Flowing page sections: hero, features, philosophy and footer
//!
//! Each section is drawn into its own [`Surface`] at full height and then
//! blitted at its scroll offset. Animated elements are placed from their
//! document bounds plus the engine's `y` translation, and faded towards the
//! section background by their opacity.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use signalscroll_core::{Bounds, Property, PropertySet, Rgba, TargetId};

use super::{centered_band, rows, scaled, Surface};
use crate::app::App;
use crate::page::{Page, Section, CALENDAR_CELLS, CALENDAR_TARGET_CELL, COL_PX};
use crate::theme::{faded, tint, to_color, visibility};

const MARGIN: u16 = 4;
const WEEKDAYS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];
const CALENDAR_COL: u16 = 4;

/// A section surface positioned relative to the screen
struct SectionFrame {
    surface: Surface,
    bounds: Bounds,
    top: i32,
    row_px: f64,
    background: Rgba,
}

impl SectionFrame {
    /// `None` when the section is entirely off screen
    fn begin(area: Rect, page: &Page, section: Section) -> Option<Self> {
        let layout = page.layout();
        let bounds = layout.section(section);
        let row_px = layout.row_px;
        let top = rows(bounds.top - page.position(), row_px);
        let height = rows(bounds.height, row_px);
        if top >= i32::from(area.height) || top + height <= 0 {
            return None;
        }

        let background = section.background(page.palette());
        let mut surface = Surface::new(area.width, height);
        surface.fill(Style::default().bg(to_color(background)));
        Some(Self {
            surface,
            bounds,
            top,
            row_px,
            background,
        })
    }

    /// Surface row of a document offset
    fn row(&self, doc_px: f64) -> i32 {
        rows(doc_px - self.bounds.top, self.row_px)
    }

    /// Full-width rect for an element box, shifted by its `y` translation
    fn element(&self, bounds: Bounds, style: &PropertySet) -> Option<Rect> {
        let row = self.row(bounds.top + style.number(Property::Y));
        let height = rows(bounds.height, self.row_px).max(1);
        let area = self.surface.area();
        if row < 0 || row >= i32::from(area.height) {
            return None;
        }
        let width = area.width.saturating_sub(MARGIN * 2);
        Some(Rect::new(MARGIN, row as u16, width, height as u16))
    }

    fn finish(self, frame: &mut Frame, area: Rect) {
        self.surface.blit(frame.buffer_mut(), area, 0, self.top);
    }
}

/// Bounds and animated style of a target
fn animated(page: &Page, target: TargetId) -> Option<(Bounds, PropertySet)> {
    let bounds = page.engine().bounds(target)?;
    Some((bounds, page.style(target)))
}

pub struct HeroWidget;

impl HeroWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let page = &app.page;
        let Some(mut section) = SectionFrame::begin(area, page, Section::Hero) else {
            return;
        };
        let palette = page.palette();
        let bg = section.background;

        for (i, target) in page.targets().hero_lines.iter().enumerate() {
            let Some((bounds, style)) = animated(page, *target) else {
                continue;
            };
            let Some(rect) = section.element(bounds, &style) else {
                continue;
            };
            let line = match i {
                0 => Line::from(Span::styled(
                    "SYSTEM INITIALIZATION",
                    Style::default().fg(faded(palette.signal, bg, &style)),
                )),
                1 => Line::from(vec![
                    Span::styled(
                        "MASTER ",
                        Style::default()
                            .fg(faded(palette.paper, bg, &style))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled("the", Style::default().fg(faded(palette.paper, bg, &style))),
                ]),
                2 => Line::from(Span::styled(
                    "Digital Force.",
                    Style::default()
                        .fg(faded(palette.signal, bg, &style))
                        .add_modifier(Modifier::BOLD | Modifier::ITALIC),
                )),
                3 => Line::from(Span::styled(
                    "Saurabh — Your AI Jedi guiding you through the digital force of machine learning.",
                    Style::default().fg(faded(palette.paper.with_alpha(0.7), bg, &style)),
                )),
                _ => Line::from(Span::styled(
                    " Start Your Training → ",
                    Style::default()
                        .fg(faded(palette.dark, bg, &style))
                        .bg(faded(palette.signal, bg, &style))
                        .add_modifier(Modifier::BOLD),
                )),
            };
            section
                .surface
                .render(Paragraph::new(line).wrap(Wrap { trim: true }), rect);
        }

        section.finish(frame, area);
    }
}

pub struct FeaturesWidget;

impl FeaturesWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let page = &app.page;
        let Some(mut section) = SectionFrame::begin(area, page, Section::Features) else {
            return;
        };
        let palette = page.palette();
        let width = section.surface.area().width;

        let heading = Line::from(Span::styled(
            "// CAPABILITIES",
            Style::default().fg(tint(palette.dark, 0.5, palette.offwhite)),
        ));
        section
            .surface
            .render(Paragraph::new(heading), Rect::new(MARGIN, 1, width, 1));

        let cards = page.layout().feature_cards();
        let row = section.row(cards.top).max(0) as u16;
        let strip = Rect::new(
            MARGIN,
            row,
            width.saturating_sub(MARGIN * 2),
            rows(cards.height, section.row_px).max(0) as u16,
        );
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .spacing(2)
            .split(strip);

        shuffler_card(&mut section.surface, columns[0], page);
        typewriter_card(&mut section.surface, columns[1], app);
        scheduler_card(&mut section, columns[2], page);

        section.finish(frame, area);
    }
}

fn card_block<'a>(title: &'a str, foreground: Rgba, background: Rgba) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(tint(foreground, 0.1, background)))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().fg(to_color(foreground)).bg(to_color(background)))
}

fn shuffler_card(surface: &mut Surface, rect: Rect, page: &Page) {
    let palette = page.palette();
    let block = card_block("\"Force-Sensitive\" Curation", palette.dark, palette.paper);
    let inner = block.inner(rect);
    surface.render(block, rect);

    let desc = Paragraph::new(Span::styled(
        "Cutting through digital noise to deliver only tools that matter.",
        Style::default().fg(tint(palette.dark, 0.7, palette.paper)),
    ))
    .wrap(Wrap { trim: true });
    surface.render(desc, Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), 3));

    // back to front so the front card lands on top
    let deck: Vec<_> = page.shuffler().cards().collect();
    for (i, card) in deck.iter().enumerate().rev() {
        let y = inner.y + 4 + i as u16;
        let band = scaled(Rect::new(inner.x + 1, y, inner.width.saturating_sub(2), 2), card.scale);
        let style = PropertySet::new().with(Property::Opacity, card.opacity);
        let face = Rgba::rgb(0xFF, 0xFF, 0xFF);
        let text = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {}", card.label.to_uppercase()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]))
        .style(
            Style::default()
                .fg(faded(palette.dark, palette.paper, &style))
                .bg(faded(face, palette.paper, &style)),
        );
        surface.render(text, band);
    }
}

fn typewriter_card(surface: &mut Surface, rect: Rect, app: &App) {
    let page = &app.page;
    let palette = page.palette();
    let block = card_block("The \"Padawan\" Path", palette.paper, palette.dark);
    let inner = block.inner(rect);
    surface.render(block, rect);

    let live = Line::from(vec![
        Span::styled(" ● ", Style::default().fg(app.theme.signal)),
        Span::styled(
            "Live Transmission",
            Style::default().fg(tint(palette.paper, 0.6, palette.dark)),
        ),
    ]);
    surface.render(Paragraph::new(live), Rect::new(inner.x, inner.y, inner.width, 1));

    let panel = Rect::new(
        inner.x + 1,
        inner.y + 2,
        inner.width.saturating_sub(2),
        inner.height.saturating_sub(3),
    );
    let panel_bg = Rgba::rgb(0x1A, 0x1A, 0x1A);
    let text = vec![
        Line::from(Span::styled(
            "> sys.boot.protocol",
            Style::default().fg(tint(palette.signal, 0.5, panel_bg)),
        )),
        Line::from(vec![
            Span::raw(page.typewriter().visible().to_string()),
            Span::styled("█", Style::default().fg(app.theme.signal)),
        ]),
    ];
    surface.render(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(app.theme.paper).bg(app.theme.panel)),
        panel,
    );
}

fn scheduler_card(section: &mut SectionFrame, rect: Rect, page: &Page) {
    let palette = page.palette();
    let block = card_block("Wisdom Over Hype", palette.dark, palette.paper);
    let inner = block.inner(rect);
    section.surface.render(block, rect);

    let desc = Paragraph::new(Span::styled(
        "Philosophy over tutorials. Learn to think with the tools.",
        Style::default().fg(tint(palette.dark, 0.7, palette.paper)),
    ))
    .wrap(Wrap { trim: true });
    section
        .surface
        .render(desc, Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), 3));

    let calendar = page.layout().calendar();
    let grid_top = section.row(calendar.top).max(0) as u16;
    let grid_width = CALENDAR_COL * 7 + 1;
    let grid = centered_band(
        Rect::new(inner.x, grid_top, inner.width, rows(calendar.height, section.row_px) as u16),
        grid_width,
    );
    section.surface.render(
        Block::default().style(Style::default().bg(to_color(palette.offwhite))),
        grid,
    );

    let header: Vec<Span> = WEEKDAYS
        .iter()
        .map(|d| {
            Span::styled(
                format!(" {d}  "),
                Style::default().fg(tint(palette.dark, 0.5, palette.offwhite)),
            )
        })
        .collect();
    section.surface.render(
        Paragraph::new(Line::from(header)),
        Rect::new(grid.x, grid.y, grid.width, 1),
    );

    let highlight = page.style(page.targets().cell);
    for cell in 0..CALENDAR_CELLS {
        let (row, col) = ((cell / 7) as u16, (cell % 7) as u16);
        let style = if cell == CALENDAR_TARGET_CELL {
            let bg = highlight.color(Property::Background).over(&palette.offwhite);
            Style::default()
                .fg(to_color(highlight.color(Property::Color).over(&bg)))
                .bg(to_color(bg))
        } else {
            Style::default().fg(to_color(palette.dark))
        };
        section.surface.render(
            Paragraph::new(Span::styled(format!("{:>2} ", cell + 1), style)),
            Rect::new(grid.x + col * CALENDAR_COL, grid.y + 1 + row, CALENDAR_COL - 1, 1),
        );
    }

    // The cursor moves in half-height rows so its path crosses the grid
    let cursor = page.style(page.targets().cursor);
    if visibility(&cursor) < 0.05 {
        return;
    }
    let x = (cursor.number(Property::X) / COL_PX).round() as i32;
    let y = rows(cursor.number(Property::Y), section.row_px * 2.0);
    let (cx, cy) = (i32::from(grid.x) + 1 + x, i32::from(grid.y) + y);
    if cx < 0 || cy < 0 {
        return;
    }
    let glyph = if cursor.number(Property::Scale) < 0.95 { "▸" } else { "➤" };
    let under = if cy == i32::from(grid.y) + 2 && cx >= i32::from(grid.x) {
        palette.offwhite
    } else {
        palette.paper
    };
    section.surface.render(
        Paragraph::new(Span::styled(
            glyph,
            Style::default().fg(faded(palette.dark, under, &cursor)),
        )),
        Rect::new(cx as u16, cy as u16, 1, 1),
    );
}

pub struct PhilosophyWidget;

impl PhilosophyWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let page = &app.page;
        let Some(mut section) = SectionFrame::begin(area, page, Section::Philosophy) else {
            return;
        };
        let palette = page.palette();
        let bg = section.background;

        if let Some(first) = page.layout().philosophy_lines().first() {
            let row = section.row(first.top) - 4;
            if row >= 0 {
                let lead = Paragraph::new(Span::styled(
                    "Most influencers focus on: following the latest 10-minute tutorial hype.",
                    Style::default().fg(tint(palette.paper, 0.5, bg)),
                ))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
                let width = section.surface.area().width;
                section.surface.render(lead, Rect::new(MARGIN, row as u16, width.saturating_sub(MARGIN * 2), 2));
            }
        }

        for (i, target) in page.targets().philosophy_lines.iter().enumerate() {
            let Some((bounds, style)) = animated(page, *target) else {
                continue;
            };
            let Some(rect) = section.element(bounds, &style) else {
                continue;
            };
            let (text, color) = if i == 0 {
                ("We focus on:", palette.paper)
            } else {
                ("Thinking with the tools.", palette.signal)
            };
            let line = Paragraph::new(Span::styled(
                text,
                Style::default()
                    .fg(faded(color, bg, &style))
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            section.surface.render(line, rect);
        }

        section.finish(frame, area);
    }
}

pub struct FooterWidget;

impl FooterWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let page = &app.page;
        let Some(mut section) = SectionFrame::begin(area, page, Section::Footer) else {
            return;
        };
        let palette = page.palette();
        let bg = section.background;
        let full = section.surface.area();
        let body = centered_band(full, 64);
        let row = |y: u16, height: u16| Rect::new(body.x, y, body.width, height);

        let lines: [(Paragraph, Rect); 4] = [
            (
                Paragraph::new(Span::styled(
                    "Join the Council.",
                    Style::default()
                        .fg(to_color(palette.paper))
                        .add_modifier(Modifier::BOLD | Modifier::ITALIC),
                )),
                row(3, 1),
            ),
            (
                Paragraph::new(Span::styled(
                    "Subscribe to the Signal and receive raw, unpolished transmissions of AI wisdom directly to your terminal.",
                    Style::default().fg(tint(palette.paper, 0.6, bg)),
                ))
                .wrap(Wrap { trim: true }),
                row(5, 2),
            ),
            (
                Paragraph::new(Span::styled(
                    " SUBSCRIBE TO THE SIGNAL ",
                    Style::default()
                        .fg(app.theme.dark)
                        .bg(app.theme.signal)
                        .add_modifier(Modifier::BOLD),
                )),
                row(8, 1),
            ),
            (
                Paragraph::new("─".repeat(usize::from(full.width)))
                    .style(Style::default().fg(tint(palette.paper, 0.1, bg))),
                Rect::new(0, 11, full.width, 1),
            ),
        ];
        for (paragraph, rect) in lines {
            section.surface.render(paragraph.alignment(Alignment::Center), rect);
        }

        let bottom = Rect::new(MARGIN, 13, full.width.saturating_sub(MARGIN * 2), 1);
        let status = Paragraph::new(Line::from(vec![
            Span::styled("● ", Style::default().fg(app.theme.signal)),
            Span::styled(
                "SYSTEM OPERATIONAL",
                Style::default().fg(tint(palette.paper, 0.6, bg)),
            ),
        ]));
        let copyright = Paragraph::new(Span::styled(
            "© 2026 SAURABH. DIGITAL FORCE.",
            Style::default().fg(tint(palette.paper, 0.4, bg)),
        ))
        .alignment(Alignment::Center);
        let links = Paragraph::new(Span::styled(
            "Transmissions  Archives  Data Policy",
            Style::default().fg(tint(palette.paper, 0.4, bg)),
        ))
        .alignment(Alignment::Right);
        section.surface.render(status, bottom);
        section.surface.render(copyright, bottom);
        section.surface.render(links, bottom);

        section.finish(frame, area);
    }
}
