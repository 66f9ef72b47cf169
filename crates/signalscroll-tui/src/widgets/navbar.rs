use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use signalscroll_core::Property;

use super::centered_band;
use crate::app::App;
use crate::theme::to_color;

const PILL_WIDTH: u16 = 72;

/// Floating navbar; its colours come straight from the toggle's current style
pub struct NavbarWidget;

impl NavbarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let page = &app.page;
        let palette = page.palette();
        let style = page.style(page.targets().nav);

        let underlay = page.current_section().background(palette);
        let background = style.color(Property::Background).over(&underlay);
        let foreground = style.color(Property::Color);
        let border = style.color(Property::BorderColor).over(&background);

        let band = Rect::new(area.x, area.y, area.width, area.height.min(3));
        let pill = centered_band(band, PILL_WIDTH.min(area.width.saturating_sub(2)));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(to_color(border)).bg(to_color(background)))
            .style(app.theme.layered(foreground, background, underlay));
        let inner = block.inner(pill);
        frame.render_widget(block, pill);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(16)])
            .split(inner);

        let links = Line::from(vec![
            Span::styled(" SAURABH.", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   Philosophy   Protocol"),
        ]);
        frame.render_widget(Paragraph::new(links), columns[0]);

        let cta = Paragraph::new(Line::from(Span::styled(
            " Join Council ",
            Style::default()
                .fg(app.theme.dark)
                .bg(app.theme.signal)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Right);
        frame.render_widget(cta, columns[1]);
    }
}
