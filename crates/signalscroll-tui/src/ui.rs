use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::app::{App, Mode, STATUS_ROWS};
use crate::widgets::{
    FeaturesWidget, FooterWidget, HeroWidget, NavbarWidget, PhilosophyWidget, PopupWidget,
    ProtocolWidget, StatusBarWidget,
};

/// Draw one frame: page sections in document order, the fixed navbar on
/// top, then the status bar and any overlay
pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    // Main layout: page + status bar
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_ROWS)])
        .split(size);
    let page_area = main_layout[0];

    frame.render_widget(
        Block::default().style(Style::default().bg(app.theme.dark)),
        page_area,
    );
    HeroWidget::render(frame, page_area, app);
    FeaturesWidget::render(frame, page_area, app);
    PhilosophyWidget::render(frame, page_area, app);
    ProtocolWidget::render(frame, page_area, app);
    FooterWidget::render(frame, page_area, app);
    NavbarWidget::render(frame, page_area, app);

    StatusBarWidget::render(frame, main_layout[1], app);

    if app.show_inspector {
        PopupWidget::render_inspector(frame, app);
    }
    if app.mode == Mode::Help {
        PopupWidget::render_help(frame, &app.theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use signalscroll_core::AppConfig;

    use crate::input::Action;
    use crate::page::Section;

    const COLS: u16 = 120;
    const ROWS: u16 = 41;

    fn app() -> App {
        let mut config = AppConfig::default();
        config.ui.smooth_scroll = false;
        App::new(Arc::new(config), COLS, ROWS).unwrap()
    }

    fn render(app: &App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(COLS, ROWS)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                if let Some(cell) = buffer.cell((x, y)) {
                    out.push_str(cell.symbol());
                }
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_hero_and_navbar_on_first_frame() {
        let mut app = app();
        app.update(Duration::from_secs(2));
        let screen = text(&render(&app));
        assert!(screen.contains("SAURABH."));
        assert!(screen.contains("SYSTEM INITIALIZATION"));
        assert!(screen.contains("NORMAL"));
    }

    #[test]
    fn test_every_section_renders() {
        let mut app = app();
        let expected = [
            (Section::Features, "Wisdom Over Hype"),
            (Section::Philosophy, "Most influencers focus on"),
            (Section::Protocol, "Signal Extraction"),
            (Section::Footer, "Join the Council."),
        ];
        for (section, needle) in expected {
            app.apply(Action::JumpToSection(section));
            app.update(Duration::from_millis(16));
            let screen = text(&render(&app));
            assert!(screen.contains(needle), "{needle} missing at {section:?}");
        }
    }

    #[test]
    fn test_overlays() {
        let mut app = app();
        app.apply(Action::ToggleInspector);
        app.apply(Action::ShowHelp);
        let screen = text(&render(&app));
        assert!(screen.contains("Inspector"));
        assert!(screen.contains("jump to section"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut config = AppConfig::default();
        config.ui.smooth_scroll = false;
        let mut app = App::new(Arc::new(config), 8, 3).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(8, 3)).unwrap();
        for _ in 0..20 {
            app.apply(Action::ScrollPageDown);
            app.update(Duration::from_millis(50));
            terminal.draw(|frame| draw(frame, &app)).unwrap();
        }
    }
}
