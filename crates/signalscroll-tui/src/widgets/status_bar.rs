use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use signalscroll_core::ToggleState;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Mode};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let page = &app.page;
        let theme = &app.theme;

        let mode_str = match app.mode {
            Mode::Normal if app.show_inspector => "INSPECT",
            Mode::Normal => "NORMAL",
            Mode::Help => "HELP",
        };
        let nav_str = match page.navbar_state() {
            ToggleState::Active => "solid",
            ToggleState::Inactive => "clear",
        };
        let engine = page.engine();

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {msg}")
        } else {
            format!(
                " {} | {} | {:.0}/{:.0}px | nav {} | listeners {} | scheduled {}{}",
                mode_str,
                page.current_section().label(),
                page.position(),
                page.max_scroll(),
                nav_str,
                engine.listener_count(),
                engine.scheduled_count(),
                if page.is_mounted() { "" } else { " | unmounted" },
            )
        };

        let help_hint = " q:quit j/k:scroll 1-5:jump i:inspect r:remount ?:help ";
        let padding_len = usize::from(area.width)
            .saturating_sub(status_text.width() + help_hint.width());

        let bar = Style::default().bg(theme.panel);
        let line = Line::from(vec![
            Span::styled(status_text, bar.fg(theme.paper)),
            Span::styled(" ".repeat(padding_len), bar),
            Span::styled(help_hint, bar.fg(theme.signal)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
