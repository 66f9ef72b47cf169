use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::theme::Theme;

const HELP: &[(&str, &str)] = &[
    ("j / k, ↓ / ↑", "scroll"),
    ("Ctrl-d / Ctrl-u", "half page"),
    ("Ctrl-f / Ctrl-b", "full page"),
    ("gg / G", "top / bottom"),
    ("1-5", "jump to section"),
    ("i", "toggle inspector"),
    ("r", "unmount and remount scenes"),
    ("?", "this help"),
    ("q / Ctrl-c", "quit"),
];

pub struct PopupWidget;

impl PopupWidget {
    /// Key reference
    pub fn render_help(frame: &mut Frame, theme: &Theme) {
        let area = frame.area();
        let popup_width = 48u16.min(area.width.saturating_sub(4));
        let popup_height = (HELP.len() as u16 + 4).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(popup_width, popup_height, area);

        let lines: Vec<Line> = HELP
            .iter()
            .map(|(keys, action)| {
                Line::from(vec![
                    Span::styled(
                        format!("{keys:>18}  "),
                        Style::default()
                            .fg(theme.signal)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(*action, Style::default().fg(theme.paper)),
                ])
            })
            .collect();

        frame.render_widget(Clear, popup_area);
        let block = popup_block(" Keys ", theme);
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);
        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// Live engine state: scroll triggers, their ranges and progress
    pub fn render_inspector(frame: &mut Frame, app: &App) {
        let theme = &app.theme;
        let area = frame.area();
        let popup_width = 64u16.min(area.width.saturating_sub(4));
        let popup_height = area.height.saturating_sub(6).max(3);
        let popup_area = Rect::new(
            area.right().saturating_sub(popup_width + 2),
            area.y + 4,
            popup_width,
            popup_height.min(area.height.saturating_sub(4)),
        );

        let snapshot = app.page.snapshot();
        let dim = Style::default().fg(ratatui::style::Color::Gray);
        let mut lines = vec![
            Line::from(Span::styled(
                format!(
                    "scroll {:.0}px  clock {:.2}s  listeners {}  scheduled {}",
                    snapshot.position, snapshot.clock_secs, snapshot.listeners, snapshot.scheduled
                ),
                Style::default().fg(theme.paper),
            )),
            Line::default(),
        ];

        for binding in &snapshot.bindings {
            let range = binding
                .range
                .map(|r| format!("{:.0}..{:.0}", r.start, r.end))
                .unwrap_or_else(|| "-".to_string());
            let progress = binding
                .progress
                .map(|p| format!("{:>5.1}%", p * 100.0))
                .unwrap_or_else(|| "    -".to_string());
            let mut spans = vec![
                Span::styled(
                    format!("{:<9}", binding.mode),
                    Style::default()
                        .fg(theme.signal)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<20}", binding.trigger.as_deref().unwrap_or("?")),
                    Style::default().fg(theme.paper),
                ),
                Span::styled(format!("{range:<14}"), dim),
                Span::styled(progress, Style::default().fg(theme.paper)),
            ];
            if let Some(pin) = binding.pin {
                spans.push(Span::styled(format!("  {pin:?}"), dim));
            }
            lines.push(Line::from(spans));
        }

        if !snapshot.toggles.is_empty() {
            lines.push(Line::default());
        }
        for toggle in &snapshot.toggles {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<9}", "toggle"),
                    Style::default()
                        .fg(theme.signal)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<20}", toggle.target.as_deref().unwrap_or("?")),
                    Style::default().fg(theme.paper),
                ),
                Span::styled(
                    format!(
                        "{:?}{}",
                        toggle.state,
                        if toggle.transitioning { " (easing)" } else { "" }
                    ),
                    dim,
                ),
            ]));
        }

        frame.render_widget(Clear, popup_area);
        let block = popup_block(" Inspector ", theme);
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

fn popup_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.signal))
        .style(Style::default().bg(theme.panel))
}

/// Helper function to create a centered rect
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect(50, 10, area), Rect::new(25, 15, 50, 10));
        // larger than the area pins to the origin
        assert_eq!(centered_rect(120, 50, area).x, 0);
    }
}
