use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use signalscroll_core::AppConfig;
use tracing::{debug, info};

use crate::input::Action;
use crate::page::{Page, Section};
use crate::scroll::{ScrollAnimator, ScrollSettings};
use crate::theme::Theme;

/// Rows reserved below the page for the status bar
pub const STATUS_ROWS: u16 = 1;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Help,
}

/// Application state
pub struct App {
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    /// The animated page and its scroll engine
    pub page: Page,
    /// Eased scroll position fed into the page every frame
    pub scroll: ScrollAnimator,
    pub mode: Mode,
    /// Engine inspector overlay
    pub show_inspector: bool,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Pending key for multi-key commands (e.g., 'gg')
    pub pending_key: Option<char>,
}

impl App {
    /// Build the app for a terminal of `columns` x `rows`
    pub fn new(config: Arc<AppConfig>, columns: u16, rows: u16) -> Result<Self> {
        let viewport = Page::viewport_for(columns, page_rows(rows), config.ui.row_px);
        let page = Page::new(&config, viewport)?;
        let theme = Theme::new(*page.palette());
        let scroll = ScrollAnimator::new(ScrollSettings::from_config(&config.ui));

        Ok(Self {
            config,
            theme,
            page,
            scroll,
            mode: Mode::Normal,
            show_inspector: false,
            should_quit: false,
            status_message: None,
            pending_key: None,
        })
    }

    /// Viewport height in document pixels
    pub fn viewport_height(&self) -> f64 {
        self.page.layout().viewport.height
    }

    pub fn apply(&mut self, action: Action) {
        if action != Action::PendingG {
            self.clear_pending_key();
        }
        let max = self.page.max_scroll();
        let vh = self.viewport_height();

        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.scroll.scroll_down(max),
            Action::ScrollUp => self.scroll.scroll_up(max),
            Action::ScrollHalfPageDown => self.scroll.half_page_down(vh, max),
            Action::ScrollHalfPageUp => self.scroll.half_page_up(vh, max),
            Action::ScrollPageDown => self.scroll.page_down(vh, max),
            Action::ScrollPageUp => self.scroll.page_up(vh, max),
            Action::JumpToTop => self.scroll.scroll_to(0.0, max),
            Action::JumpToBottom => self.scroll.scroll_to(max, max),
            Action::PendingG => self.pending_key = Some('g'),
            Action::JumpToSection(section) => self.jump_to_section(section),
            Action::ToggleInspector => self.show_inspector = !self.show_inspector,
            Action::Remount => {
                self.page.remount();
                info!("Scenes remounted");
                self.set_status("Scenes remounted");
            }
            Action::ShowHelp => self.mode = Mode::Help,
            Action::ExitMode => {
                self.mode = Mode::Normal;
                self.show_inspector = false;
                self.clear_status();
            }
            Action::None => {}
        }
    }

    pub fn jump_to_section(&mut self, section: Section) {
        let top = self.page.layout().section(section).top;
        debug!(section = section.label(), top, "Jump to section");
        self.scroll.scroll_to(top, self.page.max_scroll());
    }

    /// Advance one frame: ease the scroll, feed it to the engine, run the clocks
    pub fn update(&mut self, dt: Duration) {
        let position = self.scroll.update(dt, self.page.max_scroll());
        if (position - self.page.position()).abs() > f64::EPSILON {
            self.page.scroll_to(position);
        }
        self.page.advance(dt);
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        let viewport = Page::viewport_for(columns, page_rows(rows), self.config.ui.row_px);
        self.page.resize(viewport);
        if self.scroll.target() > self.page.max_scroll() {
            self.scroll.set(self.page.position());
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn clear_pending_key(&mut self) {
        self.pending_key = None;
    }
}

fn page_rows(terminal_rows: u16) -> u16 {
    terminal_rows.saturating_sub(STATUS_ROWS).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut config = AppConfig::default();
        config.ui.smooth_scroll = false;
        App::new(Arc::new(config), 120, 41).unwrap()
    }

    #[test]
    fn test_viewport_excludes_status_bar() {
        let app = app();
        assert_eq!(app.viewport_height(), 40.0 * app.config.ui.row_px);
    }

    #[test]
    fn test_scroll_reaches_engine_on_update() {
        let mut app = app();
        app.apply(Action::ScrollDown);
        app.update(Duration::from_millis(16));
        assert_eq!(app.page.position(), 60.0);

        app.apply(Action::JumpToSection(Section::Protocol));
        app.update(Duration::from_millis(16));
        assert_eq!(app.page.current_section(), Section::Protocol);

        app.apply(Action::JumpToBottom);
        app.update(Duration::from_millis(16));
        assert_eq!(app.page.position(), app.page.max_scroll());
    }

    #[test]
    fn test_pending_g_cleared_by_other_actions() {
        let mut app = app();
        app.apply(Action::PendingG);
        assert_eq!(app.pending_key, Some('g'));
        app.apply(Action::ScrollDown);
        assert_eq!(app.pending_key, None);
    }

    #[test]
    fn test_remount_sets_status() {
        let mut app = app();
        app.apply(Action::Remount);
        assert!(app.page.is_mounted());
        assert!(app.status_message.is_some());
        app.apply(Action::ExitMode);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_resize_clamps_scroll() {
        let mut app = app();
        app.apply(Action::JumpToBottom);
        app.update(Duration::from_millis(16));
        app.resize(120, 21);
        app.update(Duration::from_millis(16));
        assert!(app.page.position() <= app.page.max_scroll());
        assert!(app.scroll.current() <= app.page.max_scroll());
    }
}
