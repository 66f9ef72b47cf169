use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
        SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use signalscroll_core::AppConfig;
use signalscroll_tui::{
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    ui, App,
};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let (columns, rows) = terminal::size()?;
    let mut app = App::new(Arc::clone(&config), columns, rows)?;
    info!(columns, rows, "Starting preview");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("Signal"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = main_loop(&mut terminal, &mut app, &config).await;

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.page.unmount();
    info!("Preview closed");
    result
}

async fn main_loop(terminal: &mut Term, app: &mut App, config: &AppConfig) -> Result<()> {
    let mut events = EventHandler::new(config.ui.tick_rate_ms);
    let mut frames = time::interval(config.ui.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(AppEvent::Key(key)) => {
                    let action = handle_key_event(key, app);
                    debug!(?action, "Key");
                    app.apply(action);
                }
                Some(AppEvent::Resize(columns, rows)) => app.resize(columns, rows),
                // reader gone; nothing more can arrive
                None => break,
            },
            now = frames.tick() => {
                app.update(now - last_frame);
                last_frame = now;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
