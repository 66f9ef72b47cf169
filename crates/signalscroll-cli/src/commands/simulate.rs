use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use signalscroll_core::{AppConfig, Placement, Property, Rgba, ToggleState, Viewport};
use signalscroll_tui::Page;

/// What the page looks like after settling at one scroll position
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub position: f64,
    pub clock_secs: f64,
    pub section: &'static str,
    pub navbar: NavbarReport,
    pub cards: Vec<CardReport>,
    pub listeners: usize,
    pub scheduled: usize,
}

#[derive(Debug, Serialize)]
pub struct NavbarReport {
    pub state: ToggleState,
    pub background: Rgba,
    pub color: Rgba,
}

#[derive(Debug, Serialize)]
pub struct CardReport {
    pub name: String,
    pub placement: Placement,
    pub viewport_top: f64,
    pub scale: f64,
    pub blur: f64,
    pub opacity: f64,
}

pub fn run(
    config: &AppConfig,
    positions: &[f64],
    step_ms: u64,
    (width, height): (f64, f64),
    json: bool,
) -> Result<()> {
    let frames = simulate(
        config,
        positions,
        Duration::from_millis(step_ms),
        Viewport::new(width, height),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(());
    }

    for frame in &frames {
        println!(
            "scroll {:>7.1}px  t={:.2}s  {:<10}  navbar {:?} (bg alpha {:.2})",
            frame.position,
            frame.clock_secs,
            frame.section,
            frame.navbar.state,
            frame.navbar.background.a,
        );
        for card in &frame.cards {
            let placement = if card.placement.is_fixed() { "pinned" } else { "flow" };
            println!(
                "    {:<8} {:<6} top {:>7.1}  scale {:.3}  blur {:>5.2}  opacity {:.3}",
                card.name, placement, card.viewport_top, card.scale, card.blur, card.opacity
            );
        }
    }
    Ok(())
}

/// Scroll to each position in turn and let the clock run `settle` in frames
pub fn simulate(
    config: &AppConfig,
    positions: &[f64],
    settle: Duration,
    viewport: Viewport,
) -> Result<Vec<FrameReport>> {
    let mut page = Page::new(config, viewport)?;
    let frame = config.ui.frame_interval();
    info!(positions = positions.len(), ?settle, "Simulating");

    let mut reports = Vec::with_capacity(positions.len());
    for &position in positions {
        page.scroll_to(position);
        let mut elapsed = Duration::ZERO;
        while elapsed < settle {
            let dt = frame.min(settle - elapsed);
            page.advance(dt);
            elapsed += dt;
        }
        reports.push(report(&page));
    }
    Ok(reports)
}

fn report(page: &Page) -> FrameReport {
    let engine = page.engine();
    let nav = page.style(page.targets().nav);

    let cards = page
        .targets()
        .cards
        .iter()
        .filter_map(|&id| {
            let name = engine.with_stage(|stage| stage.get(id).map(|t| t.name().to_string()))?;
            let style = page.style(id);
            Some(CardReport {
                name,
                placement: engine.placement(id)?,
                viewport_top: engine.viewport_top(id)?,
                scale: style.number(Property::Scale),
                blur: style.number(Property::Blur),
                opacity: style.number(Property::Opacity),
            })
        })
        .collect();

    FrameReport {
        position: page.position(),
        clock_secs: engine.now(),
        section: page.current_section().label(),
        navbar: NavbarReport {
            state: page.navbar_state(),
            background: nav.color(Property::Background),
            color: nav.color(Property::Color),
        },
        cards,
        listeners: engine.listener_count(),
        scheduled: engine.scheduled_count(),
    }
}
