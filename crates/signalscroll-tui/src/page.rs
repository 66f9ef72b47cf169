//! The landing page as a set of engine targets and scenes
//!
//! Everything is measured in document pixels. A terminal row is
//! `ui.row_px` pixels tall and a column is [`COL_PX`] wide, so section
//! heights expressed in viewport heights keep their proportions at any
//! terminal size.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use signalscroll_core::config::{AppConfig, ProtocolCardConfig};
use signalscroll_core::effects::{Shuffler, Typewriter};
use signalscroll_core::{
    Anchor, BindingMode, Bounds, CoverEffect, Disposer, EaseMode, Easing, EngineSnapshot, Palette,
    Position, Property, PropertySet, RangeEnd, Repeat, Rgba, SceneSpec, ScrollEngine, StackSpec,
    TargetId, Timeline, ToggleSpec, ToggleState, TriggerSpec, Tween, Viewport,
};
use tracing::{debug, info};

/// Document pixels per terminal column
pub const COL_PX: f64 = 10.0;

const NAV_ROWS: f64 = 3.0;
const FEATURES_ROWS: f64 = 22.0;
const PHILOSOPHY_MIN_ROWS: f64 = 16.0;
const FOOTER_ROWS: f64 = 18.0;

/// Index of the highlighted cell in the scheduler calendar
pub const CALENDAR_TARGET_CELL: usize = 9;
pub const CALENDAR_CELLS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hero,
    Features,
    Philosophy,
    Protocol,
    Footer,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Hero,
        Section::Features,
        Section::Philosophy,
        Section::Protocol,
        Section::Footer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Hero => "Hero",
            Section::Features => "Features",
            Section::Philosophy => "Philosophy",
            Section::Protocol => "Protocol",
            Section::Footer => "Join",
        }
    }

    fn target_name(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::Features => "features",
            Section::Philosophy => "philosophy",
            Section::Protocol => "protocol",
            Section::Footer => "footer",
        }
    }

    /// Page colour behind the section
    pub fn background(self, palette: &Palette) -> Rgba {
        match self {
            Section::Hero | Section::Footer => palette.dark,
            Section::Philosophy => palette.black,
            Section::Features | Section::Protocol => palette.offwhite,
        }
    }
}

/// Section and element boxes for one viewport size
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub viewport: Viewport,
    pub row_px: f64,
    sections: Vec<(Section, Bounds)>,
    card_count: usize,
}

impl Layout {
    pub fn compute(viewport: Viewport, row_px: f64, card_count: usize) -> Self {
        let vh = viewport.height;
        let heights = [
            (Section::Hero, vh),
            (Section::Features, FEATURES_ROWS * row_px),
            (Section::Philosophy, vh.max(PHILOSOPHY_MIN_ROWS * row_px)),
            (Section::Protocol, vh * card_count.max(1) as f64),
            (Section::Footer, FOOTER_ROWS * row_px),
        ];
        let mut top = 0.0;
        let sections = heights
            .into_iter()
            .map(|(section, height)| {
                let bounds = Bounds::new(top, height);
                top += height;
                (section, bounds)
            })
            .collect();
        Self {
            viewport,
            row_px,
            sections,
            card_count,
        }
    }

    pub fn section(&self, section: Section) -> Bounds {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, b)| *b)
            .unwrap_or_default()
    }

    pub fn document_height(&self) -> f64 {
        self.section(Section::Footer).bottom()
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport.height).max(0.0)
    }

    /// Section under the navbar at a scroll position
    pub fn section_at(&self, position: f64) -> Section {
        let probe = position + NAV_ROWS * self.row_px;
        self.sections
            .iter()
            .rev()
            .find(|(_, b)| b.top <= probe)
            .map(|(s, _)| *s)
            .unwrap_or(Section::Hero)
    }

    pub fn nav(&self) -> Bounds {
        Bounds::new(0.0, NAV_ROWS * self.row_px)
    }

    /// Label, two headline lines, copy and call to action, bottom-aligned
    pub fn hero_lines(&self) -> Vec<Bounds> {
        let hero = self.section(Section::Hero);
        let r = self.row_px;
        [(13.0, 1.0), (11.0, 2.0), (9.0, 2.0), (6.0, 2.0), (3.0, 1.0)]
            .into_iter()
            .map(|(from_bottom, rows)| {
                Bounds::new((hero.bottom() - from_bottom * r).max(hero.top), rows * r)
            })
            .collect()
    }

    /// The three feature cards side by side
    pub fn feature_cards(&self) -> Bounds {
        let features = self.section(Section::Features);
        Bounds::new(features.top + 4.0 * self.row_px, 14.0 * self.row_px)
    }

    /// Origin of the calendar grid inside the scheduler card
    pub fn calendar(&self) -> Bounds {
        let cards = self.feature_cards();
        Bounds::new(cards.top + 5.0 * self.row_px, 4.0 * self.row_px)
    }

    pub fn philosophy_lines(&self) -> Vec<Bounds> {
        let section = self.section(Section::Philosophy);
        let r = self.row_px;
        let middle = section.top + section.height / 2.0;
        vec![
            Bounds::new(middle - 2.0 * r, 2.0 * r),
            Bounds::new(middle + r, 3.0 * r),
        ]
    }

    /// Each card one viewport tall, stacked down the protocol section
    pub fn cards(&self) -> Vec<Bounds> {
        let protocol = self.section(Section::Protocol);
        let vh = self.viewport.height;
        (0..self.card_count)
            .map(|i| Bounds::new(protocol.top + vh * i as f64, vh))
            .collect()
    }
}

/// Engine targets the widgets read back
#[derive(Debug, Clone)]
pub struct Targets {
    pub nav: TargetId,
    pub sections: Vec<(Section, TargetId)>,
    pub hero_lines: Vec<TargetId>,
    pub cursor: TargetId,
    pub cell: TargetId,
    pub philosophy_lines: Vec<TargetId>,
    pub cards: Vec<TargetId>,
}

impl Targets {
    pub fn section(&self, section: Section) -> Option<TargetId> {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, id)| *id)
    }
}

/// Motion parameters parsed out of the config
#[derive(Debug, Clone)]
struct Choreography {
    palette: Palette,
    nav_threshold: f64,
    nav_duration: Duration,
    nav_easing: Easing,
    nav_inactive: PropertySet,
    nav_active: PropertySet,
    hero_offset: f64,
    hero_duration: Duration,
    hero_stagger: Duration,
    hero_delay: Duration,
    hero_easing: Easing,
    philosophy_start: Anchor,
    philosophy_offset: f64,
    philosophy_duration: Duration,
    philosophy_stagger: Duration,
    philosophy_easing: Easing,
    philosophy_restartable: bool,
    cursor_repeat_delay: Duration,
    pin_start: Anchor,
    pin_end: Anchor,
    cover_start: Anchor,
    cover_end: RangeEnd,
    cover: CoverEffect,
    trailing_cover_end: Option<RangeEnd>,
}

impl Choreography {
    fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            palette: config.palette.parse()?,
            nav_threshold: config.navbar.threshold_px,
            nav_duration: Duration::from_millis(config.navbar.transition_ms),
            nav_easing: config.navbar.easing()?,
            nav_inactive: config.navbar.inactive.to_properties()?,
            nav_active: config.navbar.active.to_properties()?,
            hero_offset: config.hero.offset_y,
            hero_duration: Duration::from_millis(config.hero.duration_ms),
            hero_stagger: Duration::from_millis(config.hero.stagger_ms),
            hero_delay: Duration::from_millis(config.hero.delay_ms),
            hero_easing: config.hero.easing()?,
            philosophy_start: config.philosophy.start()?,
            philosophy_offset: config.philosophy.offset_y,
            philosophy_duration: Duration::from_millis(config.philosophy.duration_ms),
            philosophy_stagger: Duration::from_millis(config.philosophy.stagger_ms),
            philosophy_easing: config.philosophy.easing()?,
            philosophy_restartable: config.philosophy.restartable,
            cursor_repeat_delay: Duration::from_millis(config.features.cursor_repeat_delay_ms),
            pin_start: config.protocol.pin_start()?,
            pin_end: config.protocol.pin_end()?,
            cover_start: config.protocol.cover_start()?,
            cover_end: config.protocol.cover_end()?,
            cover: config.protocol.cover,
            trailing_cover_end: config.protocol.trailing_cover_end()?,
        })
    }
}

/// The page: engine, layout, scenes and the self-timed card effects
pub struct Page {
    engine: ScrollEngine,
    layout: Layout,
    targets: Targets,
    motion: Choreography,
    cards: Vec<ProtocolCardConfig>,
    typewriter: Typewriter,
    shuffler: Shuffler,
    navbar: Rc<Cell<ToggleState>>,
    scenes: Vec<Disposer>,
}

impl Page {
    /// Build the page for a viewport and mount every scene
    pub fn new(config: &AppConfig, viewport: Viewport) -> Result<Self> {
        let motion = Choreography::from_config(config)?;
        let cards = config.protocol.cards.clone();
        let layout = Layout::compute(viewport, config.ui.row_px, cards.len());
        let engine = ScrollEngine::new(viewport);
        let targets = register(&engine, &layout, &motion);

        let features = &config.features;
        let mut page = Self {
            engine,
            layout,
            targets,
            motion,
            cards,
            typewriter: Typewriter::new(
                features.typewriter_text.clone(),
                Duration::from_millis(features.typewriter_tick_ms),
                features.typewriter_pause_ticks,
            ),
            shuffler: Shuffler::new(
                features.shuffle_items.clone(),
                Duration::from_millis(features.shuffle_interval_ms),
            ),
            navbar: Rc::new(Cell::new(ToggleState::Inactive)),
            scenes: Vec::new(),
        };
        page.mount();
        info!(
            document_height = page.layout.document_height(),
            targets = page.engine.with_stage(|s| s.len()),
            "Page ready"
        );
        Ok(page)
    }

    /// Terminal size to viewport
    pub fn viewport_for(columns: u16, rows: u16, row_px: f64) -> Viewport {
        Viewport::new(f64::from(columns) * COL_PX, f64::from(rows) * row_px)
    }

    /// Mount all scenes and evaluate them once at the current position
    pub fn mount(&mut self) {
        if !self.scenes.is_empty() {
            return;
        }
        self.typewriter.reset();
        self.shuffler.reset();
        self.navbar.set(ToggleState::for_position(
            self.engine.position(),
            self.motion.nav_threshold,
        ));
        let scenes = [
            self.navbar_scene(),
            self.hero_scene(),
            self.features_scene(),
            self.philosophy_scene(),
            self.protocol_scene(),
        ];
        for scene in scenes {
            self.scenes.push(self.engine.mount(scene));
        }
        self.engine.refresh();
        debug!(
            listeners = self.engine.listener_count(),
            scheduled = self.engine.scheduled_count(),
            "Scenes mounted"
        );
    }

    /// Dispose every scene
    pub fn unmount(&mut self) {
        for scene in self.scenes.drain(..) {
            scene.dispose();
        }
        debug!(
            listeners = self.engine.listener_count(),
            scheduled = self.engine.scheduled_count(),
            "Scenes disposed"
        );
    }

    /// Tear down and mount again, replaying the entrances
    pub fn remount(&mut self) {
        self.unmount();
        self.mount();
    }

    pub fn is_mounted(&self) -> bool {
        !self.scenes.is_empty()
    }

    pub fn resize(&mut self, viewport: Viewport) {
        let layout = Layout::compute(viewport, self.layout.row_px, self.cards.len());
        if layout == self.layout {
            return;
        }
        self.layout = layout;
        self.apply_layout();
        self.engine.resize(viewport);
        let max = self.layout.max_scroll();
        if self.engine.position() > max {
            self.engine.scroll_to(max);
        }
    }

    pub fn scroll_to(&self, position: f64) {
        self.engine
            .scroll_to(position.clamp(0.0, self.layout.max_scroll()));
    }

    /// Advance every clock by one frame; the card effects stop while unmounted
    pub fn advance(&mut self, dt: Duration) {
        self.engine.advance(dt);
        if self.is_mounted() {
            self.typewriter.advance(dt);
            self.shuffler.advance(dt);
        }
    }

    pub fn engine(&self) -> &ScrollEngine {
        &self.engine
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    pub fn palette(&self) -> &Palette {
        &self.motion.palette
    }

    pub fn cards(&self) -> &[ProtocolCardConfig] {
        &self.cards
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn shuffler(&self) -> &Shuffler {
        &self.shuffler
    }

    pub fn position(&self) -> f64 {
        self.engine.position()
    }

    pub fn max_scroll(&self) -> f64 {
        self.layout.max_scroll()
    }

    pub fn current_section(&self) -> Section {
        self.layout.section_at(self.position())
    }

    pub fn navbar_state(&self) -> ToggleState {
        self.navbar.get()
    }

    /// Animated style of a target, empty if it is gone
    pub fn style(&self, target: TargetId) -> PropertySet {
        self.engine.style(target).unwrap_or_default()
    }

    /// Viewport offset of a target, including pinning and its `y` translation
    pub fn screen_top(&self, target: TargetId) -> Option<f64> {
        let top = self.engine.viewport_top(target)?;
        Some(top + self.style(target).number(Property::Y))
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.engine.snapshot()
    }

    fn apply_layout(&self) {
        let t = &self.targets;
        let l = &self.layout;
        self.engine.set_bounds(t.nav, l.nav());
        for (section, id) in &t.sections {
            self.engine.set_bounds(*id, l.section(*section));
        }
        for (id, bounds) in t.hero_lines.iter().zip(l.hero_lines()) {
            self.engine.set_bounds(*id, bounds);
        }
        let calendar = l.calendar();
        self.engine.set_bounds(t.cursor, calendar);
        self.engine.set_bounds(t.cell, calendar);
        for (id, bounds) in t.philosophy_lines.iter().zip(l.philosophy_lines()) {
            self.engine.set_bounds(*id, bounds);
        }
        for (id, bounds) in t.cards.iter().zip(l.cards()) {
            self.engine.set_bounds(*id, bounds);
        }
    }

    fn navbar_scene(&self) -> SceneSpec {
        let m = &self.motion;
        let state = Rc::clone(&self.navbar);
        let spec = ToggleSpec::new(m.nav_threshold, m.nav_inactive.clone(), m.nav_active.clone())
            .target(self.targets.nav)
            .duration(m.nav_duration)
            .easing(m.nav_easing);
        SceneSpec::new("navbar").toggle_with(spec, move |next| {
            debug!(?next, "Navbar style changed");
            state.set(next);
        })
    }

    fn hero_scene(&self) -> SceneSpec {
        let m = &self.motion;
        let entrance = Tween::from(
            self.targets.hero_lines.iter().copied(),
            PropertySet::new()
                .with(Property::Y, m.hero_offset)
                .with(Property::Opacity, 0.0),
        )
        .duration(m.hero_duration)
        .stagger(m.hero_stagger)
        .delay(m.hero_delay)
        .easing(m.hero_easing);
        SceneSpec::new("hero").play(Timeline::single(entrance))
    }

    fn features_scene(&self) -> SceneSpec {
        let (cursor, cell) = (self.targets.cursor, self.targets.cell);
        let palette = &self.motion.palette;
        let at = |x: f64, y: f64| PropertySet::new().with(Property::X, x).with(Property::Y, y);

        let click = Timeline::new()
            .then(
                Tween::to([cursor], at(80.0, 70.0))
                    .duration(Duration::from_secs(1))
                    .easing(Easing::Power(2, EaseMode::InOut)),
            )
            .then(
                Tween::to([cursor], PropertySet::new().with(Property::Scale, 0.8))
                    .duration(Duration::from_millis(100))
                    .yoyo(true)
                    .repeat(1),
            )
            .at(
                Tween::to(
                    [cell],
                    PropertySet::new()
                        .with(Property::Background, palette.signal)
                        .with(Property::Color, palette.dark),
                )
                .duration(Duration::from_millis(200)),
                Position::Overlap(Duration::from_millis(200)),
            )
            .then(
                Tween::to([cursor], at(180.0, 150.0).with(Property::Opacity, 0.0))
                    .duration(Duration::from_secs(1))
                    .delay(Duration::from_millis(500)),
            )
            .then(Tween::set(
                [cell],
                PropertySet::new()
                    .with(Property::Background, Rgba::TRANSPARENT)
                    .with(Property::Color, palette.dark),
            ))
            .then(Tween::set(
                [cursor],
                at(0.0, 0.0)
                    .with(Property::Scale, 1.0)
                    .with(Property::Opacity, 1.0),
            ))
            .repeat(Repeat::Infinite)
            .repeat_delay(self.motion.cursor_repeat_delay);

        SceneSpec::new("features").play(click)
    }

    fn philosophy_scene(&self) -> SceneSpec {
        let m = &self.motion;
        let reveal = Timeline::single(
            Tween::from(
                self.targets.philosophy_lines.iter().copied(),
                PropertySet::new()
                    .with(Property::Y, m.philosophy_offset)
                    .with(Property::Opacity, 0.0),
            )
            .duration(m.philosophy_duration)
            .stagger(m.philosophy_stagger)
            .easing(m.philosophy_easing),
        );
        let mode = if m.philosophy_restartable {
            BindingMode::restartable(reveal)
        } else {
            BindingMode::one_shot(reveal)
        };
        let mut scene = SceneSpec::new("philosophy");
        if let Some(section) = self.targets.section(Section::Philosophy) {
            scene = scene.trigger(TriggerSpec::new(section).start(m.philosophy_start), mode);
        }
        scene
    }

    fn protocol_scene(&self) -> SceneSpec {
        let m = &self.motion;
        let mut scene = SceneSpec::new("protocol");
        if let Some(container) = self.targets.section(Section::Protocol) {
            let mut stack = StackSpec::new(self.targets.cards.iter().copied())
                .pin(m.pin_start, RangeEnd::on(container, m.pin_end))
                .cover(m.cover_start, m.cover_end)
                .effect(m.cover);
            if let Some(end) = m.trailing_cover_end {
                stack = stack.trailing_cover(m.pin_start, end);
            }
            scene = scene.stack(stack);
        }
        scene
    }
}

fn register(engine: &ScrollEngine, layout: &Layout, motion: &Choreography) -> Targets {
    let nav = engine.add_target("nav", layout.nav(), motion.nav_inactive.clone());

    let sections = Section::ALL
        .into_iter()
        .map(|s| (s, engine.add_target(s.target_name(), layout.section(s), PropertySet::new())))
        .collect();

    let hero_lines = layout
        .hero_lines()
        .into_iter()
        .enumerate()
        .map(|(i, b)| engine.add_target(format!("hero-{i}"), b, PropertySet::new()))
        .collect();

    let calendar = layout.calendar();
    let cursor = engine.add_target("cursor", calendar, PropertySet::new());
    let cell = engine.add_target(
        format!("calendar-cell-{CALENDAR_TARGET_CELL}"),
        calendar,
        PropertySet::new()
            .with(Property::Background, Rgba::TRANSPARENT)
            .with(Property::Color, motion.palette.dark),
    );

    let philosophy_lines = layout
        .philosophy_lines()
        .into_iter()
        .enumerate()
        .map(|(i, b)| engine.add_target(format!("philosophy-line-{i}"), b, PropertySet::new()))
        .collect();

    let cards = layout
        .cards()
        .into_iter()
        .enumerate()
        .map(|(i, b)| engine.add_target(format!("card-{}", i + 1), b, PropertySet::new()))
        .collect();

    Targets {
        nav,
        sections,
        hero_lines,
        cursor,
        cell,
        philosophy_lines,
        cards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: u16 = 40;

    fn page() -> Page {
        let config = AppConfig::default();
        Page::new(&config, Page::viewport_for(120, ROWS, config.ui.row_px)).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_layout_stacks_sections() {
        let layout = Layout::compute(Viewport::new(1200.0, 800.0), 20.0, 3);
        assert_eq!(layout.section(Section::Hero), Bounds::new(0.0, 800.0));
        assert_eq!(layout.section(Section::Features).top, 800.0);
        assert_eq!(layout.section(Section::Protocol).height, 2400.0);
        let cards = layout.cards();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[1].top, layout.section(Section::Protocol).top + 800.0);
        assert_eq!(layout.max_scroll(), layout.document_height() - 800.0);
        assert_eq!(layout.section_at(0.0), Section::Hero);
        assert_eq!(layout.section_at(cards[2].top), Section::Protocol);
    }

    #[test]
    fn test_hero_entrance_plays_on_mount() {
        let mut page = page();
        let line = page.targets().hero_lines[0];
        assert!(close(page.style(line).number(Property::Opacity), 0.0));
        assert!(close(page.style(line).number(Property::Y), 40.0));

        page.advance(Duration::from_secs(2));
        assert!(close(page.style(line).number(Property::Opacity), 1.0));
        assert!(close(page.style(line).number(Property::Y), 0.0));
    }

    #[test]
    fn test_navbar_turns_solid_past_threshold() {
        let mut page = page();
        let nav = page.targets().nav;
        assert_eq!(page.style(nav).color(Property::Background), Rgba::TRANSPARENT);

        page.scroll_to(150.0);
        page.advance(Duration::from_millis(400));
        assert_eq!(page.navbar_state(), ToggleState::Active);
        assert!(close(page.style(nav).color(Property::Background).a, 0.8));

        page.scroll_to(50.0);
        page.advance(Duration::from_millis(400));
        assert_eq!(page.navbar_state(), ToggleState::Inactive);
        assert!(close(page.style(nav).color(Property::Background).a, 0.0));
    }

    #[test]
    fn test_philosophy_reveals_once() {
        let mut page = page();
        let line = page.targets().philosophy_lines[0];
        assert!(close(page.style(line).number(Property::Opacity), 0.0));

        let section = page.layout().section(Section::Philosophy);
        let vh = page.layout().viewport.height;
        page.scroll_to(section.top - vh * 0.8 + 1.0);
        page.advance(Duration::from_secs(2));
        assert!(close(page.style(line).number(Property::Opacity), 1.0));

        page.scroll_to(0.0);
        page.scroll_to(section.top);
        assert!(close(page.style(line).number(Property::Opacity), 1.0));
    }

    #[test]
    fn test_protocol_card_covered_while_next_slides_in() {
        let page = page();
        let cards = page.layout().cards();
        let vh = page.layout().viewport.height;
        let ids = page.targets().cards.clone();

        page.scroll_to(cards[1].top - vh / 2.0);
        let first = page.style(ids[0]);
        assert!(page.engine().placement(ids[0]).unwrap().is_fixed());
        assert!(close(page.engine().viewport_top(ids[0]).unwrap(), 0.0));
        assert!(close(first.number(Property::Scale), 0.95));
        assert!(close(first.number(Property::Blur), 10.0));
        assert!(close(first.number(Property::Opacity), 0.75));
        assert!(close(page.engine().viewport_top(ids[1]).unwrap(), vh / 2.0));

        page.scroll_to(cards[1].top);
        assert!(close(page.style(ids[0]).number(Property::Opacity), 0.5));
        assert!(close(page.style(ids[1]).number(Property::Opacity), 1.0));
    }

    #[test]
    fn test_unmount_leaves_nothing_behind() {
        let mut page = page();
        page.advance(Duration::from_millis(300));
        assert!(page.engine().scheduled_count() > 0);

        page.unmount();
        assert!(!page.is_mounted());
        assert_eq!(page.engine().scheduled_count(), 0);
        assert_eq!(page.engine().listener_count(), 0);
        // entrance cut short is rolled back to the natural style
        let line = page.targets().hero_lines[0];
        assert!(close(page.style(line).number(Property::Opacity), 1.0));

        page.remount();
        assert!(page.is_mounted());
        assert!(close(page.style(line).number(Property::Opacity), 0.0));
    }

    #[test]
    fn test_resize_relayouts_and_clamps_scroll() {
        let mut page = page();
        let before = page.max_scroll();
        page.scroll_to(before);
        page.resize(Page::viewport_for(120, ROWS / 2, 20.0));
        assert!(page.max_scroll() < before);
        assert!(page.position() <= page.max_scroll());
        let protocol = page.targets().section(Section::Protocol).unwrap();
        assert_eq!(
            page.engine().bounds(protocol),
            Some(page.layout().section(Section::Protocol))
        );
    }

    #[test]
    fn test_card_effects_follow_frame_clock() {
        let mut page = page();
        assert_eq!(page.typewriter().visible(), "");
        page.advance(Duration::from_millis(300));
        assert_eq!(page.typewriter().visible(), "Bre");
        page.advance(Duration::from_millis(3000));
        assert_eq!(page.shuffler().rotations(), 1);
        assert_eq!(page.shuffler().items()[0], "Agnostic Discovery");
    }

    #[test]
    fn test_last_card_covers_as_it_leaves() {
        let page = page();
        let cards = page.layout().cards();
        let vh = page.layout().viewport.height;
        let last = *page.targets().cards.last().unwrap();

        page.scroll_to(cards[2].top);
        assert!(close(page.style(last).number(Property::Scale), 1.0));
        page.scroll_to(cards[2].top + vh / 4.0);
        assert!(close(page.style(last).number(Property::Scale), 0.975));
        assert!(close(page.style(last).number(Property::Opacity), 0.875));
    }

    #[test]
    fn test_card_effects_stop_while_unmounted() {
        let mut page = page();
        page.advance(Duration::from_millis(300));
        page.unmount();
        page.advance(Duration::from_secs(3));
        assert_eq!(page.typewriter().visible(), "Bre");
        assert_eq!(page.shuffler().rotations(), 0);

        page.mount();
        assert_eq!(page.typewriter().visible(), "");
        page.advance(Duration::from_millis(100));
        assert_eq!(page.typewriter().visible(), "B");
    }

    #[test]
    fn test_remount_mid_stack_restores_cards_at_top() {
        let mut page = page();
        let cards = page.layout().cards();
        let vh = page.layout().viewport.height;
        let first = page.targets().cards[0];

        page.scroll_to(cards[1].top - vh / 2.0);
        assert!(close(page.style(first).number(Property::Scale), 0.95));
        page.remount();
        page.scroll_to(0.0);
        let style = page.style(first);
        assert!(close(style.number(Property::Scale), 1.0));
        assert!(close(style.number(Property::Blur), 0.0));
        assert!(close(style.number(Property::Opacity), 1.0));
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let mut config = AppConfig::default();
        config.protocol.pin_end = "middle nowhere".to_string();
        assert!(Page::new(&config, Viewport::new(800.0, 600.0)).is_err());
    }
}
