//! Scroll engine: the owned registry behind every binding, playback and toggle
//!
//! # Architecture
//!
//! ```text
//! scroll_to / resize / set_bounds          advance(dt)
//!            |                                  |
//!            v                                  v
//!   recompute dirty ranges              sample playbacks
//!   evaluate bindings                   step toggle transitions
//!   evaluate toggles                            |
//!            |                                  |
//!            +------> stage (styles, placements) <------+
//!            |
//!            v
//!   dispatch callbacks (outside the registry borrow)
//! ```
//!
//! The engine is single-threaded. All state lives behind one
//! `Rc<RefCell<..>>`; handles keep a `Weak` to it, so they turn into no-ops
//! once the engine is dropped. User callbacks are always invoked with the
//! registry released, which makes it safe to release bindings or dispose
//! whole scenes from inside a callback.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::Serialize;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace, warn};

use crate::pin::{self, PinPhase, Placement, StackSpec};
use crate::property::PropertySet;
use crate::stage::{Bounds, Stage, TargetId, Viewport};
use crate::timeline::{Origin, ResolvedTimeline, Timeline};
use crate::toggle::{ToggleController, ToggleSpec, ToggleState};
use crate::trigger::{self, BindingMode, ScrollRange, Side, TriggerSpec};
use crate::Result;

new_key_type! {
    pub struct BindingId;
    pub struct PlaybackId;
    pub struct ToggleId;
    pub struct ScopeId;
}

/// Called with the clamped progress whenever it changes
pub type ProgressCallback = Box<dyn FnMut(f64)>;

/// Called with the new state whenever a toggle flips
pub type ToggleCallback = Box<dyn FnMut(ToggleState)>;

/// Pre-animation values of the properties a timeline writes
type Baseline = BTreeMap<TargetId, PropertySet>;

fn baseline_of(stage: &Stage, timeline: &ResolvedTimeline) -> Baseline {
    timeline
        .touched()
        .into_iter()
        .filter_map(|(id, properties)| {
            stage
                .get(id)
                .map(|target| (id, target.style().project(properties)))
        })
        .collect()
}

fn render(stage: &mut Stage, frame: BTreeMap<TargetId, PropertySet>) {
    for (id, values) in frame {
        stage.apply(id, &values);
    }
}

fn restore(stage: &mut Stage, baseline: &Baseline) {
    for (id, values) in baseline {
        stage.apply(*id, values);
    }
}

struct Playback {
    timeline: ResolvedTimeline,
    /// Engine clock at start, in seconds
    started: f64,
    baseline: Baseline,
    scope: Option<ScopeId>,
}

impl Playback {
    /// Finite and not yet finished
    fn is_pending(&self, now: f64) -> bool {
        !self.timeline.is_infinite() && !self.timeline.is_complete(now - self.started)
    }
}

enum BindingKind {
    OneShot {
        timeline: ResolvedTimeline,
        restartable: bool,
        baseline: Baseline,
        playback: Option<PlaybackId>,
    },
    Scrubbed {
        timeline: Option<ResolvedTimeline>,
    },
    Pinned {
        phase: PinPhase,
    },
}

impl BindingKind {
    fn label(&self) -> &'static str {
        match self {
            BindingKind::OneShot { .. } => "one_shot",
            BindingKind::Scrubbed { .. } => "scrubbed",
            BindingKind::Pinned { .. } => "pinned",
        }
    }
}

struct Binding {
    spec: TriggerSpec,
    kind: BindingKind,
    range: Option<ScrollRange>,
    side: Option<Side>,
    progress: Option<f64>,
    fires: u64,
    callback: Option<ProgressCallback>,
    scope: Option<ScopeId>,
}

struct Toggle {
    controller: ToggleController,
    callback: Option<ToggleCallback>,
    scope: Option<ScopeId>,
}

enum Notification {
    Progress(BindingId, f64),
    Toggle(ToggleId, ToggleState),
}

/// Entries removed while the registry was borrowed
///
/// They may own callbacks that capture handles, so they are dropped only
/// after the borrow ends.
#[derive(Default)]
struct Garbage {
    bindings: Vec<Binding>,
    toggles: Vec<Toggle>,
}

struct EngineInner {
    stage: Stage,
    viewport: Viewport,
    position: f64,
    clock: Duration,
    layout_dirty: bool,
    needs_flush: bool,
    bindings: SlotMap<BindingId, Binding>,
    playbacks: SlotMap<PlaybackId, Playback>,
    toggles: SlotMap<ToggleId, Toggle>,
    scopes: SlotMap<ScopeId, String>,
}

impl EngineInner {
    fn new(viewport: Viewport) -> Self {
        Self {
            stage: Stage::new(),
            viewport,
            position: 0.0,
            clock: Duration::ZERO,
            layout_dirty: false,
            needs_flush: false,
            bindings: SlotMap::with_key(),
            playbacks: SlotMap::with_key(),
            toggles: SlotMap::with_key(),
            scopes: SlotMap::with_key(),
        }
    }

    fn now(&self) -> f64 {
        self.clock.as_secs_f64()
    }

    fn mark_layout_dirty(&mut self) {
        self.layout_dirty = true;
        self.needs_flush = true;
    }

    fn play(&mut self, timeline: &Timeline, scope: Option<ScopeId>) -> PlaybackId {
        let resolved = timeline.resolve(&self.stage);
        let baseline = baseline_of(&self.stage, &resolved);
        debug!(
            targets = resolved.targets().len(),
            infinite = resolved.is_infinite(),
            "Starting playback"
        );
        render(&mut self.stage, resolved.sample(0.0));
        let started = self.now();
        self.playbacks.insert(Playback {
            timeline: resolved,
            started,
            baseline,
            scope,
        })
    }

    fn bind(
        &mut self,
        spec: TriggerSpec,
        mode: BindingMode,
        callback: Option<ProgressCallback>,
        scope: Option<ScopeId>,
    ) -> BindingId {
        let range = spec.resolve(&self.stage, self.viewport.height);
        let kind = match mode {
            BindingMode::OneShot {
                timeline,
                restartable,
            } => {
                let resolved = timeline.resolve(&self.stage);
                let baseline = baseline_of(&self.stage, &resolved);
                // entrance effects show their start state before they fire
                render(&mut self.stage, resolved.sample(0.0));
                BindingKind::OneShot {
                    timeline: resolved,
                    restartable,
                    baseline,
                    playback: None,
                }
            }
            BindingMode::Scrubbed { timeline } => BindingKind::Scrubbed {
                // scrubbed values survive disposal, so never start from them
                timeline: timeline.map(|t| t.resolve_from(&self.stage, Origin::Natural)),
            },
            BindingMode::Pinned => BindingKind::Pinned {
                phase: PinPhase::Unpinned,
            },
        };
        trace!(mode = kind.label(), ?range, "Binding created");
        self.needs_flush = true;
        self.bindings.insert(Binding {
            spec,
            kind,
            range,
            side: None,
            progress: None,
            fires: 0,
            callback,
            scope,
        })
    }

    fn add_toggle(
        &mut self,
        spec: ToggleSpec,
        callback: Option<ToggleCallback>,
        scope: Option<ScopeId>,
    ) -> ToggleId {
        self.needs_flush = true;
        self.toggles.insert(Toggle {
            controller: ToggleController::new(spec),
            callback,
            scope,
        })
    }

    fn recompute_ranges(&mut self) {
        let viewport_height = self.viewport.height;
        for binding in self.bindings.values_mut() {
            binding.range = binding.spec.resolve(&self.stage, viewport_height);
        }
        self.layout_dirty = false;
        trace!(bindings = self.bindings.len(), "Recomputed trigger ranges");
    }

    /// Bring every binding and toggle up to date with the scroll position
    fn evaluate(&mut self) -> Vec<Notification> {
        if self.layout_dirty {
            self.recompute_ranges();
        }
        self.needs_flush = false;

        let position = self.position;
        let now = self.now();
        let mut notes = Vec::new();

        let ids: Vec<BindingId> = self.bindings.keys().collect();
        for id in ids {
            self.evaluate_binding(id, position, now, &mut notes);
        }

        let Self { stage, toggles, .. } = self;
        for (id, toggle) in toggles.iter_mut() {
            if let Some(state) = toggle.controller.evaluate(position, now) {
                if toggle.callback.is_some() {
                    notes.push(Notification::Toggle(id, state));
                }
            }
            if let Some(target) = toggle.controller.spec().target {
                stage.apply(target, toggle.controller.style());
            }
        }
        notes
    }

    fn evaluate_binding(
        &mut self,
        id: BindingId,
        position: f64,
        now: f64,
        notes: &mut Vec<Notification>,
    ) {
        let Self {
            stage,
            bindings,
            playbacks,
            ..
        } = self;
        let Some(binding) = bindings.get_mut(id) else {
            return;
        };

        let Some(range) = binding.range else {
            // an unpinnable region must not keep a pinned or shifted placement
            if let (BindingKind::Pinned { phase }, Some(trigger)) =
                (&mut binding.kind, binding.spec.trigger)
            {
                if *phase != PinPhase::Unpinned {
                    stage.set_placement(trigger, Placement::default());
                }
                *phase = PinPhase::Unpinned;
            }
            return;
        };

        let progress = range.progress(position);
        if binding.progress != Some(progress) {
            binding.progress = Some(progress);
            if binding.callback.is_some() {
                notes.push(Notification::Progress(id, progress));
            }
        }
        let side = range.side(position);
        let previous = binding.side.replace(side);

        match &mut binding.kind {
            BindingKind::OneShot {
                timeline,
                restartable,
                baseline,
                playback,
            } => {
                if !trigger::is_entry(previous, side) || (!*restartable && binding.fires > 0) {
                    return;
                }
                binding.fires += 1;
                if let Some(old) = playback.take() {
                    playbacks.remove(old);
                }
                render(stage, timeline.sample(0.0));
                *playback = Some(playbacks.insert(Playback {
                    timeline: timeline.clone(),
                    started: now,
                    baseline: baseline.clone(),
                    scope: binding.scope,
                }));
                debug!(fires = binding.fires, position, "One-shot trigger fired");
            }
            BindingKind::Scrubbed { timeline } => {
                if let Some(timeline) = timeline {
                    render(stage, timeline.sample_progress(progress));
                }
            }
            BindingKind::Pinned { phase } => {
                let Some(trigger) = binding.spec.trigger else {
                    return;
                };
                let Some(bounds) = stage.get(trigger).map(|t| t.bounds()) else {
                    return;
                };
                let (next, placement) = pin::place(Some(range), position, bounds);
                if next != *phase {
                    let previous = *phase;
                    debug!(from = ?previous, to = ?next, position, "Pin phase changed");
                    *phase = next;
                }
                stage.set_placement(trigger, placement);
            }
        }
    }

    /// Advance playbacks and toggle transitions to the current clock
    fn tick(&mut self) {
        let now = self.now();
        let Self {
            stage,
            playbacks,
            toggles,
            ..
        } = self;

        let mut finished = Vec::new();
        for (id, playback) in playbacks.iter() {
            let elapsed = now - playback.started;
            render(stage, playback.timeline.sample(elapsed));
            if playback.timeline.is_complete(elapsed) {
                finished.push(id);
            }
        }
        for id in finished {
            playbacks.remove(id);
            trace!("Playback finished");
        }

        for toggle in toggles.values_mut() {
            if !toggle.controller.is_transitioning() {
                continue;
            }
            toggle.controller.advance(now);
            if let Some(target) = toggle.controller.spec().target {
                stage.apply(target, toggle.controller.style());
            }
        }
    }

    fn cancel_playback(&mut self, id: PlaybackId) -> bool {
        let Some(playback) = self.playbacks.remove(id) else {
            return false;
        };
        if playback.is_pending(self.now()) {
            restore(&mut self.stage, &playback.baseline);
        }
        true
    }

    fn release_binding(&mut self, id: BindingId) -> Option<Binding> {
        let binding = self.bindings.remove(id)?;
        match &binding.kind {
            BindingKind::OneShot {
                baseline, playback, ..
            } => {
                let now = self.now();
                let pending = match playback.and_then(|pid| self.playbacks.remove(pid)) {
                    Some(running) => running.is_pending(now),
                    None => binding.fires == 0,
                };
                if pending {
                    restore(&mut self.stage, baseline);
                }
            }
            BindingKind::Pinned { .. } => {
                if let Some(trigger) = binding.spec.trigger {
                    self.stage.set_placement(trigger, Placement::default());
                }
            }
            BindingKind::Scrubbed { .. } => {}
        }
        debug!(mode = binding.kind.label(), fires = binding.fires, "Released binding");
        Some(binding)
    }

    fn dispose_scope(&mut self, scope: ScopeId) -> Garbage {
        let mut garbage = Garbage::default();
        let Some(name) = self.scopes.remove(scope) else {
            return garbage;
        };

        let bindings: Vec<BindingId> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.scope == Some(scope))
            .map(|(id, _)| id)
            .collect();
        for id in bindings {
            garbage.bindings.extend(self.release_binding(id));
        }

        let playbacks: Vec<PlaybackId> = self
            .playbacks
            .iter()
            .filter(|(_, p)| p.scope == Some(scope))
            .map(|(id, _)| id)
            .collect();
        let cancelled = playbacks.len();
        for id in playbacks {
            self.cancel_playback(id);
        }

        let toggles: Vec<ToggleId> = self
            .toggles
            .iter()
            .filter(|(_, t)| t.scope == Some(scope))
            .map(|(id, _)| id)
            .collect();
        for id in toggles {
            garbage.toggles.extend(self.toggles.remove(id));
        }

        debug!(
            scene = %name,
            bindings = garbage.bindings.len(),
            playbacks = cancelled,
            toggles = garbage.toggles.len(),
            "Disposed scene"
        );
        garbage
    }

    fn scheduled_count(&self) -> usize {
        self.playbacks.len()
            + self
                .toggles
                .values()
                .filter(|t| t.controller.is_transitioning())
                .count()
    }

    fn listener_count(&self) -> usize {
        self.bindings.len() + self.toggles.len()
    }

    fn target_name(&self, id: Option<TargetId>) -> Option<String> {
        id.and_then(|id| self.stage.get(id)).map(|t| t.name().to_string())
    }
}

/// Everything a visual region wants registered while it is mounted
pub enum SceneItem {
    /// Time-based playback started on mount
    Play(Timeline),
    Trigger {
        spec: TriggerSpec,
        mode: BindingMode,
        on_progress: Option<ProgressCallback>,
    },
    Stack(StackSpec),
    Toggle {
        spec: ToggleSpec,
        on_change: Option<ToggleCallback>,
    },
}

/// Declarative description of a mounted region
pub struct SceneSpec {
    name: String,
    items: Vec<SceneItem>,
}

impl SceneSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(mut self, item: SceneItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn play(self, timeline: Timeline) -> Self {
        self.item(SceneItem::Play(timeline))
    }

    pub fn trigger(self, spec: TriggerSpec, mode: BindingMode) -> Self {
        self.item(SceneItem::Trigger {
            spec,
            mode,
            on_progress: None,
        })
    }

    pub fn trigger_with(
        self,
        spec: TriggerSpec,
        mode: BindingMode,
        on_progress: impl FnMut(f64) + 'static,
    ) -> Self {
        self.item(SceneItem::Trigger {
            spec,
            mode,
            on_progress: Some(Box::new(on_progress)),
        })
    }

    pub fn stack(self, stack: StackSpec) -> Self {
        self.item(SceneItem::Stack(stack))
    }

    pub fn toggle(self, spec: ToggleSpec) -> Self {
        self.item(SceneItem::Toggle {
            spec,
            on_change: None,
        })
    }

    pub fn toggle_with(self, spec: ToggleSpec, on_change: impl FnMut(ToggleState) + 'static) -> Self {
        self.item(SceneItem::Toggle {
            spec,
            on_change: Some(Box::new(on_change)),
        })
    }
}

/// Owner of the scroll position, the stage and every registered effect
pub struct ScrollEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl ScrollEngine {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EngineInner::new(viewport))),
        }
    }

    fn handle(&self) -> Weak<RefCell<EngineInner>> {
        Rc::downgrade(&self.inner)
    }

    // --- layout ---

    pub fn add_target(&self, name: impl Into<String>, bounds: Bounds, natural: PropertySet) -> TargetId {
        let mut inner = self.inner.borrow_mut();
        inner.mark_layout_dirty();
        inner.stage.insert(name, bounds, natural)
    }

    /// Unmount an element; bindings that reference it stop triggering
    pub fn remove_target(&self, id: TargetId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let removed = inner.stage.remove(id).is_some();
        if removed {
            inner.mark_layout_dirty();
        }
        removed
    }

    /// Move or resize an element; ranges are recomputed before the next evaluation
    pub fn set_bounds(&self, id: TargetId, bounds: Bounds) -> bool {
        let mut inner = self.inner.borrow_mut();
        let changed = inner.stage.set_bounds(id, bounds);
        if changed {
            inner.mark_layout_dirty();
        }
        changed
    }

    pub fn resize(&self, viewport: Viewport) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.viewport == viewport {
                return;
            }
            debug!(width = viewport.width, height = viewport.height, "Viewport resized");
            inner.viewport = viewport;
            inner.mark_layout_dirty();
        }
        self.flush();
    }

    /// Recompute every range and re-evaluate at the current position
    pub fn refresh(&self) {
        self.inner.borrow_mut().mark_layout_dirty();
        self.flush();
    }

    // --- clocks ---

    pub fn scroll_to(&self, position: f64) {
        if !position.is_finite() {
            warn!(position, "Ignoring non-finite scroll position");
            return;
        }
        self.inner.borrow_mut().position = position;
        self.flush();
    }

    /// Advance the frame clock
    pub fn advance(&self, dt: Duration) {
        let notes = {
            let mut inner = self.inner.borrow_mut();
            let notes = if inner.needs_flush {
                inner.evaluate()
            } else {
                Vec::new()
            };
            inner.clock += dt;
            inner.tick();
            notes
        };
        self.dispatch(notes);
    }

    fn flush(&self) {
        let notes = self.inner.borrow_mut().evaluate();
        self.dispatch(notes);
    }

    fn dispatch(&self, notes: Vec<Notification>) {
        for note in notes {
            match note {
                Notification::Progress(id, progress) => {
                    let callback = self
                        .inner
                        .borrow_mut()
                        .bindings
                        .get_mut(id)
                        .and_then(|b| b.callback.take());
                    let Some(mut callback) = callback else {
                        continue;
                    };
                    callback(progress);
                    let leftover = {
                        let mut inner = self.inner.borrow_mut();
                        match inner.bindings.get_mut(id) {
                            Some(binding) => {
                                binding.callback = Some(callback);
                                None
                            }
                            None => Some(callback),
                        }
                    };
                    drop(leftover);
                }
                Notification::Toggle(id, state) => {
                    let callback = self
                        .inner
                        .borrow_mut()
                        .toggles
                        .get_mut(id)
                        .and_then(|t| t.callback.take());
                    let Some(mut callback) = callback else {
                        continue;
                    };
                    callback(state);
                    let leftover = {
                        let mut inner = self.inner.borrow_mut();
                        match inner.toggles.get_mut(id) {
                            Some(toggle) => {
                                toggle.callback = Some(callback);
                                None
                            }
                            None => Some(callback),
                        }
                    };
                    drop(leftover);
                }
            }
        }
    }

    // --- registration ---

    /// Start a time-based playback right away
    pub fn play(&self, timeline: &Timeline) -> PlaybackHandle {
        let id = self.inner.borrow_mut().play(timeline, None);
        PlaybackHandle {
            engine: self.handle(),
            id,
        }
    }

    pub fn bind(&self, spec: TriggerSpec, mode: BindingMode) -> BindingHandle {
        self.bind_inner(spec, mode, None)
    }

    pub fn bind_with(
        &self,
        spec: TriggerSpec,
        mode: BindingMode,
        on_progress: impl FnMut(f64) + 'static,
    ) -> BindingHandle {
        self.bind_inner(spec, mode, Some(Box::new(on_progress)))
    }

    fn bind_inner(
        &self,
        spec: TriggerSpec,
        mode: BindingMode,
        callback: Option<ProgressCallback>,
    ) -> BindingHandle {
        let id = self.inner.borrow_mut().bind(spec, mode, callback, None);
        self.flush();
        BindingHandle {
            engine: self.handle(),
            id,
        }
    }

    pub fn toggle(&self, spec: ToggleSpec) -> ToggleHandle {
        self.toggle_inner(spec, None)
    }

    pub fn toggle_with(&self, spec: ToggleSpec, on_change: impl FnMut(ToggleState) + 'static) -> ToggleHandle {
        self.toggle_inner(spec, Some(Box::new(on_change)))
    }

    fn toggle_inner(&self, spec: ToggleSpec, callback: Option<ToggleCallback>) -> ToggleHandle {
        let id = self.inner.borrow_mut().add_toggle(spec, callback, None);
        self.flush();
        ToggleHandle {
            engine: self.handle(),
            id,
        }
    }

    /// Register a scene without evaluating it
    ///
    /// The first evaluation happens on the next scroll, refresh or frame.
    pub fn mount(&self, scene: SceneSpec) -> Disposer {
        let mut inner = self.inner.borrow_mut();
        let scope = inner.scopes.insert(scene.name.clone());
        debug!(scene = %scene.name, items = scene.items.len(), "Mounting scene");

        for item in scene.items {
            match item {
                SceneItem::Play(timeline) => {
                    inner.play(&timeline, Some(scope));
                }
                SceneItem::Trigger {
                    spec,
                    mode,
                    on_progress,
                } => {
                    inner.bind(spec, mode, on_progress, Some(scope));
                }
                SceneItem::Stack(stack) => {
                    for (spec, mode) in stack.bindings() {
                        inner.bind(spec, mode, None, Some(scope));
                    }
                }
                SceneItem::Toggle { spec, on_change } => {
                    inner.add_toggle(spec, on_change, Some(scope));
                }
            }
        }
        inner.needs_flush = true;

        Disposer {
            engine: self.handle(),
            scope,
            disposed: Cell::new(false),
        }
    }

    /// Mount a scene and evaluate it once against the current position
    pub fn activate(&self, scene: SceneSpec) -> Disposer {
        let disposer = self.mount(scene);
        self.flush();
        disposer
    }

    // --- queries ---

    pub fn position(&self) -> f64 {
        self.inner.borrow().position
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.borrow().viewport
    }

    /// Engine clock in seconds
    pub fn now(&self) -> f64 {
        self.inner.borrow().now()
    }

    pub fn find_target(&self, name: &str) -> Option<TargetId> {
        self.inner.borrow().stage.find(name)
    }

    pub fn bounds(&self, target: TargetId) -> Option<Bounds> {
        self.inner.borrow().stage.get(target).map(|t| t.bounds())
    }

    /// Current presentation values of a target
    pub fn style(&self, target: TargetId) -> Option<PropertySet> {
        self.inner
            .borrow()
            .stage
            .get(target)
            .map(|t| t.style().clone())
    }

    pub fn placement(&self, target: TargetId) -> Option<Placement> {
        self.inner.borrow().stage.get(target).map(|t| t.placement())
    }

    /// Target top relative to the viewport at the current scroll position
    pub fn viewport_top(&self, target: TargetId) -> Option<f64> {
        let inner = self.inner.borrow();
        let position = inner.position;
        inner.stage.get(target).map(|t| t.viewport_top(position))
    }

    /// Read the whole stage at once
    pub fn with_stage<R>(&self, f: impl FnOnce(&Stage) -> R) -> R {
        f(&self.inner.borrow().stage)
    }

    /// Playbacks in flight plus toggles mid-transition
    pub fn scheduled_count(&self) -> usize {
        self.inner.borrow().scheduled_count()
    }

    /// Live bindings plus toggles
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listener_count()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let inner = self.inner.borrow();
        let position = inner.position;

        let mut targets: Vec<TargetSnapshot> = inner
            .stage
            .iter()
            .map(|(_, t)| TargetSnapshot {
                name: t.name().to_string(),
                bounds: t.bounds(),
                viewport_top: t.viewport_top(position),
                placement: t.placement(),
                style: t.style().clone(),
            })
            .collect();
        targets.sort_by(|a, b| {
            a.bounds
                .top
                .total_cmp(&b.bounds.top)
                .then_with(|| a.name.cmp(&b.name))
        });

        let bindings = inner
            .bindings
            .values()
            .map(|b| BindingSnapshot {
                mode: b.kind.label(),
                trigger: inner.target_name(b.spec.trigger),
                range: b.range,
                side: b.side,
                progress: b.progress,
                fires: b.fires,
                pin: match b.kind {
                    BindingKind::Pinned { phase } => Some(phase),
                    _ => None,
                },
            })
            .collect();

        let toggles = inner
            .toggles
            .values()
            .map(|t| ToggleSnapshot {
                target: inner.target_name(t.controller.spec().target),
                state: t.controller.state(),
                transitions_started: t.controller.transitions_started(),
                transitioning: t.controller.is_transitioning(),
                style: t.controller.style().clone(),
            })
            .collect();

        EngineSnapshot {
            position,
            viewport: inner.viewport,
            clock_secs: inner.now(),
            scheduled: inner.scheduled_count(),
            listeners: inner.listener_count(),
            targets,
            bindings,
            toggles,
        }
    }
}

/// Handle to a trigger binding
///
/// Dropping the handle leaves the binding in place; call [`release`](Self::release).
pub struct BindingHandle {
    engine: Weak<RefCell<EngineInner>>,
    id: BindingId,
}

impl BindingHandle {
    /// Remove the binding; calling it again is a no-op
    pub fn release(&self) {
        let Some(engine) = self.engine.upgrade() else {
            return;
        };
        let removed = engine.borrow_mut().release_binding(self.id);
        drop(removed);
    }

    pub fn is_active(&self) -> bool {
        self.read(|_| ()).is_some()
    }

    /// How many times a one-shot binding has fired
    pub fn fire_count(&self) -> u64 {
        self.read(|b| b.fires).unwrap_or(0)
    }

    pub fn progress(&self) -> Option<f64> {
        self.read(|b| b.progress).flatten()
    }

    pub fn range(&self) -> Option<ScrollRange> {
        self.read(|b| b.range).flatten()
    }

    fn read<R>(&self, f: impl FnOnce(&Binding) -> R) -> Option<R> {
        let engine = self.engine.upgrade()?;
        let inner = engine.borrow();
        inner.bindings.get(self.id).map(f)
    }
}

/// Handle to a time-based playback
pub struct PlaybackHandle {
    engine: Weak<RefCell<EngineInner>>,
    id: PlaybackId,
}

impl PlaybackHandle {
    /// Stop the playback, rolling back a finite one that has not finished
    pub fn cancel(&self) {
        if let Some(engine) = self.engine.upgrade() {
            engine.borrow_mut().cancel_playback(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.engine
            .upgrade()
            .is_some_and(|engine| engine.borrow().playbacks.contains_key(self.id))
    }
}

/// Handle to a threshold toggle
pub struct ToggleHandle {
    engine: Weak<RefCell<EngineInner>>,
    id: ToggleId,
}

impl ToggleHandle {
    pub fn release(&self) {
        let Some(engine) = self.engine.upgrade() else {
            return;
        };
        let removed = engine.borrow_mut().toggles.remove(self.id);
        drop(removed);
    }

    pub fn state(&self) -> Option<ToggleState> {
        self.read(|c| c.state())
    }

    /// Interpolated style, mid-transition values included
    pub fn style(&self) -> Option<PropertySet> {
        self.read(|c| c.style().clone())
    }

    pub fn transitions_started(&self) -> u64 {
        self.read(|c| c.transitions_started()).unwrap_or(0)
    }

    fn read<R>(&self, f: impl FnOnce(&ToggleController) -> R) -> Option<R> {
        let engine = self.engine.upgrade()?;
        let inner = engine.borrow();
        inner.toggles.get(self.id).map(|t| f(&t.controller))
    }
}

/// Tears down everything a scene registered
///
/// Disposal releases the scene's bindings and toggles, cancels its
/// playbacks and rolls back entrance effects that have not finished.
/// It is idempotent and also runs when the disposer is dropped.
pub struct Disposer {
    engine: Weak<RefCell<EngineInner>>,
    scope: ScopeId,
    disposed: Cell<bool>,
}

impl Disposer {
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let Some(engine) = self.engine.upgrade() else {
            return;
        };
        let garbage = engine.borrow_mut().dispose_scope(self.scope);
        drop(garbage);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Serializable view of the engine, for diagnostics and headless runs
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub position: f64,
    pub viewport: Viewport,
    pub clock_secs: f64,
    pub scheduled: usize,
    pub listeners: usize,
    pub targets: Vec<TargetSnapshot>,
    pub bindings: Vec<BindingSnapshot>,
    pub toggles: Vec<ToggleSnapshot>,
}

impl EngineSnapshot {
    pub fn target(&self, name: &str) -> Option<&TargetSnapshot> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSnapshot {
    pub name: String,
    pub bounds: Bounds,
    pub viewport_top: f64,
    pub placement: Placement,
    pub style: PropertySet,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindingSnapshot {
    pub mode: &'static str,
    pub trigger: Option<String>,
    pub range: Option<ScrollRange>,
    pub side: Option<Side>,
    pub progress: Option<f64>,
    pub fires: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<PinPhase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleSnapshot {
    pub target: Option<String>,
    pub state: ToggleState,
    pub transitions_started: u64,
    pub transitioning: bool,
    pub style: PropertySet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::easing::Easing;
    use crate::property::Property;
    use crate::timeline::{Repeat, Tween};
    use crate::trigger::{Anchor, RangeEnd};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn engine() -> ScrollEngine {
        ScrollEngine::new(Viewport::new(1280.0, 1000.0))
    }

    fn reveal(target: TargetId) -> Timeline {
        Timeline::single(
            Tween::from([target], PropertySet::new().with(Property::Y, 50.0).with(Property::Opacity, 0.0))
                .duration(ms(1000)),
        )
    }

    fn number(engine: &ScrollEngine, target: TargetId, property: Property) -> f64 {
        engine.style(target).map(|s| s.number(property)).unwrap_or(f64::NAN)
    }

    #[test]
    fn test_one_shot_fires_once_per_entry_when_restartable() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(1000.0, 500.0), PropertySet::new());
        let spec = TriggerSpec::new(card).start(Anchor::top_top());
        let handle = engine.bind(spec, BindingMode::restartable(reveal(card)));

        for position in [0.0, 1200.0, 2000.0, 1200.0] {
            engine.scroll_to(position);
        }
        assert_eq!(handle.fire_count(), 2);
    }

    #[test]
    fn test_one_shot_non_restartable_fires_once() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(1000.0, 500.0), PropertySet::new());
        let spec = TriggerSpec::new(card).start(Anchor::top_top());
        let handle = engine.bind(spec, BindingMode::one_shot(reveal(card)));

        for position in [0.0, 1200.0, 2000.0, 1200.0, 0.0, 1300.0] {
            engine.scroll_to(position);
        }
        assert_eq!(handle.fire_count(), 1);
    }

    #[test]
    fn test_one_shot_jump_across_range_counts_as_entry() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(1000.0, 500.0), PropertySet::new());
        let spec = TriggerSpec::new(card).start(Anchor::top_top());
        let handle = engine.bind(spec, BindingMode::one_shot(reveal(card)));

        engine.scroll_to(5000.0);
        assert_eq!(handle.fire_count(), 1);
    }

    #[test]
    fn test_one_shot_start_state_renders_before_firing() {
        let engine = engine();
        let line = engine.add_target("line", Bounds::new(3000.0, 100.0), PropertySet::new());
        let spec = TriggerSpec::new(line).start("top 80%".parse().unwrap());
        engine.bind(spec, BindingMode::one_shot(reveal(line)));

        assert!(close(number(&engine, line, Property::Y), 50.0));
        engine.scroll_to(2300.0);
        engine.advance(ms(2000));
        assert!(close(number(&engine, line, Property::Y), 0.0));
        assert!(close(number(&engine, line, Property::Opacity), 1.0));
        assert_eq!(engine.scheduled_count(), 0);
    }

    #[test]
    fn test_scrubbed_progress_callback() {
        let engine = engine();
        let region = engine.add_target("region", Bounds::new(1000.0, 1000.0), PropertySet::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let spec = TriggerSpec::new(region)
            .start(Anchor::top_top())
            .end("+=100%".parse::<RangeEnd>().unwrap());
        let handle = engine.bind_with(spec, BindingMode::progress_only(), move |p| {
            sink.borrow_mut().push(p)
        });

        for position in [500.0, 1000.0, 1250.0, 1500.0, 2000.0, 2500.0, 1500.0] {
            engine.scroll_to(position);
        }
        assert_eq!(*seen.borrow(), vec![0.0, 0.25, 0.5, 1.0, 0.5]);
        assert_eq!(handle.progress(), Some(0.5));
    }

    #[test]
    fn test_pinned_position_is_invariant_inside_range() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(1000.0, 1000.0), PropertySet::new());
        let spec = TriggerSpec::new(card)
            .start(Anchor::top_top())
            .end("+=100%".parse::<RangeEnd>().unwrap());
        engine.bind(spec, BindingMode::Pinned);

        engine.scroll_to(500.0);
        assert_eq!(engine.viewport_top(card), Some(500.0));
        for position in [1000.0, 1200.0, 1999.0] {
            engine.scroll_to(position);
            assert_eq!(engine.viewport_top(card), Some(0.0));
        }
        engine.scroll_to(2000.0);
        assert_eq!(engine.viewport_top(card), Some(0.0));
        assert!(!engine.placement(card).unwrap().is_fixed());
        engine.scroll_to(100.0);
        assert_eq!(engine.placement(card), Some(Placement::default()));
    }

    #[test]
    fn test_navbar_scenario() {
        let engine = engine();
        let transparent = PropertySet::new().with(Property::Background, Rgba::TRANSPARENT);
        let opaque = PropertySet::new().with(Property::Background, Rgba::new(245.0, 243.0, 238.0, 0.8));
        let nav = engine.add_target("nav", Bounds::new(0.0, 60.0), transparent.clone());
        let _scene = engine.activate(
            SceneSpec::new("navbar").toggle(ToggleSpec::new(100.0, transparent, opaque).target(nav)),
        );
        let alpha = |engine: &ScrollEngine| engine.style(nav).unwrap().color(Property::Background).a;

        engine.scroll_to(0.0);
        assert_eq!(alpha(&engine), 0.0);

        engine.scroll_to(150.0);
        engine.advance(ms(300));
        assert!(close(alpha(&engine), 0.8));

        engine.scroll_to(50.0);
        engine.advance(ms(300));
        assert!(close(alpha(&engine), 0.0));
        assert_eq!(engine.snapshot().toggles[0].transitions_started, 2);
    }

    #[test]
    fn test_three_card_stack_scenario() {
        let engine = engine();
        let cards: Vec<TargetId> = (0..3)
            .map(|i| {
                engine.add_target(
                    format!("card-{}", i + 1),
                    Bounds::new(1000.0 * f64::from(i), 1000.0),
                    PropertySet::new(),
                )
            })
            .collect();
        let _scene = engine.activate(SceneSpec::new("protocol").stack(StackSpec::new(cards.clone())));

        engine.scroll_to(2500.0);

        let third = engine.style(cards[2]).unwrap();
        assert!(engine.placement(cards[2]).unwrap().is_fixed());
        assert_eq!(engine.viewport_top(cards[2]), Some(0.0));
        assert!(close(third.number(Property::Opacity), 1.0));
        assert!(close(third.number(Property::Blur), 0.0));
        assert!(close(third.number(Property::Scale), 1.0));

        let second = engine.style(cards[1]).unwrap();
        assert!(!engine.placement(cards[1]).unwrap().is_fixed());
        assert!(close(second.number(Property::Scale), 0.95));
        assert!(close(second.number(Property::Blur), 10.0));
        assert!(close(second.number(Property::Opacity), 0.75));

        let first = engine.style(cards[0]).unwrap();
        assert!(close(first.number(Property::Scale), 0.9));
        assert!(close(first.number(Property::Blur), 20.0));
        assert!(close(first.number(Property::Opacity), 0.5));

        // covering follows declaration order, not direction
        engine.scroll_to(1500.0);
        assert!(close(number(&engine, cards[0], Property::Blur), 10.0));
        assert!(close(number(&engine, cards[1], Property::Blur), 0.0));
    }

    #[test]
    fn test_dispose_leaves_nothing_scheduled() {
        let engine = engine();
        let cursor = engine.add_target("cursor", Bounds::new(0.0, 20.0), PropertySet::new());
        let nav = engine.add_target("nav", Bounds::new(0.0, 60.0), PropertySet::new());
        let card = engine.add_target("card", Bounds::new(1000.0, 1000.0), PropertySet::new());

        let looping = Timeline::single(Tween::to([cursor], PropertySet::new().with(Property::X, 80.0)))
            .repeat(Repeat::Infinite)
            .repeat_delay(ms(1000));
        let scene = SceneSpec::new("page")
            .play(looping)
            .toggle(ToggleSpec::new(100.0, PropertySet::new(), PropertySet::new().with(Property::Opacity, 0.5)).target(nav))
            .stack(StackSpec::new([card]))
            .trigger_with(TriggerSpec::new(card), BindingMode::progress_only(), |_| {});
        let disposer = engine.activate(scene);

        engine.scroll_to(300.0);
        engine.advance(ms(16));
        assert!(engine.scheduled_count() > 0);
        assert!(engine.listener_count() > 0);

        disposer.dispose();
        disposer.dispose();
        assert_eq!(engine.scheduled_count(), 0);
        assert_eq!(engine.listener_count(), 0);
        assert!(disposer.is_disposed());
    }

    #[test]
    fn test_dispose_restores_pending_entrance() {
        let engine = engine();
        let line = engine.add_target("line", Bounds::new(0.0, 40.0), PropertySet::new());
        let disposer = engine.activate(SceneSpec::new("hero").play(reveal(line)));

        assert!(close(number(&engine, line, Property::Y), 50.0));
        engine.advance(ms(300));
        assert!(number(&engine, line, Property::Y) < 50.0);

        disposer.dispose();
        assert!(close(number(&engine, line, Property::Y), 0.0));
        assert!(close(number(&engine, line, Property::Opacity), 1.0));
    }

    #[test]
    fn test_dispose_keeps_scrubbed_values() {
        let engine = engine();
        let cards = [
            engine.add_target("a", Bounds::new(0.0, 1000.0), PropertySet::new()),
            engine.add_target("b", Bounds::new(1000.0, 1000.0), PropertySet::new()),
        ];
        let disposer = engine.activate(SceneSpec::new("stack").stack(StackSpec::new(cards)));
        engine.scroll_to(1500.0);
        disposer.dispose();

        engine.scroll_to(0.0);
        // scrubbed effects stop updating rather than rolling back
        assert!(close(number(&engine, cards[0], Property::Scale), 0.95));
        assert_eq!(engine.placement(cards[1]), Some(Placement::default()));
    }

    #[test]
    fn test_remounted_stack_starts_from_natural_style() {
        let engine = engine();
        let cards = [
            engine.add_target("a", Bounds::new(0.0, 1000.0), PropertySet::new()),
            engine.add_target("b", Bounds::new(1000.0, 1000.0), PropertySet::new()),
        ];
        let first = engine.activate(SceneSpec::new("stack").stack(StackSpec::new(cards)));
        engine.scroll_to(1500.0);
        first.dispose();

        let _second = engine.activate(SceneSpec::new("stack").stack(StackSpec::new(cards)));
        assert!(close(number(&engine, cards[0], Property::Scale), 0.95));
        engine.scroll_to(0.0);
        assert!(close(number(&engine, cards[0], Property::Scale), 1.0));
        assert!(close(number(&engine, cards[0], Property::Blur), 0.0));
        assert!(close(number(&engine, cards[0], Property::Opacity), 1.0));
    }

    #[test]
    fn test_trailing_cover_fades_last_card() {
        let engine = engine();
        let cards = [
            engine.add_target("a", Bounds::new(0.0, 1000.0), PropertySet::new()),
            engine.add_target("b", Bounds::new(1000.0, 1000.0), PropertySet::new()),
        ];
        let stack = StackSpec::new(cards)
            .trailing_cover(Anchor::top_top(), "+=100%".parse::<RangeEnd>().unwrap());
        let _scene = engine.activate(SceneSpec::new("stack").stack(stack));

        engine.scroll_to(1000.0);
        assert!(close(number(&engine, cards[1], Property::Scale), 1.0));
        engine.scroll_to(1500.0);
        assert!(close(number(&engine, cards[1], Property::Scale), 0.95));
        assert!(close(number(&engine, cards[1], Property::Blur), 10.0));
    }

    #[test]
    fn test_dispose_before_initial_evaluation() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(0.0, 500.0), PropertySet::new());
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let disposer = engine.mount(
            SceneSpec::new("early")
                .trigger(TriggerSpec::new(card), BindingMode::one_shot(reveal(card)))
                .trigger_with(TriggerSpec::new(card), BindingMode::progress_only(), move |_| {
                    counter.set(counter.get() + 1)
                }),
        );
        disposer.dispose();
        engine.scroll_to(100.0);
        engine.advance(ms(16));

        assert_eq!(fired.get(), 0);
        assert_eq!(engine.listener_count(), 0);
        assert!(close(number(&engine, card, Property::Y), 0.0));
    }

    #[test]
    fn test_dispose_from_inside_callback() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(1000.0, 1000.0), PropertySet::new());
        let slot: Rc<RefCell<Option<Disposer>>> = Rc::new(RefCell::new(None));
        let inner_slot = Rc::clone(&slot);
        let spec = TriggerSpec::new(card).start(Anchor::top_top());
        let disposer = engine.activate(SceneSpec::new("self-destruct").trigger_with(
            spec,
            BindingMode::progress_only(),
            move |p| {
                if p > 0.0 {
                    if let Some(disposer) = inner_slot.borrow_mut().take() {
                        disposer.dispose();
                    }
                }
            },
        ));
        *slot.borrow_mut() = Some(disposer);

        engine.scroll_to(1500.0);
        assert_eq!(engine.listener_count(), 0);
        assert!(slot.borrow().is_none());
    }

    #[test]
    fn test_release_is_idempotent_and_survives_engine_drop() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(0.0, 500.0), PropertySet::new());
        let handle = engine.bind(TriggerSpec::new(card), BindingMode::progress_only());
        handle.release();
        handle.release();
        assert!(!handle.is_active());
        assert_eq!(engine.listener_count(), 0);

        let disposer = engine.activate(SceneSpec::new("late").trigger(TriggerSpec::new(card), BindingMode::Pinned));
        drop(engine);
        disposer.dispose();
        handle.release();
    }

    #[test]
    fn test_resize_recomputes_ranges() {
        let engine = engine();
        let text = engine.add_target("text", Bounds::new(1000.0, 200.0), PropertySet::new());
        let spec = TriggerSpec::new(text).start("top 80%".parse().unwrap());
        let handle = engine.bind(spec, BindingMode::progress_only());
        assert_eq!(handle.range().map(|r| r.start), Some(200.0));

        engine.resize(Viewport::new(1280.0, 500.0));
        assert_eq!(handle.range().map(|r| r.start), Some(600.0));

        engine.set_bounds(text, Bounds::new(2000.0, 200.0));
        engine.scroll_to(0.0);
        assert_eq!(handle.range().map(|r| r.start), Some(1600.0));
    }

    #[test]
    fn test_lost_pin_range_clears_passed_shift() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(1000.0, 1000.0), PropertySet::new());
        let spec = TriggerSpec::new(card)
            .start(Anchor::top_top())
            .end("+=100%".parse::<RangeEnd>().unwrap());
        let handle = engine.bind(spec, BindingMode::Pinned);

        engine.scroll_to(2500.0);
        assert!(matches!(engine.placement(card), Some(Placement::Flow { .. })));
        assert_ne!(engine.placement(card), Some(Placement::default()));

        engine.resize(Viewport::new(1280.0, 0.0));
        engine.scroll_to(0.0);
        assert!(handle.range().is_none());
        assert_eq!(engine.placement(card), Some(Placement::default()));
        assert_eq!(engine.viewport_top(card), Some(1000.0));
    }

    #[test]
    fn test_removed_target_is_a_silent_no_op() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(0.0, 500.0), PropertySet::new());
        let other = engine.add_target("other", Bounds::new(0.0, 500.0), PropertySet::new());
        let scrub = Timeline::single(Tween::to([card], PropertySet::new().with(Property::X, 10.0)).easing(Easing::Linear));
        let doomed = engine.bind(TriggerSpec::new(card), BindingMode::scrubbed(scrub));
        let alive = engine.bind(
            TriggerSpec::new(other),
            BindingMode::scrubbed(Timeline::single(
                Tween::to([other], PropertySet::new().with(Property::X, 10.0)).easing(Easing::Linear),
            )),
        );

        engine.remove_target(card);
        engine.scroll_to(250.0);
        assert!(doomed.range().is_none());
        assert!(engine.style(card).is_none());
        assert!(alive.progress().unwrap() > 0.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let engine = engine();
        let card = engine.add_target("card", Bounds::new(0.0, 1000.0), PropertySet::new());
        engine.bind(
            TriggerSpec::new(card).start(Anchor::top_top()),
            BindingMode::Pinned,
        );
        engine.scroll_to(100.0);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.bindings[0].pin, Some(PinPhase::Pinning));
        assert_eq!(snapshot.target("card").unwrap().viewport_top, 0.0);
        let json = snapshot.to_json_pretty().unwrap();
        assert!(json.contains("\"pinning\""));
    }
}
