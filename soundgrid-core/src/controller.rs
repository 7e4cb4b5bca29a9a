//! The grid explorer as one state machine.
//!
//! The front end forwards every input as an [`Event`] and executes the
//! [`Command`]s that come back: playing audio, arming or cancelling timers,
//! rebuilding the composite. Drawing is a pure read of the state through
//! [`GridController::frame_plan`].

use crate::composite::CompositeKey;
use crate::config::GridConfig;
use crate::coord::GridCoord;
use crate::filter::{CompiledFilters, FilterEntry, FilterSet};
use crate::frame::{plan_frame, FrameInputs, FramePlan};
use crate::index::{CellRecord, GridIndex};
use crate::palette::ColorMode;
use crate::selection::{SelectOutcome, SelectTrigger, SelectionEngine};
use crate::trail::Trail;
use crate::viewport::{CanvasSize, SmoothStep, Viewport, ZoomDirection, ZoomOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    ZoomRepeat,
    SmoothCenter,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Resized { width: f64, height: f64 },
    /// Every tile has resolved; `version` is the tile set's version.
    TilesComplete { version: u64 },
    /// Pointer coordinates are canvas-relative pixels.
    PointerDown { x: f64, y: f64, now_ms: f64 },
    PointerMove { x: f64, y: f64, now_ms: f64 },
    PointerUp,
    Wheel { delta_y: f64 },
    ZoomPress(ZoomDirection),
    ZoomRelease,
    Timer(TimerKind),
    Frame { now_ms: f64 },
    SetFilters(Vec<FilterEntry>),
    SetColorMode(ColorMode),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    PlayAudio { path: String },
    /// Arm `kind`, replacing any pending timer of the same kind.
    ArmTimer { kind: TimerKind, delay_ms: u32 },
    CancelTimer(TimerKind),
    /// Build the composite for this key, then call
    /// [`GridController::mark_composite_built`].
    RebuildComposite(CompositeKey),
}

#[derive(Clone, Copy, Debug, Default)]
struct PointerState {
    down: bool,
    last: Option<(f64, f64)>,
    pan: Option<(f64, f64)>,
}

pub struct GridController {
    config: GridConfig,
    index: GridIndex,
    filters: FilterSet,
    compiled: CompiledFilters,
    color_mode: ColorMode,
    /// `None` until every tile has resolved.
    tile_version: Option<u64>,
    built: Option<CompositeKey>,
    viewport: Viewport,
    selection: SelectionEngine,
    trail: Trail,
    pointer: PointerState,
    zoom_hold: Option<ZoomDirection>,
    smooth_centering: bool,
    initial_center_applied: bool,
}

impl GridController {
    pub fn new(config: GridConfig, index: GridIndex) -> Self {
        let selection = SelectionEngine::new(GridCoord::center(config.grid_size), config.min_play_interval_ms);
        Self {
            viewport: Viewport::new(&config),
            trail: Trail::new(config.trail_fade_ms),
            selection,
            index,
            filters: FilterSet::default(),
            compiled: CompiledFilters::default(),
            color_mode: ColorMode::None,
            tile_version: None,
            built: None,
            pointer: PointerState::default(),
            zoom_hold: None,
            smooth_centering: false,
            initial_center_applied: false,
            config,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn index(&self) -> &GridIndex {
        &self.index
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn compiled_filters(&self) -> &CompiledFilters {
        &self.compiled
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selected(&self) -> GridCoord {
        self.selection.selected()
    }

    /// Record under the selection, if it passes the active filters.
    pub fn selected_record(&self) -> Option<&CellRecord> {
        self.index.get(self.selection.selected()).filter(|r| self.compiled.matches(Some(*r)))
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn is_smooth_centering(&self) -> bool {
        self.smooth_centering
    }

    pub fn zoom_held(&self) -> Option<ZoomDirection> {
        self.zoom_hold
    }

    /// Key the composite must be built for, once tiles are complete.
    pub fn composite_key(&self) -> Option<CompositeKey> {
        self.tile_version.map(|tile_version| CompositeKey {
            filters: self.filters.signature(),
            color_mode: self.color_mode,
            tile_version,
        })
    }

    pub fn mark_composite_built(&mut self, key: CompositeKey) {
        log::debug!("composite built for {:?}", key);
        self.built = Some(key);
    }

    /// The current composite exists and the initial centering has happened.
    pub fn is_ready(&self) -> bool {
        self.initial_center_applied && self.composite_key().is_some_and(|k| self.built.as_ref() == Some(&k))
    }

    pub fn can_zoom_in(&self) -> bool {
        self.viewport.state().scale < self.viewport.max_scale()
    }

    pub fn can_zoom_out(&self) -> bool {
        !self.viewport.is_perfectly_centered()
    }

    pub fn frame_plan(&self, now_ms: f64) -> Option<FramePlan> {
        if !self.is_ready() {
            return None;
        }
        Some(plan_frame(&FrameInputs {
            viewport: &self.viewport,
            index: &self.index,
            filters: &self.compiled,
            trail: &self.trail,
            selected: self.selection.selected(),
            color_mode: self.color_mode,
            highlight_size: self.config.highlight_size(),
            now_ms,
        }))
    }

    // ── Update ───────────────────────────────────────────────────────────────

    pub fn update(&mut self, event: Event) -> Vec<Command> {
        let mut out = Vec::new();
        match event {
            Event::Resized { width, height } => {
                if self.viewport.set_canvas(CanvasSize::new(width, height)) {
                    log::debug!("canvas resized to {width}x{height}");
                }
                self.try_initial_center();
            }
            Event::TilesComplete { version } => {
                self.tile_version = Some(version);
                self.request_composite(&mut out);
                self.try_initial_center();
            }
            Event::PointerDown { x, y, now_ms } => {
                if self.is_ready() {
                    self.pointer.down = true;
                    self.pointer_at(x, y, SelectTrigger::Press, now_ms, &mut out);
                }
            }
            Event::PointerMove { x, y, now_ms } => {
                if self.is_ready() && self.pointer.down {
                    self.pointer_at(x, y, SelectTrigger::Drag, now_ms, &mut out);
                }
            }
            Event::PointerUp => {
                self.pointer.down = false;
                self.pointer.pan = None;
                self.release_zoom(&mut out);
            }
            Event::Wheel { delta_y } => {
                if self.is_ready() {
                    let factor = self.config.wheel_zoom_factor;
                    self.apply_zoom(ZoomDirection::from_wheel(delta_y), factor, &mut out);
                }
            }
            Event::ZoomPress(direction) => {
                if self.is_ready() {
                    self.zoom_hold = Some(direction);
                    out.push(Command::ArmTimer { kind: TimerKind::ZoomRepeat, delay_ms: self.config.zoom_repeat_ms });
                }
            }
            Event::ZoomRelease => self.release_zoom(&mut out),
            Event::Timer(TimerKind::ZoomRepeat) => {
                if let Some(direction) = self.zoom_hold {
                    let factor = self.config.zoom_factor;
                    self.apply_zoom(direction, factor, &mut out);
                    out.push(Command::ArmTimer { kind: TimerKind::ZoomRepeat, delay_ms: self.config.zoom_repeat_ms });
                }
            }
            Event::Timer(TimerKind::SmoothCenter) => {
                if self.smooth_centering {
                    match self.viewport.smooth_center_step(self.config.center_smoothing) {
                        SmoothStep::Continue => out.push(Command::ArmTimer {
                            kind: TimerKind::SmoothCenter,
                            delay_ms: self.config.smooth_center_delay_ms,
                        }),
                        SmoothStep::Settled => self.smooth_centering = false,
                    }
                }
            }
            Event::Frame { now_ms } => {
                self.trail.prune(now_ms);
                self.edge_pan(now_ms, &mut out);
            }
            Event::SetFilters(entries) => {
                self.filters = FilterSet::new(entries);
                self.compiled = self.filters.compile();
                if let Some(moved) = self.selection.revalidate(&self.index, &self.compiled) {
                    log::debug!("selection snapped to {:?} after filter change", moved);
                }
                self.request_composite(&mut out);
            }
            Event::SetColorMode(mode) => {
                self.color_mode = mode;
                self.request_composite(&mut out);
            }
        }
        out
    }

    fn request_composite(&mut self, out: &mut Vec<Command>) {
        if let Some(key) = self.composite_key() {
            if self.built.as_ref() != Some(&key) {
                out.push(Command::RebuildComposite(key));
            }
        }
    }

    fn try_initial_center(&mut self) {
        if self.initial_center_applied || self.tile_version.is_none() {
            return;
        }
        let half = self.config.grid_size as f64 / 2.0;
        if self.viewport.center_on(self.config.initial_scale, half, half) {
            self.initial_center_applied = true;
            log::info!("initial view centred at scale {}", self.config.initial_scale);
        }
    }

    fn pointer_at(&mut self, x: f64, y: f64, trigger: SelectTrigger, now_ms: f64, out: &mut Vec<Command>) {
        self.pointer.last = Some((x, y));
        self.pointer.pan = self.viewport.edge_pan_direction(x, y, self.config.pan_edge_threshold);
        let target = self.viewport.screen_to_cell(x, y);
        self.select(target, trigger, now_ms, out);
    }

    fn select(&mut self, target: GridCoord, trigger: SelectTrigger, now_ms: f64, out: &mut Vec<Command>) {
        let outcome = self.selection.select(&self.index, &self.compiled, target, trigger, now_ms);
        if let SelectOutcome::Selected { playback: Some(playback), .. } = outcome {
            if let Some(prev) = playback.trail_from {
                self.trail.push(prev, now_ms);
            }
            out.push(Command::PlayAudio { path: self.config.audio_path(&playback.file_key) });
        }
    }

    fn edge_pan(&mut self, now_ms: f64, out: &mut Vec<Command>) {
        if !(self.is_ready() && self.pointer.down) {
            return;
        }
        let (Some(direction), Some((x, y))) = (self.pointer.pan, self.pointer.last) else {
            return;
        };
        self.viewport.pan_by(direction, self.config.pan_step_px());
        let target = self.viewport.screen_to_cell(x, y);
        self.select(target, SelectTrigger::Drag, now_ms, out);
    }

    fn apply_zoom(&mut self, direction: ZoomDirection, factor: f64, out: &mut Vec<Command>) {
        let anchor = self.selection.selected();
        match self.viewport.zoom_about(anchor, direction, factor) {
            ZoomOutcome::AtMinimum => {
                if !self.smooth_centering {
                    self.smooth_centering = true;
                    out.push(Command::ArmTimer {
                        kind: TimerKind::SmoothCenter,
                        delay_ms: self.config.smooth_center_delay_ms,
                    });
                }
            }
            ZoomOutcome::Zoomed | ZoomOutcome::Unchanged => {
                if self.smooth_centering {
                    self.smooth_centering = false;
                    out.push(Command::CancelTimer(TimerKind::SmoothCenter));
                }
            }
        }
    }

    fn release_zoom(&mut self, out: &mut Vec<Command>) {
        if self.zoom_hold.take().is_some() {
            out.push(Command::CancelTimer(TimerKind::ZoomRepeat));
        }
    }

    /// Commands that stop every pending timer, for teardown.
    pub fn shutdown(&mut self) -> Vec<Command> {
        self.zoom_hold = None;
        self.smooth_centering = false;
        self.pointer = PointerState::default();
        vec![
            Command::CancelTimer(TimerKind::ZoomRepeat),
            Command::CancelTimer(TimerKind::SmoothCenter),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Gender, SoundType};

    fn record(key: &str, sound_type: SoundType) -> CellRecord {
        CellRecord {
            id: key.into(),
            sound_type,
            gender: Gender::Male,
            age: Some(30),
            file_key: key.into(),
        }
    }

    fn controller_with(cells: Vec<(GridCoord, CellRecord)>) -> GridController {
        let config = GridConfig { grid_size: 9, ..GridConfig::default() };
        let index = GridIndex::from_records(9, cells).unwrap();
        GridController::new(config, index)
    }

    fn controller() -> GridController {
        controller_with(vec![(GridCoord::new(4, 4), record("a", SoundType::Cough))])
    }

    fn make_ready(c: &mut GridController) {
        c.update(Event::Resized { width: 400.0, height: 300.0 });
        let cmds = c.update(Event::TilesComplete { version: 1 });
        let [Command::RebuildComposite(key)] = cmds.as_slice() else { panic!("{cmds:?}") };
        c.mark_composite_built(key.clone());
        assert!(c.is_ready());
    }

    #[test]
    fn test_not_ready_until_composite_and_centering() {
        let mut c = controller();
        assert!(!c.is_ready());
        assert!(c.update(Event::PointerDown { x: 1.0, y: 1.0, now_ms: 0.0 }).is_empty());

        let cmds = c.update(Event::TilesComplete { version: 1 });
        let [Command::RebuildComposite(key)] = cmds.as_slice() else { panic!("{cmds:?}") };
        c.mark_composite_built(key.clone());
        // no canvas yet
        assert!(!c.is_ready());

        c.update(Event::Resized { width: 400.0, height: 300.0 });
        assert!(c.is_ready());
        assert_eq!(c.viewport().state().scale, c.config().initial_scale);
        assert!(c.frame_plan(0.0).is_some());
    }

    #[test]
    fn test_filter_change_requests_rebuild_and_unreadies() {
        let mut c = controller();
        c.update(Event::Resized { width: 400.0, height: 300.0 });
        let cmds = c.update(Event::TilesComplete { version: 1 });
        let [Command::RebuildComposite(key)] = cmds.as_slice() else { panic!() };
        c.mark_composite_built(key.clone());
        assert!(c.is_ready());

        let cmds = c.update(Event::SetFilters(vec![FilterEntry::active("Cough")]));
        let [Command::RebuildComposite(key)] = cmds.as_slice() else { panic!("{cmds:?}") };
        assert!(!c.is_ready());
        c.mark_composite_built(key.clone());
        assert!(c.is_ready());

        // inactive entries do not change the signature
        let cmds = c.update(Event::SetFilters(vec![
            FilterEntry { name: "Sigh".into(), active: false },
            FilterEntry::active("Cough"),
        ]));
        assert!(cmds.is_empty());
        assert!(c.update(Event::SetColorMode(ColorMode::None)).is_empty());
        assert!(!c.update(Event::SetColorMode(ColorMode::Age)).is_empty());
    }

    #[test]
    fn test_canvas_sized_before_tiles_complete() {
        let mut c = controller();
        c.update(Event::Resized { width: 400.0, height: 300.0 });
        assert!(!c.is_ready());
        // the front end re-reports the same size every frame
        c.update(Event::Resized { width: 400.0, height: 300.0 });

        let cmds = c.update(Event::TilesComplete { version: 1 });
        let [Command::RebuildComposite(key)] = cmds.as_slice() else { panic!("{cmds:?}") };
        c.mark_composite_built(key.clone());
        assert!(c.is_ready());
        assert_eq!(c.viewport().state().scale, c.config().initial_scale);

        let state = c.viewport().state();
        c.update(Event::Resized { width: 400.0, height: 300.0 });
        assert_eq!(c.viewport().state(), state);
    }

    #[test]
    fn test_filter_change_moves_hidden_selection() {
        let mut c = controller_with(vec![
            (GridCoord::new(4, 4), record("a", SoundType::Sigh)),
            (GridCoord::new(5, 4), record("b", SoundType::Cough)),
        ]);
        make_ready(&mut c);
        assert_eq!(c.selected(), GridCoord::new(4, 4));

        let cmds = c.update(Event::SetFilters(vec![FilterEntry::active("Cough")]));
        assert!(!cmds.iter().any(|cmd| matches!(cmd, Command::PlayAudio { .. })));
        assert_eq!(c.selected(), GridCoord::new(5, 4));
        assert!(c.trail().is_empty());
        let Some(Command::RebuildComposite(key)) = cmds.last() else { panic!("{cmds:?}") };
        c.mark_composite_built(key.clone());

        let plan = c.frame_plan(0.0).unwrap();
        assert_eq!(plan.highlight.unwrap().file_key, "b");
        assert_eq!(c.selected_record().map(|r| r.id.as_str()), Some("b"));

        // nothing passes: selection stays, but is not drawn or described
        let cmds = c.update(Event::SetFilters(vec![FilterEntry::active("Sneeze")]));
        let Some(Command::RebuildComposite(key)) = cmds.last() else { panic!("{cmds:?}") };
        c.mark_composite_built(key.clone());
        assert_eq!(c.selected(), GridCoord::new(5, 4));
        assert!(c.selected_record().is_none());
        let plan = c.frame_plan(0.0).unwrap();
        assert!(plan.highlight.is_none());
        assert!(plan.popup.is_none());
    }

    #[test]
    fn test_zoom_hold_rearms_until_release() {
        let mut c = controller();
        c.update(Event::Resized { width: 400.0, height: 300.0 });
        let cmds = c.update(Event::TilesComplete { version: 1 });
        let Command::RebuildComposite(key) = &cmds[0] else { panic!() };
        c.mark_composite_built(key.clone());

        let cmds = c.update(Event::ZoomPress(ZoomDirection::In));
        assert_eq!(cmds, vec![Command::ArmTimer { kind: TimerKind::ZoomRepeat, delay_ms: 10 }]);
        let before = c.viewport().state().scale;
        let cmds = c.update(Event::Timer(TimerKind::ZoomRepeat));
        assert!(c.viewport().state().scale > before);
        assert_eq!(cmds, vec![Command::ArmTimer { kind: TimerKind::ZoomRepeat, delay_ms: 10 }]);

        assert_eq!(c.update(Event::ZoomRelease), vec![Command::CancelTimer(TimerKind::ZoomRepeat)]);
        assert!(c.update(Event::Timer(TimerKind::ZoomRepeat)).is_empty());
        assert!(c.update(Event::ZoomRelease).is_empty());
    }

    #[test]
    fn test_shutdown_cancels_timers() {
        let mut c = controller();
        let cmds = c.shutdown();
        assert!(cmds.contains(&Command::CancelTimer(TimerKind::ZoomRepeat)));
        assert!(cmds.contains(&Command::CancelTimer(TimerKind::SmoothCenter)));
    }
}
