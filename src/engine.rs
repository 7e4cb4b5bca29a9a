//! Browser-side owner of the [`GridController`].
//!
//! Everything the grid needs between frames lives in one thread-local
//! [`Engine`]. Inputs arrive through [`dispatch`]; the commands that come
//! back are executed only after the engine borrow is released, so timer and
//! audio side effects can never re-enter it.

use std::cell::RefCell;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use leptos::prelude::*;
use soundgrid_core::composite::{build_composite, CompositeCache, CompositeKey};
use soundgrid_core::controller::{Command, Event, GridController};
use soundgrid_core::frame::PopupAnchor;
use soundgrid_core::tiles::TileSet;
use soundgrid_core::{CellRecord, GridConfig, GridIndex};
use crate::audio::playback;
use crate::canvas::grid_renderer::{self, HighlightCache};
use crate::canvas::tile_loader::LoadedTile;
use crate::state::{AppState, LoadPhase};
use crate::timers;

pub struct Engine {
    controller: GridController,
    tiles: TileSet<LoadedTile>,
    composite: CompositeCache,
    /// The composite raster uploaded to an offscreen canvas.
    composite_canvas: Option<HtmlCanvasElement>,
    highlights: HighlightCache,
    state: AppState,
}

thread_local! {
    static ENGINE: RefCell<Option<Engine>> = const { RefCell::new(None) };
}

fn with_engine<R>(f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
    ENGINE.with(|e| e.borrow_mut().as_mut().map(f))
}

/// Milliseconds on the page clock, shared by pointer events and frames.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Replace the engine with a fresh one. Returns the file keys whose tiles
/// still need loading.
pub fn install(config: GridConfig, index: GridIndex, state: AppState) -> Vec<String> {
    let tiles = TileSet::new(index.file_keys());
    let pending = tiles.pending_keys();
    let complete = tiles.is_complete().then(|| tiles.version());
    let engine = Engine {
        controller: GridController::new(config, index),
        tiles,
        composite: CompositeCache::default(),
        composite_canvas: None,
        highlights: HighlightCache::new(),
        state,
    };
    ENGINE.with(|e| *e.borrow_mut() = Some(engine));
    match complete {
        // Nothing to load.
        Some(version) => {
            state.phase.set(LoadPhase::Compositing);
            dispatch(Event::TilesComplete { version });
        }
        None => state.phase.set(LoadPhase::Tiles),
    }
    pending
}

pub fn dispatch(event: Event) {
    let Some(commands) = with_engine(|eng| eng.controller.update(event)) else { return };
    for command in commands {
        execute(command);
    }
    sync_state();
}

fn execute(command: Command) {
    match command {
        Command::PlayAudio { path } => playback::play(&path),
        Command::ArmTimer { kind, delay_ms } => timers::arm(kind, delay_ms),
        Command::CancelTimer(kind) => timers::cancel(kind),
        Command::RebuildComposite(key) => rebuild_composite(key),
    }
}

fn rebuild_composite(key: CompositeKey) {
    let failed = with_engine(|eng| -> Option<(AppState, String)> {
        let (raster, rebuilt) = eng.composite.ensure(&key, || {
            build_composite(
                eng.controller.index(),
                &eng.tiles,
                eng.controller.compiled_filters(),
                eng.controller.color_mode(),
                eng.controller.config().cell_size,
            )
        });
        if rebuilt || eng.composite_canvas.is_none() {
            match grid_renderer::upload_raster(raster) {
                Ok(canvas) => eng.composite_canvas = Some(canvas),
                Err(e) => return Some((eng.state, format!("Failed to upload composite: {e:?}"))),
            }
        }
        eng.controller.mark_composite_built(key);
        None
    })
    .flatten();
    if let Some((state, msg)) = failed {
        log::error!("{msg}");
        state.phase.set(LoadPhase::Failed(msg));
    }
}

// ── Tile loading ─────────────────────────────────────────────────────────────

/// Record one finished tile load (`None` for a failed one). The last one
/// hands the completed set to the controller.
pub fn tile_resolved(key: &str, tile: Option<LoadedTile>) {
    let resolved = with_engine(|eng| {
        let progress = match tile {
            Some(tile) => eng.tiles.resolve_loaded(key, tile),
            None => eng.tiles.resolve_failed(key),
        };
        (eng.state, progress, eng.tiles.version())
    });
    let Some((state, progress, version)) = resolved else { return };

    set_if_changed(state.progress, progress.percent());
    if progress.is_complete() {
        state.phase.set(LoadPhase::Compositing);
        dispatch(Event::TilesComplete { version });
    }
}

// ── Signals ──────────────────────────────────────────────────────────────────

fn set_if_changed<T: PartialEq + Send + Sync + 'static>(signal: RwSignal<T>, value: T) {
    if signal.with_untracked(|v| *v != value) {
        signal.set(value);
    }
}

struct Snapshot {
    state: AppState,
    ready: bool,
    selected: Option<CellRecord>,
    can_zoom_in: bool,
    can_zoom_out: bool,
}

fn sync_state() {
    let snapshot = with_engine(|eng| {
        let c = &eng.controller;
        Snapshot {
            state: eng.state,
            ready: c.is_ready(),
            selected: c.selected_record().cloned(),
            can_zoom_in: c.can_zoom_in(),
            can_zoom_out: c.can_zoom_out(),
        }
    });
    let Some(s) = snapshot else { return };

    set_if_changed(s.state.ready, s.ready);
    set_if_changed(s.state.selected, s.selected);
    set_if_changed(s.state.can_zoom_in, s.can_zoom_in);
    set_if_changed(s.state.can_zoom_out, s.can_zoom_out);
    if s.ready && s.state.phase.with_untracked(|p| *p == LoadPhase::Compositing) {
        s.state.phase.set(LoadPhase::Done);
    }
}

// ── Drawing ──────────────────────────────────────────────────────────────────

/// Paint the current frame. Does nothing until the grid is ready.
pub fn draw(ctx: &CanvasRenderingContext2d, now_ms: f64) {
    let drawn = with_engine(|eng| {
        let plan = eng.controller.frame_plan(now_ms)?;
        let composite = eng.composite_canvas.as_ref()?;
        let config = eng.controller.config();
        let highlight = plan.highlight.as_ref().and_then(|h| {
            let tile = eng.tiles.get(&h.file_key)?;
            let size = config.highlight_size().round() as u32;
            eng.highlights.get_or_render(&h.file_key, &tile.image, size, config.highlight_gamma)
        });
        grid_renderer::draw_frame(ctx, &plan, composite, highlight.as_ref());
        Some((eng.state, plan.popup))
    })
    .flatten();

    if let Some((state, popup)) = drawn {
        set_if_changed::<Option<PopupAnchor>>(state.popup, popup);
    }
}

/// Stop pending timers and drop the engine.
pub fn shutdown() {
    let commands = with_engine(|eng| eng.controller.shutdown()).unwrap_or_default();
    for command in commands {
        execute(command);
    }
    timers::cancel_all();
    ENGINE.with(|e| e.borrow_mut().take());
}
