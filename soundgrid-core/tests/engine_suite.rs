//! End-to-end scenarios driving `GridController` the way the web front end does.

use soundgrid_core::composite::{build_composite, CompositeCache};
use soundgrid_core::controller::{Command, Event, GridController, TimerKind};
use soundgrid_core::filter::FilterEntry;
use soundgrid_core::index::{CellRecord, Gender, GridIndex, SoundType};
use soundgrid_core::palette::ColorMode;
use soundgrid_core::tiles::{TileImage, TileSet};
use soundgrid_core::viewport::ZoomDirection;
use soundgrid_core::{GridConfig, GridCoord};

const W: f64 = 800.0;
const H: f64 = 600.0;

fn record(x: i32, y: i32, sound_type: SoundType, gender: Gender) -> CellRecord {
    CellRecord {
        id: format!("id{x}_{y}"),
        sound_type,
        gender,
        age: Some(20 + (x + y).unsigned_abs() % 50),
        file_key: format!("clip_{x}_{y}"),
    }
}

fn dense_index(size: u32) -> GridIndex {
    let cells = (0..size as i32).flat_map(|x| {
        (0..size as i32).map(move |y| {
            let t = SoundType::ALL[((x + y) % 6) as usize];
            let g = if x % 2 == 0 { Gender::Male } else { Gender::Female };
            (GridCoord::new(x, y), record(x, y, t, g))
        })
    });
    GridIndex::from_records(size, cells).unwrap()
}

fn config(size: u32) -> GridConfig {
    GridConfig { grid_size: size, ..GridConfig::default() }
}

/// Run the controller through load, composite and sizing, executing
/// rebuild commands the way the front end does.
fn ready(mut c: GridController) -> GridController {
    c.update(Event::Resized { width: W, height: H });
    let cmds = c.update(Event::TilesComplete { version: 1 });
    rebuild_all(&mut c, &cmds);
    assert!(c.is_ready());
    c
}

fn rebuild_all(c: &mut GridController, cmds: &[Command]) {
    for cmd in cmds {
        if let Command::RebuildComposite(key) = cmd {
            c.mark_composite_built(key.clone());
        }
    }
}

fn audio_count(cmds: &[Command]) -> usize {
    cmds.iter().filter(|c| matches!(c, Command::PlayAudio { .. })).count()
}

fn cell_point(c: &GridController, cell: GridCoord) -> (f64, f64) {
    c.viewport().cell_center_on_screen(cell)
}

#[test]
fn test_zoom_out_past_minimum_converges_to_full_grid_center() {
    let mut c = ready(GridController::new(config(144), dense_index(144)));

    // walk the selection away from the centre so zoom-out leaves the grid off-centre
    let (x, y) = cell_point(&c, GridCoord::new(80, 75));
    c.update(Event::PointerDown { x, y, now_ms: 0.0 });
    c.update(Event::PointerUp);
    assert_eq!(c.selected(), GridCoord::new(80, 75));

    let mut armed = false;
    for _ in 0..200 {
        let cmds = c.update(Event::Wheel { delta_y: 1.0 });
        if cmds.contains(&Command::ArmTimer { kind: TimerKind::SmoothCenter, delay_ms: 16 }) {
            armed = true;
            break;
        }
    }
    assert!(armed);
    assert_eq!(c.viewport().state().scale, 0.5);
    assert!(!c.viewport().is_perfectly_centered());

    // repeated zoom-out while animating must not double-arm
    assert!(c.update(Event::Wheel { delta_y: 1.0 }).is_empty());

    let mut ticks = 0;
    loop {
        let cmds = c.update(Event::Timer(TimerKind::SmoothCenter));
        if cmds.is_empty() {
            break;
        }
        ticks += 1;
        assert!(ticks < 10_000);
    }

    let target = c.viewport().center_transform(0.5, 72.0, 72.0).unwrap();
    assert_eq!(c.viewport().state(), target);
    assert!(c.viewport().is_perfectly_centered());
    assert!(!c.can_zoom_out());
    assert!(!c.is_smooth_centering());
}

#[test]
fn test_zoom_in_cancels_smooth_centering() {
    let mut c = ready(GridController::new(config(144), dense_index(144)));
    while !c.is_smooth_centering() {
        c.update(Event::Wheel { delta_y: 1.0 });
    }
    let cmds = c.update(Event::Wheel { delta_y: -1.0 });
    assert!(cmds.contains(&Command::CancelTimer(TimerKind::SmoothCenter)));
    // a stale timer firing afterwards is harmless
    let before = c.viewport().state();
    assert!(c.update(Event::Timer(TimerKind::SmoothCenter)).is_empty());
    assert_eq!(c.viewport().state(), before);
}

#[test]
fn test_rapid_drag_plays_once_per_throttle_interval() {
    let mut c = ready(GridController::new(config(144), dense_index(144)));
    let start = c.selected();

    let mut plays = 0;
    let (x, y) = cell_point(&c, start);
    plays += audio_count(&c.update(Event::PointerDown { x, y, now_ms: 0.0 }));

    // a new cell every 10 ms for half a second
    for step in 1..=50 {
        let cell = GridCoord::new(start.x + (step % 2) * 2 - 1, start.y);
        let (x, y) = cell_point(&c, cell);
        let now_ms = step as f64 * 10.0;
        plays += audio_count(&c.update(Event::PointerMove { x, y, now_ms }));
        assert_eq!(c.selected(), cell, "selection itself is never throttled");
    }

    // t = 0 (press), 130, 260, 390 with a 125 ms gate sampled every 10 ms
    assert_eq!(plays, 4);
}

#[test]
fn test_three_by_three_single_cell() {
    let index = GridIndex::from_records(3, [(GridCoord::new(1, 1), record(1, 1, SoundType::Cough, Gender::Male))]).unwrap();
    let mut c = ready(GridController::new(config(3), index));
    let (x, y) = cell_point(&c, GridCoord::new(0, 0));
    let cmds = c.update(Event::PointerDown { x, y, now_ms: 0.0 });
    assert_eq!(c.selected(), GridCoord::new(1, 1));
    assert_eq!(cmds, vec![Command::PlayAudio { path: "audio_processed/clip_1_1.wav".into() }]);
}

#[test]
fn test_zoom_keeps_selected_cell_fixed() {
    let mut c = ready(GridController::new(config(144), dense_index(144)));
    let (x, y) = cell_point(&c, GridCoord::new(60, 90));
    c.update(Event::PointerDown { x, y, now_ms: 0.0 });
    c.update(Event::PointerUp);
    let anchor = c.selected();
    let before = c.viewport().cell_center_on_screen(anchor);

    for delta in [-1.0, -1.0, -1.0, 1.0, -1.0] {
        c.update(Event::Wheel { delta_y: delta });
        let after = c.viewport().cell_center_on_screen(anchor);
        assert!((after.0 - before.0).abs() < 1e-6);
        assert!((after.1 - before.1).abs() < 1e-6);
    }
}

#[test]
fn test_selection_is_idempotent() {
    let cells = [(2, 2, SoundType::Sigh), (6, 3, SoundType::Cough), (3, 6, SoundType::Cough)];
    let index = GridIndex::from_records(
        9,
        cells.map(|(x, y, t)| (GridCoord::new(x, y), record(x, y, t, Gender::Female))),
    )
    .unwrap();
    let mut c = ready(GridController::new(config(9), index));
    c.update(Event::SetFilters(vec![FilterEntry::active("Cough")]));
    let key = c.composite_key().unwrap();
    c.mark_composite_built(key);

    let (x, y) = cell_point(&c, GridCoord::new(4, 4));
    c.update(Event::PointerDown { x, y, now_ms: 0.0 });
    let first = c.selected();
    c.update(Event::PointerDown { x, y, now_ms: 1000.0 });
    assert_eq!(c.selected(), first);
    // both Coughs sit on the radius-2 ring; dx = -1 is scanned before dx = +2
    assert_eq!(first, GridCoord::new(3, 6));
}

#[test]
fn test_edge_pan_moves_view_and_selection() {
    let mut c = ready(GridController::new(config(144), dense_index(144)));
    let y = H / 2.0;
    c.update(Event::PointerDown { x: W - 10.0, y, now_ms: 0.0 });
    let first = c.selected();
    let before = c.viewport().state();

    for frame in 1..=20 {
        c.update(Event::Frame { now_ms: frame as f64 * 16.0 });
    }
    let after = c.viewport().state();
    assert!((before.translate_x - after.translate_x - 80.0).abs() < 1e-9);
    assert_eq!(before.translate_y, after.translate_y);
    assert!(c.selected().x > first.x);
    assert_eq!(c.selected().y, first.y);

    c.update(Event::PointerUp);
    c.update(Event::Frame { now_ms: 1000.0 });
    assert_eq!(c.viewport().state(), after);
}

#[test]
fn test_trail_records_previous_played_cell() {
    let mut c = ready(GridController::new(config(144), dense_index(144)));
    let start = c.selected();
    let (x, y) = cell_point(&c, start);
    c.update(Event::PointerDown { x, y, now_ms: 0.0 });
    let next = GridCoord::new(start.x + 3, start.y);
    let (x, y) = cell_point(&c, next);
    c.update(Event::PointerMove { x, y, now_ms: 200.0 });

    let plan = c.frame_plan(300.0).unwrap();
    assert_eq!(plan.trail.len(), 1);
    assert_eq!(plan.trail[0].rect, c.viewport().cell_rect(start));
    assert!(plan.highlight.is_some());

    c.update(Event::Frame { now_ms: 900.0 });
    assert!(c.trail().is_empty());
}

#[test]
fn test_load_composite_and_first_frame() {
    let mut c = GridController::new(config(4), {
        let json = r#"{
            "0_3": { "id": "a", "sound_type": "Cough", "gender": "Male", "age": 20, "file_name": "a" },
            "3_0": { "id": "b", "sound_type": "Sigh", "gender": "Female", "age": "70", "file_name": "b" },
            "1_1": { "id": "c", "sound_type": "Sniff", "gender": "Male", "age": 40, "file_name": "broken" }
        }"#;
        GridIndex::from_json(json, 4).unwrap()
    });
    let mut tiles: TileSet<TileImage> = TileSet::new(c.index().file_keys());
    let mut cache = CompositeCache::default();
    c.update(Event::Resized { width: W, height: H });

    let red = [200, 0, 0, 255];
    let mut progress = Vec::new();
    progress.push(tiles.resolve_loaded("a", TileImage::solid(16, 16, red)).percent());
    progress.push(tiles.resolve_failed("broken").percent());
    assert!(!c.is_ready());
    progress.push(tiles.resolve_loaded("b", TileImage::solid(16, 16, red)).percent());
    assert_eq!(progress, vec![33, 67, 100]);

    let cmds = c.update(Event::TilesComplete { version: tiles.version() });
    for cmd in cmds {
        if let Command::RebuildComposite(key) = cmd {
            let (raster, rebuilt) = cache.ensure(&key, || {
                build_composite(c.index(), &tiles, c.compiled_filters(), key.color_mode, c.config().cell_size)
            });
            assert!(rebuilt);
            assert_eq!(raster.width, 32);
            // "0_3" is the top-left display cell
            assert_eq!(raster.pixel(0, 0), red);
            c.mark_composite_built(key);
        }
    }
    assert!(c.is_ready());
    let plan = c.frame_plan(0.0).unwrap();
    assert_eq!(plan.composite.scale, c.config().initial_scale);
    // initial selection (2,2) is empty, so no highlight or popup
    assert!(plan.popup.is_none());
}

#[test]
fn test_color_mode_changes_rebuild_key() {
    let mut c = ready(GridController::new(config(9), dense_index(9)));
    let before = c.composite_key().unwrap();
    let cmds = c.update(Event::SetColorMode(ColorMode::Gender));
    let [Command::RebuildComposite(key)] = cmds.as_slice() else { panic!("{cmds:?}") };
    assert_ne!(key, &before);
    assert_eq!(key.color_mode, ColorMode::Gender);
}

#[test]
fn test_zoom_buttons_hold_and_release_on_pointer_up() {
    let mut c = ready(GridController::new(config(144), dense_index(144)));
    c.update(Event::ZoomPress(ZoomDirection::In));
    for _ in 0..500 {
        c.update(Event::Timer(TimerKind::ZoomRepeat));
    }
    assert_eq!(c.viewport().state().scale, 8.0);
    assert!(!c.can_zoom_in());
    let cmds = c.update(Event::PointerUp);
    assert_eq!(cmds, vec![Command::CancelTimer(TimerKind::ZoomRepeat)]);
    assert_eq!(c.zoom_held(), None);
}
