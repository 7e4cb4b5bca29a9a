//! Snapping a pointer target to a selectable cell, and the playback throttle.

use crate::coord::GridCoord;
use crate::filter::CompiledFilters;
use crate::index::GridIndex;

fn is_selectable(index: &GridIndex, filters: &CompiledFilters, coord: GridCoord) -> bool {
    index.get(coord).is_some_and(|r| filters.matches(Some(r)))
}

/// Nearest selectable cell to `start` by Chebyshev distance.
///
/// The start cell is checked first, then square rings of radius 1, 2, ...
/// while `r < N / 2`. Within a ring, `dx` runs outer and `dy` inner, both
/// from `-r` to `r`, visiting only perimeter cells. The first hit wins, so
/// ties always resolve the same way.
pub fn spiral_search(index: &GridIndex, filters: &CompiledFilters, start: GridCoord) -> Option<GridCoord> {
    if is_selectable(index, filters, start) {
        return Some(start);
    }
    let n = index.size();
    let limit = n as f64 / 2.0;
    let mut r = 1i32;
    while (r as f64) < limit {
        for dx in -r..=r {
            for dy in -r..=r {
                if dx.abs() != r && dy.abs() != r {
                    continue;
                }
                let cell = start.offset(dx, dy);
                if cell.in_bounds(n) && is_selectable(index, filters, cell) {
                    return Some(cell);
                }
            }
        }
        r += 1;
    }
    None
}

/// Minimum-interval gate shared by audio playback and trail recording.
#[derive(Clone, Debug)]
pub struct ThrottleGate {
    min_interval_ms: f64,
    last: Option<f64>,
}

impl ThrottleGate {
    pub fn new(min_interval_ms: f64) -> Self {
        Self { min_interval_ms, last: None }
    }

    /// Pass (and restart the window) if the interval has elapsed.
    pub fn try_pass(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last {
            if now_ms - last < self.min_interval_ms {
                return false;
            }
        }
        self.last = Some(now_ms);
        true
    }
}

/// What caused a selection attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectTrigger {
    /// Pointer pressed: replays the current cell even if unchanged.
    Press,
    /// Drag or pan tick: only a move to a different cell plays.
    Drag,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Playback {
    pub file_key: String,
    /// Previous selection to append to the trail, if it had a record.
    pub trail_from: Option<GridCoord>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectOutcome {
    /// Out of bounds, or nothing selectable within the search radius.
    Ignored,
    Selected {
        coord: GridCoord,
        changed: bool,
        /// `None` when nothing should play (unchanged drag, or throttled).
        playback: Option<Playback>,
    },
}

#[derive(Clone, Debug)]
pub struct SelectionEngine {
    selected: GridCoord,
    gate: ThrottleGate,
}

impl SelectionEngine {
    pub fn new(initial: GridCoord, min_play_interval_ms: f64) -> Self {
        Self { selected: initial, gate: ThrottleGate::new(min_play_interval_ms) }
    }

    pub fn selected(&self) -> GridCoord {
        self.selected
    }

    /// Move a selection the filters now hide to the nearest visible cell,
    /// silently: no playback, no trail. Returns the new cell if it moved.
    /// With nothing reachable the selection stays put and renders as hidden.
    pub fn revalidate(&mut self, index: &GridIndex, filters: &CompiledFilters) -> Option<GridCoord> {
        if is_selectable(index, filters, self.selected) {
            return None;
        }
        let coord = spiral_search(index, filters, self.selected)?;
        self.selected = coord;
        Some(coord)
    }

    /// Resolve `target` and update the selection. The selection itself is
    /// never throttled; only playback and trail recording go through the gate.
    pub fn select(
        &mut self,
        index: &GridIndex,
        filters: &CompiledFilters,
        target: GridCoord,
        trigger: SelectTrigger,
        now_ms: f64,
    ) -> SelectOutcome {
        if !target.in_bounds(index.size()) {
            return SelectOutcome::Ignored;
        }
        let Some(coord) = spiral_search(index, filters, target) else {
            return SelectOutcome::Ignored;
        };
        let Some(record) = index.get(coord) else {
            return SelectOutcome::Ignored;
        };

        let previous = self.selected;
        let changed = previous != coord;
        self.selected = coord;

        let wants_play = changed || trigger == SelectTrigger::Press;
        let playback = (wants_play && self.gate.try_pass(now_ms)).then(|| Playback {
            file_key: record.file_key.clone(),
            trail_from: (changed && index.get(previous).is_some()).then_some(previous),
        });

        SelectOutcome::Selected { coord, changed, playback }
    }
}
