//! Fading history of recently played cells.

use crate::coord::GridCoord;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailEntry {
    pub coord: GridCoord,
    pub at_ms: f64,
}

#[derive(Clone, Debug)]
pub struct Trail {
    entries: Vec<TrailEntry>,
    fade_ms: f64,
}

impl Trail {
    pub fn new(fade_ms: f64) -> Self {
        Self { entries: Vec::new(), fade_ms }
    }

    pub fn push(&mut self, coord: GridCoord, now_ms: f64) {
        self.entries.push(TrailEntry { coord, at_ms: now_ms });
    }

    /// Drop entries whose age has reached the fade duration.
    pub fn prune(&mut self, now_ms: f64) {
        let fade = self.fade_ms;
        self.entries.retain(|e| now_ms - e.at_ms < fade);
    }

    /// Live entries with their outline alpha (`1 - age / fade`), oldest first.
    pub fn visible(&self, now_ms: f64) -> impl Iterator<Item = (GridCoord, f64)> + '_ {
        self.entries.iter().filter_map(move |e| {
            let age = now_ms - e.at_ms;
            (age < self.fade_ms).then(|| (e.coord, (1.0 - age / self.fade_ms).clamp(0.0, 1.0)))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
