//! Tile load bookkeeping.
//!
//! The browser decodes images concurrently; this tracks which file keys are
//! still pending, which resolved, and the aggregate progress. A failed decode
//! still resolves its key, so progress always reaches 100.

use std::collections::{HashMap, HashSet};

/// RGBA pixels of one decoded tile.
#[derive(Clone, Debug, PartialEq)]
pub struct TileImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TileImage {
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat((width * height) as usize);
        Self { width, height, pixels }
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// Anything the compositor can sample cell pixels from.
pub trait CellPixels {
    fn cell_pixels(&self) -> &TileImage;
}

impl CellPixels for TileImage {
    fn cell_pixels(&self) -> &TileImage {
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
}

impl LoadProgress {
    /// Whole percent, 100 for an empty load.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.loaded as f64 / self.total as f64 * 100.0).round();
        pct.min(100.0) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.loaded >= self.total
    }
}

pub struct TileSet<T> {
    tiles: HashMap<String, T>,
    pending: HashSet<String>,
    failed: usize,
    total: usize,
    /// Bumped each time the set becomes complete; part of the composite key.
    version: u64,
}

impl<T> TileSet<T> {
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        let pending: HashSet<String> = keys.into_iter().collect();
        let total = pending.len();
        let version = if total == 0 { 1 } else { 0 };
        Self {
            tiles: HashMap::with_capacity(total),
            pending,
            failed: 0,
            total,
            version,
        }
    }

    pub fn pending_keys(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }

    pub fn resolve_loaded(&mut self, key: &str, tile: T) -> LoadProgress {
        if self.pending.remove(key) {
            self.tiles.insert(key.to_string(), tile);
            self.after_resolve();
        }
        self.progress()
    }

    pub fn resolve_failed(&mut self, key: &str) -> LoadProgress {
        if self.pending.remove(key) {
            self.failed += 1;
            self.after_resolve();
        }
        self.progress()
    }

    fn after_resolve(&mut self) {
        if self.pending.is_empty() {
            self.version += 1;
            log::info!(
                "tiles complete: {} loaded, {} failed",
                self.tiles.len(),
                self.failed
            );
        }
    }

    pub fn progress(&self) -> LoadProgress {
        LoadProgress { loaded: self.total - self.pending.len(), total: self.total }
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.tiles.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tiles.contains_key(key)
    }

    pub fn loaded_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }
}
