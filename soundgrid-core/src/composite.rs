//! Pre-rendered full-grid raster.
//!
//! Drawing thousands of tiles every frame is too slow, so the whole grid is
//! composited once into an RGBA buffer and the render loop only blits it.
//! The buffer is rebuilt when its [`CompositeKey`] changes.

use crate::filter::{CompiledFilters, FilterSignature};
use crate::index::GridIndex;
use crate::palette::{self, ColorMode, Rgb};
use crate::tiles::{CellPixels, TileImage, TileSet};

/// Coverage of the hairline border drawn around tinted cells.
const BORDER_COVERAGE: f64 = 0.25;

/// RGBA raster, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn filled(width: u32, height: u32, rgb: Rgb) -> Self {
        let pixels = [rgb[0], rgb[1], rgb[2], 255].repeat((width * height) as usize);
        Self { width, height, pixels }
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    fn blend_px(&mut self, x: u32, y: u32, rgb: Rgb, alpha: f64) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let dst = &mut self.pixels[i..i + 4];
        let dst_a = dst[3] as f64 / 255.0;
        let out_a = alpha + dst_a * (1.0 - alpha);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let blended = (rgb[c] as f64 * alpha + dst[c] as f64 * dst_a * (1.0 - alpha)) / out_a;
            dst[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgb: Rgb) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                let i = ((py * self.width + px) * 4) as usize;
                self.pixels[i..i + 4].copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
            }
        }
    }

    pub fn blend_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgb: Rgb, alpha: f64) {
        for py in y..y + h {
            for px in x..x + w {
                self.blend_px(px, py, rgb, alpha);
            }
        }
    }

    /// Blend a one-pixel ring just inside the rectangle.
    pub fn blend_border(&mut self, x: u32, y: u32, w: u32, h: u32, rgb: Rgb, alpha: f64) {
        if w == 0 || h == 0 {
            return;
        }
        for px in x..x + w {
            self.blend_px(px, y, rgb, alpha);
            if h > 1 {
                self.blend_px(px, y + h - 1, rgb, alpha);
            }
        }
        for py in y + 1..(y + h).saturating_sub(1) {
            self.blend_px(x, py, rgb, alpha);
            if w > 1 {
                self.blend_px(x + w - 1, py, rgb, alpha);
            }
        }
    }

    /// Draw `tile` scaled (nearest neighbour) into a `size`×`size` square,
    /// compositing source-over.
    pub fn draw_tile(&mut self, tile: &TileImage, x: u32, y: u32, size: u32) {
        if tile.width == 0 || tile.height == 0 || size == 0 {
            return;
        }
        for dy in 0..size {
            let sy = (dy as u64 * tile.height as u64 / size as u64) as u32;
            for dx in 0..size {
                let sx = (dx as u64 * tile.width as u64 / size as u64) as u32;
                let si = ((sy * tile.width + sx) * 4) as usize;
                let Some(src) = tile.pixels.get(si..si + 4) else { continue };
                let alpha = src[3] as f64 / 255.0;
                self.blend_px(x + dx, y + dy, [src[0], src[1], src[2]], alpha);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    pub filters: FilterSignature,
    pub color_mode: ColorMode,
    pub tile_version: u64,
}

/// Composite every occupied cell once: visible tiles (plus optional overlay
/// tint), background fill for anything filtered out or not loaded.
pub fn build_composite<T: CellPixels>(
    index: &GridIndex,
    tiles: &TileSet<T>,
    filters: &CompiledFilters,
    color_mode: ColorMode,
    cell_size: u32,
) -> Raster {
    let side = index.size() * cell_size;
    let mut raster = Raster::filled(side, side, palette::COMPOSITE_BASE);
    let mut drawn = 0usize;

    for (coord, record) in index.occupied() {
        let x = coord.x as u32 * cell_size;
        let y = coord.y as u32 * cell_size;
        let tile = tiles.get(&record.file_key);

        match tile {
            Some(tile) if filters.matches(Some(record)) => {
                raster.draw_tile(tile.cell_pixels(), x, y, cell_size);
                if let Some(color) = palette::overlay_color(color_mode, record) {
                    raster.blend_rect(x, y, cell_size, cell_size, color, palette::OVERLAY_ALPHA);
                    let border = palette::darken(color, palette::BORDER_DARKEN);
                    raster.blend_border(x, y, cell_size, cell_size, border, BORDER_COVERAGE);
                }
                drawn += 1;
            }
            _ => raster.fill_rect(x, y, cell_size, cell_size, palette::BACKGROUND),
        }
    }

    log::debug!("composite: {drawn}/{} cells drawn, mode {:?}", index.len(), color_mode);
    raster
}

/// The last built raster and the key it was built for.
#[derive(Default)]
pub struct CompositeCache {
    entry: Option<(CompositeKey, Raster)>,
    builds: u64,
}

impl CompositeCache {
    pub fn is_current(&self, key: &CompositeKey) -> bool {
        self.entry.as_ref().is_some_and(|(k, _)| k == key)
    }

    /// Return the raster for `key`, building it first if the cached one is stale.
    /// The flag is true when a rebuild happened.
    pub fn ensure(&mut self, key: &CompositeKey, build: impl FnOnce() -> Raster) -> (&Raster, bool) {
        let rebuilt = !self.is_current(key);
        let entry = match self.entry.take() {
            Some(entry) if !rebuilt => entry,
            _ => {
                self.builds += 1;
                (key.clone(), build())
            }
        };
        let (_, raster) = self.entry.insert(entry);
        (&*raster, rebuilt)
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.entry.as_ref().map(|(_, r)| r)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn builds(&self) -> u64 {
        self.builds
    }
}
