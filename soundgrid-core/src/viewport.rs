//! Grid space ↔ screen space transform.
//!
//! `screen = grid * scale + translate`, where grid space is the composite
//! raster (cell `(x, y)` spans `x * cell_size .. (x + 1) * cell_size`).
//! Every operation that depends on the canvas size is a no-op until a
//! non-zero size has been observed.

use crate::config::GridConfig;
use crate::coord::GridCoord;

/// Sub-pixel tolerance used for "centered" checks and the smooth-center snap.
pub const SNAP_TOLERANCE_PX: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Wheel convention: scrolling up (negative delta) zooms in.
    pub fn from_wheel(delta_y: f64) -> Self {
        if delta_y < 0.0 { ZoomDirection::In } else { ZoomDirection::Out }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomOutcome {
    Zoomed,
    /// Zoom-out requested while already at the minimum scale.
    AtMinimum,
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmoothStep {
    Continue,
    Settled,
}

/// Axis-aligned screen rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }
}

#[derive(Clone, Debug)]
pub struct Viewport {
    state: ViewportState,
    canvas: CanvasSize,
    grid_size: u32,
    cell_size: f64,
    min_scale: f64,
    max_scale: f64,
}

impl Viewport {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            state: ViewportState { scale: config.min_scale, translate_x: 0.0, translate_y: 0.0 },
            canvas: CanvasSize::default(),
            grid_size: config.grid_size,
            cell_size: config.cell_size as f64,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn set_state(&mut self, state: ViewportState) {
        self.state = state;
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Record a new canvas size. Zero sizes are ignored. Returns true when the
    /// stored size changed.
    pub fn set_canvas(&mut self, size: CanvasSize) -> bool {
        if !size.is_valid() || size == self.canvas {
            return false;
        }
        self.canvas = size;
        true
    }

    pub fn has_canvas(&self) -> bool {
        self.canvas.is_valid()
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    // ── Centering ────────────────────────────────────────────────────────────

    /// Transform that puts the centre of grid cell `(grid_x, grid_y)` at the
    /// canvas centre. Fractional cell positions are allowed.
    pub fn center_transform(&self, scale: f64, grid_x: f64, grid_y: f64) -> Option<ViewportState> {
        if !self.canvas.is_valid() {
            return None;
        }
        let cell_cx = grid_x * self.cell_size + self.cell_size / 2.0;
        let cell_cy = grid_y * self.cell_size + self.cell_size / 2.0;
        Some(ViewportState {
            scale,
            translate_x: self.canvas.width / 2.0 - cell_cx * scale,
            translate_y: self.canvas.height / 2.0 - cell_cy * scale,
        })
    }

    pub fn center_on(&mut self, scale: f64, grid_x: f64, grid_y: f64) -> bool {
        match self.center_transform(scale, grid_x, grid_y) {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Whole grid centred at the minimum scale.
    pub fn full_grid_center(&self) -> Option<ViewportState> {
        let half = self.grid_size as f64 / 2.0;
        self.center_transform(self.min_scale, half, half)
    }

    pub fn is_perfectly_centered(&self) -> bool {
        let Some(target) = self.full_grid_center() else { return false };
        self.state.scale == self.min_scale
            && (self.state.translate_x - target.translate_x).abs() < SNAP_TOLERANCE_PX
            && (self.state.translate_y - target.translate_y).abs() < SNAP_TOLERANCE_PX
    }

    /// One ease-out step toward [`Self::full_grid_center`]. Snaps exactly once
    /// within a pixel on both axes.
    pub fn smooth_center_step(&mut self, smoothing: f64) -> SmoothStep {
        let Some(target) = self.full_grid_center() else { return SmoothStep::Settled };
        let dx = target.translate_x - self.state.translate_x;
        let dy = target.translate_y - self.state.translate_y;
        if dx.abs() < SNAP_TOLERANCE_PX && dy.abs() < SNAP_TOLERANCE_PX {
            self.state = target;
            return SmoothStep::Settled;
        }
        self.state.translate_x += dx * smoothing;
        self.state.translate_y += dy * smoothing;
        SmoothStep::Continue
    }

    // ── Zoom ─────────────────────────────────────────────────────────────────

    /// Scale by `factor` keeping the centre of `anchor` fixed on screen.
    pub fn zoom_about(&mut self, anchor: GridCoord, direction: ZoomDirection, factor: f64) -> ZoomOutcome {
        if !self.canvas.is_valid() {
            return ZoomOutcome::Unchanged;
        }
        let old = self.state.scale;
        let new = match direction {
            ZoomDirection::Out if old <= self.min_scale => return ZoomOutcome::AtMinimum,
            ZoomDirection::Out => (old / factor).max(self.min_scale),
            ZoomDirection::In => (old * factor).min(self.max_scale),
        };
        if new == old {
            return ZoomOutcome::Unchanged;
        }

        let (cx, cy) = self.cell_center(anchor);
        let px = cx * old + self.state.translate_x;
        let py = cy * old + self.state.translate_y;
        self.state = ViewportState {
            scale: new,
            translate_x: px - cx * new,
            translate_y: py - cy * new,
        };
        ZoomOutcome::Zoomed
    }

    // ── Edge panning ─────────────────────────────────────────────────────────

    /// Unit vector from the canvas centre toward `(x, y)` when the point lies
    /// within `threshold` px of any edge; `None` otherwise.
    pub fn edge_pan_direction(&self, x: f64, y: f64, threshold: f64) -> Option<(f64, f64)> {
        if !self.canvas.is_valid() {
            return None;
        }
        let near_edge = x < threshold
            || x > self.canvas.width - threshold
            || y < threshold
            || y > self.canvas.height - threshold;
        if !near_edge {
            return None;
        }
        let dx = x - self.canvas.width / 2.0;
        let dy = y - self.canvas.height / 2.0;
        let mag = (dx * dx + dy * dy).sqrt();
        if mag == 0.0 {
            return None;
        }
        Some((dx / mag, dy / mag))
    }

    /// Move the view toward `direction`; content slides the opposite way.
    pub fn pan_by(&mut self, direction: (f64, f64), step_px: f64) {
        if !self.canvas.is_valid() {
            return;
        }
        self.state.translate_x -= direction.0 * step_px;
        self.state.translate_y -= direction.1 * step_px;
    }

    // ── Hit testing ──────────────────────────────────────────────────────────

    /// Cell under a canvas-relative point. May be out of bounds.
    pub fn screen_to_cell(&self, x: f64, y: f64) -> GridCoord {
        let gx = (x - self.state.translate_x) / self.state.scale;
        let gy = (y - self.state.translate_y) / self.state.scale;
        GridCoord::new(
            (gx / self.cell_size).floor() as i32,
            (gy / self.cell_size).floor() as i32,
        )
    }

    pub fn grid_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
        (
            gx * self.state.scale + self.state.translate_x,
            gy * self.state.scale + self.state.translate_y,
        )
    }

    fn cell_center(&self, cell: GridCoord) -> (f64, f64) {
        (
            cell.x as f64 * self.cell_size + self.cell_size / 2.0,
            cell.y as f64 * self.cell_size + self.cell_size / 2.0,
        )
    }

    pub fn cell_center_on_screen(&self, cell: GridCoord) -> (f64, f64) {
        let (cx, cy) = self.cell_center(cell);
        self.grid_to_screen(cx, cy)
    }

    pub fn cell_rect(&self, cell: GridCoord) -> Rect {
        let (x, y) = self.grid_to_screen(cell.x as f64 * self.cell_size, cell.y as f64 * self.cell_size);
        let side = self.cell_size * self.state.scale;
        Rect { x, y, w: side, h: side }
    }
}
