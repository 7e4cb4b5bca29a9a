//! Per-frame draw list.
//!
//! The render loop asks for a [`FramePlan`] every animation frame and paints
//! it in order: background, composite, trail outlines, highlight. Nothing in
//! here touches a canvas, so the geometry is testable natively.

use crate::coord::GridCoord;
use crate::filter::CompiledFilters;
use crate::index::GridIndex;
use crate::palette::{self, ColorMode, Rgb};
use crate::trail::Trail;
use crate::viewport::{CanvasSize, Rect, Viewport, ViewportState};

pub const TRAIL_LINE_WIDTH: f64 = 1.5;
pub const HIGHLIGHT_LINE_WIDTH: f64 = 3.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailOutline {
    pub rect: Rect,
    pub alpha: f64,
}

/// Magnified copy of the selected tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    pub rect: Rect,
    pub file_key: String,
    pub border: Rgb,
}

/// Screen point the metadata popup hangs from (its bottom-centre sits just
/// above this point).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopupAnchor {
    pub left: f64,
    pub top: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub canvas: CanvasSize,
    pub background: Rgb,
    /// Transform for blitting the composite raster.
    pub composite: ViewportState,
    pub trail: Vec<TrailOutline>,
    /// Only drawn by the caller when the tile image is actually loaded.
    pub highlight: Option<Highlight>,
    pub popup: Option<PopupAnchor>,
}

pub struct FrameInputs<'a> {
    pub viewport: &'a Viewport,
    pub index: &'a GridIndex,
    pub filters: &'a CompiledFilters,
    pub trail: &'a Trail,
    pub selected: GridCoord,
    pub color_mode: ColorMode,
    pub highlight_size: f64,
    pub now_ms: f64,
}

pub fn plan_frame(inputs: &FrameInputs<'_>) -> FramePlan {
    let vp = inputs.viewport;
    let canvas = vp.canvas();

    let trail = inputs
        .trail
        .visible(inputs.now_ms)
        .map(|(coord, alpha)| TrailOutline { rect: vp.cell_rect(coord), alpha })
        .collect();

    let mut highlight = None;
    let mut popup = None;
    let visible = inputs.index.get(inputs.selected).filter(|r| inputs.filters.matches(Some(*r)));
    if let Some(record) = visible {
        let cell = vp.cell_rect(inputs.selected);
        let hs = inputs.highlight_size;
        let offset = (hs - cell.w) / 2.0;
        let rect = Rect { x: cell.x - offset, y: cell.y - offset, w: hs, h: hs };

        popup = Some(PopupAnchor { left: cell.center_x(), top: rect.y });

        let on_screen = cell.x + hs > 0.0 && cell.y + hs > 0.0 && cell.x < canvas.width && cell.y < canvas.height;
        if on_screen {
            let border = palette::overlay_color(inputs.color_mode, record)
                .map(|c| palette::darken(c, palette::BORDER_DARKEN))
                .unwrap_or(palette::ACCENT);
            highlight = Some(Highlight { rect, file_key: record.file_key.clone(), border });
        }
    }

    FramePlan {
        canvas,
        background: palette::BACKGROUND,
        composite: vp.state(),
        trail,
        highlight,
        popup,
    }
}
