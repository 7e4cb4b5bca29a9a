use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageData};
use soundgrid_core::composite::Raster;
use soundgrid_core::frame::{FramePlan, Highlight, HIGHLIGHT_LINE_WIDTH, TRAIL_LINE_WIDTH};
use soundgrid_core::palette;
use crate::canvas::colors::{css_rgb, css_rgba};

/// Darkened highlight copies kept around for recently selected cells.
const HIGHLIGHT_CACHE_LEN: usize = 64;

// ── Canvas helpers ───────────────────────────────────────────────────────────

pub fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()?
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Detached canvas of the given size, with its 2D context.
pub fn create_canvas(width: u32, height: u32) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let doc = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = doc.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = context_2d(&canvas).ok_or_else(|| JsValue::from_str("no 2d context"))?;
    Ok((canvas, ctx))
}

/// Copy an RGBA raster onto a fresh offscreen canvas.
pub fn upload_raster(raster: &Raster) -> Result<HtmlCanvasElement, JsValue> {
    let (canvas, ctx) = create_canvas(raster.width, raster.height)?;
    let img = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(&raster.pixels[..]),
        raster.width,
        raster.height,
    )?;
    ctx.put_image_data(&img, 0.0, 0.0)?;
    Ok(canvas)
}

/// Draw `image` at `size`×`size` and remap its brightness through the
/// highlight gamma curve.
pub fn darkened_highlight(image: &HtmlImageElement, size: u32, gamma: f64) -> Result<HtmlCanvasElement, JsValue> {
    let (canvas, ctx) = create_canvas(size, size)?;
    let s = size as f64;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, s, s)?;
    let data = ctx.get_image_data(0.0, 0.0, s, s)?;
    let mut pixels = data.data().0;
    palette::gamma_darken(&mut pixels, gamma);
    let img = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&pixels[..]), size, size)?;
    ctx.put_image_data(&img, 0.0, 0.0)?;
    Ok(canvas)
}

// ── Highlight cache ──────────────────────────────────────────────────────────

pub struct HighlightCache {
    /// front = oldest
    entries: Vec<(String, HtmlCanvasElement)>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn get_or_render(
        &mut self,
        file_key: &str,
        image: &HtmlImageElement,
        size: u32,
        gamma: f64,
    ) -> Option<HtmlCanvasElement> {
        if let Some(pos) = self.entries.iter().position(|(k, _)| k == file_key) {
            let entry = self.entries.remove(pos);
            let canvas = entry.1.clone();
            self.entries.push(entry);
            return Some(canvas);
        }
        let canvas = match darkened_highlight(image, size, gamma) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to render highlight for {file_key}: {e:?}");
                return None;
            }
        };
        if self.entries.len() >= HIGHLIGHT_CACHE_LEN {
            self.entries.remove(0);
        }
        self.entries.push((file_key.to_string(), canvas.clone()));
        Some(canvas)
    }
}

// ── Frame ────────────────────────────────────────────────────────────────────

pub fn draw_frame(
    ctx: &CanvasRenderingContext2d,
    plan: &FramePlan,
    composite: &HtmlCanvasElement,
    highlight_image: Option<&HtmlCanvasElement>,
) {
    let (w, h) = (plan.canvas.width, plan.canvas.height);
    ctx.set_fill_style_str(&css_rgb(plan.background));
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.save();
    let t = plan.composite;
    let _ = ctx.translate(t.translate_x, t.translate_y);
    let _ = ctx.scale(t.scale, t.scale);
    let _ = ctx.draw_image_with_html_canvas_element(composite, 0.0, 0.0);
    ctx.restore();

    ctx.set_line_width(TRAIL_LINE_WIDTH);
    for outline in &plan.trail {
        ctx.set_stroke_style_str(&css_rgba(palette::ACCENT, outline.alpha));
        let r = outline.rect;
        ctx.stroke_rect(r.x, r.y, r.w, r.h);
    }

    if let (Some(highlight), Some(image)) = (&plan.highlight, highlight_image) {
        draw_highlight(ctx, highlight, image);
    }
}

fn draw_highlight(ctx: &CanvasRenderingContext2d, highlight: &Highlight, image: &HtmlCanvasElement) {
    let r = highlight.rect;
    ctx.set_fill_style_str(&css_rgb(palette::HIGHLIGHT_FILL));
    ctx.fill_rect(r.x, r.y, r.w, r.h);
    ctx.set_line_width(HIGHLIGHT_LINE_WIDTH);
    ctx.set_stroke_style_str(&css_rgb(highlight.border));
    ctx.stroke_rect(r.x, r.y, r.w, r.h);

    let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(image, r.x, r.y, r.w, r.h);

    let (overlay, alpha) = palette::HIGHLIGHT_OVERLAY;
    ctx.set_fill_style_str(&css_rgba(overlay, alpha));
    ctx.fill_rect(r.x, r.y, r.w, r.h);
}
