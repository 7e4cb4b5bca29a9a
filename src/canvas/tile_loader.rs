//! Spectrogram tile loading.
//!
//! Each file key's PNG is decoded by the browser, then sampled down to one
//! grid cell on a scratch canvas. The decoded element is kept as well, since
//! the selection highlight draws it at full size.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};
use soundgrid_core::tiles::{CellPixels, TileImage};
use soundgrid_core::GridConfig;
use crate::canvas::grid_renderer;
use crate::engine;

/// Decodes running at once.
const MAX_IN_FLIGHT: usize = 64;

pub struct LoadedTile {
    pub cell: TileImage,
    pub image: HtmlImageElement,
}

impl CellPixels for LoadedTile {
    fn cell_pixels(&self) -> &TileImage {
        &self.cell
    }
}

thread_local! {
    static SCRATCH: RefCell<Option<(HtmlCanvasElement, CanvasRenderingContext2d)>> = const { RefCell::new(None) };
}

/// Start loading every key. Each result, success or failure, is reported to
/// the engine as it lands.
pub fn load_all(keys: Vec<String>, config: &GridConfig) {
    log::info!("Loading {} tiles", keys.len());
    let workers = MAX_IN_FLIGHT.min(keys.len());
    let queue = Rc::new(RefCell::new(keys));
    let config = Rc::new(config.clone());

    for _ in 0..workers {
        let queue = queue.clone();
        let config = config.clone();
        wasm_bindgen_futures::spawn_local(async move {
            loop {
                let Some(key) = queue.borrow_mut().pop() else { break };
                let path = config.image_path(&key);
                let tile = match load_tile(&path, config.cell_size).await {
                    Ok(tile) => Some(tile),
                    Err(e) => {
                        log::warn!("Failed to load image: {path} ({e:?})");
                        None
                    }
                };
                engine::tile_resolved(&key, tile);
            }
        });
    }
}

async fn load_tile(path: &str, cell_size: u32) -> Result<LoadedTile, JsValue> {
    let image = HtmlImageElement::new()?;
    image.set_src(path);
    JsFuture::from(image.decode()).await?;
    let cell = sample_cell(&image, cell_size)?;
    Ok(LoadedTile { cell, image })
}

/// Scale `image` down to `size`×`size` and read the pixels back.
fn sample_cell(image: &HtmlImageElement, size: u32) -> Result<TileImage, JsValue> {
    SCRATCH.with(|s| {
        let mut s = s.borrow_mut();
        let ctx = match &*s {
            Some((canvas, ctx)) if canvas.width() == size => ctx.clone(),
            _ => {
                let (canvas, ctx) = grid_renderer::create_canvas(size, size)?;
                *s = Some((canvas, ctx.clone()));
                ctx
            }
        };
        let side = size as f64;
        ctx.clear_rect(0.0, 0.0, side, side);
        ctx.draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, side, side)?;
        let data = ctx.get_image_data(0.0, 0.0, side, side)?;
        Ok(TileImage { width: size, height: size, pixels: data.data().0 })
    })
}
