//! Static asset fetches: config document and grid index.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;
use soundgrid_core::{GridConfig, GridIndex};

pub const CONFIG_URL: &str = "grid_config.json";

pub async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let resp: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("GET {url}: HTTP {}", resp.status())));
    }
    let text = JsFuture::from(resp.text()?).await?;
    text.as_string().ok_or_else(|| JsValue::from_str("response body is not text"))
}

/// Load the optional config document, falling back to defaults.
pub async fn load_config() -> GridConfig {
    let text = match fetch_text(CONFIG_URL).await {
        Ok(t) => t,
        Err(e) => {
            log::warn!("No {CONFIG_URL} ({e:?}), using defaults");
            return GridConfig::default();
        }
    };
    match GridConfig::from_json(&text) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring {CONFIG_URL}: {e}");
            GridConfig::default()
        }
    }
}

pub async fn load_index(config: &GridConfig) -> Result<GridIndex, String> {
    let text = fetch_text(&config.index_url)
        .await
        .map_err(|e| format!("Failed to fetch {}: {e:?}", config.index_url))?;
    let index = GridIndex::from_json(&text, config.grid_size).map_err(|e| e.to_string())?;
    log::info!("Index loaded: {} cells, {} distinct clips", index.len(), index.file_keys().len());
    Ok(index)
}
