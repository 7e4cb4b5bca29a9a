use wasm_bindgen::prelude::*;

mod assets;
mod audio;
mod canvas;
mod components;
mod engine;
mod state;
mod timers;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(components::app::App);
}
