use leptos::prelude::*;
use wasm_bindgen::JsCast;
use soundgrid_core::palette::{self, ColorMode};
use crate::canvas::colors::css_hex;
use crate::state::AppState;

/// Overlay color mode picker with its legend.
#[component]
pub fn ColorPanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_mode_change = move |ev: web_sys::Event| {
        let Some(target) = ev.target() else { return };
        let select: web_sys::HtmlSelectElement = target.unchecked_into();
        state.color_mode.set(ColorMode::from_label(&select.value()));
    };

    view! {
        <div class="color-panel">
            <div class="color-panel-title">"Color by"</div>
            <select class="setting-select" on:change=on_mode_change>
                {ColorMode::ALL
                    .into_iter()
                    .map(|mode| view! {
                        <option
                            value=mode.label()
                            selected=move || state.color_mode.get() == mode
                        >{mode.label()}</option>
                    })
                    .collect_view()}
            </select>
            <div class="legend">
                {move || palette::legend(state.color_mode.get()).into_iter().map(|(label, color)| {
                    view! {
                        <div class="legend-row">
                            <span class="legend-swatch" style=format!("background: {};", css_hex(color))></span>
                            <span class="legend-label">{label}</span>
                        </div>
                    }
                }).collect_view()}
            </div>
        </div>
    }
}
