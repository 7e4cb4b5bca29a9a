use leptos::prelude::*;
use wasm_bindgen::JsCast;
use soundgrid_core::filter::{filter_vocabulary, FilterEntry, FilterSet};
use crate::canvas::colors::{css_hex, filter_chip_color};
use crate::state::AppState;

fn edit_filters(state: &AppState, f: impl FnOnce(&mut FilterSet)) {
    state.filters.update(|entries| {
        let mut set = FilterSet::new(std::mem::take(entries));
        f(&mut set);
        *entries = set.entries().to_vec();
    });
}

fn chip_style(entry: &FilterEntry) -> String {
    let color = css_hex(filter_chip_color(&entry.name));
    if entry.active {
        format!("background: {color}; border-color: {color};")
    } else {
        format!("border-color: {color}; color: {color};")
    }
}

/// Filter picker plus one chip per filter. A chip toggles on click; its ×
/// removes it.
#[component]
pub fn FilterBar() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_pick = move |ev: web_sys::Event| {
        let Some(target) = ev.target() else { return };
        let select: web_sys::HtmlSelectElement = target.unchecked_into();
        let name = select.value();
        if !name.is_empty() {
            edit_filters(&state, |set| set.add(&name));
        }
        select.set_value("");
    };

    view! {
        <div class="filter-bar">
            <select class="filter-select" on:change=on_pick>
                <option value="" selected=true>"Add filter…"</option>
                {filter_vocabulary()
                    .into_iter()
                    .map(|name| view! { <option value=name.clone()>{name.clone()}</option> })
                    .collect_view()}
            </select>
            <div class="filter-chips">
                {move || state.filters.get().into_iter().map(|entry| {
                    let toggle_name = entry.name.clone();
                    let remove_name = entry.name.clone();
                    view! {
                        <span
                            class=if entry.active { "filter-chip active" } else { "filter-chip" }
                            style=chip_style(&entry)
                            on:click=move |_| {
                                let name = toggle_name.clone();
                                edit_filters(&state, |set| set.toggle(&name));
                            }
                        >
                            {entry.name.clone()}
                            <button
                                class="filter-chip-remove"
                                title="Remove filter"
                                on:click=move |ev: web_sys::MouseEvent| {
                                    ev.stop_propagation();
                                    let name = remove_name.clone();
                                    edit_filters(&state, |set| set.remove(&name));
                                }
                            >"×"</button>
                        </span>
                    }
                }).collect_view()}
            </div>
        </div>
    }
}
