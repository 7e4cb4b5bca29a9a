use leptos::prelude::*;
use soundgrid_core::controller::Event;
use crate::assets;
use crate::canvas::tile_loader;
use crate::components::color_panel::ColorPanel;
use crate::components::filter_bar::FilterBar;
use crate::components::grid_view::GridView;
use crate::components::metadata_popup::MetadataPopup;
use crate::components::progress::LoadProgress;
use crate::components::zoom_controls::ZoomControls;
use crate::engine;
use crate::state::{AppState, LoadPhase};

/// Config, then index, then tiles. Compositing and the first frame follow
/// from the engine once the last tile resolves.
async fn bootstrap(state: AppState) {
    let config = assets::load_config().await;
    let index = match assets::load_index(&config).await {
        Ok(index) => index,
        Err(e) => {
            log::error!("{e}");
            state.phase.set(LoadPhase::Failed(e));
            return;
        }
    };
    let keys = engine::install(config.clone(), index, state);
    tile_loader::load_all(keys, &config);
}

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    provide_context(state);

    wasm_bindgen_futures::spawn_local(bootstrap(state));

    Effect::new(move || {
        let entries = state.filters.get();
        engine::dispatch(Event::SetFilters(entries));
    });

    Effect::new(move || {
        let mode = state.color_mode.get();
        engine::dispatch(Event::SetColorMode(mode));
    });

    view! {
        <div class="app">
            <GridView />
            {move || {
                if state.ready.get() {
                    view! {
                        <div class="overlays">
                            <FilterBar />
                            <ColorPanel />
                            <ZoomControls />
                            <MetadataPopup />
                        </div>
                    }.into_any()
                } else {
                    view! { <LoadProgress /> }.into_any()
                }
            }}
        </div>
    }
}
