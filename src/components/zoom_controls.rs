use leptos::prelude::*;
use web_sys::MouseEvent;
use soundgrid_core::controller::Event;
use soundgrid_core::viewport::ZoomDirection;
use crate::engine;
use crate::state::AppState;

fn press(direction: ZoomDirection) -> impl Fn(MouseEvent) + Copy {
    move |ev: MouseEvent| {
        ev.stop_propagation();
        engine::dispatch(Event::ZoomPress(direction));
    }
}

/// Hold-to-repeat zoom buttons.
#[component]
pub fn ZoomControls() -> impl IntoView {
    let state = expect_context::<AppState>();
    let release = |_: MouseEvent| engine::dispatch(Event::ZoomRelease);

    view! {
        <div class="zoom-controls">
            <button
                class="zoom-btn"
                title="Zoom in"
                disabled=move || !state.can_zoom_in.get()
                on:mousedown=press(ZoomDirection::In)
                on:mouseup=release
                on:mouseleave=release
            >"+"</button>
            <button
                class="zoom-btn"
                title="Zoom out"
                disabled=move || !state.can_zoom_out.get()
                on:mousedown=press(ZoomDirection::Out)
                on:mouseup=release
                on:mouseleave=release
            >"−"</button>
        </div>
    }
}
