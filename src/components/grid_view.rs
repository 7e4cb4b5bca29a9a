use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use leptos::prelude::*;
use leptos::ev;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};
use soundgrid_core::controller::Event;
use crate::canvas::grid_renderer;
use crate::engine;
use crate::state::AppState;

/// Canvas-relative position of a mouse event.
fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top())
}

/// Match the backing store to the displayed size and report it to the engine.
/// Reported every frame: the engine may be installed after the first resize,
/// and an unchanged size is a no-op there.
fn sync_canvas_size(canvas: &HtmlCanvasElement) {
    let rect = canvas.get_bounding_client_rect();
    let display_w = rect.width() as u32;
    let display_h = rect.height() as u32;
    if display_w == 0 || display_h == 0 {
        return;
    }
    if canvas.width() != display_w || canvas.height() != display_h {
        canvas.set_width(display_w);
        canvas.set_height(display_h);
    }
    engine::dispatch(Event::Resized { width: display_w as f64, height: display_h as f64 });
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request_frame(cb: &FrameCallback) {
    let Some(win) = web_sys::window() else { return };
    if let Some(closure) = cb.borrow().as_ref() {
        if let Err(e) = win.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }
}

/// Drive frames until `running` is cleared: resize check, per-frame update,
/// then paint.
fn start_frame_loop(canvas_ref: NodeRef<leptos::html::Canvas>, running: Arc<AtomicBool>) {
    let cb: FrameCallback = Rc::new(RefCell::new(None));
    let next = cb.clone();
    *cb.borrow_mut() = Some(Closure::new(move || {
        if !running.load(Ordering::Relaxed) {
            // Breaks the closure's self-reference.
            next.borrow_mut().take();
            return;
        }
        if let Some(canvas_el) = canvas_ref.get_untracked() {
            let canvas: &HtmlCanvasElement = canvas_el.as_ref();
            sync_canvas_size(canvas);
            let now = engine::now_ms();
            engine::dispatch(Event::Frame { now_ms: now });
            if let Some(ctx) = grid_renderer::context_2d(canvas) {
                engine::draw(&ctx, now);
            }
        }
        request_frame(&next);
    }));
    request_frame(&cb);
}

#[component]
pub fn GridView() -> impl IntoView {
    let state = expect_context::<AppState>();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let running = Arc::new(AtomicBool::new(true));

    start_frame_loop(canvas_ref, running.clone());

    // Releasing anywhere ends a drag and any zoom-button hold.
    let up_handle = window_event_listener(ev::mouseup, move |_| {
        state.dragging.set(false);
        engine::dispatch(Event::PointerUp);
    });

    on_cleanup(move || {
        running.store(false, Ordering::Relaxed);
        up_handle.remove();
        engine::shutdown();
    });

    let on_mousedown = move |ev: MouseEvent| {
        ev.prevent_default();
        let Some(canvas_el) = canvas_ref.get_untracked() else { return };
        let (x, y) = canvas_point(canvas_el.as_ref(), &ev);
        state.dragging.set(true);
        engine::dispatch(Event::PointerDown { x, y, now_ms: engine::now_ms() });
    };

    let on_mousemove = move |ev: MouseEvent| {
        if !state.dragging.get_untracked() {
            return;
        }
        let Some(canvas_el) = canvas_ref.get_untracked() else { return };
        let (x, y) = canvas_point(canvas_el.as_ref(), &ev);
        engine::dispatch(Event::PointerMove { x, y, now_ms: engine::now_ms() });
    };

    let on_wheel = move |ev: WheelEvent| {
        ev.prevent_default();
        engine::dispatch(Event::Wheel { delta_y: ev.delta_y() });
    };

    view! {
        <div class="grid-container">
            <canvas
                node_ref=canvas_ref
                class=move || if state.ready.get() { "grid-canvas ready" } else { "grid-canvas" }
                style=move || if state.dragging.get() { "cursor: grabbing;" } else { "cursor: crosshair;" }
                on:mousedown=on_mousedown
                on:mousemove=on_mousemove
                on:wheel=on_wheel
            />
        </div>
    }
}
