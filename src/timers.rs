//! One pending `setTimeout` per [`TimerKind`].
//!
//! Arming a kind clears its previous timeout first, so a kind is never
//! double-armed. Each arm bumps a generation counter; a callback that fires
//! after being superseded sees a stale generation and does nothing.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use soundgrid_core::controller::{Event, TimerKind};
use crate::engine;

struct Pending {
    handle: i32,
    generation: u64,
}

thread_local! {
    static PENDING: RefCell<HashMap<TimerKind, Pending>> = RefCell::new(HashMap::new());
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

pub fn arm(kind: TimerKind, delay_ms: u32) {
    cancel(kind);
    let Some(win) = web_sys::window() else { return };

    let generation = GENERATION.with(|g| {
        g.set(g.get() + 1);
        g.get()
    });
    let cb = Closure::once_into_js(move || {
        let current = PENDING.with(|p| {
            let mut p = p.borrow_mut();
            match p.get(&kind) {
                Some(pending) if pending.generation == generation => {
                    p.remove(&kind);
                    true
                }
                _ => false,
            }
        });
        if current {
            engine::dispatch(Event::Timer(kind));
        }
    });
    match win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay_ms as i32) {
        Ok(handle) => PENDING.with(|p| {
            p.borrow_mut().insert(kind, Pending { handle, generation });
        }),
        Err(e) => log::error!("setTimeout failed for {kind:?}: {e:?}"),
    }
}

pub fn cancel(kind: TimerKind) {
    let Some(pending) = PENDING.with(|p| p.borrow_mut().remove(&kind)) else { return };
    if let Some(win) = web_sys::window() {
        win.clear_timeout_with_handle(pending.handle);
    }
}

pub fn cancel_all() {
    let kinds: Vec<TimerKind> = PENDING.with(|p| p.borrow().keys().copied().collect());
    for kind in kinds {
        cancel(kind);
    }
}
