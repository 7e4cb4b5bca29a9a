use leptos::prelude::*;
use crate::state::{AppState, LoadPhase};

fn phase_label(phase: &LoadPhase) -> String {
    match phase {
        LoadPhase::Index => "Loading index…".to_string(),
        LoadPhase::Tiles => "Loading spectrograms…".to_string(),
        LoadPhase::Compositing => "Compositing…".to_string(),
        LoadPhase::Done => String::new(),
        LoadPhase::Failed(msg) => format!("Failed: {msg}"),
    }
}

/// Start-up progress, shown until the grid is ready.
#[component]
pub fn LoadProgress() -> impl IntoView {
    let state = expect_context::<AppState>();
    let failed = move || state.phase.with(|p| matches!(p, LoadPhase::Failed(_)));

    view! {
        <div class=move || if failed() { "loading failed" } else { "loading" }>
            <div class="loading-label">{move || state.phase.with(phase_label)}</div>
            <div class="progress-track">
                <div
                    class="progress-fill"
                    style=move || format!("width: {}%;", state.progress.get())
                ></div>
            </div>
            <div class="progress-pct">{move || format!("{}%", state.progress.get())}</div>
        </div>
    }
}
