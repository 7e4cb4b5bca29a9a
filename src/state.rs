use leptos::prelude::*;
use soundgrid_core::filter::FilterEntry;
use soundgrid_core::frame::PopupAnchor;
use soundgrid_core::palette::ColorMode;
use soundgrid_core::CellRecord;

/// What the start-up sequence is doing.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadPhase {
    Index,
    Tiles,
    Compositing,
    Done,
    Failed(String),
}

/// UI-facing mirror of the engine. The engine owns the real state and
/// pushes snapshots here after each update.
#[derive(Clone, Copy)]
pub struct AppState {
    pub phase: RwSignal<LoadPhase>,
    /// Tile load progress, 0..=100.
    pub progress: RwSignal<u8>,
    pub ready: RwSignal<bool>,
    // Inputs owned by the UI; the engine consumes them.
    pub filters: RwSignal<Vec<FilterEntry>>,
    pub color_mode: RwSignal<ColorMode>,
    // Outputs pushed by the engine.
    pub selected: RwSignal<Option<CellRecord>>,
    pub popup: RwSignal<Option<PopupAnchor>>,
    pub can_zoom_in: RwSignal<bool>,
    pub can_zoom_out: RwSignal<bool>,
    pub dragging: RwSignal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            phase: RwSignal::new(LoadPhase::Index),
            progress: RwSignal::new(0),
            ready: RwSignal::new(false),
            filters: RwSignal::new(Vec::new()),
            color_mode: RwSignal::new(ColorMode::None),
            selected: RwSignal::new(None),
            popup: RwSignal::new(None),
            can_zoom_in: RwSignal::new(true),
            can_zoom_out: RwSignal::new(true),
            dragging: RwSignal::new(false),
        }
    }
}
