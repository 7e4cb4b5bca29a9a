pub mod app;
pub mod color_panel;
pub mod filter_bar;
pub mod grid_view;
pub mod metadata_popup;
pub mod progress;
pub mod zoom_controls;
