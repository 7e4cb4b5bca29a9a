pub mod colors;
pub mod grid_renderer;
pub mod tile_loader;
