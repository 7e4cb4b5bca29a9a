//! Engine core for the soundgrid spectrogram explorer.
//!
//! Everything here is plain Rust with no browser dependencies: the grid index
//! and its filter predicate, tile load bookkeeping, the composite raster, the
//! viewport transform, spiral selection, the fading trail, and the
//! [`controller::GridController`] that ties them together. The web front end
//! feeds it events and executes the effects it returns.

pub mod composite;
pub mod config;
pub mod controller;
pub mod coord;
pub mod filter;
pub mod frame;
pub mod index;
pub mod palette;
pub mod selection;
pub mod tiles;
pub mod trail;
pub mod viewport;

pub use config::GridConfig;
pub use coord::GridCoord;
pub use index::{CellRecord, Gender, GridIndex, SoundType};
