//! Tunables for the grid explorer.
//!
//! Every field has a default, so a config document only needs to list the
//! values it overrides.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grid_size must be at least 1")]
    EmptyGrid,
    #[error("cell_size must be at least 1")]
    ZeroCellSize,
    #[error("scale range {min}..{max} is invalid")]
    ScaleRange { min: f64, max: f64 },
    #[error("initial_scale {0} lies outside the scale range")]
    InitialScale(f64),
    #[error("{name} must be greater than 1 (got {value})")]
    ZoomFactor { name: &'static str, value: f64 },
    #[error("center_smoothing must be in (0, 1] (got {0})")]
    Smoothing(f64),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per side (N).
    pub grid_size: u32,
    /// Pixel size of one cell in grid space.
    pub cell_size: u32,
    pub initial_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Per-tick factor while a zoom button is held.
    pub zoom_factor: f64,
    /// Per-notch factor for the mouse wheel.
    pub wheel_zoom_factor: f64,
    /// Fraction of the remaining distance covered per smooth-centering step.
    pub center_smoothing: f64,
    pub smooth_center_delay_ms: u32,
    pub zoom_repeat_ms: u32,
    pub min_play_interval_ms: f64,
    pub trail_fade_ms: f64,
    /// Distance from a canvas edge (px) inside which a held pointer pans.
    pub pan_edge_threshold: f64,
    pub pan_speed: f64,
    /// Highlight edge length as a multiple of `cell_size`.
    pub highlight_factor: f64,
    pub highlight_gamma: f64,
    pub image_dir: String,
    pub audio_dir: String,
    pub index_url: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: 144,
            cell_size: 8,
            initial_scale: 2.0,
            min_scale: 0.5,
            max_scale: 8.0,
            zoom_factor: 1.02,
            wheel_zoom_factor: 1.05,
            center_smoothing: 0.08,
            smooth_center_delay_ms: 16,
            zoom_repeat_ms: 10,
            min_play_interval_ms: 125.0,
            trail_fade_ms: 600.0,
            pan_edge_threshold: 100.0,
            pan_speed: 0.04,
            highlight_factor: 8.0,
            highlight_gamma: 4.0,
            image_dir: "sparse_spectrograms".to_string(),
            audio_dir: "audio_processed".to_string(),
            index_url: "grid_index.json".to_string(),
        }
    }
}

impl GridConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(ConfigError::ScaleRange { min: self.min_scale, max: self.max_scale });
        }
        if !(self.min_scale..=self.max_scale).contains(&self.initial_scale) {
            return Err(ConfigError::InitialScale(self.initial_scale));
        }
        for (name, value) in [
            ("zoom_factor", self.zoom_factor),
            ("wheel_zoom_factor", self.wheel_zoom_factor),
        ] {
            if !(value > 1.0) {
                return Err(ConfigError::ZoomFactor { name, value });
            }
        }
        if !(self.center_smoothing > 0.0 && self.center_smoothing <= 1.0) {
            return Err(ConfigError::Smoothing(self.center_smoothing));
        }
        Ok(())
    }

    /// Edge length of the full composite raster in pixels.
    pub fn canvas_draw_size(&self) -> u32 {
        self.grid_size * self.cell_size
    }

    pub fn highlight_size(&self) -> f64 {
        self.cell_size as f64 * self.highlight_factor
    }

    /// Screen pixels travelled per frame while edge-panning.
    pub fn pan_step_px(&self) -> f64 {
        self.pan_speed * 100.0
    }

    pub fn image_path(&self, file_key: &str) -> String {
        format!("{}/{}.png", self.image_dir, file_key)
    }

    pub fn audio_path(&self, file_key: &str) -> String {
        format!("{}/{}.wav", self.audio_dir, file_key)
    }
}
