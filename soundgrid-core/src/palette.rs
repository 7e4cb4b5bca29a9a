//! Colors for cells, overlays and highlight, plus the highlight's gamma remap.

use crate::filter::{age_range_for, AGE_RANGES};
use crate::index::{CellRecord, Gender, SoundType};

pub type Rgb = [u8; 3];

/// Canvas background and filtered-out cells.
pub const BACKGROUND: Rgb = [0xF4, 0xF3, 0xEF];
/// Base fill of the composite raster (unoccupied coordinates).
pub const COMPOSITE_BASE: Rgb = [0xFF, 0xFF, 0xFF];
pub const HIGHLIGHT_FILL: Rgb = [0xD7, 0xEC, 0xFF];
/// Highlight border without a color mode, and trail outlines.
pub const ACCENT: Rgb = [0x5D, 0xAD, 0xE2];
pub const HIGHLIGHT_OVERLAY: (Rgb, f64) = ([215, 236, 255], 0.4);
pub const AGE_FALLBACK: Rgb = [0xBD, 0xC3, 0xC7];
pub const TEXT_FALLBACK: Rgb = [0x55, 0x55, 0x55];

/// Alpha of the per-cell overlay tint (0x33).
pub const OVERLAY_ALPHA: f64 = 0x33 as f64 / 255.0;
/// How much overlay borders are darkened.
pub const BORDER_DARKEN: f64 = 0.3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    #[default]
    None,
    Age,
    Gender,
    SoundType,
}

impl ColorMode {
    pub const ALL: [ColorMode; 4] = [ColorMode::None, ColorMode::Age, ColorMode::Gender, ColorMode::SoundType];

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::None => "None",
            ColorMode::Age => "Age",
            ColorMode::Gender => "Gender",
            ColorMode::SoundType => "Sound Type",
        }
    }

    pub fn from_label(label: &str) -> Self {
        Self::ALL.into_iter().find(|m| m.label() == label).unwrap_or_default()
    }
}

pub fn sound_type_color(t: SoundType) -> Rgb {
    match t {
        SoundType::Sigh => [0x5D, 0xAD, 0xE2],
        SoundType::Throatclearing => [0xF5, 0xB0, 0x41],
        SoundType::Sniff => [0x48, 0xC9, 0xB0],
        SoundType::Laughter => [0xE8, 0x43, 0x93],
        SoundType::Sneeze => [0xE7, 0x4C, 0x3C],
        SoundType::Cough => [0x8E, 0x44, 0xAD],
    }
}

pub fn sound_type_emoji(t: SoundType) -> &'static str {
    match t {
        SoundType::Sigh => "🥱",
        SoundType::Throatclearing => "😤",
        SoundType::Sniff => "👃",
        SoundType::Laughter => "😂",
        SoundType::Sneeze => "🤧",
        SoundType::Cough => "😮‍💨",
    }
}

pub fn gender_color(g: Gender) -> Rgb {
    match g {
        Gender::Male => [0x34, 0x98, 0xDB],
        Gender::Female => [0xE8, 0x43, 0x93],
    }
}

/// Age band color; ages outside every band (or unknown) get the grey fallback.
pub fn age_color(age: Option<u32>) -> Rgb {
    match age.and_then(age_range_for).map(|r| r.min) {
        Some(18) => [0x2E, 0xCC, 0x71],
        Some(25) => [0xF1, 0xC4, 0x0F],
        Some(35) => [0xE6, 0x7E, 0x22],
        Some(45) => [0xE7, 0x4C, 0x3C],
        Some(55) | Some(65) => [0x9B, 0x59, 0xB6],
        _ => AGE_FALLBACK,
    }
}

/// Overlay tint for a record under `mode`, `None` when no overlay applies.
pub fn overlay_color(mode: ColorMode, record: &CellRecord) -> Option<Rgb> {
    match mode {
        ColorMode::None => None,
        ColorMode::Age => Some(age_color(record.age)),
        ColorMode::Gender => Some(gender_color(record.gender)),
        ColorMode::SoundType => Some(sound_type_color(record.sound_type)),
    }
}

pub fn darken(rgb: Rgb, amount: f64) -> Rgb {
    let k = (1.0 - amount).clamp(0.0, 1.0);
    rgb.map(|c| (c as f64 * k).round() as u8)
}

/// Legend rows for a color mode.
pub fn legend(mode: ColorMode) -> Vec<(String, Rgb)> {
    match mode {
        ColorMode::None => Vec::new(),
        ColorMode::Age => AGE_RANGES
            .iter()
            .map(|r| (r.label.to_string(), age_color(Some(r.min))))
            .collect(),
        ColorMode::Gender => Gender::ALL
            .iter()
            .map(|&g| (g.label().to_string(), gender_color(g)))
            .collect(),
        ColorMode::SoundType => SoundType::ALL
            .iter()
            .map(|&t| (t.label().to_string(), sound_type_color(t)))
            .collect(),
    }
}

pub fn hex(rgb: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Darken RGBA pixels in place by remapping luminance through a power curve:
/// `new = 255 * (old / 255)^gamma`, scaling R, G and B by the same ratio so
/// hue is kept. Black pixels and alpha are untouched.
pub fn gamma_darken(pixels: &mut [u8], gamma: f64) {
    for px in pixels.chunks_exact_mut(4) {
        let (r, g, b) = (px[0] as f64, px[1] as f64, px[2] as f64);
        let br = 0.299 * r + 0.587 * g + 0.114 * b;
        if br <= 0.0 {
            continue;
        }
        let new_br = 255.0 * (br / 255.0).powf(gamma);
        let ratio = new_br / br;
        px[0] = (r * ratio).clamp(0.0, 255.0) as u8;
        px[1] = (g * ratio).clamp(0.0, 255.0) as u8;
        px[2] = (b * ratio).clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_colors_follow_bands() {
        assert_eq!(age_color(Some(18)), [0x2E, 0xCC, 0x71]);
        assert_eq!(age_color(Some(44)), [0xE6, 0x7E, 0x22]);
        assert_eq!(age_color(Some(70)), [0x9B, 0x59, 0xB6]);
        assert_eq!(age_color(Some(12)), AGE_FALLBACK);
        assert_eq!(age_color(None), AGE_FALLBACK);
    }

    #[test]
    fn test_darken() {
        assert_eq!(darken([100, 200, 0], 0.3), [70, 140, 0]);
        assert_eq!(darken([255, 255, 255], 0.0), [255, 255, 255]);
        assert_eq!(darken([255, 255, 255], 2.0), [0, 0, 0]);
    }

    #[test]
    fn test_gamma_darken_keeps_extremes_and_alpha() {
        let mut px = vec![0, 0, 0, 255, 255, 255, 255, 128, 128, 128, 128, 200];
        gamma_darken(&mut px, 4.0);
        assert_eq!(&px[0..4], &[0, 0, 0, 255]);
        assert_eq!(&px[4..8], &[255, 255, 255, 128]);
        // mid grey drops to roughly 255 * 0.5^4
        assert!(px[8] >= 15 && px[8] <= 17, "{}", px[8]);
        assert_eq!(px[8], px[9]);
        assert_eq!(px[11], 200);
    }

    #[test]
    fn test_gamma_darken_preserves_hue_ratio() {
        let mut px = vec![200, 100, 50, 255];
        gamma_darken(&mut px, 4.0);
        let ratio = px[0] as f64 / px[1] as f64;
        assert!((ratio - 2.0).abs() < 0.2, "{ratio}");
    }

    #[test]
    fn test_overlay_and_legend() {
        let r = CellRecord {
            id: "a".into(),
            sound_type: SoundType::Cough,
            gender: Gender::Female,
            age: Some(50),
            file_key: "a".into(),
        };
        assert_eq!(overlay_color(ColorMode::None, &r), None);
        assert_eq!(overlay_color(ColorMode::SoundType, &r), Some([0x8E, 0x44, 0xAD]));
        assert_eq!(overlay_color(ColorMode::Gender, &r), Some([0xE8, 0x43, 0x93]));
        assert_eq!(legend(ColorMode::Age).len(), 6);
        assert!(legend(ColorMode::None).is_empty());
        assert_eq!(ColorMode::from_label("Sound Type"), ColorMode::SoundType);
        assert_eq!(ColorMode::from_label("bogus"), ColorMode::None);
        assert_eq!(hex([0x5D, 0xAD, 0xE2]), "#5DADE2");
    }
}
