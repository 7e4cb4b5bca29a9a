use soundgrid_core::palette::{self, Rgb};

/// CSS `rgb()` string for a canvas fill/stroke style.
pub fn css_rgb(c: Rgb) -> String {
    format!("rgb({},{},{})", c[0], c[1], c[2])
}

pub fn css_rgba(c: Rgb, alpha: f64) -> String {
    format!("rgba({},{},{},{})", c[0], c[1], c[2], alpha.clamp(0.0, 1.0))
}

/// Text color for a value in the metadata popup and filter chips.
pub fn css_hex(c: Rgb) -> String {
    palette::hex(c)
}

/// Chip color for a filter name: its sound type, gender or age band color.
pub fn filter_chip_color(name: &str) -> Rgb {
    use soundgrid_core::filter::{AGE_PREFIX, AGE_RANGES};
    use soundgrid_core::{Gender, SoundType};

    if let Ok(t) = name.parse::<SoundType>() {
        return palette::sound_type_color(t);
    }
    if let Some(g) = Gender::ALL.into_iter().find(|g| g.label() == name) {
        return palette::gender_color(g);
    }
    let label = name.strip_prefix(AGE_PREFIX).unwrap_or(name);
    AGE_RANGES
        .iter()
        .find(|r| r.label == label)
        .map(|r| palette::age_color(Some(r.min)))
        .unwrap_or(palette::TEXT_FALLBACK)
}
