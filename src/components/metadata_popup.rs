use leptos::prelude::*;
use soundgrid_core::palette;
use soundgrid_core::CellRecord;
use crate::canvas::colors::css_hex;
use crate::state::AppState;

fn age_text(record: &CellRecord) -> String {
    record.age.map(|a| a.to_string()).unwrap_or_else(|| "Unknown".to_string())
}

/// Details of the selected clip, hanging above its cell.
#[component]
pub fn MetadataPopup() -> impl IntoView {
    let state = expect_context::<AppState>();

    move || {
        let record = state.selected.get()?;
        let anchor = state.popup.get()?;
        let type_color = css_hex(palette::sound_type_color(record.sound_type));
        let gender_color = css_hex(palette::gender_color(record.gender));
        let age_color = css_hex(palette::age_color(record.age));
        Some(view! {
            <div
                class="metadata-popup"
                style=format!(
                    "left: {:.1}px; top: {:.1}px; transform: translate(-50%, calc(-100% - 10px));",
                    anchor.left, anchor.top,
                )
            >
                <div class="popup-row">
                    <span class="popup-key">"ID"</span>
                    <span class="popup-value">{record.id.clone()}</span>
                </div>
                <div class="popup-row">
                    <span class="popup-key">"Type"</span>
                    <span class="popup-value" style=format!("color: {type_color};")>
                        {format!("{} {}", palette::sound_type_emoji(record.sound_type), record.sound_type.label())}
                    </span>
                </div>
                <div class="popup-row">
                    <span class="popup-key">"Gender"</span>
                    <span class="popup-value" style=format!("color: {gender_color};")>{record.gender.label()}</span>
                </div>
                <div class="popup-row">
                    <span class="popup-key">"Age"</span>
                    <span class="popup-value" style=format!("color: {age_color};")>{age_text(&record)}</span>
                </div>
            </div>
        })
    }
}
