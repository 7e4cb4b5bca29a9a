use web_sys::HtmlAudioElement;

/// Fire-and-forget clip playback. Rejections (autoplay policy, missing
/// file) are swallowed.
pub fn play(path: &str) {
    let audio = match HtmlAudioElement::new_with_src(path) {
        Ok(a) => a,
        Err(e) => {
            log::error!("Failed to create audio element for {path}: {e:?}");
            return;
        }
    };
    let Ok(promise) = audio.play() else { return };
    wasm_bindgen_futures::spawn_local(async move {
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    });
}
