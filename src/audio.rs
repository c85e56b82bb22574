//! Background music using an HTML audio element
//!
//! One looping track per game. Music starts when a round starts and is
//! stopped and rewound on reset, driven by the session's `GameEvent`s.

use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use crate::config::AudioSettings;
use crate::sim::GameEvent;

/// Looping music track (silent when no track was supplied)
pub struct MusicPlayer {
    element: Option<HtmlAudioElement>,
    settings: AudioSettings,
}

impl MusicPlayer {
    pub fn new(uri: Option<&str>, settings: AudioSettings) -> Self {
        let element = uri.and_then(|src| match HtmlAudioElement::new_with_src(src) {
            Ok(el) => {
                el.set_loop(true);
                el.set_volume(settings.effective_volume() as f64);
                Some(el)
            }
            Err(e) => {
                log::warn!("Failed to create audio element: {:?}", e);
                None
            }
        });
        if element.is_none() {
            log::info!("No music track, playing silently");
        }
        Self { element, settings }
    }

    /// Start playback (the browser may refuse until a user gesture)
    pub fn play(&self) {
        let Some(el) = &self.element else {
            return;
        };
        if self.settings.muted {
            return;
        }
        match el.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("Music playback rejected: {:?}", e);
                }
            }),
            Err(e) => log::warn!("Music playback failed: {:?}", e),
        }
    }

    /// Pause and rewind to the beginning
    pub fn stop(&self) {
        if let Some(el) = &self.element {
            let _ = el.pause();
            el.set_current_time(0.0);
        }
    }

    pub fn muted(&self) -> bool {
        self.settings.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        if let Some(el) = &self.element {
            el.set_volume(self.settings.effective_volume() as f64);
        }
        if muted {
            self.stop();
        }
    }

    /// React to the music events of a tick or command
    pub fn handle_events(&self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::MusicStart => self.play(),
                GameEvent::MusicStop => self.stop(),
                _ => {}
            }
        }
    }
}
