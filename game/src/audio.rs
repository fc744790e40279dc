use std::time::Duration;

use engine::collab::AudioNotifier;
use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::sfx::{MENU_CLICK_DURATION_MS, MENU_CLICK_FREQ_HZ, MENU_CLICK_SFX_VOLUME};

/// Rodio-backed menu click notifier.
///
/// Construction fails when no audio device is available; callers fall back
/// to [`engine::collab::SilentAudio`] in that case, so sound is strictly
/// optional.
pub struct RodioAudio {
    // Dropping the stream kills playback; keep it alive with the handle.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    gain: f32,
}

impl RodioAudio {
    pub fn new(gain: f32) -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Self {
                _stream: stream,
                handle,
                gain: gain.clamp(0.0, 1.0),
            }),
            Err(err) => {
                log::warn!("no audio output available ({err}); running silent");
                None
            }
        }
    }
}

impl AudioNotifier for RodioAudio {
    fn on_menu_click(&mut self) {
        let Ok(sink) = Sink::try_new(&self.handle) else {
            return;
        };
        let blip = SineWave::new(MENU_CLICK_FREQ_HZ)
            .take_duration(Duration::from_millis(MENU_CLICK_DURATION_MS))
            .amplify(MENU_CLICK_SFX_VOLUME * self.gain);
        sink.append(blip);
        sink.detach();
    }
}
