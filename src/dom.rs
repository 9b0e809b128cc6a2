//! Browser-side effect implementations: audio cue playback and the
//! rower figure's highlight classes.

use log::warn;
use stroke_tempo::scheduler::{Cue, StrokeEffects, StrokePhase};
use wasm_bindgen::JsValue;
use web_sys::HtmlAudioElement;

use crate::config::{CATCH_CUE_SRC, COUNTDOWN_CUE_SRC, RECOVER_CUE_SRC, ROWER_ID};

/// Plays cues through `HtmlAudioElement`s and toggles highlight classes
/// on the rower figure. A cue whose element could not be created is
/// skipped; the cycle itself keeps running.
pub struct DomStrokeEffects {
    countdown: Option<HtmlAudioElement>,
    catch: Option<HtmlAudioElement>,
    recover: Option<HtmlAudioElement>,
}

impl DomStrokeEffects {
    pub fn new() -> Self {
        Self {
            countdown: load_cue(COUNTDOWN_CUE_SRC),
            catch: load_cue(CATCH_CUE_SRC),
            recover: load_cue(RECOVER_CUE_SRC),
        }
    }

    fn audio_for(&self, cue: Cue) -> Option<&HtmlAudioElement> {
        match cue {
            Cue::Countdown => self.countdown.as_ref(),
            Cue::Catch => self.catch.as_ref(),
            Cue::Recover => self.recover.as_ref(),
        }
    }
}

fn load_cue(src: &str) -> Option<HtmlAudioElement> {
    let created: Result<HtmlAudioElement, JsValue> = HtmlAudioElement::new_with_src(src);
    match created {
        Ok(audio) => Some(audio),
        Err(err) => {
            warn!("audio cue {src} unavailable: {err:?}");
            None
        }
    }
}

fn phase_class(phase: StrokePhase) -> &'static str {
    match phase {
        StrokePhase::Catch => "catch",
        StrokePhase::Finish => "finish",
    }
}

impl StrokeEffects for DomStrokeEffects {
    fn play_cue(&self, cue: Cue) {
        if let Some(audio) = self.audio_for(cue) {
            audio.set_current_time(0.0);
            let _ = audio.play();
        }
    }

    fn halt_cues(&self) {
        for audio in [&self.countdown, &self.catch, &self.recover]
            .into_iter()
            .flatten()
        {
            let _ = audio.pause();
        }
    }

    fn set_phase(&self, phase: Option<StrokePhase>) {
        let Some(figure) = gloo_utils::document().get_element_by_id(ROWER_ID) else {
            return;
        };
        let classes = figure.class_list();
        let _ = classes.remove_2("catch", "finish");
        if let Some(phase) = phase {
            let _ = classes.add_1(phase_class(phase));
        }
    }
}
