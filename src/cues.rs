//! Speech and audio capabilities the session calls into.
//!
//! The session never waits on either: calls are fire-and-forget and reward
//! timing uses fixed durations. Each session owns its own instances, so
//! there is no process-wide "currently playing" state.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::i18n::Language;
use crate::round::ItemKind;

/// Text-to-speech.
pub trait Speaker {
    fn speak(&mut self, text: &str, language: Language);
    /// Cancels queued and in-flight utterances.
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Cue {
    /// Siren, horn or engine sound for the round's pictogram.
    Reward(ItemKind),
    /// Played when the letter colouring is done.
    SuccessJingle,
}

pub trait AudioCuePlayer {
    fn play(&mut self, cue: Cue);
    fn stop_all(&mut self);
}

/// Something a [`CueLog`] recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueRecord {
    Spoken { text: String, language: Language },
    SpeechStopped,
    Played(Cue),
    AudioStopped,
}

/// Recording implementation of both capabilities.
///
/// Clones share the same log, so a test (or the terminal front end, which
/// shows speech as captions) can keep one handle and give the other to a
/// session.
#[derive(Debug, Clone, Default)]
pub struct CueLog {
    records: Rc<RefCell<Vec<CueRecord>>>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CueRecord> {
        self.records.borrow().clone()
    }

    pub fn take(&self) -> Vec<CueRecord> {
        std::mem::take(&mut *self.records.borrow_mut())
    }

    pub fn spoken(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter_map(|record| match record {
                CueRecord::Spoken { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn played(&self) -> Vec<Cue> {
        self.records
            .borrow()
            .iter()
            .filter_map(|record| match record {
                CueRecord::Played(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub fn last_spoken(&self) -> Option<String> {
        self.spoken().pop()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }

    fn push(&self, record: CueRecord) {
        self.records.borrow_mut().push(record);
    }
}

impl Speaker for CueLog {
    fn speak(&mut self, text: &str, language: Language) {
        self.push(CueRecord::Spoken {
            text: text.to_string(),
            language,
        });
    }

    fn stop(&mut self) {
        self.push(CueRecord::SpeechStopped);
    }
}

impl AudioCuePlayer for CueLog {
    fn play(&mut self, cue: Cue) {
        self.push(CueRecord::Played(cue));
    }

    fn stop_all(&mut self) {
        self.push(CueRecord::AudioStopped);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Speaker for Silent {
    fn speak(&mut self, _text: &str, _language: Language) {}
    fn stop(&mut self) {}
}

impl AudioCuePlayer for Silent {
    fn play(&mut self, _cue: Cue) {}
    fn stop_all(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_log() {
        let log = CueLog::new();
        let mut speaker = log.clone();
        let mut audio = log.clone();

        speaker.speak("trois", Language::Fr);
        audio.play(Cue::Reward(ItemKind::Boat));
        audio.stop_all();

        assert_eq!(log.spoken(), vec!["trois".to_string()]);
        assert_eq!(log.played(), vec![Cue::Reward(ItemKind::Boat)]);
        assert_eq!(log.records().last(), Some(&CueRecord::AudioStopped));
    }

    #[test]
    fn take_empties_the_log() {
        let log = CueLog::new();
        let mut speaker = log.clone();
        speaker.speak("A", Language::En);
        assert_eq!(log.take().len(), 1);
        assert!(log.records().is_empty());
        assert_eq!(log.last_spoken(), None);
    }

    #[test]
    fn cue_labels() {
        assert_eq!(Cue::SuccessJingle.to_string(), "successJingle");
    }
}
