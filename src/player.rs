// src/player.rs
// Plays a single announcement: sound cue first, then the spoken message once
// the cue has had time to land.
//
// The speech and sound capabilities are injected, so the player works the
// same with a real TTS program, a console printer or a test double.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::announcement::{Announcement, SoundKey};

// ============================================================================
// Capability seams
// ============================================================================

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech capability unavailable")]
    Unavailable,

    #[error("speech engine failed: {0}")]
    Engine(String),

    #[error("speech cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("sound playback failed: {0}")]
    Playback(String),
}

/// A voice offered by the speech capability
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 style tag, e.g. `en-IN`
    pub language: String,
}

impl Voice {
    pub fn new(name: &str, language: &str) -> Self {
        Voice { name: name.to_string(), language: language.to_string() }
    }
}

/// What gets handed to the speech engine
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub voice: Option<Voice>,
    pub rate: f32,
}

/// Platform speech synthesis. `speak` resolves when the utterance is done.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    fn is_available(&self) -> bool;

    fn voices(&self) -> Vec<Voice>;

    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError>;

    /// Stop whatever is being spoken right now.
    fn cancel(&self);
}

/// Platform audio clips. `play` starts a clip and returns without waiting.
pub trait SoundEffects: Send + Sync {
    fn play(&self, sound: SoundKey) -> Result<(), SoundError>;

    fn stop_all(&self);
}

// ============================================================================
// Settings
// ============================================================================

/// Time between starting a sound cue and starting speech
#[derive(Debug, Clone, PartialEq)]
pub struct SoundDelays {
    pub win: Duration,
    pub jackpot: Duration,
    pub fanfare: Duration,
    pub applause: Duration,
}

impl Default for SoundDelays {
    fn default() -> Self {
        SoundDelays {
            win: Duration::from_millis(600),
            jackpot: Duration::from_millis(1500),
            fanfare: Duration::from_millis(1000),
            applause: Duration::from_millis(1200),
        }
    }
}

impl SoundDelays {
    pub fn for_sound(&self, sound: Option<SoundKey>) -> Duration {
        match sound {
            Some(SoundKey::Win) => self.win,
            Some(SoundKey::Jackpot) => self.jackpot,
            Some(SoundKey::Fanfare) => self.fanfare,
            Some(SoundKey::Applause) => self.applause,
            None => Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub language: String,
    pub preferred_voice: Option<String>,
    pub rate: f32,
    pub sound_delays: SoundDelays,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        PlayerSettings {
            language: "en-IN".to_string(),
            preferred_voice: None,
            rate: 1.0,
            sound_delays: SoundDelays::default(),
        }
    }
}

// ============================================================================
// Voice selection
// ============================================================================

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

fn primary_subtag(tag: &str) -> String {
    normalize_tag(tag).split('-').next().unwrap_or_default().to_string()
}

/// Pick a voice for `language`.
///
/// Preference order: the voice named `preferred`, an exact language tag
/// match, a voice sharing the primary language subtag, the first voice.
pub fn select_voice<'a>(voices: &'a [Voice], language: &str, preferred: Option<&str>) -> Option<&'a Voice> {
    if let Some(name) = preferred {
        if let Some(voice) = voices.iter().find(|v| v.name.eq_ignore_ascii_case(name)) {
            return Some(voice);
        }
    }

    let wanted = normalize_tag(language);
    let wanted_primary = primary_subtag(language);
    voices
        .iter()
        .find(|v| normalize_tag(&v.language) == wanted)
        .or_else(|| voices.iter().find(|v| primary_subtag(&v.language) == wanted_primary))
        .or_else(|| voices.first())
}

// ============================================================================
// Player
// ============================================================================

pub struct AnnouncementPlayer {
    speech: Arc<dyn SpeechEngine>,
    sounds: Arc<dyn SoundEffects>,
    settings: PlayerSettings,
    muted: AtomicBool,
}

impl AnnouncementPlayer {
    pub fn new(speech: Arc<dyn SpeechEngine>, sounds: Arc<dyn SoundEffects>, settings: PlayerSettings) -> Self {
        AnnouncementPlayer {
            speech,
            sounds,
            settings,
            muted: AtomicBool::new(false),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    /// Stop in-flight speech and sounds immediately.
    pub fn cancel(&self) {
        self.speech.cancel();
        self.sounds.stop_all();
    }

    /// Play one announcement to completion. Never fails: speech errors are
    /// logged and count as done so the queue keeps moving.
    pub async fn play(&self, announcement: &Announcement) {
        if self.is_muted() {
            return;
        }

        if let Some(sound) = announcement.sound() {
            if let Err(e) = self.sounds.play(sound) {
                log::warn!("Sound '{sound}' failed: {e}");
            }
        }

        if !self.speech.is_available() {
            log::debug!("Speech unavailable, sound only for: {}", announcement.message());
            return;
        }

        let delay = self.settings.sound_delays.for_sound(announcement.sound());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.is_muted() {
            return;
        }

        let voices = self.speech.voices();
        let voice = select_voice(&voices, &self.settings.language, self.settings.preferred_voice.as_deref()).cloned();
        let utterance = Utterance {
            text: announcement.message().to_string(),
            language: self.settings.language.clone(),
            voice,
            rate: self.settings.rate,
        };

        match self.speech.speak(utterance).await {
            Ok(()) => {}
            Err(SpeechError::Cancelled) => log::debug!("Speech cancelled: {}", announcement.message()),
            Err(e) => log::warn!("Speech failed, skipping: {e}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_doubles {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Records every utterance and takes `pace` to "speak" each one.
    pub struct RecordingSpeech {
        pub spoken: Mutex<Vec<Utterance>>,
        pub cancels: Mutex<usize>,
        pub available: bool,
        pub fail: bool,
        pub pace: Duration,
        pub voices: Vec<Voice>,
        pub max_active: AtomicUsize,
        active: AtomicUsize,
        cancel: tokio::sync::Notify,
    }

    impl RecordingSpeech {
        pub fn new(pace: Duration) -> Self {
            RecordingSpeech {
                spoken: Mutex::new(Vec::new()),
                cancels: Mutex::new(0),
                available: true,
                fail: false,
                pace,
                voices: vec![Voice::new("Alex", "en-US"), Voice::new("Veena", "en-IN")],
                max_active: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                cancel: tokio::sync::Notify::new(),
            }
        }

        pub fn texts(&self) -> Vec<String> {
            self.spoken.lock().unwrap().iter().map(|u| u.text.clone()).collect()
        }
    }

    #[async_trait]
    impl SpeechEngine for RecordingSpeech {
        fn is_available(&self) -> bool {
            self.available
        }

        fn voices(&self) -> Vec<Voice> {
            self.voices.clone()
        }

        async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
            let cancelled = self.cancel.notified();
            self.spoken.lock().unwrap().push(utterance);
            if self.fail {
                return Err(SpeechError::Engine("synthesizer crashed".to_string()));
            }
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);
            let result = tokio::select! {
                _ = tokio::time::sleep(self.pace) => Ok(()),
                _ = cancelled => Err(SpeechError::Cancelled),
            };
            self.active.fetch_sub(1, Ordering::SeqCst);
            result
        }

        fn cancel(&self) {
            *self.cancels.lock().unwrap() += 1;
            self.cancel.notify_waiters();
        }
    }

    #[derive(Default)]
    pub struct RecordingSounds {
        pub played: Mutex<Vec<SoundKey>>,
        pub stops: Mutex<usize>,
        pub fail: bool,
    }

    impl SoundEffects for RecordingSounds {
        fn play(&self, sound: SoundKey) -> Result<(), SoundError> {
            self.played.lock().unwrap().push(sound);
            if self.fail {
                return Err(SoundError::Playback("no audio device".to_string()));
            }
            Ok(())
        }

        fn stop_all(&self) {
            *self.stops.lock().unwrap() += 1;
        }
    }
}
