// src/speech.rs
// Concrete speech and sound capabilities for the terminal announcer.
//
// - CommandSpeech: hands each utterance to an external TTS program (espeak-ng, say, ...)
// - ConsoleSpeech: prints the utterance and waits roughly as long as saying it would take
// - SilentSpeech: a platform without speech
// - TerminalBell / SilentSounds: sound cues

use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Notify;

use crate::announcement::SoundKey;
use crate::defs::Colors;
use crate::player::{SoundEffects, SoundError, SpeechEngine, SpeechError, Utterance, Voice};
use crate::terminal;

// ============================================================================
// External TTS program
// ============================================================================

/// Runs `program args... text` per utterance. `{voice}`, `{lang}` and
/// `{rate}` in the arguments are substituted before spawning.
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
    voices: Vec<Voice>,
    available: bool,
    cancel: Notify,
}

/// Whether `program` resolves to a file, directly or through `PATH`.
pub fn program_on_path(program: &str) -> bool {
    if program.is_empty() {
        return false;
    }
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(program).is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

impl CommandSpeech {
    pub fn new(program: &str, args: Vec<String>, voices: Vec<Voice>) -> Self {
        let available = program_on_path(program);
        if !available {
            log::warn!("Speech program '{program}' not found, announcements will be sound only");
        }
        CommandSpeech {
            program: program.to_string(),
            args,
            voices,
            available,
            cancel: Notify::new(),
        }
    }

    fn expand_args(&self, utterance: &Utterance) -> Vec<String> {
        let voice = utterance
            .voice
            .as_ref()
            .map(|v| v.name.clone())
            .unwrap_or_else(|| utterance.language.clone());
        let rate = format!("{}", (175.0 * utterance.rate).round() as u32);
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{voice}", &voice)
                    .replace("{lang}", &utterance.language)
                    .replace("{rate}", &rate)
            })
            .collect();
        args.push(utterance.text.clone());
        args
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::Unavailable);
        }
        let cancelled = self.cancel.notified();

        let mut child = Command::new(&self.program)
            .args(self.expand_args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Engine(format!("failed to start '{}': {e}", self.program)))?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| SpeechError::Engine(e.to_string()))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(SpeechError::Engine(format!("'{}' exited with {status}", self.program)))
                }
            }
            _ = cancelled => {
                let _ = child.start_kill();
                Err(SpeechError::Cancelled)
            }
        }
    }

    fn cancel(&self) {
        self.cancel.notify_waiters();
    }
}

// ============================================================================
// Console speech
// ============================================================================

/// Prints utterances. Waits `per_word` for every word so pacing feels spoken.
pub struct ConsoleSpeech {
    per_word: Duration,
    cancel: Notify,
}

impl ConsoleSpeech {
    pub fn new(per_word: Duration) -> Self {
        ConsoleSpeech { per_word, cancel: Notify::new() }
    }

    fn speaking_time(&self, text: &str) -> Duration {
        let words = text.split_whitespace().count() as u32;
        self.per_word * words
    }
}

impl Default for ConsoleSpeech {
    fn default() -> Self {
        Self::new(Duration::from_millis(350))
    }
}

#[async_trait]
impl SpeechEngine for ConsoleSpeech {
    fn is_available(&self) -> bool {
        true
    }

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        let cancelled = self.cancel.notified();
        terminal::emit(&format!("🗣️  {}{}{}", Colors::green(), utterance.text, Colors::reset()));
        tokio::select! {
            _ = tokio::time::sleep(self.speaking_time(&utterance.text)) => Ok(()),
            _ = cancelled => Err(SpeechError::Cancelled),
        }
    }

    fn cancel(&self) {
        self.cancel.notify_waiters();
    }
}

/// A runtime with no speech capability at all
pub struct SilentSpeech;

#[async_trait]
impl SpeechEngine for SilentSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    async fn speak(&self, _utterance: Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn cancel(&self) {}
}

// ============================================================================
// Sound cues
// ============================================================================

/// Rings the terminal bell and prints the cue name
pub struct TerminalBell;

impl SoundEffects for TerminalBell {
    fn play(&self, sound: SoundKey) -> Result<(), SoundError> {
        let rings = match sound {
            SoundKey::Win => 1,
            SoundKey::Fanfare => 2,
            SoundKey::Applause => 2,
            SoundKey::Jackpot => 3,
        };
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{}{}\r\n", "\x07".repeat(rings), format_cue(sound))
            .and_then(|_| stdout.flush())
            .map_err(|e| SoundError::Playback(e.to_string()))
    }

    fn stop_all(&self) {}
}

fn format_cue(sound: SoundKey) -> String {
    format!("{}♪ {}{}", Colors::magenta(), sound.as_str().to_uppercase(), Colors::reset())
}

pub struct SilentSounds;

impl SoundEffects for SilentSounds {
    fn play(&self, _sound: SoundKey) -> Result<(), SoundError> {
        Ok(())
    }

    fn stop_all(&self) {}
}
