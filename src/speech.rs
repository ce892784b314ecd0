//! Best-effort spoken rendering of quiz words.
//!
//! The [`Speaker`] owns the voice choice and talks to a [`SpeechBackend`].
//! Every failure path degrades to silence: no backend, no voices, or a
//! synthesiser that fails to launch all leave the quiz usable.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};

use crate::error::SpeechError;

/// Regional variant preferred when choosing a voice.
pub const PREFERRED_LOCALE: &str = "en-GB";
/// Language tag used when no voice could be chosen.
pub const FALLBACK_LANG: &str = "en-GB";
/// Slightly slower than the synthesiser default, to help spelling.
pub const SPEECH_RATE: f32 = 0.95;
pub const SPEECH_PITCH: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Multiplier over the backend's default rate.
    pub rate: f32,
    /// Multiplier over the backend's default pitch.
    pub pitch: f32,
    pub lang: String,
    pub voice: Option<Voice>,
}

pub trait SpeechBackend: Send {
    fn voices(&self) -> Vec<Voice>;
    /// Start speaking without waiting for playback to finish.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;
    /// Stop whatever is currently being spoken. No-op when silent.
    fn cancel(&mut self);
}

/// Voice selection: the preferred regional locale, then any English voice,
/// then whatever is available.
pub fn pick_voice(voices: &[Voice]) -> Option<Voice> {
    let preferred = PREFERRED_LOCALE.to_ascii_lowercase();
    voices
        .iter()
        .find(|v| v.lang.to_ascii_lowercase().contains(&preferred))
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.lang.to_ascii_lowercase().starts_with("en"))
        })
        .or_else(|| voices.first())
        .cloned()
}

pub struct Speaker {
    backend: Option<Box<dyn SpeechBackend>>,
    voice: Option<Voice>,
}

impl Speaker {
    pub fn new(backend: Box<dyn SpeechBackend>) -> Self {
        let mut speaker = Self {
            backend: Some(backend),
            voice: None,
        };
        speaker.refresh_voices();
        speaker
    }

    /// A speaker with no speech capability. `speak` always returns false.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            voice: None,
        }
    }

    /// Use a synthesiser found on `PATH`, or fall back to [`Speaker::disabled`].
    pub fn detect() -> Self {
        match CommandSpeech::detect() {
            Some(backend) => {
                tracing::info!("speech synthesiser: {}", backend.program.display());
                Self::new(Box::new(backend))
            }
            None => {
                tracing::warn!("no speech synthesiser found; words will not be spoken");
                Self::disabled()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    /// Re-run voice selection. Call whenever the backend's voice set changes.
    pub fn refresh_voices(&mut self) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        self.voice = pick_voice(&backend.voices());
        match &self.voice {
            Some(v) => tracing::debug!("selected voice {} ({})", v.name, v.lang),
            None => tracing::debug!("no voices available"),
        }
    }

    /// Speak `text`, interrupting anything already playing.
    ///
    /// Returns false only when there is no speech capability at all; a
    /// backend failure still counts as an attempt.
    pub fn speak(&mut self, text: &str) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };

        backend.cancel();
        let utterance = Utterance {
            text: text.to_string(),
            rate: SPEECH_RATE,
            pitch: SPEECH_PITCH,
            lang: self
                .voice
                .as_ref()
                .map_or_else(|| FALLBACK_LANG.to_string(), |v| v.lang.clone()),
            voice: self.voice.clone(),
        };
        if let Err(e) = backend.speak(&utterance) {
            tracing::warn!("speech failed: {e}");
        }
        true
    }

    pub fn cancel(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.cancel();
        }
    }
}

impl std::fmt::Debug for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speaker")
            .field("available", &self.is_available())
            .field("voice", &self.voice)
            .finish()
    }
}

const SYNTHESISERS: [&str; 2] = ["espeak-ng", "espeak"];
/// espeak's default speaking rate in words per minute.
const BASE_WPM: f32 = 175.0;
/// espeak's default pitch on its 0-99 scale.
const BASE_PITCH: f32 = 50.0;

/// Speech through an external espeak-compatible process.
#[derive(Debug)]
pub struct CommandSpeech {
    program: PathBuf,
    child: Option<Child>,
}

impl CommandSpeech {
    pub fn with_program<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            child: None,
        }
    }

    pub fn detect() -> Option<Self> {
        let path = env::var_os("PATH")?;
        SYNTHESISERS.iter().find_map(|name| {
            env::split_paths(&path)
                .map(|dir| dir.join(name))
                .find(|candidate| candidate.is_file())
                .map(Self::with_program)
        })
    }

    fn args_for(utterance: &Utterance) -> Vec<String> {
        let lang = utterance
            .voice
            .as_ref()
            .map_or(utterance.lang.as_str(), |v| v.lang.as_str());
        vec![
            "-s".into(),
            ((BASE_WPM * utterance.rate).round() as u32).to_string(),
            "-p".into(),
            ((BASE_PITCH * utterance.pitch).round() as u32).min(99).to_string(),
            "-v".into(),
            lang.to_ascii_lowercase(),
            "--".into(),
            utterance.text.clone(),
        ]
    }
}

/// Parse the table printed by `espeak --voices`:
/// `Pty Language Age/Gender VoiceName File Other Languages`.
pub fn parse_voice_table(table: &str) -> Vec<Voice> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _priority = cols.next()?;
            let lang = cols.next()?;
            let _age_gender = cols.next()?;
            let name = cols.next()?;
            Some(Voice::new(name, lang))
        })
        .collect()
}

impl SpeechBackend for CommandSpeech {
    fn voices(&self) -> Vec<Voice> {
        match Command::new(&self.program)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()
        {
            Ok(out) if out.status.success() => {
                parse_voice_table(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                tracing::warn!("listing voices exited with {}", out.status);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("listing voices failed: {e}");
                Vec::new()
            }
        }
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        let child = Command::new(&self.program)
            .args(Self::args_for(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            // Already exited is fine.
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    voices: Vec<Voice>,
    spoken: Vec<Utterance>,
    cancels: usize,
}

/// In-memory backend that records utterances. Clones share state, so a
/// test can keep one handle while the [`Speaker`] owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySpeech {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySpeech {
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let speech = Self::default();
        speech.set_voices(voices);
        speech
    }

    pub fn set_voices(&self, voices: Vec<Voice>) {
        if let Ok(mut state) = self.state.lock() {
            state.voices = voices;
        }
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.state
            .lock()
            .map(|s| s.spoken.clone())
            .unwrap_or_default()
    }

    pub fn spoken_words(&self) -> Vec<String> {
        self.spoken().into_iter().map(|u| u.text).collect()
    }

    pub fn cancels(&self) -> usize {
        self.state.lock().map(|s| s.cancels).unwrap_or_default()
    }
}

impl SpeechBackend for MemorySpeech {
    fn voices(&self) -> Vec<Voice> {
        self.state
            .lock()
            .map(|s| s.voices.clone())
            .unwrap_or_default()
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        if let Ok(mut state) = self.state.lock() {
            state.spoken.push(utterance.clone());
        }
        Ok(())
    }

    fn cancel(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.cancels += 1;
        }
    }
}
