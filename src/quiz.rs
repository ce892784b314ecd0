//! The quiz state machine.
//!
//! `Idle` (no session) -> `Active` (one current item) -> `Idle`. While
//! active, the current item is either being answered or resolved, and the
//! set of legal commands follows from that (see [`Quiz::available_commands`]).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Duration;

use crate::error::StartError;
use crate::history::{HistoryEntry, HistoryStore, Score};
use crate::normalize::answers_match;
use crate::session::{Mode, Outcome, Session, SessionParams};
use crate::speech::Speaker;
use crate::timer::{Countdown, CountdownTick};
use crate::words::WordList;

pub const IDLE_STATUS: &str = "Select a mode and round, then press Start.";
pub const TIME_UP: &str = "Time up.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Current item awaits an answer (possibly after a practice retry).
    Answering,
    /// Current item is scored; only moving on makes progress.
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Command {
    Start,
    Say,
    Repeat,
    Hint,
    Submit,
    Next,
    End,
    ClearHistory,
}

/// What the presentation layer should show under the question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Feedback {
    #[default]
    None,
    /// Practice mode first miss: not scored, try again.
    Retry,
    Correct {
        word: String,
    },
    Wrong {
        word: String,
        reason: Option<String>,
    },
    Hint(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResult {
    /// No current item, or it is already resolved.
    Ignored,
    Retry,
    Correct,
    Wrong,
}

/// Describe `word` without spelling it out.
pub fn hint_for(word: &str) -> String {
    let first = word.chars().next().unwrap_or('?');
    let last = word.chars().next_back().unwrap_or('?');
    let letters = word.chars().count();
    let vowels = word
        .chars()
        .filter(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
        .count();
    format!("Starts with: {first}. Ends with: {last}. Letters: {letters}. Vowels: {vowels}.")
}

pub struct Quiz {
    words: WordList,
    speaker: Speaker,
    history: Box<dyn HistoryStore>,
    rng: StdRng,
    session: Option<Session>,
    countdown: Countdown,
    status: String,
    feedback: Feedback,
}

impl Quiz {
    pub fn new(words: WordList, speaker: Speaker, history: Box<dyn HistoryStore>) -> Self {
        Self {
            words,
            speaker,
            history,
            rng: StdRng::from_entropy(),
            session: None,
            countdown: Countdown::default(),
            status: IDLE_STATUS.to_string(),
            feedback: Feedback::None,
        }
    }

    /// Fix the shuffle order, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    pub fn speaker_mut(&mut self) -> &mut Speaker {
        &mut self.speaker
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.list()
    }

    pub fn phase(&self) -> Phase {
        match self.session.as_ref().and_then(Session::current) {
            None => Phase::Idle,
            Some(item) if item.is_resolved() => Phase::Resolved,
            Some(_) => Phase::Answering,
        }
    }

    pub fn available_commands(&self) -> Vec<Command> {
        use Command::*;
        match self.phase() {
            Phase::Idle => vec![Start, ClearHistory],
            Phase::Answering => vec![Say, Repeat, Hint, Submit, End, ClearHistory],
            Phase::Resolved => vec![Say, Repeat, Hint, Next, End, ClearHistory],
        }
    }

    pub fn is_enabled(&self, command: Command) -> bool {
        self.available_commands().contains(&command)
    }

    pub fn start(&mut self, params: SessionParams) -> Result<(), StartError> {
        if self.session.is_some() {
            return Err(StartError::SessionActive);
        }
        self.countdown.cancel();

        let available = self.words.words_for(&params.round);
        let refusal = if available.is_empty() {
            Some(StartError::NoWords {
                round: params.round.clone(),
            })
        } else if params.count == 0 {
            Some(StartError::ZeroCount)
        } else {
            None
        };
        if let Some(err) = refusal {
            tracing::info!("not starting round '{}': {err}", params.round);
            self.status = err.to_string();
            return Err(err);
        }

        let mut words = available.to_vec();
        words.shuffle(&mut self.rng);
        words.truncate(params.count.min(words.len()));

        let session = Session::new(&params, words);
        tracing::info!(
            mode = %session.mode,
            round = %session.round,
            items = session.total(),
            per_word_secs = session.per_word_secs,
            "session started"
        );
        self.status = format!("Ready. Round: {}. Mode: {}.", session.round, session.mode);
        self.feedback = Feedback::None;
        self.session = Some(session);

        self.advance(true);
        Ok(())
    }

    /// Move to the following item, ending the session after the last one.
    /// Only legal once the current item is resolved.
    pub fn next(&mut self) -> bool {
        if self.phase() != Phase::Resolved {
            return false;
        }
        self.advance(false);
        true
    }

    fn advance(&mut self, first: bool) {
        self.countdown.cancel();
        self.feedback = Feedback::None;

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !first && session.index >= session.total() {
            self.end();
            return;
        }
        session.index += 1;
        let Some(word) = session.current().map(|item| item.word.clone()) else {
            self.end();
            return;
        };

        let intro = match session.mode {
            Mode::Practice => "New word loaded.",
            Mode::Test => "New test word loaded.",
        };
        self.status = format!("{intro} Round: {} | Q {}", session.round, session.progress());
        let countdown = session.is_timed().then_some(session.per_word_secs);
        tracing::debug!("item {}", session.progress());

        self.speaker.speak(&word);
        if let Some(secs) = countdown {
            self.countdown.start(secs);
            self.refresh_timer_status(secs);
        }
    }

    fn refresh_timer_status(&mut self, left: u32) {
        if let Some(session) = self.session.as_ref() {
            self.status = format!(
                "Time left: {left}s | Round: {} | Q {}",
                session.round,
                session.progress()
            );
        }
    }

    /// Feed elapsed wall-clock time to the per-item countdown.
    pub fn tick(&mut self, elapsed: Duration) {
        match self.countdown.advance(elapsed) {
            CountdownTick::Idle | CountdownTick::Pending => {}
            CountdownTick::Second(left) => self.refresh_timer_status(left),
            CountdownTick::Expired => {
                tracing::debug!("countdown expired");
                // A timeout does not count as an attempt.
                self.mark_wrong(Some(TIME_UP));
            }
        }
    }

    pub fn submit(&mut self, typed: &str, strict: bool) -> SubmitResult {
        let Some(session) = self.session.as_mut() else {
            return SubmitResult::Ignored;
        };
        let mode = session.mode;
        let Some(item) = session.current_mut() else {
            return SubmitResult::Ignored;
        };
        if item.is_resolved() {
            return SubmitResult::Ignored;
        }

        item.attempts += 1;
        let attempts = item.attempts;
        let matched = answers_match(typed, &item.word, strict);

        if matched {
            self.mark_correct();
            SubmitResult::Correct
        } else if mode == Mode::Practice && attempts == 1 {
            self.feedback = Feedback::Retry;
            SubmitResult::Retry
        } else {
            self.mark_wrong(None);
            SubmitResult::Wrong
        }
    }

    fn mark_correct(&mut self) {
        self.countdown.cancel();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(item) = session.current_mut() else {
            return;
        };
        item.outcome = Outcome::Correct;
        let word = item.word.clone();
        session.correct += 1;
        self.feedback = Feedback::Correct { word };
    }

    fn mark_wrong(&mut self, reason: Option<&str>) {
        self.countdown.cancel();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(item) = session.current_mut() else {
            return;
        };
        item.outcome = Outcome::Incorrect;
        let word = item.word.clone();
        session.wrong += 1;
        self.feedback = Feedback::Wrong {
            word,
            reason: reason.map(str::to_string),
        };
    }

    /// Speak the current word again. False when idle or speech is unavailable.
    pub fn say(&mut self) -> bool {
        let Some(word) = self
            .session
            .as_ref()
            .and_then(Session::current)
            .map(|item| item.word.clone())
        else {
            return false;
        };
        self.speaker.speak(&word)
    }

    pub fn request_hint(&mut self) -> Option<String> {
        let hint = hint_for(&self.session.as_ref()?.current()?.word);
        self.feedback = Feedback::Hint(hint.clone());
        Some(hint)
    }

    /// Stop the session and record it. Unanswered items count as not correct.
    pub fn end(&mut self) {
        self.countdown.cancel();
        let Some(session) = self.session.take() else {
            return;
        };

        let entry = HistoryEntry {
            mode: session.mode,
            round: session.round.clone(),
            score: Score {
                correct: session.correct,
                total: session.total(),
            },
            ended_at: chrono::Utc::now(),
        };
        tracing::info!(score = %entry.summary(), "session ended");
        if let Err(e) = self.history.record(entry) {
            tracing::warn!("could not save session to history: {e}");
        }

        self.status = format!(
            "Session ended. Score: {}/{}.",
            session.correct,
            session.total()
        );
        self.feedback = Feedback::None;
    }

    pub fn clear_history(&mut self) {
        if let Err(e) = self.history.clear() {
            tracing::warn!("could not clear history: {e}");
        }
    }
}

impl std::fmt::Debug for Quiz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quiz")
            .field("session", &self.session)
            .field("countdown", &self.countdown)
            .field("status", &self.status)
            .field("feedback", &self.feedback)
            .finish_non_exhaustive()
    }
}
