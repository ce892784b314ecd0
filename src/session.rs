use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// One free retry per item before a miss is scored.
    #[default]
    Practice,
    /// Single attempt, optionally time-boxed per item.
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

/// One quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub word: String,
    pub attempts: u32,
    pub outcome: Outcome,
}

impl Item {
    pub fn new(word: String) -> Self {
        Self {
            word,
            attempts: 0,
            outcome: Outcome::Unknown,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome != Outcome::Unknown
    }
}

/// What the user asked for when starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub mode: Mode,
    pub round: String,
    pub count: usize,
    /// Seconds allowed per item in test mode; 0 means untimed.
    pub per_word_secs: u32,
}

/// One run of the quiz. `index` is 1-based and 0 before the first item.
#[derive(Debug, Clone)]
pub struct Session {
    pub mode: Mode,
    pub round: String,
    pub per_word_secs: u32,
    pub items: Vec<Item>,
    pub index: usize,
    pub correct: usize,
    pub wrong: usize,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(params: &SessionParams, words: Vec<String>) -> Self {
        Self {
            mode: params.mode,
            round: params.round.clone(),
            per_word_secs: params.per_word_secs,
            items: words.into_iter().map(Item::new).collect(),
            index: 0,
            correct: 0,
            wrong: 0,
            started_at: Utc::now(),
        }
    }

    pub fn current(&self) -> Option<&Item> {
        self.index
            .checked_sub(1)
            .and_then(|idx| self.items.get(idx))
    }

    pub fn current_mut(&mut self) -> Option<&mut Item> {
        self.index
            .checked_sub(1)
            .and_then(move |idx| self.items.get_mut(idx))
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn is_timed(&self) -> bool {
        self.mode == Mode::Test && self.per_word_secs > 0
    }

    /// "i/n" progress label.
    pub fn progress(&self) -> String {
        format!("{}/{}", self.index, self.items.len())
    }
}
