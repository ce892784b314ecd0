use std::path::PathBuf;

use thiserror::Error;

/// Failures loading the word-list document. These are startup failures.
#[derive(Debug, Error)]
pub enum WordListError {
    #[error("unable to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("word list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed word list: {0}")]
    Malformed(String),

    #[error("bundled word list '{0}' not found")]
    UnknownBundled(String),
}

/// Failures writing the persisted history slot.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures reported by a speech backend. Never shown to the user.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to launch speech synthesiser: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Reasons a session could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("No words found for this round.")]
    NoWords { round: String },

    #[error("Choose at least one word.")]
    ZeroCount,

    #[error("A session is already running.")]
    SessionActive,
}
