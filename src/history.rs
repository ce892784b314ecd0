use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::HistoryError;
use crate::session::Mode;

/// Most entries kept; older ones are dropped on `record`.
pub const HISTORY_CAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

/// Summary of one finished (or ended early) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub mode: Mode,
    pub round: String,
    pub score: Score,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ended_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// `mode | round | correct/total`
    pub fn summary(&self) -> String {
        format!(
            "{} | {} | {}/{}",
            self.mode, self.round, self.score.correct, self.score.total
        )
    }

    pub fn ended_at_local(&self) -> String {
        self.ended_at
            .with_timezone(&Local)
            .format("%d/%m/%Y, %H:%M:%S")
            .to_string()
    }
}

/// Bounded, most-recent-first list of past sessions.
pub trait HistoryStore {
    fn record(&mut self, entry: HistoryEntry) -> Result<(), HistoryError>;
    /// Never fails: missing or unreadable data is an empty history.
    fn list(&self) -> Vec<HistoryEntry>;
    fn clear(&mut self) -> Result<(), HistoryError>;
}

fn push_front_capped(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    entries.insert(0, entry);
    entries.truncate(HISTORY_CAP);
}

/// History persisted as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::history_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(entries)?;
        // Write beside the slot then swap it in, so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl HistoryStore for FileHistoryStore {
    fn record(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.list();
        push_front_capped(&mut entries, entry);
        self.write_all(&entries)
    }

    fn list(&self) -> Vec<HistoryEntry> {
        let Ok(bytes) = fs::read(&self.path) else {
            return Vec::new();
        };
        match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("ignoring unreadable history {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore for MemoryHistoryStore {
    fn record(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        push_front_capped(&mut self.entries, entry);
        Ok(())
    }

    fn list(&self) -> Vec<HistoryEntry> {
        self.entries.clone()
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn entry(round: &str, correct: usize) -> HistoryEntry {
        HistoryEntry {
            mode: Mode::Test,
            round: round.to_string(),
            score: Score { correct, total: 10 },
            ended_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn serializes_with_camel_case_and_epoch_millis() {
        let json = serde_json::to_value(entry("Round 1", 7)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "mode": "test",
                "round": "Round 1",
                "score": {"correct": 7, "total": 10},
                "endedAt": 1_700_000_000_000i64,
            })
        );
    }

    #[test]
    fn summary_line() {
        assert_eq!(entry("Animals", 3).summary(), "test | Animals | 3/10");
    }

    #[test]
    fn file_store_records_most_recent_first() {
        let dir = tempdir().unwrap();
        let mut store = FileHistoryStore::with_path(dir.path().join("history.json"));
        assert!(store.list().is_empty());

        store.record(entry("first", 1)).unwrap();
        store.record(entry("second", 2)).unwrap();

        let rounds: Vec<_> = store.list().into_iter().map(|e| e.round).collect();
        assert_eq!(rounds, vec!["second", "first"]);
        assert!(!dir.path().join("history.json.tmp").exists());
    }

    #[test]
    fn file_store_caps_entries() {
        let dir = tempdir().unwrap();
        let mut store = FileHistoryStore::with_path(dir.path().join("history.json"));
        for i in 0..HISTORY_CAP + 5 {
            store.record(entry(&format!("r{i}"), i)).unwrap();
        }

        let list = store.list();
        assert_eq!(list.len(), HISTORY_CAP);
        assert_eq!(list[0].round, format!("r{}", HISTORY_CAP + 4));
        assert_eq!(list[HISTORY_CAP - 1].round, "r5");
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, b"{ definitely not a list").unwrap();

        let mut store = FileHistoryStore::with_path(&path);
        assert!(store.list().is_empty());

        store.record(entry("fresh", 4)).unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn clear_removes_everything_and_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let mut store = FileHistoryStore::with_path(dir.path().join("nested/history.json"));
        store.clear().unwrap();

        store.record(entry("x", 1)).unwrap();
        store.clear().unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn memory_store_caps_entries() {
        let mut store = MemoryHistoryStore::default();
        for i in 0..HISTORY_CAP * 2 {
            store.record(entry("r", i)).unwrap();
            assert!(store.list().len() <= HISTORY_CAP);
        }
        assert_eq!(store.list()[0].score.correct, HISTORY_CAP * 2 - 1);
    }
}
