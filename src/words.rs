use include_dir::{include_dir, Dir};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::WordListError;

static WORDS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/words");

/// Name of the bundled list used when no `--words` file is given.
pub const DEFAULT_BUNDLED: &str = "default";

/// Rounds and their words, in the order the source document lists them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    rounds: Vec<(String, Vec<String>)>,
}

impl WordList {
    pub fn new(rounds: Vec<(String, Vec<String>)>) -> Self {
        Self { rounds }
    }

    /// Parse either `{"rounds": {...}}` or a bare round mapping.
    pub fn from_json(text: &str) -> Result<Self, WordListError> {
        let doc: Value = serde_json::from_str(text)?;
        let Value::Object(mut top) = doc else {
            return Err(WordListError::Malformed(
                "expected an object mapping round names to word arrays".into(),
            ));
        };

        // A non-object "rounds" value is just a round with that name.
        let rounds = if matches!(top.get("rounds"), Some(Value::Object(_))) {
            match top.remove("rounds") {
                Some(Value::Object(rounds)) => rounds,
                _ => Map::new(),
            }
        } else {
            top
        };

        let mut parsed = Vec::with_capacity(rounds.len());
        for (name, words) in rounds {
            let Value::Array(words) = words else {
                return Err(WordListError::Malformed(format!(
                    "round '{name}' is not an array of words"
                )));
            };
            let words = words
                .into_iter()
                .map(|w| match w {
                    Value::String(s) => Ok(s),
                    other => Err(WordListError::Malformed(format!(
                        "round '{name}' contains a non-string entry: {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            parsed.push((name, words));
        }

        Ok(Self { rounds: parsed })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WordListError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| WordListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Load one of the word lists compiled into the binary.
    pub fn bundled(name: &str) -> Result<Self, WordListError> {
        let file = WORDS_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| WordListError::UnknownBundled(name.to_string()))?;
        let text = file.contents_utf8().ok_or_else(|| {
            WordListError::Malformed(format!("bundled list '{name}' is not UTF-8"))
        })?;
        Self::from_json(text)
    }

    pub fn bundled_names() -> Vec<String> {
        let mut names: Vec<String> = WORDS_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn round_names(&self) -> Vec<&str> {
        self.rounds.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Words for `round`; empty when the round is unknown.
    pub fn words_for(&self, round: &str) -> &[String] {
        self.rounds
            .iter()
            .find(|(name, _)| name == round)
            .map(|(_, words)| words.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_wrapped_document_in_source_order() {
        let list = WordList::from_json(
            r#"{"rounds": {"Zebra": ["one"], "Alpha": ["two", "three"], "Middle": []}}"#,
        )
        .unwrap();

        assert_eq!(list.round_names(), vec!["Zebra", "Alpha", "Middle"]);
        assert_eq!(list.words_for("Alpha"), ["two", "three"]);
        assert!(list.words_for("Middle").is_empty());
    }

    #[test]
    fn parses_bare_mapping() {
        let list = WordList::from_json(r#"{"Year 1": ["cat", "dog"]}"#).unwrap();
        assert_eq!(list.round_names(), vec!["Year 1"]);
        assert_eq!(list.words_for("Year 1").len(), 2);
    }

    #[test]
    fn unknown_round_is_empty_not_an_error() {
        let list = WordList::from_json(r#"{"a": ["x"]}"#).unwrap();
        assert!(list.words_for("missing").is_empty());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert_matches!(WordList::from_json("[1, 2]"), Err(WordListError::Malformed(_)));
        assert_matches!(
            WordList::from_json(r#"{"a": "cat"}"#),
            Err(WordListError::Malformed(_))
        );
        assert_matches!(
            WordList::from_json(r#"{"a": ["cat", 3]}"#),
            Err(WordListError::Malformed(_))
        );
        assert_matches!(WordList::from_json("{not json"), Err(WordListError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = WordList::load(dir.path().join("nope.json"));
        assert_matches!(result, Err(WordListError::Io { .. }));
    }

    #[test]
    fn bundled_default_has_words() {
        assert!(WordList::bundled_names().contains(&DEFAULT_BUNDLED.to_string()));
        let list = WordList::bundled(DEFAULT_BUNDLED).unwrap();
        assert!(!list.is_empty());
        let first = list.round_names()[0].to_string();
        assert!(!list.words_for(&first).is_empty());
    }

    #[test]
    fn unknown_bundled_list() {
        assert_matches!(
            WordList::bundled("klingon"),
            Err(WordListError::UnknownBundled(_))
        );
    }
}
