use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use spelldrill::app::{AppAction, ScreenKind};
use spelldrill::config::{Config, FileConfigStore};
use spelldrill::history::MemoryHistoryStore;
use spelldrill::quiz::{Feedback, TIME_UP};
use spelldrill::runtime::{FixedTicker, QuizEvent, Runner, TestEventSource};
use spelldrill::session::Mode;
use spelldrill::speech::{MemorySpeech, Speaker, Voice};
use spelldrill::words::WordList;
use spelldrill::{App, Quiz};

// Headless integration using the internal runtime + App without a TTY.

fn key(code: KeyCode) -> QuizEvent {
    QuizEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn build_app(config: Config, speech: &MemorySpeech, dir: &tempfile::TempDir) -> App {
    let words = WordList::new(vec![("Birds".into(), vec!["Owl".into()])]);
    let quiz = Quiz::new(
        words,
        Speaker::new(Box::new(speech.clone())),
        Box::new(MemoryHistoryStore::default()),
    );
    let store = FileConfigStore::with_path(dir.path().join("config.json"));
    App::new(quiz, Box::new(store), config)
}

/// Drive the app until the event source runs dry or the app quits.
fn drive<T: spelldrill::runtime::Ticker>(
    runner: &mut Runner<TestEventSource, T>,
    app: &mut App,
    max_steps: u32,
) -> AppAction {
    for _ in 0..max_steps {
        let (event, elapsed) = runner.step_timed();
        app.on_tick(elapsed);
        if let QuizEvent::Key(k) = event {
            if app.on_key(k) == AppAction::Quit {
                return AppAction::Quit;
            }
        }
    }
    AppAction::Continue
}

#[test]
fn headless_practice_flow_completes() {
    let dir = tempfile::tempdir().unwrap();
    let speech = MemorySpeech::with_voices(vec![Voice::new("British", "en-GB")]);
    let mut app = build_app(Config::default(), &speech, &dir);

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );

    // Start, miss once, then spell it right and move on.
    tx.send(key(KeyCode::Enter)).unwrap();
    for c in "oul".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();
    for c in "owl".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();

    let action = drive(&mut runner, &mut app, 50);

    assert_eq!(action, AppAction::Quit);
    assert_eq!(app.screen(), ScreenKind::Setup);
    assert_eq!(app.quiz.status(), "Session ended. Score: 1/1.");
    assert_eq!(speech.spoken_words(), vec!["Owl"]);
    assert_eq!(speech.spoken()[0].lang, "en-GB");

    let history = app.quiz.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].mode, Mode::Practice);
    assert_eq!(history[0].score.correct, 1);
}

#[test]
fn headless_timed_test_runs_out() {
    let dir = tempfile::tempdir().unwrap();
    let speech = MemorySpeech::default();
    let mut app = build_app(
        Config {
            mode: Mode::Test,
            seconds: 5,
            ..Config::default()
        },
        &speech,
        &dir,
    );

    app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert_eq!(app.quiz.remaining_secs(), Some(5));

    for _ in 0..5 {
        app.on_tick(Duration::from_secs(1));
    }

    let session = app.quiz.session().expect("session still active");
    assert_eq!(session.wrong, 1);
    assert_eq!(session.current().unwrap().attempts, 0);
    assert!(matches!(
        app.quiz.feedback(),
        Feedback::Wrong { reason: Some(r), .. } if r == TIME_UP
    ));

    // Typing is locked once resolved; Enter moves on and finishes the session.
    app.on_key(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::NONE));
    assert!(app.answer.is_empty());
    app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert!(app.quiz.session().is_none());
    assert_eq!(app.quiz.history()[0].score.correct, 0);
}

#[test]
fn headless_strict_mode_rejects_case_change() {
    let dir = tempfile::tempdir().unwrap();
    let speech = MemorySpeech::default();
    let mut app = build_app(
        Config {
            mode: Mode::Test,
            strict: true,
            ..Config::default()
        },
        &speech,
        &dir,
    );

    app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    for c in "owl".chars() {
        app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }
    app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

    assert_eq!(app.quiz.session().unwrap().wrong, 1);
}

#[test]
fn headless_repeat_and_hint_shortcuts() {
    let dir = tempfile::tempdir().unwrap();
    let speech = MemorySpeech::default();
    let mut app = build_app(Config::default(), &speech, &dir);

    app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    app.on_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
    app.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
    app.on_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));

    assert_eq!(speech.spoken_words(), vec!["Owl", "Owl", "Owl"]);
    assert_eq!(
        app.quiz.feedback(),
        &Feedback::Hint("Starts with: O. Ends with: l. Letters: 3. Vowels: 1.".into())
    );
    // Control shortcuts never leak into the answer.
    assert!(app.answer.is_empty());
}
